//! Scripted in-memory backend for host tests.

use super::{ApiError, ApiErrorKind, ApiResult, Backend};
use crate::models::{
    Ack, EditPostRequest, FavoriteOutcome, ItemId, LikeOutcome, PostDetails, RenameOutcome,
    RenameRequest, TagCategory,
};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub calls: RefCell<Vec<String>>,
    pub likes: RefCell<VecDeque<ApiResult<LikeOutcome>>>,
    pub favorites: RefCell<VecDeque<ApiResult<FavoriteOutcome>>>,
    pub details: RefCell<VecDeque<ApiResult<PostDetails>>>,
    pub edits: RefCell<VecDeque<ApiResult<Ack>>>,
    pub renames: RefCell<VecDeque<ApiResult<RenameOutcome>>>,
    pub taxonomy: RefCell<VecDeque<ApiResult<Vec<TagCategory>>>>,
    /// Runs while a request is in flight, e.g. to simulate a second click.
    pub on_request: RefCell<Option<Box<dyn Fn()>>>,
}

pub(crate) fn rejected(error: &str) -> ApiError {
    ApiError {
        kind: ApiErrorKind::Rejected,
        message: format!("Request rejected: {error}"),
        server_error: Some(error.to_string()),
    }
}

pub(crate) fn http_500() -> ApiError {
    ApiError {
        kind: ApiErrorKind::Http,
        message: "Request failed (500): boom".to_string(),
        server_error: None,
    }
}

fn next<T>(queue: &RefCell<VecDeque<ApiResult<T>>>, what: &str) -> ApiResult<T> {
    queue
        .borrow_mut()
        .pop_front()
        .unwrap_or_else(|| panic!("no scripted response left for {what}"))
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
        if let Some(hook) = self.on_request.borrow().as_ref() {
            hook();
        }
    }
}

impl Backend for FakeBackend {
    async fn toggle_like(&self, id: &ItemId) -> ApiResult<LikeOutcome> {
        self.record(format!("POST /like/{id}"));
        next(&self.likes, "like")
    }

    async fn toggle_favorite(&self, id: &ItemId) -> ApiResult<FavoriteOutcome> {
        self.record(format!("POST /favorite/{id}"));
        next(&self.favorites, "favorite")
    }

    async fn post_details(&self, id: &ItemId) -> ApiResult<PostDetails> {
        self.record(format!("GET /post/{id}/details"));
        next(&self.details, "details")
    }

    async fn edit_post(&self, id: &ItemId, req: &EditPostRequest) -> ApiResult<Ack> {
        self.record(format!("POST /post/{id}/edit {:?} {:?}", req.title, req.tags));
        next(&self.edits, "edit")
    }

    async fn rename_title(&self, id: &ItemId, req: &RenameRequest) -> ApiResult<RenameOutcome> {
        self.record(format!("POST /admin/edit_title/{id} {:?}", req.title));
        next(&self.renames, "rename")
    }

    async fn tag_taxonomy(&self) -> ApiResult<Vec<TagCategory>> {
        self.record("GET /api/tags".to_string());
        next(&self.taxonomy, "taxonomy")
    }
}
