use crate::api::ApiClient;
use crate::cache::TaxonomyCache;
use crate::controls::dispatch::RequestGate;

/// Which server page we were loaded into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ViewKind {
    Listing,
    Favorites,
    Admin,
}

impl ViewKind {
    pub fn from_path(path: &str) -> Self {
        if path.contains("/favorites") {
            ViewKind::Favorites
        } else if path == "/admin" || path.starts_with("/admin/") {
            ViewKind::Admin
        } else {
            ViewKind::Listing
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PageContext {
    pub view: ViewKind,
}

impl PageContext {
    pub fn from_path(path: &str) -> Self {
        Self {
            view: ViewKind::from_path(path),
        }
    }

    pub fn from_location() -> Self {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();
        Self::from_path(&path)
    }

    /// Unfavoriting here takes the item out of view.
    pub fn removes_unfavorited(&self) -> bool {
        self.view == ViewKind::Favorites
    }

    pub fn allows_title_edit(&self) -> bool {
        self.view == ViewKind::Admin
    }
}

/// Everything a handler needs, built once at startup and cloned into closures.
#[derive(Clone)]
pub(crate) struct AppState {
    pub api: ApiClient,
    pub page: PageContext,
    pub taxonomy: TaxonomyCache,
    pub gate: RequestGate,
}

impl AppState {
    pub fn new(api: ApiClient, page: PageContext) -> Self {
        Self {
            api,
            page,
            taxonomy: TaxonomyCache::new(),
            gate: RequestGate::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ApiClient::from_env(), PageContext::from_location())
    }
}
