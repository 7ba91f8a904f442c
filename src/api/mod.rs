use crate::models::{
    Ack, EditPostRequest, FavoriteOutcome, ItemId, LikeOutcome, PostDetails, RenameOutcome,
    RenameRequest, TagCategory,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[cfg(test)]
pub(crate) mod fake;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
    /// 2xx response whose `success` flag was not truthy.
    Rejected,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// Server-supplied `error` text, only for `Rejected`.
    pub server_error: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
            server_error: None,
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
            server_error: None,
        }
    }

    fn http(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("Request failed ({status}): {body}"),
            server_error: None,
        }
    }

    fn rejected(server_error: Option<String>) -> Self {
        let server_error = server_error.filter(|s| !s.trim().is_empty());
        Self {
            kind: ApiErrorKind::Rejected,
            message: match &server_error {
                Some(e) => format!("Request rejected: {e}"),
                None => "Request rejected".to_string(),
            },
            server_error,
        }
    }

    /// Text for a blocking alert: the server's own error when it sent one.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_error
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// JavaScript truthiness, which is what the server contract was written against.
fn is_truthy(v: &serde_json::Value) -> bool {
    use serde_json::Value;
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Status check + JSON parse, shared by every endpoint.
pub(crate) fn interpret_json(status: u16, body: &str) -> ApiResult<serde_json::Value> {
    if !(200..300).contains(&status) {
        return Err(ApiError::http(status, body));
    }
    serde_json::from_str(body).map_err(ApiError::parse)
}

/// Full action policy: status, JSON, then the `success` envelope, then payload shape.
pub(crate) fn interpret_envelope<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
    let value = interpret_json(status, body)?;

    let success = value.get("success").map(is_truthy).unwrap_or(false);
    if !success {
        let server_error = value
            .get("error")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        return Err(ApiError::rejected(server_error));
    }

    serde_json::from_value(value).map_err(ApiError::parse)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let Some(window) = web_sys::window() else {
            return Self {
                api_url: String::new(),
            };
        };

        // `window.ENV.API_URL` wins, `window.ENV.api_url` is accepted for older pages.
        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                        if let Some(url_str) = api_url.as_string() {
                            return Self { api_url: url_str };
                        }
                    }
                }
            }
        }

        // reqwest needs absolute URLs, so default to the page's own origin.
        Self {
            api_url: window.location().origin().unwrap_or_default(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The server collaborator, as seen by the controls.
pub(crate) trait Backend {
    async fn toggle_like(&self, id: &ItemId) -> ApiResult<LikeOutcome>;
    async fn toggle_favorite(&self, id: &ItemId) -> ApiResult<FavoriteOutcome>;
    async fn post_details(&self, id: &ItemId) -> ApiResult<PostDetails>;
    async fn edit_post(&self, id: &ItemId, req: &EditPostRequest) -> ApiResult<Ack>;
    async fn rename_title(&self, id: &ItemId, req: &RenameRequest) -> ApiResult<RenameOutcome>;
    async fn tag_taxonomy(&self) -> ApiResult<Vec<TagCategory>>;
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Raw round trip: returns status and body text, leaving interpretation to the caller.
    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<(u16, String)> {
        let mut req = self
            .http
            .request(method, self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status().as_u16();
        let text = res.text().await.map_err(ApiError::network)?;
        Ok((status, text))
    }

    async fn request_action<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let (status, text) = self.send(method, path, body).await?;
        interpret_envelope(status, &text)
    }
}

impl Backend for ApiClient {
    async fn toggle_like(&self, id: &ItemId) -> ApiResult<LikeOutcome> {
        let path = format!("/like/{}", id.path_segment());
        self.request_action(reqwest::Method::POST, &path, None::<&()>)
            .await
    }

    async fn toggle_favorite(&self, id: &ItemId) -> ApiResult<FavoriteOutcome> {
        let path = format!("/favorite/{}", id.path_segment());
        self.request_action(reqwest::Method::POST, &path, None::<&()>)
            .await
    }

    async fn post_details(&self, id: &ItemId) -> ApiResult<PostDetails> {
        let path = format!("/post/{}/details", id.path_segment());
        self.request_action(reqwest::Method::GET, &path, None::<&()>)
            .await
    }

    async fn edit_post(&self, id: &ItemId, req: &EditPostRequest) -> ApiResult<Ack> {
        let path = format!("/post/{}/edit", id.path_segment());
        self.request_action(reqwest::Method::POST, &path, Some(req))
            .await
    }

    async fn rename_title(&self, id: &ItemId, req: &RenameRequest) -> ApiResult<RenameOutcome> {
        let path = format!("/admin/edit_title/{}", id.path_segment());
        self.request_action(reqwest::Method::POST, &path, Some(req))
            .await
    }

    async fn tag_taxonomy(&self) -> ApiResult<Vec<TagCategory>> {
        // Bare array, no `success` envelope.
        let (status, text) = self
            .send(reqwest::Method::GET, "/api/tags", None::<&()>)
            .await?;
        let value = interpret_json(status, &text)?;
        serde_json::from_value(value).map_err(ApiError::parse)
    }
}
