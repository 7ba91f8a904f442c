use crate::api::{ApiError, ApiResult};
use crate::util::{log_debug, log_error};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Per-control request tokens.
///
/// Every request issued for a key supersedes the previous one; a response is
/// only applied while its ticket is still the newest for that key.
#[derive(Clone, Default)]
pub(crate) struct RequestGate {
    latest: Arc<Mutex<HashMap<String, u64>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ticket {
    key: String,
    seq: u64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, key: impl Into<String>) -> Ticket {
        let key = key.into();
        let mut latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        let seq = latest.get(&key).copied().unwrap_or(0) + 1;
        latest.insert(key.clone(), seq);
        Ticket { key, seq }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|p| p.into_inner());
        latest.get(&ticket.key) == Some(&ticket.seq)
    }
}

#[derive(Debug)]
pub(crate) enum Dispatched {
    Applied,
    /// A newer request for the same control was issued meanwhile.
    Stale,
    Failed(ApiError),
}

/// One gesture's round trip. The DOM is only touched by `reconcile`, and only
/// on a successful, still-current response.
pub(crate) async fn dispatch<T>(
    gate: &RequestGate,
    key: String,
    request: impl Future<Output = ApiResult<T>>,
    reconcile: impl FnOnce(T),
) -> Dispatched {
    let ticket = gate.issue(key);
    let result = request.await;

    if !gate.is_current(&ticket) {
        return Dispatched::Stale;
    }

    match result {
        Ok(payload) => {
            reconcile(payload);
            Dispatched::Applied
        }
        Err(e) => Dispatched::Failed(e),
    }
}

/// Like/favorite failures never reach the user; they go to the console.
pub(crate) fn report(scope: &str, key: &str, outcome: &Dispatched) {
    match outcome {
        Dispatched::Applied => {}
        Dispatched::Stale => log_debug(scope, format!("dropped stale response for {key}")),
        Dispatched::Failed(e) => log_error(scope, format!("{key} failed: {e}")),
    }
}
