use crate::api::{ApiResult, Backend};
use crate::models::TagCategory;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Tag taxonomy for the lifetime of the page.
///
/// The first successful fetch is kept and never invalidated; a failed fetch
/// leaves the cache empty so the next open tries again.
#[derive(Clone, Default)]
pub(crate) struct TaxonomyCache {
    cell: Arc<OnceCell<Arc<[TagCategory]>>>,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn cached(&self) -> Option<Arc<[TagCategory]>> {
        self.cell.get().cloned()
    }

    pub async fn get_or_fetch<B: Backend>(&self, backend: &B) -> ApiResult<Arc<[TagCategory]>> {
        if let Some(hit) = self.cell.get() {
            return Ok(hit.clone());
        }

        let fetched: Arc<[TagCategory]> = backend.tag_taxonomy().await?.into();
        // Two opens racing on a cold cache both fetch; the first to land is kept.
        Ok(self.cell.get_or_init(|| fetched).clone())
    }
}
