pub(crate) mod taxonomy;

pub(crate) use taxonomy::TaxonomyCache;
