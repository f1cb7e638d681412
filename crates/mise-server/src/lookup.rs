//! The lookup cascade: local catalog, then resolution cache, then the
//! external sources, short-circuiting on the first hit.

use mise_core::{CachedResolution, OnlineProduct, ProductRecord};
use mise_sources::SourceRegistry;

use crate::storage::Storage;

/// Where the cascade terminated for a code.
#[derive(Debug)]
pub enum LookupOutcome {
    /// Tier 1 hit: the catalog row as stored.
    Local(ProductRecord),
    /// Tier 2 hit: a previously resolved code served without any network
    /// call.
    Cached(CachedResolution),
    /// Tier 3 hit: freshly resolved by an external source and written back.
    Online(OnlineProduct),
    /// Every tier missed. A valid negative outcome, not an error.
    NotFound,
}

/// Runs the cascade for an already-normalized code.
///
/// A tier-3 hit is written back into the resolution cache before
/// returning, so the next lookup for the same code stops at tier 2.
pub async fn consultar(storage: &Storage, sources: &SourceRegistry, codigo: &str) -> LookupOutcome {
    if let Some(record) = storage.find_local(codigo).await {
        tracing::debug!(codigo, "lookup served from local catalog");
        return LookupOutcome::Local(record);
    }

    if let Some(entry) = storage.find_cached(codigo).await {
        tracing::debug!(codigo, fonte = %entry.fonte, "lookup served from resolution cache");
        return LookupOutcome::Cached(entry);
    }

    if let Some(product) = sources.lookup_first(codigo).await {
        storage.cache_resolution(codigo, &product).await;
        return LookupOutcome::Online(product);
    }

    tracing::debug!(codigo, "lookup exhausted every tier");
    LookupOutcome::NotFound
}
