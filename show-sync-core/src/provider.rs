use crate::error::ProviderError;

/// A metadata source that can resolve an IMDB ID into an entity snapshot.
///
/// Implementations are expected to cache fetched entities on disk and serve
/// unexpired entries without contacting the network. `force_refresh` bypasses
/// the cached read (the fresh result is still written back), which is how
/// forced and automated re-imports pick up upstream changes before the TTL
/// runs out.
pub trait EntityProvider {
    type Entity;

    fn fetch(&self, imdb_id: &str, force_refresh: bool) -> Result<Self::Entity, ProviderError>;
}
