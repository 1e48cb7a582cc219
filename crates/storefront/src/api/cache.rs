//! Cache value types for the catalog cache.

use easel_core::Artwork;

/// Values stored in the catalog cache.
///
/// Only read-only catalog data is cached; cart, order, and auth responses
/// are always fetched fresh.
#[derive(Clone)]
pub(super) enum CacheValue {
    Artwork(Box<Artwork>),
    Artworks(Vec<Artwork>),
}
