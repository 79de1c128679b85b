use async_trait::async_trait;

use super::error::ResolverError;
use crate::coordinate::Coordinate;

/// Network client for a geocoding service. Implementations do no caching.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Coordinates of the best match for a place name.
    async fn forward(&self, place: &str) -> Result<Coordinate, ResolverError>;

    /// Human-readable name for a point.
    async fn reverse(&self, at: Coordinate) -> Result<String, ResolverError>;
}
