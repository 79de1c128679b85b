//! Read-through geocode cache.
//!
//! ```text
//!  MISS -> resolver -> success -> CACHED (24h)
//!  MISS -> resolver -> failure -> forward: error / reverse: fallback, not cached
//!  CACHED -> TTL elapsed -> MISS
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::cache_store::CacheStore;
use super::error::{GeocodeError, ResolverError};
use super::flight::KeyedLocks;
use super::resolver::Resolver;
use crate::coordinate::Coordinate;

/// Lifetime of every cached lookup.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Deadline for a single resolver call.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a reverse lookup's display name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Cached,
    Resolved,
    /// The resolver failed; the name is synthesised from the coordinates.
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseGeocode {
    pub display_name: String,
    pub source: Resolution,
}

impl ReverseGeocode {
    pub fn is_degraded(&self) -> bool {
        self.source == Resolution::Degraded
    }
}

/// Display text used when a reverse lookup cannot be resolved.
pub fn fallback_display(at: Coordinate) -> String {
    format!("Coordinates: {:.4}, {:.4}", at.lat(), at.lon())
}

/// Cache key for a place name; case and surrounding whitespace are ignored.
pub fn forward_key(place: &str) -> String {
    format!("geo:fwd:{}", place.trim().to_lowercase())
}

/// Cache key for a point, rounded to six decimals.
pub fn reverse_key(at: Coordinate) -> String {
    format!("geo:rev:{:.6},{:.6}", at.lat(), at.lon())
}

// `{}` on f64 is the shortest representation that parses back to the same bits.
fn encode_coordinate(at: Coordinate) -> String {
    format!("{},{}", at.lat(), at.lon())
}

fn decode_coordinate(value: &str) -> Option<Coordinate> {
    let (lat, lon) = value.split_once(',')?;
    Coordinate::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?).ok()
}

#[derive(Clone)]
pub struct GeocodeCache {
    store: Arc<dyn CacheStore>,
    resolver: Arc<dyn Resolver>,
    flights: Arc<KeyedLocks>,
}

impl GeocodeCache {
    /// Create a cache in front of `resolver`, storing entries in `store`.
    pub fn new(store: Arc<dyn CacheStore>, resolver: Arc<dyn Resolver>) -> Self {
        GeocodeCache {
            store,
            resolver,
            flights: Arc::new(KeyedLocks::new()),
        }
    }

    /// Coordinates for a place name. Resolver failures are returned to the
    /// caller; there is no safe coordinate to fall back to.
    pub async fn resolve_forward(&self, place: &str) -> Result<Coordinate, GeocodeError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(GeocodeError::EmptyPlace);
        }
        let key = forward_key(place);

        if let Some(hit) = self.cached_coordinate(&key).await {
            return Ok(hit);
        }

        let _flight = self.flights.acquire(&key).await;
        if let Some(hit) = self.cached_coordinate(&key).await {
            return Ok(hit);
        }

        let resolved = self
            .bounded(self.resolver.forward(place))
            .await
            .map_err(|source| {
                warn!(place, error = %source, "forward geocode failed");
                GeocodeError::Resolver {
                    place: place.to_string(),
                    source,
                }
            })?;

        self.store_value(&key, encode_coordinate(resolved)).await;
        debug!(place, coordinate = %resolved, "forward geocode resolved");
        Ok(resolved)
    }

    /// Display name for a point. Never fails: resolver errors degrade to
    /// [`fallback_display`], which is not cached.
    pub async fn resolve_reverse(&self, at: Coordinate) -> ReverseGeocode {
        let key = reverse_key(at);

        if let Some(name) = self.cached(&key).await {
            return ReverseGeocode {
                display_name: name,
                source: Resolution::Cached,
            };
        }

        let _flight = self.flights.acquire(&key).await;
        if let Some(name) = self.cached(&key).await {
            return ReverseGeocode {
                display_name: name,
                source: Resolution::Cached,
            };
        }

        let outcome = match self.bounded(self.resolver.reverse(at)).await {
            Ok(name) if name.trim().is_empty() => Err(ResolverError::NoMatch(at.to_string())),
            other => other,
        };

        match outcome {
            Ok(name) => {
                self.store_value(&key, name.clone()).await;
                debug!(%at, name = %name, "reverse geocode resolved");
                ReverseGeocode {
                    display_name: name,
                    source: Resolution::Resolved,
                }
            }
            Err(e) => {
                warn!(%at, error = %e, "reverse geocode degraded");
                ReverseGeocode {
                    display_name: fallback_display(at),
                    source: Resolution::Degraded,
                }
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ResolverError>>,
    ) -> Result<T, ResolverError> {
        match tokio::time::timeout(RESOLVE_TIMEOUT, call).await {
            Ok(result) => result,
            Err(_) => Err(ResolverError::Timeout(RESOLVE_TIMEOUT)),
        }
    }

    async fn cached(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(value)) => {
                debug!(key, "geocode cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "geocode cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "geocode cache read failed");
                None
            }
        }
    }

    async fn cached_coordinate(&self, key: &str) -> Option<Coordinate> {
        let value = self.cached(key).await?;
        let decoded = decode_coordinate(&value);
        if decoded.is_none() {
            warn!(key, value = %value, "undecodable cached coordinate");
        }
        decoded
    }

    async fn store_value(&self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, value, CACHE_TTL).await {
            warn!(key, error = %e, "geocode cache write failed");
        }
    }
}
