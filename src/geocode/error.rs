use std::time::Duration;

use thiserror::Error;

/// Failure of the external geocoding service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("geocoding request failed: {0}")]
    Transport(String),

    #[error("geocoding service returned status {0}")]
    Status(u16),

    #[error("could not decode geocoding response: {0}")]
    Decode(String),

    #[error("no geocoding match for {0:?}")]
    NoMatch(String),

    #[error("geocoding request timed out after {0:?}")]
    Timeout(Duration),

    #[error("geocoding service returned an invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Failure of the cache service itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("cache lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Failure of a forward (name → coordinates) lookup.
///
/// Reverse lookups never fail; they degrade instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("place name is empty")]
    EmptyPlace,

    #[error("could not resolve {place:?}: {source}")]
    Resolver {
        place: String,
        #[source]
        source: ResolverError,
    },
}
