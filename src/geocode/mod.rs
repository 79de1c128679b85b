//! Place-name and coordinate resolution behind a read-through cache.
//!
//! [`GeocodeCache`] is the only entry point the rest of the crate uses. It
//! owns an injected [`CacheStore`] and [`Resolver`], bounds every resolver
//! call by [`RESOLVE_TIMEOUT`], and coalesces concurrent misses for the same
//! key into one resolver call.

mod cache;
mod cache_store;
mod error;
mod flight;
#[cfg(feature = "nominatim")]
mod nominatim;
mod resolver;

pub use cache::{
    fallback_display, forward_key, reverse_key, GeocodeCache, Resolution, ReverseGeocode,
    CACHE_TTL, RESOLVE_TIMEOUT,
};
pub use cache_store::{CacheStore, InMemoryCacheStore};
pub use error::{CacheError, GeocodeError, ResolverError};
#[cfg(feature = "nominatim")]
pub use nominatim::NominatimResolver;
pub use resolver::Resolver;
