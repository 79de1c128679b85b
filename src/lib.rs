//! Geospatial dataset search.
//!
//! Filters are compiled into a single parameterized predicate
//! ([`filter::compile`]), executed against a [`store::SpatialStore`] by the
//! [`fetch::FetchExecutor`], and centered on places resolved through the
//! read-through [`geocode::GeocodeCache`]. [`query::DatasetQueries`] ties the
//! three together for transports such as the optional [`http`] router.

pub mod config;
pub mod coordinate;
pub mod fetch;
pub mod filter;
pub mod geocode;
pub mod query;
pub mod sql;
pub mod store;
pub mod telemetry;

#[cfg(feature = "http")]
pub mod http;

pub use config::{Config, ConfigError};
pub use coordinate::Coordinate;
pub use fetch::{FetchError, FetchExecutor, FetchRequest, FetchResult, Page, PageLimits, QueryTemplate};
pub use filter::{compile, CompiledPredicate, FilterSpec, InvalidFilter, SearchParams, SearchRequest};
pub use geocode::{
    CacheStore, GeocodeCache, GeocodeError, InMemoryCacheStore, Resolver, ResolverError,
};
#[cfg(feature = "nominatim")]
pub use geocode::NominatimResolver;
pub use query::{DatasetInfo, DatasetQueries, QueryError};
pub use store::{DatasetType, InMemorySpatialStore, Record, SpatialStore, StoreError};
