//! Dataset Query Orchestrator.
//!
//! [`DatasetQueries`] is what transports call. Each operation resolves a
//! place through the geocode cache when needed, compiles the filters, and
//! issues one AND-combined query. The only fan-out path is the legacy
//! [`DatasetQueries::nearby_any`].

mod catalog;
mod datasets;
mod error;

pub use catalog::DatasetInfo;
pub use datasets::{DatasetQueries, DEFAULT_LARGEST};
pub use error::QueryError;
