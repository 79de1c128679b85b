//! Request composition and parallel execution against a [`SpatialStore`].
//!
//! The normal path ANDs every compiled predicate into one [`FetchRequest`],
//! so exactly one query runs. Passing several requests to
//! [`FetchExecutor::execute`] runs them concurrently and concatenates their
//! rows without de-duplication.
//!
//! [`SpatialStore`]: crate::store::SpatialStore

mod error;
mod executor;
mod request;
mod result;

pub use error::FetchError;
pub use executor::{FetchExecutor, DEFAULT_MAX_FANOUT};
pub use request::{FetchRequest, Page, PageLimits, QueryTemplate, DEFAULT_LIMIT, MAX_LIMIT};
pub use result::FetchResult;
