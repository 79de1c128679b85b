use thiserror::Error;

use crate::fetch::FetchError;
use crate::filter::InvalidFilter;
use crate::geocode::GeocodeError;
use crate::store::StoreError;

/// Failure of an orchestrated dataset query, as reported to the boundary.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilter),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("storage query failed: {0}")]
    Storage(#[from] StoreError),
}

impl QueryError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::InvalidFilter(_) => 400,
            QueryError::Geocode(GeocodeError::EmptyPlace) => 400,
            QueryError::Geocode(GeocodeError::Resolver { .. }) => 502,
            QueryError::Fetch(FetchError::FanoutTooWide { .. }) => 400,
            QueryError::Fetch(_) => 500,
            QueryError::Storage(_) => 500,
        }
    }

    /// Stable name of the failure class, for clients and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::InvalidFilter(_)
            | QueryError::Geocode(GeocodeError::EmptyPlace)
            | QueryError::Fetch(FetchError::FanoutTooWide { .. }) => "invalid_filter",
            QueryError::Geocode(GeocodeError::Resolver { .. }) => "resolver_failure",
            QueryError::Fetch(FetchError::PartialFanout { .. }) => "partial_fanout_failure",
            QueryError::Fetch(_) | QueryError::Storage(_) => "storage_failure",
        }
    }

    /// True when the caller, not a collaborator, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
