use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum FetchError {
    /// More concurrent sub-queries were requested than the executor allows.
    #[error("fan-out of {requested} queries exceeds the limit of {max}")]
    FanoutTooWide { requested: usize, max: usize },

    /// The only query of a single-request fetch failed.
    #[error("storage query failed: {0}")]
    Storage(#[source] StoreError),

    /// One sub-query of a fan-out failed; the whole fetch is discarded.
    #[error("sub-query {index} of {total} failed: {source}")]
    PartialFanout {
        index: usize,
        total: usize,
        #[source]
        source: StoreError,
    },

    /// A sub-query task panicked or was aborted before producing a result.
    #[error("sub-query {index} did not complete: {reason}")]
    Task { index: usize, reason: String },
}

impl FetchError {
    /// The underlying storage error, if this failure came from storage.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            FetchError::Storage(e) | FetchError::PartialFanout { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
