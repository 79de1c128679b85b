//! Storage collaborator interface and an in-memory implementation.
//!
//! A [`SpatialStore`] executes composed [`Statement`]s. Connection
//! management, deadlines and the physical schema belong to the backend.

mod error;
mod in_memory;
mod record;
mod statement;

use async_trait::async_trait;

pub use error::StoreError;
pub use in_memory::InMemorySpatialStore;
pub use record::{DatasetStats, DatasetSummary, DatasetType, Extent, Record, UnknownDatasetType};
pub use statement::Statement;

#[async_trait]
pub trait SpatialStore: Send + Sync {
    /// Run a composed query and return the matching rows.
    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError>;

    /// Row count and value range for each dataset type that has rows.
    async fn summaries(&self) -> Result<Vec<DatasetSummary>, StoreError>;

    /// Aggregate statistics for one dataset type.
    async fn stats(&self, dataset_type: DatasetType) -> Result<DatasetStats, StoreError>;
}
