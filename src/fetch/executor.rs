//! Fan-out/fan-in execution of independent fetch requests.
//!
//! Every request becomes one task on a [`JoinSet`]; all tasks are spawned
//! before any is awaited, and `execute` returns only after every task has
//! finished. Results land in a slot per request so grouping follows launch
//! order regardless of completion order. Dropping the `execute` future drops
//! the `JoinSet`, which aborts whatever is still running.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::error::FetchError;
use super::request::FetchRequest;
use super::result::FetchResult;
use crate::store::{Record, SpatialStore, StoreError};

/// Upper bound on concurrently launched sub-queries per call.
pub const DEFAULT_MAX_FANOUT: usize = 16;

type Slot = Option<Result<Vec<Record>, StoreError>>;

#[derive(Clone)]
pub struct FetchExecutor {
    store: Arc<dyn SpatialStore>,
    max_fanout: usize,
}

impl FetchExecutor {
    /// Create an executor with the default fan-out bound.
    pub fn new(store: Arc<dyn SpatialStore>) -> Self {
        FetchExecutor {
            store,
            max_fanout: DEFAULT_MAX_FANOUT,
        }
    }

    /// Set the fan-out bound. Values below 1 are raised to 1.
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = max_fanout.max(1);
        self
    }

    pub fn max_fanout(&self) -> usize {
        self.max_fanout
    }

    /// Run every request concurrently and wait for all of them.
    ///
    /// Any failing sub-query fails the whole call and the rows of the
    /// successful ones are discarded. When several fail, the error reported is
    /// the one from the earliest request in launch order.
    pub async fn execute(&self, requests: Vec<FetchRequest>) -> Result<FetchResult, FetchError> {
        let total = requests.len();
        if total > self.max_fanout {
            return Err(FetchError::FanoutTooWide {
                requested: total,
                max: self.max_fanout,
            });
        }
        if total == 0 {
            return Ok(FetchResult::default());
        }

        debug!(fanout = total, "launching fetch tasks");

        let mut tasks = JoinSet::new();
        let mut launched = HashMap::with_capacity(total);
        for (index, request) in requests.iter().enumerate() {
            let statement = request.statement();
            let store = Arc::clone(&self.store);
            let handle = tasks.spawn(async move {
                debug!(task = index, sql = %statement.sql, "executing");
                store.query(&statement).await
            });
            launched.insert(handle.id(), index);
        }

        let mut slots: Vec<Slot> = (0..total).map(|_| None).collect();
        let mut join_failures: Vec<Option<String>> = vec![None; total];
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    if let Some(&index) = launched.get(&id) {
                        slots[index] = Some(result);
                    }
                }
                Err(e) => {
                    if let Some(&index) = launched.get(&e.id()) {
                        join_failures[index] = Some(e.to_string());
                    }
                }
            }
        }

        let mut groups = Vec::with_capacity(total);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(rows)) => groups.push(rows),
                Some(Err(source)) => {
                    warn!(task = index, total, error = %source, "fetch failed, discarding results");
                    return Err(if total == 1 {
                        FetchError::Storage(source)
                    } else {
                        FetchError::PartialFanout {
                            index,
                            total,
                            source,
                        }
                    });
                }
                None => {
                    let reason = join_failures[index]
                        .take()
                        .unwrap_or_else(|| "task produced no result".to_string());
                    warn!(task = index, %reason, "fetch task did not complete");
                    return Err(FetchError::Task { index, reason });
                }
            }
        }

        let result = FetchResult::from_groups(groups);
        debug!(fanout = total, rows = result.len(), "fetch complete");
        Ok(result)
    }
}
