//! InMemorySpatialStore - Vec-backed store for tests and development.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{
    DatasetStats, DatasetSummary, DatasetType, Extent, Record, SpatialStore, Statement,
    StoreError,
};
use crate::coordinate::Coordinate;
use crate::sql::{Clause, Column, Placeholder, SqlValue, Table};

/// In-memory store that evaluates statements structurally.
///
/// Clauses are resolved against the statement's argument list by placeholder
/// position, so a statement whose numbering drifted fails here the same way
/// it would against a real database. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemorySpatialStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl InMemorySpatialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        InMemorySpatialStore {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
        }
    }

    /// Append a row.
    pub fn insert(&self, record: Record) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::LockPoisoned("insert"))?;
        records.push(record);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("len"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn evaluate(&self, statement: &Statement) -> Result<Vec<Record>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("query"))?;

        let mut matched = Vec::new();
        for record in records.iter().filter(|r| in_table(r, statement.table)) {
            if matches_all(record, statement)? {
                matched.push(record.clone());
            }
        }

        if let Some(ordering) = statement.ordering {
            matched.sort_by(|a, b| {
                let order = compare_nulls_last(a.numeric(ordering.column), b.numeric(ordering.column), ordering.descending);
                order.then_with(|| b.id.cmp(&a.id))
            });
        }

        let limit = integer_arg(statement, statement.limit)?;
        let offset = integer_arg(statement, statement.offset)?;
        if limit < 0 || offset < 0 {
            return Err(StoreError::Query("LIMIT and OFFSET must be non-negative".into()));
        }

        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl SpatialStore for InMemorySpatialStore {
    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError> {
        self.evaluate(statement)
    }

    async fn summaries(&self) -> Result<Vec<DatasetSummary>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("summaries"))?;

        let mut by_type: BTreeMap<DatasetType, DatasetSummary> = BTreeMap::new();
        for record in records.iter() {
            let summary = by_type
                .entry(record.dataset_type)
                .or_insert_with(|| DatasetSummary {
                    dataset_type: record.dataset_type,
                    count: 0,
                    min_value: None,
                    max_value: None,
                });
            summary.count += 1;
            if let Some(value) = record.value {
                summary.min_value = Some(summary.min_value.map_or(value, |m| m.min(value)));
                summary.max_value = Some(summary.max_value.map_or(value, |m| m.max(value)));
            }
        }
        Ok(by_type.into_values().collect())
    }

    async fn stats(&self, dataset_type: DatasetType) -> Result<DatasetStats, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("stats"))?;

        let rows: Vec<&Record> = records
            .iter()
            .filter(|r| r.dataset_type == dataset_type)
            .collect();
        let values: Vec<f64> = rows.iter().filter_map(|r| r.value).collect();

        let avg_value = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };

        let spatial_extent = rows.iter().fold(None, |extent: Option<Extent>, r| {
            Some(match extent {
                None => Extent {
                    min_lat: r.lat,
                    min_lon: r.lon,
                    max_lat: r.lat,
                    max_lon: r.lon,
                },
                Some(e) => Extent {
                    min_lat: e.min_lat.min(r.lat),
                    min_lon: e.min_lon.min(r.lon),
                    max_lat: e.max_lat.max(r.lat),
                    max_lon: e.max_lon.max(r.lon),
                },
            })
        });

        Ok(DatasetStats {
            total_count: rows.len() as u64,
            avg_value,
            min_value: values.iter().copied().reduce(f64::min),
            max_value: values.iter().copied().reduce(f64::max),
            spatial_extent,
        })
    }
}

/// The legacy `locations` table only ever held meteorites.
fn in_table(record: &Record, table: Table) -> bool {
    match table {
        Table::Locations => record.dataset_type == DatasetType::Meteorite,
        Table::Datasets => true,
    }
}

fn matches_all(record: &Record, statement: &Statement) -> Result<bool, StoreError> {
    for clause in &statement.filter {
        if !matches(record, clause, statement)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches(record: &Record, clause: &Clause, statement: &Statement) -> Result<bool, StoreError> {
    match clause {
        Clause::Between { column, low, high } => {
            let low = numeric_arg(statement, *low)?;
            let high = numeric_arg(statement, *high)?;
            Ok(record
                .numeric(*column)
                .is_some_and(|v| low <= v && v <= high))
        }
        Clause::Equals { column, value } => {
            let expected = text_arg(statement, *value)?;
            Ok(record.text(*column) == Some(expected))
        }
        Clause::Within { lon, lat, radius } => {
            let lon = numeric_arg(statement, *lon)?;
            let lat = numeric_arg(statement, *lat)?;
            let radius = numeric_arg(statement, *radius)?;
            let center = Coordinate::new(lat, lon).map_err(|e| StoreError::Query(e.to_string()))?;
            Ok(record
                .position()
                .is_some_and(|p| p.distance_meters(&center) <= radius))
        }
    }
}

fn arg(statement: &Statement, placeholder: Placeholder) -> Result<&SqlValue, StoreError> {
    statement.arg(placeholder).ok_or_else(|| StoreError::Argument {
        position: placeholder.position(),
        reason: format!("only {} arguments bound", statement.args.len()),
    })
}

fn numeric_arg(statement: &Statement, placeholder: Placeholder) -> Result<f64, StoreError> {
    let value = arg(statement, placeholder)?;
    value.as_f64().ok_or_else(|| StoreError::Argument {
        position: placeholder.position(),
        reason: format!("expected a number, got {}", value),
    })
}

fn integer_arg(statement: &Statement, placeholder: Placeholder) -> Result<i64, StoreError> {
    let value = arg(statement, placeholder)?;
    value.as_i64().ok_or_else(|| StoreError::Argument {
        position: placeholder.position(),
        reason: format!("expected an integer, got {}", value),
    })
}

fn text_arg(statement: &Statement, placeholder: Placeholder) -> Result<&str, StoreError> {
    let value = arg(statement, placeholder)?;
    value.as_str().ok_or_else(|| StoreError::Argument {
        position: placeholder.position(),
        reason: format!("expected text, got {}", value),
    })
}

fn compare_nulls_last(a: Option<f64>, b: Option<f64>, descending: bool) -> CmpOrdering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let order = a.partial_cmp(&b).unwrap_or(CmpOrdering::Equal);
            if descending {
                order.reverse()
            } else {
                order
            }
        }
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}
