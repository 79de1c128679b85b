//! Shared fixtures: a sample store, a scripted resolver, and a store wrapper
//! that records every statement it is asked to run.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geoquery::geocode::{GeocodeCache, InMemoryCacheStore, Resolver, ResolverError};
use geoquery::store::{DatasetStats, DatasetSummary, DatasetType, Statement, StoreError};
use geoquery::{Coordinate, DatasetQueries, InMemorySpatialStore, Record, SpatialStore};

pub fn sample_records() -> Vec<Record> {
    vec![
        Record::meteorite(1, "Aachen", "L5", 21.0, 1880, 50.775, 6.08333),
        Record::meteorite(2, "Aarhus", "H6", 720.0, 1951, 56.18333, 10.23333),
        Record::meteorite(6, "Abee", "EH4", 107_000.0, 1952, 54.21667, -113.0),
        Record::meteorite(10, "Acapulco", "Acapulcoite", 1_914.0, 1976, 16.88333, -99.9),
        Record::meteorite(370, "Achiras", "L6", 780.0, 1902, -33.16667, -64.95),
        Record::meteorite(392, "Adzhi-Bogdo (stone)", "LL3-6", 910.0, 1949, 44.83333, 95.16667),
        Record::new(1001, DatasetType::Climate, "Sydney Observatory Hill", -33.8607, 151.205)
            .with_value(22.4, "C"),
        Record::new(1002, DatasetType::Climate, "Hobart Ellerslie Road", -42.8897, 147.3278)
            .with_value(12.1, "C"),
        Record::new(2001, DatasetType::Wind, "Wilsons Promontory", -39.1297, 146.4244)
            .with_value(38.5, "km/h"),
    ]
}

/// Resolver backed by a fixed gazetteer, counting calls.
pub struct CountingResolver {
    places: HashMap<String, (f64, f64)>,
    forward_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
    failing: AtomicBool,
}

impl CountingResolver {
    pub fn new() -> Self {
        let places = [
            ("aachen", (50.7753455, 6.0838868)),
            ("acapulco", (16.8531086, -99.8236533)),
            ("sydney", (-33.8698439, 151.2082848)),
        ]
        .into_iter()
        .map(|(name, at)| (name.to_string(), at))
        .collect();

        CountingResolver {
            places,
            forward_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resolver for CountingResolver {
    async fn forward(&self, place: &str) -> Result<Coordinate, ResolverError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ResolverError::Status(503));
        }
        let (lat, lon) = self
            .places
            .get(&place.to_lowercase())
            .copied()
            .ok_or_else(|| ResolverError::NoMatch(place.to_string()))?;
        Coordinate::new(lat, lon).map_err(|e| ResolverError::InvalidCoordinate(e.to_string()))
    }

    async fn reverse(&self, at: Coordinate) -> Result<String, ResolverError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ResolverError::Transport("connection refused".into()));
        }
        let (name, _) = self
            .places
            .iter()
            .min_by(|(_, a), (_, b)| {
                let da = (a.0 - at.lat()).abs() + (a.1 - at.lon()).abs();
                let db = (b.0 - at.lat()).abs() + (b.1 - at.lon()).abs();
                da.total_cmp(&db)
            })
            .ok_or_else(|| ResolverError::NoMatch(at.to_string()))?;
        Ok(format!("{}, near {}", name, at))
    }
}

/// Wraps the in-memory store, recording statements and failing any whose SQL
/// contains `fail_on`.
pub struct RecordingStore {
    inner: InMemorySpatialStore,
    statements: Mutex<Vec<Statement>>,
    fail_on: Mutex<Option<String>>,
}

impl RecordingStore {
    pub fn new(inner: InMemorySpatialStore) -> Self {
        RecordingStore {
            inner,
            statements: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    pub fn fail_on(&self, fragment: &str) {
        *self.fail_on.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub fn last(&self) -> Statement {
        self.statements().pop().expect("no statement was executed")
    }
}

#[async_trait]
impl SpatialStore for RecordingStore {
    async fn query(&self, statement: &Statement) -> Result<Vec<Record>, StoreError> {
        self.statements.lock().unwrap().push(statement.clone());
        let failing = self
            .fail_on
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|fragment| statement.sql.contains(fragment));
        if failing {
            return Err(StoreError::Unavailable("connection pool exhausted".into()));
        }
        self.inner.query(statement).await
    }

    async fn summaries(&self) -> Result<Vec<DatasetSummary>, StoreError> {
        self.inner.summaries().await
    }

    async fn stats(&self, dataset_type: DatasetType) -> Result<DatasetStats, StoreError> {
        self.inner.stats(dataset_type).await
    }
}

pub struct Harness {
    pub queries: DatasetQueries,
    pub resolver: Arc<CountingResolver>,
    pub store: Arc<RecordingStore>,
    pub cache: InMemoryCacheStore,
}

pub fn harness() -> Harness {
    let resolver = Arc::new(CountingResolver::new());
    let store = Arc::new(RecordingStore::new(InMemorySpatialStore::with_records(
        sample_records(),
    )));
    let cache = InMemoryCacheStore::new();
    let geocoder = GeocodeCache::new(Arc::new(cache.clone()), resolver.clone());
    let queries = DatasetQueries::new(store.clone(), geocoder);
    Harness {
        queries,
        resolver,
        store,
        cache,
    }
}

pub fn ids(rows: &[Record]) -> Vec<i64> {
    rows.iter().map(|r| r.id).collect()
}
