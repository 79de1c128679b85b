use std::sync::Arc;

use geoquery::fetch::{FetchExecutor, FetchRequest, QueryTemplate};
use geoquery::{compile, Coordinate, FetchError, FilterSpec, Page, QueryError, SearchRequest};

use crate::support::{harness, ids, sample_records, RecordingStore};

fn aachen() -> Coordinate {
    Coordinate::new(50.775, 6.08333).unwrap()
}

#[tokio::test]
async fn nearby_returns_the_intersection() {
    let h = harness();
    let rows = h
        .queries
        .nearby(
            aachen(),
            1_000_000.0,
            FilterSpec::new().year_min(1900),
            Page::default(),
        )
        .await
        .unwrap();

    // Within 1000 km of Aachen: Aachen (1880) and Aarhus (1951).
    assert_eq!(ids(&rows), vec![2]);
    assert_eq!(h.store.statements().len(), 1);
}

#[tokio::test]
async fn nearby_value_filter_is_rejected_before_storage() {
    let h = harness();
    let err = h
        .queries
        .nearby(
            aachen(),
            10_000.0,
            FilterSpec::new().value_min(1.0),
            Page::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.kind(), "invalid_filter");
    assert!(h.store.statements().is_empty());
}

#[tokio::test]
async fn legacy_nearby_is_the_union_with_duplicates() {
    let h = harness();
    let rows = h
        .queries
        .nearby_any(
            aachen(),
            1_000_000.0,
            FilterSpec::new().year_min(1950).mass_min(1000.0),
            Page::default(),
        )
        .await
        .unwrap();

    let statements = h.store.statements();
    assert_eq!(statements.len(), 3);
    assert!(statements[0].sql.contains("ST_DWithin"));
    assert!(statements[1].sql.contains("year BETWEEN $1 AND $2"));
    assert!(statements[2].sql.contains("mass BETWEEN $1 AND $2"));

    // proximity: Aarhus, Aachen | years: Acapulco, Abee, Aarhus | mass: Acapulco, Abee
    assert_eq!(ids(&rows), vec![2, 1, 10, 6, 2, 10, 6]);
}

#[tokio::test]
async fn one_failing_sub_query_fails_the_legacy_search() {
    let h = harness();
    h.store.fail_on("mass BETWEEN");

    let err = h
        .queries
        .nearby_any(aachen(), 10_000.0, FilterSpec::new(), Page::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "partial_fanout_failure");
    assert_eq!(err.status_code(), 500);
    match err {
        QueryError::Fetch(FetchError::PartialFanout { index, total, .. }) => {
            assert_eq!((index, total), (2, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.store.statements().len(), 3);
}

#[tokio::test]
async fn storage_failure_aborts_a_search() {
    let h = harness();
    h.store.fail_on("FROM locations");

    let err = h
        .queries
        .search_meteorites(SearchRequest::new(FilterSpec::new().mass_min(1.0)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "storage_failure");
    assert!(err.to_string().contains("connection pool exhausted"));
}

#[tokio::test]
async fn executor_width_is_bounded_before_any_query_runs() {
    let store = Arc::new(RecordingStore::new(geoquery::InMemorySpatialStore::with_records(
        sample_records(),
    )));
    let executor = FetchExecutor::new(store.clone()).with_max_fanout(2);
    let requests = (0..3)
        .map(|year| {
            FetchRequest::new(QueryTemplate::meteorites(), Page::default())
                .and(compile(&FilterSpec::new().year_min(1900 + year)).unwrap())
        })
        .collect();

    let err = executor.execute(requests).await.unwrap_err();
    assert!(matches!(err, FetchError::FanoutTooWide { requested: 3, max: 2 }));
    assert!(store.statements().is_empty());
}
