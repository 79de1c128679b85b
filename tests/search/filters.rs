use geoquery::filter::{Center, SearchParams};
use geoquery::sql::{Clause, SqlValue};
use geoquery::{FilterSpec, InvalidFilter, PageLimits, QueryError, SearchRequest};

use crate::support::{harness, ids};

fn params(pairs: &[(&str, &str)]) -> SearchParams {
    let map: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(map)).unwrap()
}

#[tokio::test]
async fn year_and_mass_search_binds_six_arguments() {
    let h = harness();
    let request = params(&[
        ("year_start", "1900"),
        ("year_end", "2000"),
        ("mass_min", "1000"),
        ("limit", "10"),
        ("offset", "0"),
    ])
    .parse(&PageLimits::default())
    .unwrap();

    let rows = h.queries.search_meteorites(request).await.unwrap();
    assert_eq!(ids(&rows), vec![10, 6]);

    let statement = h.store.last();
    assert_eq!(
        statement.sql,
        "SELECT id, name, recclass, mass, year, ST_X(geom) AS lon, ST_Y(geom) AS lat FROM locations \
         WHERE year BETWEEN $1 AND $2 AND mass BETWEEN $3 AND $4 \
         ORDER BY year DESC LIMIT $5 OFFSET $6"
    );
    assert_eq!(
        statement.args,
        vec![
            SqlValue::Int(1900),
            SqlValue::Int(2000),
            SqlValue::Float(1000.0),
            SqlValue::Float(10_000_000.0),
            SqlValue::Int(10),
            SqlValue::Int(0),
        ]
    );
}

#[tokio::test]
async fn no_filters_means_no_where_clause() {
    let h = harness();
    let rows = h
        .queries
        .search_meteorites(SearchParams::default().parse(&PageLimits::default()).unwrap())
        .await
        .unwrap();

    assert_eq!(rows.len(), 6);
    let statement = h.store.last();
    assert!(!statement.sql.contains("WHERE"));
    assert_eq!(statement.args, vec![SqlValue::Int(50), SqlValue::Int(0)]);
}

#[tokio::test]
async fn class_is_bound_not_inlined() {
    let h = harness();
    let hostile = "L5' OR '1'='1";
    let request = params(&[("recclass", hostile)])
        .parse(&PageLimits::default())
        .unwrap();

    let rows = h.queries.search_meteorites(request).await.unwrap();
    assert!(rows.is_empty());

    let statement = h.store.last();
    assert!(!statement.sql.contains(hostile));
    assert!(statement.sql.contains("recclass = $1"));
    assert_eq!(statement.args[0], SqlValue::from(hostile));
}

#[tokio::test]
async fn proximity_binds_longitude_first_after_earlier_clauses() {
    let h = harness();
    let request = params(&[
        ("year_start", "1800"),
        ("class", "L5"),
        ("lat", "50.775"),
        ("lon", "6.08333"),
        ("radius", "5000"),
    ])
    .parse(&PageLimits::default())
    .unwrap();

    let rows = h.queries.search_meteorites(request).await.unwrap();
    assert_eq!(ids(&rows), vec![1]);

    let statement = h.store.last();
    assert!(statement.sql.contains(
        "ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint($4, $5), 4326)::geography, $6)"
    ));
    assert_eq!(statement.args[3], SqlValue::Float(6.08333));
    assert_eq!(statement.args[4], SqlValue::Float(50.775));
    assert_eq!(statement.args[5], SqlValue::Float(5000.0));
    assert!(matches!(statement.filter[2], Clause::Within { .. }));
}

#[tokio::test]
async fn coordinate_pair_location_skips_the_geocoder() {
    let h = harness();
    let request = params(&[("location", "16.88333, -99.9"), ("radius", "1000")])
        .parse(&PageLimits::default())
        .unwrap();
    assert_eq!(
        request.center,
        Some(Center::Coordinates {
            lat: 16.88333,
            lon: -99.9
        })
    );

    let rows = h.queries.search_meteorites(request).await.unwrap();
    assert_eq!(ids(&rows), vec![10]);
    assert_eq!(h.resolver.forward_calls(), 0);
}

#[tokio::test]
async fn invalid_input_never_reaches_storage() {
    let h = harness();

    let request = SearchRequest::new(FilterSpec::new()).centered(
        Center::Coordinates {
            lat: -91.0,
            lon: 0.0,
        },
        1000.0,
    );
    let err = h.queries.search_meteorites(request).await.unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidFilter(InvalidFilter::LatitudeOutOfRange(_))
    ));

    let err = h
        .queries
        .search_meteorites(SearchRequest::new(FilterSpec::new().year_min(2000).year_max(1900)))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    assert!(h.store.statements().is_empty());
}

#[tokio::test]
async fn datasets_search_filters_on_value_and_type() {
    let h = harness();
    let request = params(&[("type", "climate"), ("value_min", "15")])
        .parse(&PageLimits::default())
        .unwrap();

    let rows = h.queries.search_datasets(request).await.unwrap();
    assert_eq!(ids(&rows), vec![1001]);

    let statement = h.store.last();
    assert!(statement.sql.starts_with("SELECT id, dataset_type, name"));
    assert!(statement
        .sql
        .contains("WHERE value BETWEEN $1 AND $2 AND dataset_type = $3 ORDER BY id DESC"));
}

#[tokio::test]
async fn pages_do_not_overlap() {
    let h = harness();
    let first = h
        .queries
        .search_meteorites(params(&[("limit", "2")]).parse(&PageLimits::default()).unwrap())
        .await
        .unwrap();
    let second = h
        .queries
        .search_meteorites(
            params(&[("limit", "2"), ("offset", "2")])
                .parse(&PageLimits::default())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(ids(&first), vec![10, 6]);
    assert_eq!(ids(&second), vec![2, 392]);
}
