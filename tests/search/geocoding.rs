use std::time::Duration;

use geoquery::filter::Center;
use geoquery::geocode::{forward_key, reverse_key, CacheStore, Resolution, CACHE_TTL};
use geoquery::{Coordinate, FilterSpec, Page, SearchRequest};

use crate::support::{harness, ids};

#[tokio::test(start_paused = true)]
async fn place_lookups_are_cached_for_a_day() {
    let h = harness();

    let first = h.queries.coordinates("Aachen").await.unwrap();
    tokio::time::advance(CACHE_TTL - Duration::from_secs(60)).await;
    let second = h.queries.coordinates("aachen").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(h.resolver.forward_calls(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    let third = h.queries.coordinates("AACHEN").await.unwrap();
    assert_eq!(third, first);
    assert_eq!(h.resolver.forward_calls(), 2);
}

#[tokio::test]
async fn searches_by_place_share_the_cache() {
    let h = harness();
    let request = SearchRequest::new(FilterSpec::new())
        .centered(Center::Place("Acapulco".into()), 50_000.0);

    for _ in 0..3 {
        let rows = h.queries.search_meteorites(request.clone()).await.unwrap();
        assert_eq!(ids(&rows), vec![10]);
    }
    let rows = h
        .queries
        .near_place("acapulco", 50_000.0, FilterSpec::new(), Page::default())
        .await
        .unwrap();
    assert_eq!(ids(&rows), vec![10]);

    assert_eq!(h.resolver.forward_calls(), 1);
    let cached = h.cache.get(&forward_key("Acapulco")).await.unwrap();
    assert_eq!(cached.as_deref(), Some("16.8531086,-99.8236533"));
}

#[tokio::test]
async fn unresolvable_place_fails_with_a_resolver_error() {
    let h = harness();
    h.resolver.set_failing(true);

    let request = SearchRequest::new(FilterSpec::new())
        .centered(Center::Place("Aachen".into()), 10_000.0);
    let err = h.queries.search_meteorites(request).await.unwrap_err();

    assert_eq!(err.kind(), "resolver_failure");
    assert_eq!(err.status_code(), 502);
    assert!(h.store.statements().is_empty());
}

#[tokio::test]
async fn reverse_lookup_degrades_and_recovers() {
    let h = harness();
    let at = Coordinate::new(-33.8698439, 151.2082848).unwrap();

    h.resolver.set_failing(true);
    let degraded = h.queries.locate(at.lat(), at.lon()).await.unwrap();
    assert_eq!(degraded.source, Resolution::Degraded);
    assert_eq!(degraded.display_name, "Coordinates: -33.8698, 151.2083");
    assert_eq!(h.cache.get(&reverse_key(at)).await.unwrap(), None);

    h.resolver.set_failing(false);
    let resolved = h.queries.locate(at.lat(), at.lon()).await.unwrap();
    assert_eq!(resolved.source, Resolution::Resolved);
    assert!(resolved.display_name.starts_with("sydney"));

    let cached = h.queries.locate(at.lat(), at.lon()).await.unwrap();
    assert_eq!(cached.source, Resolution::Cached);
    assert_eq!(h.resolver.reverse_calls(), 2);
}

#[tokio::test]
async fn invalid_coordinates_are_rejected_before_lookup() {
    let h = harness();
    let err = h.queries.locate(45.0, 181.0).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_filter");
    assert_eq!(h.resolver.reverse_calls(), 0);
}
