//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

#![cfg(feature = "http")]

#[path = "../search/support.rs"]
mod support;

use std::sync::Arc;

use geoquery::http;
use serde_json::Value;

use support::{harness, Harness};

/// Bind to port 0 and return the actual address.
async fn start_server(h: &Harness) -> String {
    let app = http::router(Arc::new(h.queries.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn get(url: String) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_check() {
    let h = harness();
    let base = start_server(&h).await;
    let (status, body) = get(format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn meteorites_with_filters() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) =
        get(format!("{base}/meteorites?year_start=1900&year_end=2000&mass_min=1000&limit=10")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![10, 6]);
    assert_eq!(body[0]["name"], "Acapulco");
    assert!(body[0].get("value").is_none());
}

#[tokio::test]
async fn malformed_parameters_are_a_bad_request() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/meteorites?mass_min=heavy")).await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "invalid_filter");
    assert!(body["error"].as_str().unwrap().contains("mass_min"));

    let (status, _) = get(format!("{base}/meteorites?lat=100&lon=0")).await;
    assert_eq!(status, 400);

    let (status, _) = get(format!("{base}/meteorites?location=Aachen&lat=1&lon=2")).await;
    assert_eq!(status, 400);

    assert!(h.store.statements().is_empty());
}

#[tokio::test]
async fn largest_defaults_to_ten() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/meteorites/largest")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![6, 10, 392, 370, 2, 1]);

    let (_, body) = get(format!("{base}/meteorites/largest?limit=1")).await;
    assert_eq!(ids(&body), vec![6]);
}

#[tokio::test]
async fn nearby_by_place_and_by_coordinates() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/meteorites/nearby?location=Aachen&radius=10000")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1]);

    let (status, body) =
        get(format!("{base}/meteorites/nearby?lat=50.775&lon=6.08333&radius=1000000&year_start=1900")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![2]);

    let (status, body) = get(format!("{base}/meteorites/nearby")).await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "invalid_filter");

    let (status, body) =
        get(format!("{base}/meteorites/nearby?lat=50.775&lon=6.08333&value_min=1")).await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "invalid_filter");
}

#[tokio::test]
async fn nearby_match_any_uses_the_legacy_union() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) =
        get(format!("{base}/meteorites/nearby?lat=50.775&lon=6.08333&radius=1000000&year_start=1950&mass_min=1000&match=any")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![2, 1, 10, 6, 2, 10, 6]);

    let (status, _) = get(format!("{base}/meteorites/nearby?lat=0&lon=0&match=some")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn location_degrades_when_the_geocoder_is_down() {
    let h = harness();
    h.resolver.set_failing(true);
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/meteorites/location?lat=50.775&lon=6.08333")).await;
    assert_eq!(status, 200);
    assert_eq!(body["location"], "Coordinates: 50.7750, 6.0833");
    assert_eq!(body["degraded"], true);

    let (status, _) = get(format!("{base}/meteorites/location?lat=50.775")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn geocode_propagates_resolver_failures() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/geocode?location=Sydney")).await;
    assert_eq!(status, 200);
    assert_eq!(body["lat"], -33.8698439);
    assert_eq!(body["lon"], 151.2082848);

    let (status, body) = get(format!("{base}/geocode?location=Atlantis")).await;
    assert_eq!(status, 502);
    assert_eq!(body["kind"], "resolver_failure");

    let (status, _) = get(format!("{base}/geocode")).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn datasets_by_type_and_catalogue() {
    let h = harness();
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/datasets/climate?value_min=15")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1001]);
    assert_eq!(body[0]["unit"], "C");

    let (status, body) = get(format!("{base}/datasets?type=wind")).await;
    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![2001]);

    let (status, body) = get(format!("{base}/datasets/types")).await;
    assert_eq!(status, 200);
    let types: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["meteorite", "climate", "wind"]);
    assert_eq!(body[1]["value_range"], "12.10 - 22.40");

    let (status, body) = get(format!("{base}/datasets/stats/climate")).await;
    assert_eq!(status, 200);
    assert_eq!(body["total_count"], 2);

    let (status, body) = get(format!("{base}/datasets/stats/volcano")).await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "invalid_filter");
}

#[tokio::test]
async fn storage_failures_are_server_errors() {
    let h = harness();
    h.store.fail_on("FROM datasets");
    let base = start_server(&h).await;

    let (status, body) = get(format!("{base}/datasets")).await;
    assert_eq!(status, 500);
    assert_eq!(body["kind"], "storage_failure");
}
