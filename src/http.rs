//! HTTP transport: maps query strings onto [`DatasetQueries`] operations.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true }`.
//! - `GET /meteorites`: filtered search (`year_start`, `year_end`,
//!   `mass_min`, `mass_max`, `class`/`recclass`, `location` or `lat`+`lon`,
//!   `radius`, `limit`, `offset`).
//! - `GET /meteorites/largest`: heaviest first, `limit` defaults to 10.
//! - `GET /meteorites/nearby`: requires `lat`+`lon` or `location`;
//!   `match=any` selects the legacy union search.
//! - `GET /meteorites/location`: reverse geocode `lat`+`lon`.
//! - `GET /geocode`: forward geocode `location`.
//! - `GET /datasets`, `GET /datasets/:type`: unified dataset search, with
//!   `value_min`/`value_max` and `type`.
//! - `GET /datasets/types`, `GET /datasets/stats/:type`: catalogue and stats.
//!
//! Errors are `{ "error": <message>, "kind": <class> }` with the status from
//! [`QueryError::status_code`].

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::coordinate::Coordinate;
use crate::filter::{Center, InvalidFilter, SearchParams};
use crate::query::{DatasetInfo, DatasetQueries, QueryError};
use crate::store::{DatasetStats, DatasetType, Record};

type Shared = Arc<DatasetQueries>;

/// Build an axum `Router` serving the dataset queries.
pub fn router(queries: Shared) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/meteorites", get(meteorites_handler))
        .route("/meteorites/largest", get(largest_handler))
        .route("/meteorites/nearby", get(nearby_handler))
        .route("/meteorites/location", get(location_handler))
        .route("/geocode", get(geocode_handler))
        .route("/datasets", get(datasets_handler))
        .route("/datasets/types", get(dataset_types_handler))
        .route("/datasets/stats/:type", get(dataset_stats_handler))
        .route("/datasets/:type", get(datasets_by_type_handler))
        .with_state(queries)
}

/// Serve over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve(queries: Shared, addr: &str) -> Result<(), std::io::Error> {
    let app = router(queries);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if !self.is_client_error() {
            warn!(kind = self.kind(), error = %self, "request failed");
        }
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn meteorites_handler(
    State(queries): State<Shared>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, QueryError> {
    let request = params.parse(queries.limits())?;
    Ok(Json(queries.search_meteorites(request).await?))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<String>,
}

async fn largest_handler(
    State(queries): State<Shared>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Record>>, QueryError> {
    let limit = match params.limit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => None,
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| InvalidFilter::Parameter {
            field: "limit",
            reason: format!("cannot parse {:?}", raw),
        })?),
    };
    Ok(Json(queries.largest(limit).await?))
}

#[derive(Debug, Deserialize)]
struct MatchMode {
    #[serde(rename = "match")]
    mode: Option<String>,
}

async fn nearby_handler(
    State(queries): State<Shared>,
    Query(params): Query<SearchParams>,
    Query(matching): Query<MatchMode>,
) -> Result<Json<Vec<Record>>, QueryError> {
    let request = params.parse(queries.limits())?;
    let legacy = match matching.mode.as_deref() {
        None | Some("all") => false,
        Some("any") => true,
        Some(other) => {
            return Err(InvalidFilter::Parameter {
                field: "match",
                reason: format!("expected \"all\" or \"any\", got {:?}", other),
            }
            .into())
        }
    };

    let center = match request.center {
        Some(Center::Coordinates { lat, lon }) => Coordinate::new(lat, lon)?,
        Some(Center::Place(place)) if !legacy => {
            let rows = queries
                .near_place(&place, request.radius_meters, request.filter, request.page)
                .await?;
            return Ok(Json(rows));
        }
        Some(Center::Place(place)) => queries.coordinates(&place).await?,
        None => {
            return Err(InvalidFilter::Conflict("lat and lon, or location, are required".into()).into())
        }
    };

    let rows = if legacy {
        queries
            .nearby_any(center, request.radius_meters, request.filter, request.page)
            .await?
    } else {
        queries
            .nearby(center, request.radius_meters, request.filter, request.page)
            .await?
    };
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct PointParams {
    lat: Option<String>,
    lon: Option<String>,
}

fn required_f64(field: &'static str, raw: Option<&str>) -> Result<f64, InvalidFilter> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or(InvalidFilter::Parameter {
        field,
        reason: "is required".into(),
    })?;
    raw.parse().map_err(|_| InvalidFilter::Parameter {
        field,
        reason: format!("cannot parse {:?}", raw),
    })
}

async fn location_handler(
    State(queries): State<Shared>,
    Query(params): Query<PointParams>,
) -> Result<Json<Value>, QueryError> {
    let lat = required_f64("lat", params.lat.as_deref())?;
    let lon = required_f64("lon", params.lon.as_deref())?;
    let located = queries.locate(lat, lon).await?;
    Ok(Json(json!({
        "lat": lat,
        "lon": lon,
        "location": located.display_name,
        "degraded": located.is_degraded(),
    })))
}

#[derive(Debug, Deserialize)]
struct PlaceParams {
    location: Option<String>,
}

async fn geocode_handler(
    State(queries): State<Shared>,
    Query(params): Query<PlaceParams>,
) -> Result<Json<Value>, QueryError> {
    let location = params.location.unwrap_or_default();
    let at = queries.coordinates(&location).await?;
    Ok(Json(json!({
        "location": location.trim(),
        "lat": at.lat(),
        "lon": at.lon(),
    })))
}

async fn datasets_handler(
    State(queries): State<Shared>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, QueryError> {
    let request = params.parse(queries.limits())?;
    Ok(Json(queries.search_datasets(request).await?))
}

fn dataset_type(raw: &str) -> Result<DatasetType, InvalidFilter> {
    raw.parse().map_err(|_| InvalidFilter::Parameter {
        field: "type",
        reason: format!("unknown dataset type {:?}", raw),
    })
}

async fn datasets_by_type_handler(
    State(queries): State<Shared>,
    Path(raw_type): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, QueryError> {
    let mut request = params.parse(queries.limits())?;
    request.filter.dataset_type = Some(dataset_type(&raw_type)?);
    Ok(Json(queries.search_datasets(request).await?))
}

async fn dataset_types_handler(
    State(queries): State<Shared>,
) -> Result<Json<Vec<DatasetInfo>>, QueryError> {
    Ok(Json(queries.dataset_types().await?))
}

async fn dataset_stats_handler(
    State(queries): State<Shared>,
    Path(raw_type): Path<String>,
) -> Result<Json<DatasetStats>, QueryError> {
    let dataset_type = dataset_type(&raw_type)?;
    Ok(Json(queries.dataset_stats(dataset_type).await?))
}
