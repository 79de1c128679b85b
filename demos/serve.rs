//! Serve a small in-memory sample over HTTP.
//!
//! ```text
//! GEOQUERY_BIND=127.0.0.1:8080 cargo run --example serve --features http
//! curl 'http://127.0.0.1:8080/meteorites?year_start=1900&mass_min=1000'
//! curl 'http://127.0.0.1:8080/meteorites/nearby?location=Aachen&radius=100000'
//! ```

use std::sync::Arc;

use geoquery::http;
use geoquery::{
    telemetry, Config, DatasetQueries, DatasetType, GeocodeCache, InMemoryCacheStore,
    InMemorySpatialStore, NominatimResolver, Record,
};
use tracing::info;

fn sample_records() -> Vec<Record> {
    vec![
        Record::meteorite(1, "Aachen", "L5", 21.0, 1880, 50.775, 6.08333),
        Record::meteorite(2, "Aarhus", "H6", 720.0, 1951, 56.18333, 10.23333),
        Record::meteorite(6, "Abee", "EH4", 107_000.0, 1952, 54.21667, -113.0),
        Record::meteorite(10, "Acapulco", "Acapulcoite", 1_914.0, 1976, 16.88333, -99.9),
        Record::meteorite(370, "Achiras", "L6", 780.0, 1902, -33.16667, -64.95),
        Record::meteorite(11890, "Hoba", "Iron, IVB", 60_000_000.0, 1920, -19.58333, 17.91667),
        Record::new(1001, DatasetType::Climate, "Sydney Observatory Hill", -33.8607, 151.205)
            .with_value(22.4, "°C"),
        Record::new(1002, DatasetType::Climate, "Hobart Ellerslie Road", -42.8897, 147.3278)
            .with_value(12.1, "°C"),
        Record::new(2001, DatasetType::Wind, "Wilsons Promontory", -39.1297, 146.4244)
            .with_value(38.5, "km/h"),
        Record::new(3001, DatasetType::Fire, "Blue Mountains", -33.7, 150.3)
            .with_value(87.0, "FFDI")
            .with_metadata(r#"{"season":"2019-2020"}"#),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init_tracing(&config.logging);

    let store = Arc::new(InMemorySpatialStore::with_records(sample_records()));
    let resolver = Arc::new(NominatimResolver::from_config(&config.geocoder)?);
    let geocoder = GeocodeCache::new(Arc::new(InMemoryCacheStore::new()), resolver);

    let queries = DatasetQueries::new(store, geocoder)
        .with_limits(config.query.page_limits())
        .with_max_fanout(config.query.max_fanout);

    info!(bind = %config.server.bind, geocoder = %config.geocoder.base_url, "serving");
    http::serve(Arc::new(queries), &config.server.bind).await?;
    Ok(())
}
