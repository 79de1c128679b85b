//! Nominatim (OpenStreetMap) geocoding client.
//!
//! Requires the `nominatim` feature (on by default).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::error::ResolverError;
use super::resolver::Resolver;
use super::cache::RESOLVE_TIMEOUT;
use crate::config::{GeocoderConfig, DEFAULT_USER_AGENT};
use crate::coordinate::Coordinate;

/// Nominatim returns coordinates as strings; accept numbers too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn value(&self) -> Result<f64, ResolverError> {
        match self {
            Degrees::Number(v) => Ok(*v),
            Degrees::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ResolverError::Decode(format!("not a coordinate: {:?}", s))),
        }
    }
}

#[derive(Deserialize)]
struct ForwardHit {
    lat: Degrees,
    lon: Degrees,
}

#[derive(Deserialize)]
struct ReverseBody {
    #[serde(default)]
    display_name: String,
}

pub struct NominatimResolver {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimResolver {
    /// Client for `base_url` with the default user agent and 10 second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ResolverError> {
        Self::with_options(base_url, DEFAULT_USER_AGENT, RESOLVE_TIMEOUT)
    }

    /// Client with an explicit user agent and request timeout.
    pub fn with_options(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Client for the configured endpoint and user agent.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self, ResolverError> {
        Self::with_options(&config.base_url, &config.user_agent, RESOLVE_TIMEOUT)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ResolverError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ResolverError::Timeout(self.timeout)
            } else {
                ResolverError::Decode(e.to_string())
            }
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> ResolverError {
        if e.is_timeout() {
            ResolverError::Timeout(self.timeout)
        } else {
            ResolverError::Transport(e.to_string())
        }
    }
}

impl fmt::Debug for NominatimResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimResolver")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Resolver for NominatimResolver {
    async fn forward(&self, place: &str) -> Result<Coordinate, ResolverError> {
        let hits: Vec<ForwardHit> = self
            .get_json(
                "search",
                &[("format", "json".to_string()), ("q", place.to_string())],
            )
            .await?;

        let first = hits
            .first()
            .ok_or_else(|| ResolverError::NoMatch(place.to_string()))?;
        let coordinate = Coordinate::new(first.lat.value()?, first.lon.value()?)
            .map_err(|e| ResolverError::InvalidCoordinate(e.to_string()))?;

        debug!(place, %coordinate, matches = hits.len(), "nominatim forward lookup");
        Ok(coordinate)
    }

    async fn reverse(&self, at: Coordinate) -> Result<String, ResolverError> {
        let body: ReverseBody = self
            .get_json(
                "reverse",
                &[
                    ("format", "json".to_string()),
                    ("lat", at.lat().to_string()),
                    ("lon", at.lon().to_string()),
                ],
            )
            .await?;

        if body.display_name.trim().is_empty() {
            return Err(ResolverError::NoMatch(at.to_string()));
        }
        debug!(%at, name = %body.display_name, "nominatim reverse lookup");
        Ok(body.display_name)
    }
}
