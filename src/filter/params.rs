//! Query-string parameters as handlers receive them.
//!
//! Every field arrives as an optional raw string; an absent or empty value
//! means "not supplied". [`SearchParams::parse`] turns them into a typed
//! [`SearchRequest`] or an [`InvalidFilter`] naming the offending field.

use std::str::FromStr;

use serde::Deserialize;

use super::error::InvalidFilter;
use super::spec::{FilterSpec, DEFAULT_RADIUS_METERS};
use crate::fetch::{Page, PageLimits};
use crate::store::DatasetType;

/// Where a proximity search is centered.
#[derive(Debug, Clone, PartialEq)]
pub enum Center {
    /// Raw coordinates, range-checked at compile time.
    Coordinates { lat: f64, lon: f64 },
    /// A free-text place name, resolved through the geocode cache.
    Place(String),
}

/// A parsed search: filters, an optional center, and pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Filter criteria. `radius_center` is filled in once `center` is resolved.
    pub filter: FilterSpec,
    pub center: Option<Center>,
    pub radius_meters: f64,
    pub page: Page,
}

impl SearchRequest {
    pub fn new(filter: FilterSpec) -> Self {
        SearchRequest {
            filter,
            center: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            page: Page::default(),
        }
    }

    /// Center the search on a place or point.
    pub fn centered(mut self, center: Center, radius_meters: f64) -> Self {
        self.center = Some(center);
        self.radius_meters = radius_meters;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub year_start: Option<String>,
    pub year_end: Option<String>,
    pub mass_min: Option<String>,
    pub mass_max: Option<String>,
    pub value_min: Option<String>,
    pub value_max: Option<String>,
    pub class: Option<String>,
    pub recclass: Option<String>,
    #[serde(alias = "type")]
    pub dataset_type: Option<String>,
    pub location: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchParams {
    pub fn parse(&self, limits: &PageLimits) -> Result<SearchRequest, InvalidFilter> {
        let filter = FilterSpec {
            year_min: field("year_start", &self.year_start)?,
            year_max: field("year_end", &self.year_end)?,
            mass_min: field("mass_min", &self.mass_min)?,
            mass_max: field("mass_max", &self.mass_max)?,
            class: text(&self.class).or_else(|| text(&self.recclass)),
            radius_center: None,
            value_min: field("value_min", &self.value_min)?,
            value_max: field("value_max", &self.value_max)?,
            dataset_type: self.dataset_type()?,
        };

        let center = self.center()?;
        let radius_meters = field("radius", &self.radius)?.unwrap_or(DEFAULT_RADIUS_METERS);
        let page = Page::with_limits(
            field("limit", &self.limit)?,
            field("offset", &self.offset)?,
            limits,
        );

        Ok(SearchRequest {
            filter,
            center,
            radius_meters,
            page,
        })
    }

    fn dataset_type(&self) -> Result<Option<DatasetType>, InvalidFilter> {
        text(&self.dataset_type)
            .map(|raw| {
                raw.parse().map_err(|_| InvalidFilter::Parameter {
                    field: "dataset_type",
                    reason: format!("unknown dataset type {:?}", raw),
                })
            })
            .transpose()
    }

    fn center(&self) -> Result<Option<Center>, InvalidFilter> {
        let lat: Option<f64> = field("lat", &self.lat)?;
        let lon: Option<f64> = field("lon", &self.lon)?;
        let location = text(&self.location);

        match (location, lat, lon) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(InvalidFilter::Conflict(
                "provide either location or lat/lon, not both".into(),
            )),
            (Some(location), None, None) => Ok(Some(
                split_coordinates(&location).unwrap_or(Center::Place(location)),
            )),
            (None, Some(lat), Some(lon)) => Ok(Some(Center::Coordinates { lat, lon })),
            (None, Some(_), None) | (None, None, Some(_)) => Err(InvalidFilter::Conflict(
                "lat and lon must be given together".into(),
            )),
            (None, None, None) => Ok(None),
        }
    }
}

fn text(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn field<T: FromStr>(name: &'static str, raw: &Option<String>) -> Result<Option<T>, InvalidFilter> {
    match text(raw) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| InvalidFilter::Parameter {
            field: name,
            reason: format!("cannot parse {:?}", value),
        }),
    }
}

/// `"40.7128, -74.0060"` is a coordinate pair rather than a place name.
fn split_coordinates(location: &str) -> Option<Center> {
    let (lat, lon) = location.split_once(',')?;
    let lat = lat.trim().parse().ok()?;
    let lon = lon.trim().parse().ok()?;
    Some(Center::Coordinates { lat, lon })
}
