use serde::{Deserialize, Serialize};

use crate::store::DatasetType;

pub const DEFAULT_YEAR_MIN: i64 = 0;
pub const DEFAULT_YEAR_MAX: i64 = 9999;
pub const DEFAULT_MASS_MIN: f64 = 0.0;
pub const DEFAULT_MASS_MAX: f64 = 10_000_000.0;
pub const DEFAULT_VALUE_MIN: f64 = 0.0;
pub const DEFAULT_VALUE_MAX: f64 = 10_000_000.0;

/// Radius used when a center is given without one.
pub const DEFAULT_RADIUS_METERS: f64 = 50_000.0;

/// Proximity constraint: rows within `radius_meters` of (`lat`, `lon`).
///
/// The pair is kept raw here; the compiler performs the range check so an
/// out-of-range center is reported as a filter error rather than lost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub lat: f64,
    pub lon: f64,
    pub radius_meters: f64,
}

impl Proximity {
    pub fn new(lat: f64, lon: f64, radius_meters: f64) -> Self {
        Proximity {
            lat,
            lon,
            radius_meters,
        }
    }
}

/// Named, independently optional filter criteria.
///
/// `None` always means "no constraint on this key".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub year_min: Option<i64>,
    #[serde(default)]
    pub year_max: Option<i64>,
    #[serde(default)]
    pub mass_min: Option<f64>,
    #[serde(default)]
    pub mass_max: Option<f64>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub radius_center: Option<Proximity>,
    #[serde(default)]
    pub value_min: Option<f64>,
    #[serde(default)]
    pub value_max: Option<f64>,
    #[serde(default)]
    pub dataset_type: Option<DatasetType>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year_min(mut self, year: i64) -> Self {
        self.year_min = Some(year);
        self
    }

    pub fn year_max(mut self, year: i64) -> Self {
        self.year_max = Some(year);
        self
    }

    pub fn mass_min(mut self, mass: f64) -> Self {
        self.mass_min = Some(mass);
        self
    }

    pub fn mass_max(mut self, mass: f64) -> Self {
        self.mass_max = Some(mass);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Restrict to rows within `radius_meters` of a point.
    pub fn near(mut self, lat: f64, lon: f64, radius_meters: f64) -> Self {
        self.radius_center = Some(Proximity::new(lat, lon, radius_meters));
        self
    }

    pub fn value_min(mut self, value: f64) -> Self {
        self.value_min = Some(value);
        self
    }

    pub fn value_max(mut self, value: f64) -> Self {
        self.value_max = Some(value);
        self
    }

    pub fn dataset_type(mut self, dataset_type: DatasetType) -> Self {
        self.dataset_type = Some(dataset_type);
        self
    }

    pub fn has_year_range(&self) -> bool {
        self.year_min.is_some() || self.year_max.is_some()
    }

    pub fn has_mass_range(&self) -> bool {
        self.mass_min.is_some() || self.mass_max.is_some()
    }

    pub fn has_value_range(&self) -> bool {
        self.value_min.is_some() || self.value_max.is_some()
    }

    /// The spec restricted to its year range.
    pub fn only_year(&self) -> FilterSpec {
        FilterSpec {
            year_min: self.year_min,
            year_max: self.year_max,
            ..FilterSpec::default()
        }
    }

    /// The spec restricted to its mass range.
    pub fn only_mass(&self) -> FilterSpec {
        FilterSpec {
            mass_min: self.mass_min,
            mass_max: self.mass_max,
            ..FilterSpec::default()
        }
    }

    /// The spec restricted to its proximity constraint.
    pub fn only_proximity(&self) -> FilterSpec {
        FilterSpec {
            radius_center: self.radius_center,
            ..FilterSpec::default()
        }
    }
}
