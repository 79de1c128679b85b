//! Filter compiler: [`FilterSpec`] → parameterized predicate.
//!
//! Clauses are emitted in a fixed order (year, class, mass, proximity, value,
//! dataset type) and every placeholder is allocated from the arguments bound
//! so far, so the numbering never depends on which optional keys are present.
//! The compiler performs no I/O; place names must be resolved beforehand.

use tracing::debug;

use super::error::InvalidFilter;
use super::predicate::{CompiledPredicate, PredicateBuilder};
use super::spec::{
    FilterSpec, DEFAULT_MASS_MAX, DEFAULT_MASS_MIN, DEFAULT_VALUE_MAX, DEFAULT_VALUE_MIN,
    DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN,
};
use crate::coordinate::Coordinate;
use crate::sql::Column;

/// Compile a filter spec into a predicate and its ordered arguments.
pub fn compile(spec: &FilterSpec) -> Result<CompiledPredicate, InvalidFilter> {
    let mut builder = PredicateBuilder::new();

    if spec.has_year_range() {
        let (low, high) = year_bounds(spec)?;
        builder.between(Column::Year, low, high);
    }

    if let Some(class) = spec.class.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        builder.equals(Column::RecClass, class);
    }

    if spec.has_mass_range() {
        let (low, high) = float_bounds(
            "mass",
            spec.mass_min,
            spec.mass_max,
            DEFAULT_MASS_MIN,
            DEFAULT_MASS_MAX,
        )?;
        builder.between(Column::Mass, low, high);
    }

    if let Some(proximity) = &spec.radius_center {
        let center = Coordinate::new(proximity.lat, proximity.lon)?;
        let radius = proximity.radius_meters;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(InvalidFilter::InvalidRadius(radius));
        }
        builder.within(center.lon(), center.lat(), radius);
    }

    if spec.has_value_range() {
        let (low, high) = float_bounds(
            "value",
            spec.value_min,
            spec.value_max,
            DEFAULT_VALUE_MIN,
            DEFAULT_VALUE_MAX,
        )?;
        builder.between(Column::Value, low, high);
    }

    if let Some(dataset_type) = spec.dataset_type {
        builder.equals(Column::DatasetType, dataset_type.as_str());
    }

    let predicate = builder.finish();
    debug!(
        predicate = %predicate.text(),
        args = predicate.args().len(),
        "compiled filter"
    );
    Ok(predicate)
}

fn year_bounds(spec: &FilterSpec) -> Result<(i64, i64), InvalidFilter> {
    if let (Some(min), Some(max)) = (spec.year_min, spec.year_max) {
        if min > max {
            return Err(InvalidFilter::InvertedRange {
                field: "year",
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok((
        spec.year_min.unwrap_or(DEFAULT_YEAR_MIN),
        spec.year_max.unwrap_or(DEFAULT_YEAR_MAX),
    ))
}

fn float_bounds(
    field: &'static str,
    min: Option<f64>,
    max: Option<f64>,
    default_min: f64,
    default_max: f64,
) -> Result<(f64, f64), InvalidFilter> {
    if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
        return Err(InvalidFilter::NotFinite { field });
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(InvalidFilter::InvertedRange {
                field,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    Ok((min.unwrap_or(default_min), max.unwrap_or(default_max)))
}
