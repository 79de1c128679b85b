//! Filter compilation.
//!
//! [`FilterSpec`] describes optional criteria; [`compile`] turns it into a
//! [`CompiledPredicate`] whose text uses positional placeholders and whose
//! argument list lines up with them one to one.
//!
//! ```
//! use geoquery::filter::{compile, FilterSpec};
//!
//! let spec = FilterSpec::new().year_min(1900).year_max(2000).mass_min(1000.0);
//! let predicate = compile(&spec).unwrap();
//! assert_eq!(predicate.text(), "year BETWEEN $1 AND $2 AND mass BETWEEN $3 AND $4");
//! assert_eq!(predicate.args().len(), 4);
//! ```

mod compiler;
mod error;
mod params;
mod predicate;
mod spec;

pub use compiler::compile;
pub use error::InvalidFilter;
pub use params::{Center, SearchParams, SearchRequest};
pub use predicate::CompiledPredicate;
pub use spec::{
    FilterSpec, Proximity, DEFAULT_MASS_MAX, DEFAULT_MASS_MIN, DEFAULT_RADIUS_METERS,
    DEFAULT_VALUE_MAX, DEFAULT_VALUE_MIN, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN,
};
