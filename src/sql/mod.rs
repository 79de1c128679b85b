//! SQL vocabulary shared by the filter compiler, the fetch layer and storage.
//!
//! Nothing in here ever interpolates caller input into query text: columns
//! and tables are closed enums, and every value travels as a bound
//! [`SqlValue`] referenced by a positional [`Placeholder`].

mod clause;
mod value;

pub use clause::{Clause, Column, Ordering, Placeholder, Table};
pub use value::SqlValue;
