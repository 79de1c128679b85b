//! End-to-end search tests: parameters in, statements and rows out.

mod fanout;
mod filters;
mod geocoding;
mod support;
