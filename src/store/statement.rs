use crate::sql::{Clause, Ordering, Placeholder, SqlValue, Table};

/// A fully composed query handed to a [`SpatialStore`](super::SpatialStore).
///
/// `sql` and `args` are what a SQL backend executes. The structured fields
/// describe the same query (with placeholders already renumbered) for
/// backends that evaluate it without a SQL engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
    pub table: Table,
    pub filter: Vec<Clause>,
    pub ordering: Option<Ordering>,
    pub limit: Placeholder,
    pub offset: Placeholder,
}

impl Statement {
    /// The argument a placeholder refers to, if it is in range.
    pub fn arg(&self, placeholder: Placeholder) -> Option<&SqlValue> {
        self.args.get(placeholder.index())
    }
}
