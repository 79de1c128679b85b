use crate::sql::{Clause, Column, Placeholder, SqlValue};

/// A compiled predicate fragment and the arguments its placeholders bind.
///
/// Placeholders are numbered locally from `$1`. Composing several predicates
/// into one statement shifts them by the number of arguments that precede
/// the fragment (see [`CompiledPredicate::render`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPredicate {
    clauses: Vec<Clause>,
    args: Vec<SqlValue>,
}

impl CompiledPredicate {
    /// A predicate that constrains nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no filter produced a clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn into_args(self) -> Vec<SqlValue> {
        self.args
    }

    /// Number of placeholders the clauses use.
    pub fn placeholder_count(&self) -> usize {
        self.clauses.iter().map(|c| c.placeholders().len()).sum()
    }

    /// Predicate text with local numbering (`$1` upwards).
    pub fn text(&self) -> String {
        self.render(0)
    }

    /// Predicate text with every placeholder shifted by `offset`.
    pub fn render(&self, offset: usize) -> String {
        self.clauses
            .iter()
            .map(|c| c.shifted(offset).to_string())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Clauses shifted by `offset`, for evaluation against a composed argument list.
    pub fn shifted_clauses(&self, offset: usize) -> impl Iterator<Item = Clause> + '_ {
        self.clauses.iter().map(move |c| c.shifted(offset))
    }
}

/// Accumulates clauses and arguments, handing out the next placeholder on
/// every bind so numbering always follows the arguments actually present.
#[derive(Debug, Default)]
pub(crate) struct PredicateBuilder {
    clauses: Vec<Clause>,
    args: Vec<SqlValue>,
}

impl PredicateBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, value: impl Into<SqlValue>) -> Placeholder {
        self.args.push(value.into());
        Placeholder::new(self.args.len())
    }

    pub(crate) fn between(
        &mut self,
        column: Column,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> &mut Self {
        let low = self.bind(low);
        let high = self.bind(high);
        self.clauses.push(Clause::Between { column, low, high });
        self
    }

    pub(crate) fn equals(&mut self, column: Column, value: impl Into<SqlValue>) -> &mut Self {
        let value = self.bind(value);
        self.clauses.push(Clause::Equals { column, value });
        self
    }

    /// Proximity clause. Bind order is lon, lat, radius to match `ST_MakePoint(x, y)`.
    pub(crate) fn within(&mut self, lon: f64, lat: f64, radius_meters: f64) -> &mut Self {
        let lon = self.bind(lon);
        let lat = self.bind(lat);
        let radius = self.bind(radius_meters);
        self.clauses.push(Clause::Within { lon, lat, radius });
        self
    }

    pub(crate) fn finish(self) -> CompiledPredicate {
        CompiledPredicate {
            clauses: self.clauses,
            args: self.args,
        }
    }
}
