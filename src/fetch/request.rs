use crate::filter::CompiledPredicate;
use crate::sql::{Column, Ordering, Placeholder, SqlValue, Table};
use crate::store::Statement;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 500;

/// Pagination bounds applied when parsing caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u64,
}

impl Page {
    /// Page with `limit` clamped to [`MAX_LIMIT`].
    pub fn new(limit: u32, offset: u64) -> Self {
        Page {
            limit: limit.min(MAX_LIMIT),
            offset,
        }
    }

    /// Page from optional caller input, defaulted and clamped by `limits`.
    pub fn with_limits(limit: Option<u32>, offset: Option<u64>, limits: &PageLimits) -> Self {
        Page {
            limit: limit.unwrap_or(limits.default_limit).min(limits.max_limit),
            offset: offset.unwrap_or(0),
        }
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(DEFAULT_LIMIT, 0)
    }
}

/// Base relation plus optional ordering; the part of a query callers never
/// parameterize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub table: Table,
    pub ordering: Option<Ordering>,
}

impl QueryTemplate {
    /// Unordered template over `table`.
    pub fn new(table: Table) -> Self {
        QueryTemplate {
            table,
            ordering: None,
        }
    }

    /// Sort the result by `ordering`.
    pub fn ordered(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    /// Meteorite rows, newest first.
    pub fn meteorites() -> Self {
        Self::new(Table::Locations).ordered(Ordering::desc(Column::Year))
    }

    /// Meteorite rows, heaviest first.
    pub fn largest_meteorites() -> Self {
        Self::new(Table::Locations).ordered(Ordering::desc(Column::Mass))
    }

    /// Unified dataset rows, most recently inserted first.
    pub fn datasets() -> Self {
        Self::new(Table::Datasets).ordered(Ordering::desc(Column::Id))
    }
}

/// One storage query: a template, predicates to AND together, and a page.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    template: QueryTemplate,
    predicates: Vec<CompiledPredicate>,
    page: Page,
}

impl FetchRequest {
    /// Request with no predicates; every row of the template matches.
    pub fn new(template: QueryTemplate, page: Page) -> Self {
        FetchRequest {
            template,
            predicates: Vec::new(),
            page,
        }
    }

    /// AND another predicate onto this request. Empty predicates are dropped.
    pub fn and(mut self, predicate: CompiledPredicate) -> Self {
        if !predicate.is_empty() {
            self.predicates.push(predicate);
        }
        self
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    pub fn predicates(&self) -> &[CompiledPredicate] {
        &self.predicates
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Compose the final statement.
    ///
    /// Each predicate is shifted by the number of arguments bound before it,
    /// and `LIMIT`/`OFFSET` take the two positions after the last predicate
    /// argument.
    pub fn statement(&self) -> Statement {
        let mut args: Vec<SqlValue> = Vec::new();
        let mut fragments = Vec::with_capacity(self.predicates.len());
        let mut filter = Vec::new();

        for predicate in &self.predicates {
            let offset = args.len();
            fragments.push(predicate.render(offset));
            filter.extend(predicate.shifted_clauses(offset));
            args.extend_from_slice(predicate.args());
        }

        let mut sql = String::from(self.template.table.projection());
        if !fragments.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&fragments.join(" AND "));
        }
        if let Some(ordering) = &self.template.ordering {
            sql.push(' ');
            sql.push_str(&ordering.to_string());
        }

        let limit = Placeholder::new(args.len() + 1);
        let offset = Placeholder::new(args.len() + 2);
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        args.push(SqlValue::from(self.page.limit));
        args.push(SqlValue::Int(i64::try_from(self.page.offset).unwrap_or(i64::MAX)));

        Statement {
            sql,
            args,
            table: self.template.table,
            filter,
            ordering: self.template.ordering,
            limit,
            offset,
        }
    }
}
