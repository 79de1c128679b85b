use std::fmt;

/// A 1-based positional placeholder (`$1`, `$2`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placeholder(usize);

impl Placeholder {
    /// Create a placeholder. Positions start at 1; `0` is bumped to 1.
    pub fn new(position: usize) -> Self {
        Placeholder(position.max(1))
    }

    /// The 1-based position as written in SQL.
    pub fn position(self) -> usize {
        self.0
    }

    /// Zero-based index into the argument list this placeholder refers to.
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// This placeholder moved `offset` positions to the right.
    pub fn shifted(self, offset: usize) -> Self {
        Placeholder(self.0 + offset)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Columns a predicate or ordering may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Year,
    Mass,
    RecClass,
    Value,
    DatasetType,
}

impl Column {
    /// Column name as it appears in SQL text.
    pub fn as_sql(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Year => "year",
            Column::Mass => "mass",
            Column::RecClass => "recclass",
            Column::Value => "value",
            Column::DatasetType => "dataset_type",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Base relations a query can select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Legacy meteorite table.
    Locations,
    /// Unified multi-dataset table.
    Datasets,
}

impl Table {
    /// Relation name as it appears in SQL text.
    pub fn name(self) -> &'static str {
        match self {
            Table::Locations => "locations",
            Table::Datasets => "datasets",
        }
    }

    /// The `SELECT ... FROM ...` head for this relation.
    pub fn projection(self) -> &'static str {
        match self {
            Table::Locations => {
                "SELECT id, name, recclass, mass, year, ST_X(geom) AS lon, ST_Y(geom) AS lat FROM locations"
            }
            Table::Datasets => {
                "SELECT id, dataset_type, name, lat, lon, value, unit, metadata, recclass, mass, year, nametype, fall FROM datasets"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub column: Column,
    pub descending: bool,
}

impl Ordering {
    /// Descending order on `column`.
    pub fn desc(column: Column) -> Self {
        Ordering {
            column,
            descending: true,
        }
    }

    /// Ascending order on `column`.
    pub fn asc(column: Column) -> Self {
        Ordering {
            column,
            descending: false,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.descending { "DESC" } else { "ASC" };
        write!(f, "ORDER BY {} {}", self.column, direction)
    }
}

/// One boolean condition of a `WHERE` clause.
///
/// Clauses carry placeholders rather than values, so the same structure can
/// be rendered to SQL text or evaluated directly against the argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `<column> BETWEEN low AND high`, inclusive on both ends.
    Between {
        column: Column,
        low: Placeholder,
        high: Placeholder,
    },
    /// `<column> = value`
    Equals { column: Column, value: Placeholder },
    /// PostGIS proximity test on the row geometry. Radius is in meters.
    Within {
        lon: Placeholder,
        lat: Placeholder,
        radius: Placeholder,
    },
}

impl Clause {
    /// Placeholders in the order they appear in the rendered text.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        match self {
            Clause::Between { low, high, .. } => vec![*low, *high],
            Clause::Equals { value, .. } => vec![*value],
            Clause::Within { lon, lat, radius } => vec![*lon, *lat, *radius],
        }
    }

    /// Copy of this clause with every placeholder moved by `offset`.
    pub fn shifted(&self, offset: usize) -> Clause {
        match self {
            Clause::Between { column, low, high } => Clause::Between {
                column: *column,
                low: low.shifted(offset),
                high: high.shifted(offset),
            },
            Clause::Equals { column, value } => Clause::Equals {
                column: *column,
                value: value.shifted(offset),
            },
            Clause::Within { lon, lat, radius } => Clause::Within {
                lon: lon.shifted(offset),
                lat: lat.shifted(offset),
                radius: radius.shifted(offset),
            },
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Between { column, low, high } => {
                write!(f, "{} BETWEEN {} AND {}", column, low, high)
            }
            Clause::Equals { column, value } => write!(f, "{} = {}", column, value),
            Clause::Within { lon, lat, radius } => write!(
                f,
                "ST_DWithin(geom::geography, ST_SetSRID(ST_MakePoint({}, {}), 4326)::geography, {})",
                lon, lat, radius
            ),
        }
    }
}
