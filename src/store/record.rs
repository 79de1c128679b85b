use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::sql::Column;

/// Kinds of data held in the unified dataset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Meteorite,
    Climate,
    Wind,
    Vegetation,
    Infrastructure,
    Fire,
}

impl DatasetType {
    pub const ALL: [DatasetType; 6] = [
        DatasetType::Meteorite,
        DatasetType::Climate,
        DatasetType::Wind,
        DatasetType::Vegetation,
        DatasetType::Infrastructure,
        DatasetType::Fire,
    ];

    /// Wire name, as stored in the `dataset_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetType::Meteorite => "meteorite",
            DatasetType::Climate => "climate",
            DatasetType::Wind => "wind",
            DatasetType::Vegetation => "vegetation",
            DatasetType::Infrastructure => "infrastructure",
            DatasetType::Fire => "fire",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DatasetType::Meteorite => "Meteorite Landings",
            DatasetType::Climate => "Climate Stations",
            DatasetType::Wind => "Wind Observations",
            DatasetType::Vegetation => "Vegetation Zones",
            DatasetType::Infrastructure => "Infrastructure",
            DatasetType::Fire => "Fire Projections",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DatasetType::Meteorite => "Global meteorite impact and discovery data",
            DatasetType::Climate => {
                "Australian climate station data with temperature, humidity, and evaporation"
            }
            DatasetType::Wind => "Wind speed and direction observations",
            DatasetType::Vegetation => "Vegetation classification and area data",
            DatasetType::Infrastructure => "Infrastructure and utility data",
            DatasetType::Fire => "Fire risk and projection data",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDatasetType(pub String);

impl fmt::Display for UnknownDatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dataset type: {}", self.0)
    }
}

impl std::error::Error for UnknownDatasetType {}

impl FromStr for DatasetType {
    type Err = UnknownDatasetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DatasetType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownDatasetType(s.to_string()))
    }
}

/// One geospatial row. Columns that do not apply to a dataset are `None`
/// and left out of the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub dataset_type: DatasetType,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recclass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nametype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fall: Option<String>,
}

impl Record {
    /// A bare row of the given type; chain the `with_*` setters for columns.
    pub fn new(id: i64, dataset_type: DatasetType, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Record {
            id,
            dataset_type,
            name: name.into(),
            lat,
            lon,
            value: None,
            unit: None,
            metadata: None,
            recclass: None,
            mass: None,
            year: None,
            nametype: None,
            fall: None,
        }
    }

    /// A meteorite row with every meteorite column set.
    pub fn meteorite(
        id: i64,
        name: impl Into<String>,
        recclass: impl Into<String>,
        mass: f64,
        year: i64,
        lat: f64,
        lon: f64,
    ) -> Self {
        Record {
            recclass: Some(recclass.into()),
            mass: Some(mass),
            year: Some(year),
            ..Record::new(id, DatasetType::Meteorite, name, lat, lon)
        }
    }

    pub fn with_value(mut self, value: f64, unit: impl Into<String>) -> Self {
        self.value = Some(value);
        self.unit = Some(unit.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Row position, if the stored lat/lon are valid.
    pub fn position(&self) -> Option<Coordinate> {
        Coordinate::new(self.lat, self.lon).ok()
    }

    /// Numeric column value; `None` is SQL NULL.
    pub fn numeric(&self, column: Column) -> Option<f64> {
        match column {
            Column::Id => Some(self.id as f64),
            Column::Year => self.year.map(|y| y as f64),
            Column::Mass => self.mass,
            Column::Value => self.value,
            Column::RecClass | Column::DatasetType => None,
        }
    }

    /// Text column value; `None` is SQL NULL.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::RecClass => self.recclass.as_deref(),
            Column::DatasetType => Some(self.dataset_type.as_str()),
            _ => None,
        }
    }
}

/// Per-type row count and value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset_type: DatasetType,
    pub count: u64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Lat/lon bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_count: u64,
    pub avg_value: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub spatial_extent: Option<Extent>,
}
