use serde::Serialize;

use crate::store::{DatasetSummary, DatasetType};

/// Catalogue entry for one dataset type that has rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetInfo {
    #[serde(rename = "type")]
    pub dataset_type: DatasetType,
    pub name: String,
    pub description: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<String>,
}

impl From<&DatasetSummary> for DatasetInfo {
    fn from(summary: &DatasetSummary) -> Self {
        let value_range = match (summary.min_value, summary.max_value) {
            (Some(min), Some(max)) => Some(format!("{:.2} - {:.2}", min, max)),
            _ => None,
        };
        DatasetInfo {
            dataset_type: summary.dataset_type,
            name: summary.dataset_type.display_name().to_string(),
            description: summary.dataset_type.description().to_string(),
            count: summary.count,
            value_range,
        }
    }
}
