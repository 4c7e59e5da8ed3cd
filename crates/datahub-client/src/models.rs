//! Manifest documents returned by the `latest` order endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub product_type: String,
}

/// One downloadable file in the latest run of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_id: String,
    pub run_date_time: DateTime<Utc>,
    #[serde(default)]
    pub run: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(default)]
    pub order: Order,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_details: OrderDetails,
}

impl OrderResponse {
    pub fn files(&self) -> &[FileEntry] {
        &self.order_details.files
    }

    pub fn into_files(self) -> Vec<FileEntry> {
        self.order_details.files
    }
}
