//! Common test fixtures for catalogue and overlay tests.

/// Category names of the default pipeline table.
pub mod categories {
    pub const PRECIPITATION: &str = "total_precipitation_rate";
    pub const CLOUD: &str = "cloud_amount_total";
    pub const PRESSURE: &str = "mean_sea_level_pressure";
    pub const TEMPERATURE: &str = "temperature_at_surface";

    /// A category no default pipeline knows about.
    pub const UNSUPPORTED: &str = "wind_speed_at_10m";
}

/// Provider file identifier `<category>_ts<HH>_<YYYYMMDD>00`.
///
/// # Example
///
/// ```
/// use test_utils::file_id;
///
/// assert_eq!(
///     file_id("cloud_amount_total", 7, "20240118"),
///     "cloud_amount_total_ts07_2024011800"
/// );
/// ```
pub fn file_id(category: &str, hour: u32, date: &str) -> String {
    format!("{}_ts{:02}_{}00", category, hour, date)
}

/// Manifest body for `GET /orders/{id}/latest` listing `file_ids`.
pub fn manifest_json(order_id: &str, file_ids: &[String]) -> String {
    let files: Vec<serde_json::Value> = file_ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "fileId": id,
                "runDateTime": "2024-01-18T00:00:00Z",
                "run": "00"
            })
        })
        .collect();

    serde_json::json!({
        "orderDetails": {
            "order": {
                "orderId": order_id,
                "name": "Test Order",
                "modelId": "mo-uk",
                "requiredLatestRuns": ["00"],
                "format": "png"
            },
            "files": files
        }
    })
    .to_string()
}
