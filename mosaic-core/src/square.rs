use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grid cell as persisted in the store.
///
/// At most one live record exists per `id`. `is_purchased` flips to true
/// only via out-of-band payment confirmation; this service never updates
/// ownership in place (stale claims are deleted and recreated).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Square {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub redirect_link: String,
    pub owner: String,
    pub is_purchased: bool,
    pub reserved_at: DateTime<Utc>,
}

/// Display projection returned by range queries. Never exposes the owner
/// or the raw reservation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SquareSummary {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub redirect_link: String,
    pub is_purchased: bool,
}

/// Content-store key for a cell's image
pub fn image_key(id: i64, extension: &str) -> String {
    format!("squares/{id}.{extension}")
}

/// Result-cache key for a `(start, end)` range query
pub fn range_cache_key(start: i64, end: i64) -> String {
    format!("squares:{start}-{end}")
}
