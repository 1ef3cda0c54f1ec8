use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category a box can be filed under, e.g. "Applications" or "Shared".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub path: String,
    #[serde(rename = "created_ts", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "last_updated_ts", default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub last_updated_by: String,
}
