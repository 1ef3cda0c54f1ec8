use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A permission level (owner, write, read) that can be granted on a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(rename = "created_ts", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "last_updated_ts", default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub last_updated_by: String,
}
