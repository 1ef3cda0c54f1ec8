use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of box metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataResponse {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub next_offset: Option<u32>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(rename = "sdb_count_in_result", default)]
    pub result_count: u32,
    #[serde(rename = "total_sdbcount", default)]
    pub total_count: u32,
    #[serde(
        rename = "safe_deposit_box_metadata",
        default,
        deserialize_with = "super::null_as_default"
    )]
    pub metadata: Vec<SdbMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdbMetadata {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub owner: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(rename = "created_ts", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(rename = "last_updated_ts", default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub last_updated_by: String,
    /// Group name to role name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_group_permissions: HashMap<String, String>,
    /// IAM principal ARN to role name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub iam_role_permissions: HashMap<String, String>,
}
