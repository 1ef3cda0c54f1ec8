use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecureFileSummary {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub path: String,
    #[serde(rename = "size_in_bytes", default)]
    pub size: u64,
    #[serde(rename = "sdbox_id", default, deserialize_with = "super::null_as_default")]
    pub sdb_id: String,
    #[serde(rename = "created_ts", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub created_by: String,
    #[serde(rename = "last_updated_ts", default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub last_updated_by: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_group_permissions: HashMap<String, String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub iam_role_permissions: HashMap<String, String>,
}

/// One page of secure file summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecureFilesResponse {
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub next_offset: Option<u32>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(rename = "file_count_in_result", default)]
    pub result_count: u32,
    #[serde(rename = "total_file_count", default)]
    pub total_count: u32,
    #[serde(
        rename = "secure_file_summaries",
        default,
        deserialize_with = "super::null_as_default"
    )]
    pub summaries: Vec<SecureFileSummary>,
}
