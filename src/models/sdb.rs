use serde::{Deserialize, Serialize};

/// A safe deposit box. Empty fields are left out when the box is sent to the
/// server, so a partially filled value works as an update patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeDepositBox {
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub category_id: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub user_group_permissions: Vec<UserGroupPermission>,
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub iam_principal_permissions: Vec<IamPrincipal>,
}

/// Role granted to a user group on a box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserGroupPermission {
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub role_id: String,
}

/// Role granted to a cloud IAM principal on a box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IamPrincipal {
    #[serde(default, deserialize_with = "super::null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub iam_principal_arn: String,
    pub role_id: String,
}
