use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a username/password login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    #[serde(rename = "success")]
    Success,
    /// Credentials were accepted but a one-time passcode is still required.
    #[serde(rename = "mfa_req")]
    MfaRequired,
}

/// Response of `/v2/auth/user`, `/v2/auth/mfa_check` and `/v2/auth/user/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAuthResponse {
    pub status: AuthStatus,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub data: UserAuthData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAuthData {
    /// Absent (`null`) while an MFA challenge is pending.
    #[serde(default)]
    pub client_token: Option<UserClientToken>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub state_token: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub devices: Vec<MfaDevice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserClientToken {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub client_token: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub policies: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub metadata: UserMetadata,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub lease_duration: i64,
    #[serde(default)]
    pub renewable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MfaDevice {
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,
    /// Sent by the server as a string, not a boolean.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_admin: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub groups: String,
}

/// Response of the cloud identity authentication endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IamAuthResponse {
    pub client_token: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub policies: Vec<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub lease_duration: i64,
    #[serde(default)]
    pub renewable: bool,
}

impl IamAuthResponse {
    /// Best-effort name of the principal the token was issued to.
    pub fn identity(&self) -> &str {
        self.metadata
            .get("iam_principal_arn")
            .or_else(|| self.metadata.get("username"))
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_auth_response_mfa() {
        let body = r#"{
            "status": "mfa_req",
            "data": {
                "user_id": "13427265",
                "username": "john.doe@nike.com",
                "state_token": "5c7d1fd1914ffff5bcc2253b3c38ef85a3125bc1",
                "devices": [{"id": "111111", "name": "Google Authenticator"}],
                "client_token": null
            }
        }"#;
        let parsed: UserAuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, AuthStatus::MfaRequired);
        assert_eq!(parsed.data.devices[0].id, "111111");
        assert!(parsed.data.client_token.is_none());
    }

    #[test]
    fn test_iam_identity_prefers_principal() {
        let body = r#"{
            "client_token": "tok",
            "metadata": {"iam_principal_arn": "arn:aws:iam::1111:role/app", "username": "arn:user"},
            "lease_duration": 3600
        }"#;
        let parsed: IamAuthResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.identity(), "arn:aws:iam::1111:role/app");

        let bare: IamAuthResponse = serde_json::from_str(r#"{"client_token": "tok"}"#).unwrap();
        assert_eq!(bare.identity(), "unknown");
    }
}
