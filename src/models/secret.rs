use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A secret as returned by the key/value store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultSecret {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub request_id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub lease_id: String,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub warnings: Vec<String>,
}

impl VaultSecret {
    /// Keys returned by a list call.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .get("keys")
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A single string field of the secret payload.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_from_list_response() {
        let body = r#"{"request_id": "r", "data": {"keys": ["app/", "db-password"]}, "warnings": null}"#;
        let secret: VaultSecret = serde_json::from_str(body).unwrap();
        assert_eq!(secret.keys(), vec!["app/", "db-password"]);
        assert!(secret.warnings.is_empty());
    }

    #[test]
    fn test_get_str() {
        let body = r#"{"data": {"password": "hunter2", "port": 5432}}"#;
        let secret: VaultSecret = serde_json::from_str(body).unwrap();
        assert_eq!(secret.get_str("password"), Some("hunter2"));
        assert_eq!(secret.get_str("port"), None);
        assert!(VaultSecret::default().keys().is_empty());
    }
}
