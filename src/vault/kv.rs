use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::SecretStore;
use crate::errors::{Error, Result};
use crate::models::VaultSecret;
use crate::resources::join_path;

const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Debug, Default, Deserialize)]
struct VaultErrors {
    #[serde(default)]
    errors: Vec<String>,
}

/// Client for the logical key/value HTTP API, served by the same host as
/// the rest of the service under `/v1/`.
pub struct VaultKvStore {
    base_url: Url,
    http: ClientWithMiddleware,
    token: RwLock<Option<Zeroizing<String>>>,
}

impl VaultKvStore {
    pub fn new(base_url: Url, http: ClientWithMiddleware, token: &str) -> Self {
        let store = Self {
            base_url,
            http,
            token: RwLock::new(None),
        };
        store.set_token(token);
        store
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: Option<(&str, &str)>,
        body: Option<&Map<String, Value>>,
    ) -> Result<Option<VaultSecret>> {
        let mut url = self.base_url.join(&join_path("/v1", path)?)?;
        if let Some((k, v)) = query {
            url.query_pairs_mut().append_pair(k, v);
        }

        let mut req = self.http.request(method.clone(), url);
        if let Some(token) = self.token() {
            req = req.header(VAULT_TOKEN_HEADER, token);
        }
        if let Some(data) = body {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(data)?);
        }

        let resp = req.send().await?;
        let status = resp.status();
        debug!(%method, path, status = status.as_u16(), "secret store call");

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = resp.bytes().await?;

        if status == StatusCode::NOT_FOUND && method == Method::GET {
            // A 404 with error messages is a real failure, a bare one means "no secret".
            let errs: VaultErrors = serde_json::from_slice(&bytes).unwrap_or_default();
            if errs.errors.is_empty() {
                return Ok(None);
            }
            return Err(Error::Vault {
                status: status.as_u16(),
                errors: errs.errors,
            });
        }
        if !status.is_success() {
            let errs: VaultErrors = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(Error::Vault {
                status: status.as_u16(),
                errors: errs.errors,
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl SecretStore for VaultKvStore {
    fn set_token(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = (!token.is_empty()).then(|| Zeroizing::new(token.to_string()));
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.as_str().to_string())
    }

    async fn read(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.call(Method::GET, path, None, None).await
    }

    async fn list(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.call(Method::GET, path, Some(("list", "true")), None).await
    }

    async fn write(&self, path: &str, data: &Map<String, Value>) -> Result<Option<VaultSecret>> {
        self.call(Method::PUT, path, None, Some(data)).await
    }

    async fn delete(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.call(Method::DELETE, path, None, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::Transport;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> VaultKvStore {
        let transport = Transport::new(&Config::default()).unwrap();
        let base = Url::parse(&server.uri()).unwrap();
        VaultKvStore::new(base, transport.retrying().clone(), "vault-token")
    }

    #[tokio::test]
    async fn test_read_secret() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/app/db"))
            .and(header(VAULT_TOKEN_HEADER, "vault-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"request_id": "1", "lease_duration": 3600, "data": {"password": "hunter2"}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let secret = store(&mock_server).read("secret/app/db").await.unwrap().unwrap();
        assert_eq!(secret.get_str("password"), Some("hunter2"));
        assert_eq!(secret.lease_duration, 3600);
    }

    #[tokio::test]
    async fn test_read_missing_secret_is_none() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"errors": []}"#))
            .mount(&mock_server)
            .await;

        assert!(store(&mock_server).read("secret/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_secrets() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/secret/app"))
            .and(query_param("list", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"data": {"keys": ["db", "nested/"]}}"#),
            )
            .mount(&mock_server)
            .await;

        let secret = store(&mock_server).list("secret/app").await.unwrap().unwrap();
        assert_eq!(secret.keys(), vec!["db", "nested/"]);
    }

    #[tokio::test]
    async fn test_write_secret() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/secret/app/db"))
            .and(body_json(serde_json::json!({"password": "hunter2"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut data = Map::new();
        data.insert("password".into(), Value::String("hunter2".into()));
        assert!(store(&mock_server).write("secret/app/db", &data).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/secret/app/db"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string(r#"{"errors": ["permission denied"]}"#),
            )
            .mount(&mock_server)
            .await;

        match store(&mock_server).delete("secret/app/db").await {
            Err(Error::Vault { status, errors }) => {
                assert_eq!(status, 403);
                assert_eq!(errors, vec!["permission denied"]);
            }
            other => panic!("expected secret store error, got {:?}", other),
        }
    }

    #[test]
    fn test_set_token() {
        let transport = Transport::new(&Config::default()).unwrap();
        let base = Url::parse("https://cerberus.example.com").unwrap();
        let kv = VaultKvStore::new(base, transport.retrying().clone(), "first");
        assert_eq!(kv.token().as_deref(), Some("first"));
        kv.set_token("second");
        assert_eq!(kv.token().as_deref(), Some("second"));
        kv.set_token("");
        assert!(kv.token().is_none());
    }
}
