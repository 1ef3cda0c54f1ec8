pub mod kv;

pub use kv::VaultKvStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::models::VaultSecret;

/// Abstraction over the key/value secret backend that sits behind the
/// service. Paths are relative and must not start with a `/`.
///
/// Each call returns `None` when the backend has nothing to report for the
/// path (missing secret, or a write that produced no response body).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Replace the token sent with every call.
    fn set_token(&self, token: &str);

    fn token(&self) -> Option<String>;

    async fn read(&self, path: &str) -> Result<Option<VaultSecret>>;

    async fn list(&self, path: &str) -> Result<Option<VaultSecret>>;

    async fn write(&self, path: &str, data: &Map<String, Value>) -> Result<Option<VaultSecret>>;

    async fn delete(&self, path: &str) -> Result<Option<VaultSecret>>;
}
