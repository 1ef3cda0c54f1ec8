use serde_json::{Map, Value};

use crate::errors::Result;
use crate::models::VaultSecret;
use crate::vault::SecretStore;

/// Every secret lives under this mount of the key/value store.
const PATH_PREFIX: &str = "secret/";

/// Read and write secrets inside boxes. Paths are relative to the secret
/// mount and must not start with a `/`, e.g. `app/my-box/db`.
pub struct Secret<'a> {
    store: &'a dyn SecretStore,
}

impl<'a> Secret<'a> {
    pub(crate) fn new(store: &'a dyn SecretStore) -> Self {
        Self { store }
    }

    pub async fn read(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.store.read(&prefixed(path)).await
    }

    /// Keys directly under `path`; see [`VaultSecret::keys`].
    pub async fn list(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.store.list(&prefixed(path)).await
    }

    pub async fn write(&self, path: &str, data: &Map<String, Value>) -> Result<Option<VaultSecret>> {
        self.store.write(&prefixed(path), data).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<VaultSecret>> {
        self.store.delete(&prefixed(path)).await
    }
}

fn prefixed(path: &str) -> String {
    format!("{}{}", PATH_PREFIX, path)
}
