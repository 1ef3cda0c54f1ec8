#![allow(dead_code)]

use std::sync::Arc;

use cerberus::{Client, TokenAuth};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const TOKEN: &str = "a-cool-token";

pub const ERROR_RESPONSE: &str = r#"{
    "error_id": "a041aa4d-1d5a-4eed-8e8a-6dc18bdf96db",
    "errors": [{
        "code": 99208,
        "message": "The name may not be blank.",
        "metadata": {
            "field": "name"
        }
    }]
}"#;

/// Route library logs to the test output. Filter with RUST_LOG.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A client logged in with a static token against `server`.
pub async fn client_for(server: &MockServer) -> Client {
    init_tracing();
    let auth = Arc::new(TokenAuth::new(&server.uri(), TOKEN).unwrap());
    Client::new(auth, None).await.unwrap()
}
