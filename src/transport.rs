/// HTTP stack shared by the client executor, the auth strategies and the
/// secret store. API calls go through reqwest-middleware with a bounded
/// exponential backoff; one-shot calls use the bare client.
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use std::time::Duration;

use crate::config::Config;
use crate::errors::Result;

/// Header identifying this library to the server.
pub const CLIENT_HEADER: &str = "X-Cerberus-Client";

pub fn client_id() -> String {
    format!("CerberusRustClient/{}", env!("CARGO_PKG_VERSION"))
}

/// Backoff applied to transiently failed sends (connection errors, 5xx, 408, 429).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSettings {
    pub initial_interval: Duration,
    pub multiplier: u32,
    pub max_interval: Duration,
    /// No retry is started once this much time has passed since the first attempt.
    pub max_elapsed_time: Duration,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            multiplier: 2,
            max_interval: Duration::from_millis(600),
            max_elapsed_time: Duration::from_millis(600),
        }
    }
}

pub struct Transport {
    raw: reqwest::Client,
    retrying: ClientWithMiddleware,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self> {
        let raw = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(32)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let b = config.backoff;
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(b.initial_interval, b.max_interval)
            .base(b.multiplier)
            .jitter(Jitter::None)
            .build_with_total_retry_duration(b.max_elapsed_time);

        let retrying = ClientBuilder::new(raw.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { raw, retrying })
    }

    /// Client without retries, for bodies that cannot be replayed.
    pub fn raw(&self) -> &reqwest::Client {
        &self.raw
    }

    pub fn retrying(&self) -> &ClientWithMiddleware {
        &self.retrying
    }
}

/// Client used by the auth strategies for their one-shot login calls, with
/// the configured timeouts.
pub(crate) fn auth_client(config: &Config) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()?)
}
