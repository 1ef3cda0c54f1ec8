use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use url::Url;

use crate::auth::{Auth, StsAuth, TokenAuth};
use crate::errors::{Error, Result};
use crate::transport::BackoffSettings;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the service. Set via CERBERUS_URL.
    pub cerberus_url: Option<String>,
    /// Pre-issued token. Set via CERBERUS_TOKEN.
    pub token: Option<String>,
    /// Region used for cloud identity auth. Set via AWS_REGION or AWS_DEFAULT_REGION.
    pub aws_region: Option<String>,
    /// Total per-request timeout. Set via CERBERUS_TIMEOUT_SECS. Default: 30.
    pub timeout: Duration,
    /// Set via CERBERUS_CONNECT_TIMEOUT_SECS. Default: 5.
    pub connect_timeout: Duration,
    pub backoff: BackoffSettings,
    /// Headers added to every API request, overriding the auth headers.
    pub default_headers: HeaderMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cerberus_url: None,
            token: None,
            aws_region: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            backoff: BackoffSettings::default(),
            default_headers: HeaderMap::new(),
        }
    }
}

impl Config {
    /// Pick an authentication strategy from the configuration: a static token
    /// when one is set, otherwise cloud identity auth for the configured region.
    pub fn auth(&self) -> Result<Arc<dyn Auth>> {
        let url = self
            .cerberus_url
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("CERBERUS_URL is not set".into()))?;

        if let Some(token) = self.token.as_deref() {
            return Ok(Arc::new(TokenAuth::new(url, token)?.with_http_config(self)?));
        }
        if let Some(region) = self.aws_region.as_deref() {
            return Ok(Arc::new(StsAuth::new(url, region)?.with_http_config(self)?));
        }
        Err(Error::InvalidConfig(
            "neither CERBERUS_TOKEN nor AWS_REGION is set".into(),
        ))
    }
}

pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();
    Ok(Config {
        cerberus_url: non_empty_var("CERBERUS_URL"),
        token: non_empty_var("CERBERUS_TOKEN"),
        aws_region: non_empty_var("AWS_REGION").or_else(|| non_empty_var("AWS_DEFAULT_REGION")),
        timeout: secs_var("CERBERUS_TIMEOUT_SECS").unwrap_or(defaults.timeout),
        connect_timeout: secs_var("CERBERUS_CONNECT_TIMEOUT_SECS")
            .unwrap_or(defaults.connect_timeout),
        ..defaults
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whole seconds; unparsable values fall back to the default.
fn secs_var(key: &str) -> Option<Duration> {
    non_empty_var(key)
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

/// Parse a service base address. The address must not carry a path or a
/// query string; request paths are always absolute.
pub fn validate_url(full_url: &str) -> Result<Url> {
    if full_url.trim().is_empty() {
        return Err(Error::InvalidConfig("Cerberus URL cannot be empty".into()));
    }
    let parsed = Url::parse(full_url)?;
    if !matches!(parsed.path(), "" | "/") {
        return Err(Error::InvalidUrl(format!(
            "given URL contained a path: {}. The URL should not have a path",
            parsed.path()
        )));
    }
    if let Some(query) = parsed.query() {
        return Err(Error::InvalidUrl(format!(
            "given URL contained a query string: {}. The URL should not have a query string",
            query
        )));
    }
    Ok(parsed)
}
