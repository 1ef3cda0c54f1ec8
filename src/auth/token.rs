use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use url::Url;

use super::{issued_token, logout_token, refresh_token, Auth, OtpSource, SessionLock};
use crate::config::{validate_url, Config};
use crate::errors::{Error, Result};
use crate::transport::auth_client;

/// Authenticates with a preexisting token. The token is not checked against
/// the server and never expires on its own; it stays valid until logout.
pub struct TokenAuth {
    base_url: Url,
    http: reqwest::Client,
    session: SessionLock,
}

impl TokenAuth {
    pub fn new(cerberus_url: &str, token: &str) -> Result<Self> {
        if cerberus_url.is_empty() {
            return Err(Error::InvalidConfig("Cerberus URL cannot be empty".into()));
        }
        if token.is_empty() {
            return Err(Error::InvalidConfig("token cannot be empty".into()));
        }
        Ok(Self {
            base_url: validate_url(cerberus_url)?,
            http: auth_client(&Config::default())?,
            session: SessionLock::with_token(token),
        })
    }

    /// Use the timeouts from `config` for refresh and logout calls.
    pub fn with_http_config(mut self, config: &Config) -> Result<Self> {
        self.http = auth_client(config)?;
        Ok(self)
    }
}

#[async_trait]
impl Auth for TokenAuth {
    /// Returns the token given at construction. `otp` is ignored.
    async fn get_token(&self, _otp: Option<&mut OtpSource>) -> Result<String> {
        self.session.valid_token().ok_or(Error::Unauthenticated)
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    async fn refresh(&self) -> Result<()> {
        let headers = self.session.headers()?;
        let resp = refresh_token(&self.http, &self.base_url, headers).await?;
        let (token, _) = issued_token(&resp)?;
        self.session.set(token, None);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let headers = self.session.headers()?;
        logout_token(&self.http, &self.base_url, headers).await?;
        self.session.clear();
        Ok(())
    }

    fn headers(&self) -> Result<HeaderMap> {
        self.session.headers()
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Static tokens carry no expiry.
    fn expiry(&self) -> Result<DateTime<Utc>> {
        Err(Error::ExpiryNotSet)
    }
}
