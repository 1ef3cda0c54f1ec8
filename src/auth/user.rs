use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

use super::{
    base_headers, check_and_parse, issued_token, logout_token, refresh_token, Auth, OtpSource,
    SessionLock,
};
use crate::config::{validate_url, Config};
use crate::errors::{Error, Result};
use crate::models::{AuthStatus, UserAuthResponse};
use crate::transport::auth_client;

/// Username and password authentication, with a one-time passcode step-up
/// when the account has MFA enabled.
pub struct UserAuth {
    username: String,
    password: Zeroizing<String>,
    base_url: Url,
    http: reqwest::Client,
    session: SessionLock,
}

impl UserAuth {
    /// The `CERBERUS_URL` environment variable, when set, takes precedence
    /// over `cerberus_url`.
    pub fn new(cerberus_url: &str, username: &str, password: &str) -> Result<Self> {
        let cerberus_url = std::env::var("CERBERUS_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| cerberus_url.to_string());

        if username.is_empty() {
            return Err(Error::InvalidConfig("username cannot be empty".into()));
        }
        if password.is_empty() {
            return Err(Error::InvalidConfig("password cannot be empty".into()));
        }
        if cerberus_url.is_empty() {
            return Err(Error::InvalidConfig("Cerberus URL cannot be empty".into()));
        }

        Ok(Self {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            base_url: validate_url(&cerberus_url)?,
            http: auth_client(&Config::default())?,
            session: SessionLock::default(),
        })
    }

    /// Use the timeouts from `config` for the login calls.
    pub fn with_http_config(mut self, config: &Config) -> Result<Self> {
        self.http = auth_client(config)?;
        Ok(self)
    }

    /// Log in, stepping up with MFA when asked to, and return the issued token.
    async fn authenticate(&self, otp: Option<&mut OtpSource>) -> Result<String> {
        let credentials = Zeroizing::new(format!("{}:{}", self.username, self.password.as_str()));
        let basic = Zeroizing::new(format!("Basic {}", STANDARD.encode(credentials.as_bytes())));

        let mut headers = base_headers()?;
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&basic)
                .map_err(|_| Error::InvalidConfig("credentials are not a valid header value".into()))?,
        );

        let url = self.base_url.join("/v2/auth/user")?;
        let resp = self.http.get(url).headers(headers).send().await?;
        let parsed = check_and_parse(resp).await?;

        if parsed.status == AuthStatus::MfaRequired {
            // Only the first registered device is offered.
            let device = parsed.data.devices.first().ok_or_else(|| {
                Error::Internal(anyhow::anyhow!("MFA is required but no device is registered"))
            })?;
            debug!(device = %device.name, "MFA required");
            return self.verify_mfa(&parsed.data.state_token, &device.id, otp).await;
        }

        self.store(&parsed)
    }

    async fn verify_mfa(
        &self,
        state_token: &str,
        device_id: &str,
        otp: Option<&mut OtpSource>,
    ) -> Result<String> {
        let code = match otp {
            Some(source) => read_otp(source).await?,
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(b"Enter token from device: ").await?;
                stdout.flush().await?;
                read_otp(&mut BufReader::new(tokio::io::stdin())).await?
            }
        };

        let body = serde_json::json!({
            "device_id": device_id,
            "state_token": state_token,
            "otp_token": code.as_str(),
        });
        let url = self.base_url.join("/v2/auth/mfa_check")?;
        let resp = self
            .http
            .post(url)
            .headers(base_headers()?)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await?;
        let parsed = check_and_parse(resp).await?;
        self.store(&parsed)
    }

    fn store(&self, resp: &UserAuthResponse) -> Result<String> {
        let (token, lease) = issued_token(resp)?;
        self.session.set_leased(token.clone(), lease)?;
        info!(username = %self.username, "authenticated with Cerberus");
        Ok(token)
    }
}

async fn read_otp<R>(source: &mut R) -> Result<Zeroizing<String>>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = Zeroizing::new(String::new());
    source.read_line(&mut line).await?;
    Ok(Zeroizing::new(line.trim().to_string()))
}

#[async_trait]
impl Auth for UserAuth {
    async fn get_token(&self, otp: Option<&mut OtpSource>) -> Result<String> {
        if let Some(token) = self.session.valid_token() {
            return Ok(token);
        }
        self.authenticate(otp).await
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    async fn refresh(&self) -> Result<()> {
        let headers = self.session.headers()?;
        let resp = refresh_token(&self.http, &self.base_url, headers).await?;
        let (token, lease) = issued_token(&resp)?;
        self.session.set_leased(token, lease)
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

    fn expiry(&self) -> Result<DateTime<Utc>> {
        self.session.expiry()
    }
}
