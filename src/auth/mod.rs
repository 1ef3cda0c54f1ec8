//! Authentication strategies.
//!
//! Each strategy owns one session (token + expiry) and knows how to obtain,
//! refresh and revoke it. The strategies can be used on their own to get a
//! login token, or handed to [`crate::Client`] which signs every request with
//! [`Auth::headers`].

pub mod sigv4;
pub mod sts;
pub mod token;
pub mod user;

pub use sigv4::AwsCredentials;
pub use sts::StsAuth;
pub use token::TokenAuth;
pub use user::UserAuth;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tokio::io::AsyncBufRead;
use tracing::debug;
use url::Url;
use zeroize::Zeroize;

use crate::errors::{Error, Result};
use crate::models::UserAuthResponse;
use crate::transport::{client_id, CLIENT_HEADER};

/// Header carrying the session token on API calls.
pub const TOKEN_HEADER: &str = "X-Cerberus-Token";

/// Subtracted from server lease durations to absorb request latency and clock skew.
const EXPIRY_DELTA_SECS: i64 = 60;

/// Line-oriented source of a one-time passcode for MFA step-up.
pub type OtpSource = dyn AsyncBufRead + Unpin + Send;

#[async_trait]
pub trait Auth: Send + Sync {
    /// Return the existing valid token, or perform every authentication step
    /// needed to get a new one. `otp` is read when an MFA code is required;
    /// when absent the code is prompted for on stdin.
    async fn get_token(&self, otp: Option<&mut OtpSource>) -> Result<String>;

    /// Whether a token exists and has not expired.
    fn is_authenticated(&self) -> bool;

    /// Use the current valid token to get a new one.
    async fn refresh(&self) -> Result<()>;

    /// Revoke the current token.
    async fn logout(&self) -> Result<()>;

    /// Headers for API calls, including the session token.
    fn headers(&self) -> Result<HeaderMap>;

    fn base_url(&self) -> &Url;

    /// Expiry of the current token. Errors when there is no token.
    fn expiry(&self) -> Result<DateTime<Utc>>;
}

#[derive(Debug, Default)]
pub(crate) struct Session {
    token: String,
    expiry: Option<DateTime<Utc>>,
}

impl Session {
    fn is_valid(&self) -> bool {
        !self.token.is_empty() && self.expiry.map_or(true, |expiry| Utc::now() < expiry)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

/// Session guarded for shared use. Guards never escape these methods, so no
/// lock is held across an await point.
#[derive(Debug, Default)]
pub(crate) struct SessionLock(RwLock<Session>);

impl SessionLock {
    pub(crate) fn with_token(token: &str) -> Self {
        Self(RwLock::new(Session {
            token: token.to_string(),
            expiry: None,
        }))
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.read().is_valid()
    }

    pub(crate) fn valid_token(&self) -> Option<String> {
        let session = self.read();
        session.is_valid().then(|| session.token.clone())
    }

    pub(crate) fn expiry(&self) -> Result<DateTime<Utc>> {
        let session = self.read();
        match session.expiry {
            Some(expiry) if !session.token.is_empty() => Ok(expiry),
            _ => Err(Error::ExpiryNotSet),
        }
    }

    pub(crate) fn set(&self, token: String, expiry: Option<DateTime<Utc>>) {
        let mut session = self.write();
        session.token.zeroize();
        session.token = token;
        session.expiry = expiry;
    }

    /// Store a token leased for `lease_secs`, minus the safety skew.
    pub(crate) fn set_leased(&self, token: String, lease_secs: i64) -> Result<()> {
        let expiry = lease_expiry(Utc::now(), lease_secs)?;
        self.set(token, Some(expiry));
        Ok(())
    }

    pub(crate) fn clear(&self) {
        let mut session = self.write();
        session.token.zeroize();
        session.token.clear();
        session.expiry = None;
    }

    /// Headers for the current token, or `Unauthenticated`.
    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let token = self.valid_token().ok_or(Error::Unauthenticated)?;
        auth_headers(&token)
    }
}

fn lease_expiry(now: DateTime<Utc>, lease_secs: i64) -> Result<DateTime<Utc>> {
    chrono::Duration::try_seconds(lease_secs.saturating_sub(EXPIRY_DELTA_SECS))
        .and_then(|lease| now.checked_add_signed(lease))
        .ok_or_else(|| {
            Error::Internal(anyhow::anyhow!(
                "lease duration of {} seconds is out of range",
                lease_secs
            ))
        })
}

/// Basic JSON headers with the token attached.
pub(crate) fn auth_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = base_headers()?;
    headers.insert(
        HeaderName::from_static("x-cerberus-token"),
        HeaderValue::from_str(token)
            .map_err(|_| Error::InvalidConfig("token is not a valid header value".into()))?,
    );
    Ok(headers)
}

pub(crate) fn base_headers() -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("x-cerberus-client"),
        HeaderValue::from_str(&client_id())
            .map_err(|_| Error::InvalidConfig(format!("invalid {} value", CLIENT_HEADER)))?,
    );
    Ok(headers)
}

/// Exchange the token carried in `headers` for a new one. Every token type
/// can be refreshed through this endpoint.
pub async fn refresh_token(
    http: &reqwest::Client,
    base_url: &Url,
    headers: HeaderMap,
) -> Result<UserAuthResponse> {
    let url = base_url.join("/v2/auth/user/refresh")?;
    let resp = http.get(url).headers(headers).send().await?;
    check_and_parse(resp).await
}

/// Revoke the token carried in `headers`.
pub async fn logout_token(http: &reqwest::Client, base_url: &Url, headers: HeaderMap) -> Result<()> {
    let url = base_url.join("/v1/auth")?;
    let resp = http.delete(url).headers(headers).send().await?;
    if resp.status() != StatusCode::NO_CONTENT {
        return Err(Error::UnexpectedStatus {
            context: "log out",
            status: resp.status().as_u16(),
        });
    }
    debug!("token revoked");
    Ok(())
}

/// Map auth failures to `Unauthorized` and decode a successful user auth response.
pub(crate) async fn check_and_parse(resp: reqwest::Response) -> Result<UserAuthResponse> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Unauthorized);
    }
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus {
            context: "authenticate",
            status: status.as_u16(),
        });
    }
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Token and lease duration issued in a user auth response.
pub(crate) fn issued_token(resp: &UserAuthResponse) -> Result<(String, i64)> {
    match resp.data.client_token.as_ref() {
        Some(ct) if !ct.client_token.is_empty() => Ok((ct.client_token.clone(), ct.lease_duration)),
        _ => Err(Error::Internal(anyhow::anyhow!(
            "authentication response did not contain a client token"
        ))),
    }
}
