use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::SharedCredentialsProvider;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use super::sigv4::{sign_request, sts_endpoint, AwsCredentials};
use super::{logout_token, Auth, OtpSource, SessionLock};
use crate::config::{validate_url, Config};
use crate::errors::{parse_api_error, Error, Result};
use crate::models::IamAuthResponse;
use crate::transport::{auth_client, client_id, CLIENT_HEADER};

const STS_BODY: &[u8] = b"Action=GetCallerIdentity&Version=2011-06-15";

static REGION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-\d+$").expect("region pattern is valid")
});

/// Authenticates with the caller's AWS identity by forwarding a signed STS
/// `GetCallerIdentity` request to the service.
///
/// Unless credentials are given explicitly they come from the default AWS
/// chain: environment variables, the shared credentials and config files,
/// web identity, the container endpoint and the instance role. The chain is
/// only consulted when a login actually happens.
pub struct StsAuth {
    base_url: Url,
    region: String,
    credentials: Option<AwsCredentials>,
    chain: OnceCell<SharedCredentialsProvider>,
    http: reqwest::Client,
    session: SessionLock,
}

impl StsAuth {
    pub fn new(cerberus_url: &str, region: &str) -> Result<Self> {
        if region.is_empty() {
            return Err(Error::InvalidConfig("region cannot be empty".into()));
        }
        if !REGION_REGEX.is_match(region) {
            return Err(Error::InvalidConfig(format!(
                "{} is not a valid AWS region",
                region
            )));
        }
        if cerberus_url.is_empty() {
            return Err(Error::InvalidConfig("Cerberus URL cannot be empty".into()));
        }
        Ok(Self {
            base_url: validate_url(cerberus_url)?,
            region: region.to_string(),
            credentials: None,
            chain: OnceCell::new(),
            http: auth_client(&Config::default())?,
            session: SessionLock::default(),
        })
    }

    pub fn with_credentials(
        cerberus_url: &str,
        region: &str,
        credentials: AwsCredentials,
    ) -> Result<Self> {
        Ok(Self {
            credentials: Some(credentials),
            ..Self::new(cerberus_url, region)?
        })
    }

    /// Use the timeouts from `config` for the login calls.
    pub fn with_http_config(mut self, config: &Config) -> Result<Self> {
        self.http = auth_client(config)?;
        Ok(self)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    async fn credentials(&self) -> Result<AwsCredentials> {
        if let Some(creds) = &self.credentials {
            return Ok(creds.clone());
        }
        let provider = self
            .chain
            .get_or_try_init(|| async {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.region.clone()))
                    .load()
                    .await;
                debug!(region = %self.region, "loaded default AWS credentials chain");
                sdk_config.credentials_provider().ok_or_else(|| {
                    Error::MissingCredentials("no AWS credentials provider is configured".into())
                })
            })
            .await?;
        AwsCredentials::from_provider(provider).await
    }

    async fn signed_headers(&self) -> Result<HeaderMap> {
        let creds = self.credentials().await?;
        let endpoint = Url::parse(&sts_endpoint(&self.region))?;
        let mut headers = HeaderMap::new();
        sign_request(
            "POST",
            &endpoint,
            &mut headers,
            STS_BODY,
            &creds,
            &self.region,
            "sts",
            Utc::now(),
        )?;
        Ok(headers)
    }

    /// Log in and return the issued token.
    async fn authenticate(&self) -> Result<String> {
        let mut headers = self.signed_headers().await?;
        headers.insert(
            HeaderName::from_static("x-cerberus-client"),
            HeaderValue::from_str(&client_id())
                .map_err(|_| Error::InvalidConfig(format!("invalid {} value", CLIENT_HEADER)))?,
        );

        let url = self.base_url.join("/v2/auth/sts-identity")?;
        let resp = self
            .http
            .post(url)
            .headers(headers)
            .body(STS_BODY)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized);
        }
        if status != StatusCode::OK {
            let body = resp.bytes().await?;
            return Err(match parse_api_error(status, &body) {
                api @ Error::Api(_) => api,
                _ => Error::UnexpectedStatus {
                    context: "authenticate",
                    status: status.as_u16(),
                },
            });
        }

        let body = resp.bytes().await?;
        let parsed: IamAuthResponse = serde_json::from_slice(&body)?;
        if parsed.client_token.is_empty() {
            return Err(Error::Internal(anyhow::anyhow!(
                "authentication response did not contain a client token"
            )));
        }
        info!(identity = %parsed.identity(), "authenticated with Cerberus");

        self.session
            .set_leased(parsed.client_token.clone(), parsed.lease_duration)?;
        Ok(parsed.client_token)
    }
}

#[async_trait]
impl Auth for StsAuth {
    async fn get_token(&self, _otp: Option<&mut OtpSource>) -> Result<String> {
        if let Some(token) = self.session.valid_token() {
            return Ok(token);
        }
        self.authenticate().await
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Logs in again instead of calling the refresh endpoint: the service
    /// caps how many times a cloud identity token may be refreshed.
    async fn refresh(&self) -> Result<()> {
        if !self.session.is_valid() {
            return Err(Error::Unauthenticated);
        }
        self.authenticate().await.map(|_| ())
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
