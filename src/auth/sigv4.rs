//! AWS Signature Version 4 signing for the cloud identity login.
//!
//! The login request is signed as if it were an STS `GetCallerIdentity` call
//! and the resulting headers are forwarded to the service, which replays them
//! against STS to prove the caller's identity. The `Host` header that was
//! signed is therefore the STS host and is never forwarded.
//!
//! Reference: https://docs.aws.amazon.com/IAM/latest/UserGuide/reference_aws-signing.html

use std::fmt;

use anyhow::{anyhow, Context};
use aws_credential_types::provider::ProvideCredentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use sha2::{Digest, Sha256};
use url::Url;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// AWS credentials used to sign the identity proof.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    secret_access_key: Zeroizing<String>,
    session_token: Option<Zeroizing<String>>,
}

impl AwsCredentials {
    pub fn new(access_key_id: &str, secret_access_key: &str, session_token: Option<&str>) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: Zeroizing::new(secret_access_key.to_string()),
            session_token: session_token
                .filter(|t| !t.is_empty())
                .map(|t| Zeroizing::new(t.to_string())),
        }
    }

    /// Resolve credentials from an AWS credentials provider, such as the
    /// default chain loaded by `aws-config`.
    pub async fn from_provider<P>(provider: &P) -> Result<Self>
    where
        P: ProvideCredentials + ?Sized,
    {
        let creds = provider
            .provide_credentials()
            .await
            .map_err(|e| Error::MissingCredentials(e.to_string()))?;
        Ok(Self::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            creds.session_token(),
        ))
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Regional STS endpoint. China regions live under a separate domain.
pub fn sts_endpoint(region: &str) -> String {
    let mut endpoint = format!("https://sts.{}.amazonaws.com", region);
    if region.starts_with("cn-") {
        endpoint.push_str(".cn");
    }
    endpoint
}

/// SHA-256 hash of data, returned as lowercase hex string.
fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], msg: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| anyhow!("SigV4: bad HMAC key: {}", e))?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// key = HMAC("AWS4" + secret, date) → HMAC(_, region) → HMAC(_, service) → HMAC(_, "aws4_request")
fn derive_signing_key(
    secret: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> anyhow::Result<Vec<u8>> {
    let secret = Zeroizing::new(format!("AWS4{}", secret));
    let k_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sign a request and insert `Authorization`, `X-Amz-Date` and, for
/// temporary credentials, `X-Amz-Security-Token` into `headers`.
///
/// The signed headers are `host`, `x-amz-date`, the security token when
/// present and `content-type` when `headers` already carries one. `Host` is
/// derived from `url` and left out of `headers`.
pub fn sign_request(
    method: &str,
    url: &Url,
    headers: &mut HeaderMap,
    body: &[u8],
    creds: &AwsCredentials,
    region: &str,
    service: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();

    let host = url.host_str().context("SigV4: URL has no host")?;
    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let canonical_uri = if url.path().is_empty() { "/" } else { url.path() };

    let mut query_pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    query_pairs.sort();
    let canonical_querystring = query_pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let payload_hash = sha256_hex(body);

    headers.insert(HeaderName::from_static(X_AMZ_DATE), HeaderValue::from_str(&amz_date)?);
    if let Some(token) = creds.session_token.as_ref() {
        headers.insert(
            HeaderName::from_static(X_AMZ_SECURITY_TOKEN),
            HeaderValue::from_str(token.as_str())?,
        );
    }

    let mut signed: Vec<(&str, String)> = vec![("host", host), (X_AMZ_DATE, amz_date.clone())];
    if let Some(token) = creds.session_token.as_ref() {
        signed.push((X_AMZ_SECURITY_TOKEN, token.as_str().to_string()));
    }
    if let Some(ct) = headers.get(CONTENT_TYPE) {
        signed.push(("content-type", ct.to_str()?.to_string()));
    }
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let canonical_headers: String = signed
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers = signed.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_uri, canonical_querystring, canonical_headers, signed_headers, payload_hash
    );

    let credential_scope = format!("{}/{}/{}/aws4_request", date_stamp, region, service);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = derive_signing_key(&creds.secret_access_key, &date_stamp, region, service)?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        creds.access_key_id, credential_scope, signed_headers, signature
    );
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

    Ok(())
}
