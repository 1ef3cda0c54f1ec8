//! Request executor shared by every resource accessor.
//!
//! `Client` ties an [`Auth`] strategy to the retrying transport and the
//! secret store. All calls go through [`Client::do_request`], which attaches
//! the session headers and honours the server's token refresh signal.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::{Auth, OtpSource};
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::resources::{Category, Metadata, Role, Sdb, Secret, SecureFile};
use crate::transport::Transport;
use crate::vault::{SecretStore, VaultKvStore};

/// Response header the server sets to `true` when the session token should
/// be exchanged for a fresh one.
pub const REFRESH_HEADER: &str = "X-Refresh-Token";

/// Body of an API request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-encoded JSON, sent as `application/json`.
    Json(Bytes),
    /// Streamed multipart form. Cannot be replayed, so it is never retried.
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(RequestBody::Json(Bytes::from(serde_json::to_vec(value)?)))
    }
}

pub struct Client {
    auth: Arc<dyn Auth>,
    base_url: Url,
    transport: Transport,
    default_headers: HeaderMap,
    secrets: Arc<dyn SecretStore>,
}

impl Client {
    /// Log in with `auth` and build a client with default settings.
    ///
    /// `otp` is only read if the login requires an MFA code.
    pub async fn new(auth: Arc<dyn Auth>, otp: Option<&mut OtpSource>) -> Result<Self> {
        Self::with_config(auth, otp, &Config::default()).await
    }

    /// Same as [`Client::new`] with the timeouts, backoff and default
    /// headers taken from `config`.
    pub async fn with_config(
        auth: Arc<dyn Auth>,
        otp: Option<&mut OtpSource>,
        config: &Config,
    ) -> Result<Self> {
        let token = auth.get_token(otp).await?;
        let transport = Transport::new(config)?;
        let store = VaultKvStore::new(auth.base_url().clone(), transport.retrying().clone(), &token);
        Ok(Self::assemble(auth, transport, config, Arc::new(store)))
    }

    /// Build a client that talks to secrets through `store` instead of the
    /// built-in key/value client. The store is seeded with the login token.
    pub async fn with_secret_store(
        auth: Arc<dyn Auth>,
        otp: Option<&mut OtpSource>,
        config: &Config,
        store: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        let token = auth.get_token(otp).await?;
        store.set_token(&token);
        let transport = Transport::new(config)?;
        Ok(Self::assemble(auth, transport, config, store))
    }

    fn assemble(
        auth: Arc<dyn Auth>,
        transport: Transport,
        config: &Config,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            base_url: auth.base_url().clone(),
            auth,
            transport,
            default_headers: config.default_headers.clone(),
            secrets,
        }
    }

    pub fn auth(&self) -> &Arc<dyn Auth> {
        &self.auth
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn secret_store(&self) -> &Arc<dyn SecretStore> {
        &self.secrets
    }

    pub fn sdb(&self) -> Sdb<'_> {
        Sdb::new(self)
    }

    pub fn role(&self) -> Role<'_> {
        Role::new(self)
    }

    pub fn category(&self) -> Category<'_> {
        Category::new(self)
    }

    pub fn metadata(&self) -> Metadata<'_> {
        Metadata::new(self)
    }

    pub fn secure_file(&self) -> SecureFile<'_> {
        SecureFile::new(self)
    }

    pub fn secret(&self) -> Secret<'_> {
        Secret::new(self.secrets.as_ref())
    }

    /// Perform an authenticated call against `path` (absolute, e.g.
    /// `/v1/role`) with `params` as query string.
    ///
    /// The response is returned whatever its status; callers classify it.
    /// When the server signals a token refresh the session is refreshed
    /// before returning, and a failed refresh is reported as
    /// [`Error::TokenRefresh`] carrying the response.
    pub async fn do_request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: RequestBody,
    ) -> Result<reqwest::Response> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let mut headers = self.auth.headers()?;
        for name in self.default_headers.keys() {
            headers.remove(name);
            for value in self.default_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        debug!(%method, path, "cerberus request");
        let sent = match body {
            RequestBody::Empty => {
                self.transport
                    .retrying()
                    .request(method, url)
                    .headers(headers)
                    .send()
                    .await
            }
            RequestBody::Json(bytes) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.transport
                    .retrying()
                    .request(method, url)
                    .headers(headers)
                    .body(bytes)
                    .send()
                    .await
            }
            RequestBody::Multipart(form) => {
                // The form sets its own content type with the boundary.
                headers.remove(CONTENT_TYPE);
                self.transport
                    .raw()
                    .request(method, url)
                    .headers(headers)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(reqwest_middleware::Error::from)
            }
        };

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                info!(error = %e, "an error was thrown when executing a call to Cerberus");
                return Err(e.into());
            }
        };
        if resp.status().is_server_error() {
            info!(status = resp.status().as_u16(), "Cerberus returned an error when executing a call");
        }

        let refresh_requested = resp
            .headers()
            .get(REFRESH_HEADER)
            .and_then(|v| v.to_str().ok())
            == Some("true");
        if refresh_requested {
            debug!("server requested a token refresh");
            if let Err(e) = self.auth.refresh().await {
                warn!(error = %e, "token refresh failed");
                return Err(Error::TokenRefresh {
                    response: Box::new(resp),
                    source: Box::new(e),
                });
            }
            let token = self.auth.get_token(None).await?;
            self.secrets.set_token(&token);
        }

        Ok(resp)
    }
}
