use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("resource not found")]
    NotFound,

    #[error("unable to complete request: not authenticated")]
    Unauthenticated,

    #[error("invalid credentials given")]
    Unauthorized,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server answered with a failure status but no error envelope,
    /// which usually means the failure happened outside the API layer.
    #[error("no error body returned from server (HTTP status {status})")]
    NoErrorBody { status: u16 },

    #[error("error while trying to {context}: got HTTP status code {status}")]
    UnexpectedStatus { context: &'static str, status: u16 },

    /// The request itself succeeded but the server asked for a token refresh
    /// that then failed. The original response is carried along.
    #[error("error refreshing token: {source}")]
    TokenRefresh {
        response: Box<reqwest::Response>,
        #[source]
        source: Box<Error>,
    },

    #[error("secret store returned HTTP status {status}: {}", errors.join("; "))]
    Vault { status: u16, errors: Vec<String> },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("expiry time not set")]
    ExpiryNotSet,

    #[error("credentials are required and cannot be found: {0}")]
    MissingCredentials(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("error while parsing response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

/// Error envelope returned by the API on a failed call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Error)]
#[error("error from API. ID: {error_id}, details: {errors:?}")]
pub struct ApiError {
    #[serde(default)]
    pub error_id: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Usually string to string, but the server declares it as an arbitrary object.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Decode an error envelope from a response body.
///
/// An empty body, or a JSON body without an `error_id`, yields
/// [`Error::NoErrorBody`]. A body that is not JSON at all yields [`Error::Json`].
pub fn parse_api_error(status: StatusCode, body: &[u8]) -> Error {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Error::NoErrorBody {
            status: status.as_u16(),
        };
    }
    match serde_json::from_slice::<ApiError>(body) {
        Ok(api) if api.error_id.is_empty() => Error::NoErrorBody {
            status: status.as_u16(),
        },
        Ok(api) => Error::Api(api),
        Err(e) => Error::Json(e),
    }
}
