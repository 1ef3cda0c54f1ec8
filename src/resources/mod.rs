//! Typed accessors over the service's REST resources.

pub mod category;
pub mod metadata;
pub mod role;
pub mod sdb;
pub mod secret;
pub mod secure_file;

pub use category::Category;
pub use metadata::{Metadata, MetadataOpts};
pub use role::Role;
pub use sdb::Sdb;
pub use secret::Secret;
pub use secure_file::SecureFile;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::{parse_api_error, Error, Result};

/// Pass the response through when it has the `expected` status, otherwise
/// turn it into an error: 404 is `NotFound`, 400 carries the API error
/// envelope, anything else is reported with `context`.
pub(crate) async fn check_status(
    resp: Response,
    expected: StatusCode,
    context: &'static str,
) -> Result<Response> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }
    match status {
        StatusCode::NOT_FOUND => Err(Error::NotFound),
        StatusCode::BAD_REQUEST => {
            let body = resp.bytes().await?;
            Err(parse_api_error(status, &body))
        }
        _ => Err(Error::UnexpectedStatus {
            context,
            status: status.as_u16(),
        }),
    }
}

pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: Response,
    expected: StatusCode,
    context: &'static str,
) -> Result<T> {
    let resp = check_status(resp, expected, context).await?;
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Append a caller supplied relative path to `base`, percent-encoding each
/// segment and dropping empty ones. `.` and `..` segments would be resolved
/// against `base` by the URL parser, so they are reported as `NotFound`.
pub(crate) fn join_path(base: &str, rel: &str) -> Result<String> {
    let mut path = base.trim_end_matches('/').to_string();
    for segment in rel.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(Error::NotFound);
        }
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/v1/secure-file", "app/certs/key.pem").unwrap(), "/v1/secure-file/app/certs/key.pem");
        assert_eq!(join_path("/v1/secure-file", "/app//a file").unwrap(), "/v1/secure-file/app/a%20file");
        assert_eq!(join_path("/v1/secure-files/", "").unwrap(), "/v1/secure-files");
        assert_eq!(join_path("/v2/safe-deposit-box", "a?b").unwrap(), "/v2/safe-deposit-box/a%3Fb");
        assert_eq!(join_path("/v1/secure-file", "app/.env").unwrap(), "/v1/secure-file/app/.env");
    }

    #[test]
    fn test_join_path_rejects_dot_segments() {
        assert!(matches!(join_path("/v2/safe-deposit-box", ".."), Err(Error::NotFound)));
        assert!(matches!(join_path("/v2/safe-deposit-box", "."), Err(Error::NotFound)));
        assert!(matches!(join_path("/v1/secure-file", "app/../../v2/auth"), Err(Error::NotFound)));
    }
}
