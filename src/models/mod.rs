//! API object definitions.
//!
//! Only the objects the client needs are modelled; unknown fields in server
//! responses are ignored.

pub mod auth;
pub mod category;
pub mod metadata;
pub mod role;
pub mod sdb;
pub mod secret;
pub mod secure_file;

pub use auth::{AuthStatus, IamAuthResponse, MfaDevice, UserAuthData, UserAuthResponse, UserClientToken, UserMetadata};
pub use category::Category;
pub use metadata::{MetadataResponse, SdbMetadata};
pub use role::Role;
pub use sdb::{IamPrincipal, SafeDepositBox, UserGroupPermission};
pub use secret::VaultSecret;
pub use secure_file::{SecureFileSummary, SecureFilesResponse};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
