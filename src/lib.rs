//! Client library for the Cerberus secrets management service.
//!
//! Pick an [`auth`] strategy, log in with [`Client::new`] and use the
//! accessors to work with safe deposit boxes, roles, categories, metadata,
//! secure files and secrets:
//!
//! ```no_run
//! # async fn run() -> cerberus::Result<()> {
//! use std::sync::Arc;
//! use cerberus::{Client, TokenAuth};
//!
//! let auth = Arc::new(TokenAuth::new("https://cerberus.example.com", "a-token")?);
//! let client = Client::new(auth, None).await?;
//! for sdb in client.sdb().list().await? {
//!     println!("{} {}", sdb.id, sdb.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod resources;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod vault;

pub use auth::{Auth, AwsCredentials, StsAuth, TokenAuth, UserAuth};
pub use client::{Client, RequestBody};
pub use config::Config;
pub use errors::{ApiError, Error, Result};
pub use resources::MetadataOpts;
