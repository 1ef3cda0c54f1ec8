use reqwest::{Method, StatusCode};
use tracing::debug;

use super::{check_status, join_path, parse_response};
use crate::client::{Client, RequestBody};
use crate::errors::{Error, Result};
use crate::models::SafeDepositBox;

const SDB_BASE_PATH: &str = "/v2/safe-deposit-box";

/// Manage and read safe deposit boxes.
pub struct Sdb<'a> {
    client: &'a Client,
}

impl<'a> Sdb<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All boxes the session is allowed to see.
    pub async fn list(&self) -> Result<Vec<SafeDepositBox>> {
        let resp = self
            .client
            .do_request(Method::GET, SDB_BASE_PATH, &[], RequestBody::Empty)
            .await?;
        parse_response(resp, StatusCode::OK, "list safe deposit boxes").await
    }

    pub async fn get(&self, id: &str) -> Result<SafeDepositBox> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound);
        }
        let resp = self
            .client
            .do_request(
                Method::GET,
                &join_path(SDB_BASE_PATH, id)?,
                &[],
                RequestBody::Empty,
            )
            .await?;
        parse_response(resp, StatusCode::OK, "get safe deposit box").await
    }

    /// Find a box by exact name among the ones returned by [`Sdb::list`].
    pub async fn get_by_name(&self, name: &str) -> Result<SafeDepositBox> {
        if name.trim().is_empty() {
            return Err(Error::NotFound);
        }
        self.list()
            .await?
            .into_iter()
            .find(|sdb| sdb.name == name)
            .ok_or(Error::NotFound)
    }

    pub async fn create(&self, sdb: &SafeDepositBox) -> Result<SafeDepositBox> {
        let resp = self
            .client
            .do_request(Method::POST, SDB_BASE_PATH, &[], RequestBody::json(sdb)?)
            .await?;
        let created: SafeDepositBox =
            parse_response(resp, StatusCode::CREATED, "create safe deposit box").await?;
        debug!(id = %created.id, name = %created.name, "safe deposit box created");
        Ok(created)
    }

    /// Fields set on `sdb` overwrite the stored ones.
    pub async fn update(&self, id: &str, sdb: &SafeDepositBox) -> Result<SafeDepositBox> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound);
        }
        let resp = self
            .client
            .do_request(
                Method::PUT,
                &join_path(SDB_BASE_PATH, id)?,
                &[],
                RequestBody::json(sdb)?,
            )
            .await?;
        parse_response(resp, StatusCode::OK, "update safe deposit box").await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound);
        }
        let resp = self
            .client
            .do_request(
                Method::DELETE,
                &join_path(SDB_BASE_PATH, id)?,
                &[],
                RequestBody::Empty,
            )
            .await?;
        check_status(resp, StatusCode::NO_CONTENT, "delete safe deposit box").await?;
        debug!(id, "safe deposit box deleted");
        Ok(())
    }
}
