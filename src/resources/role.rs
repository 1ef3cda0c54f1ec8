use reqwest::{Method, StatusCode};

use super::{join_path, parse_response};
use crate::client::{Client, RequestBody};
use crate::errors::{Error, Result};
use crate::models::Role as RoleModel;

const ROLE_BASE_PATH: &str = "/v1/role";

/// Read the permission roles that can be granted on a box.
pub struct Role<'a> {
    client: &'a Client,
}

impl<'a> Role<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<RoleModel>> {
        let resp = self
            .client
            .do_request(Method::GET, ROLE_BASE_PATH, &[], RequestBody::Empty)
            .await?;
        parse_response(resp, StatusCode::OK, "list roles").await
    }

    pub async fn get(&self, id: &str) -> Result<RoleModel> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound);
        }
        let resp = self
            .client
            .do_request(
                Method::GET,
                &join_path(ROLE_BASE_PATH, id)?,
                &[],
                RequestBody::Empty,
            )
            .await?;
        parse_response(resp, StatusCode::OK, "get role").await
    }
}
