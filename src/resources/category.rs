use reqwest::{Method, StatusCode};

use super::{join_path, parse_response};
use crate::client::{Client, RequestBody};
use crate::errors::{Error, Result};
use crate::models::Category as CategoryModel;

const CATEGORY_BASE_PATH: &str = "/v1/category";

/// Read the categories boxes are filed under.
pub struct Category<'a> {
    client: &'a Client,
}

impl<'a> Category<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<CategoryModel>> {
        let resp = self
            .client
            .do_request(Method::GET, CATEGORY_BASE_PATH, &[], RequestBody::Empty)
            .await?;
        parse_response(resp, StatusCode::OK, "list categories").await
    }

    pub async fn get(&self, id: &str) -> Result<CategoryModel> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::NotFound);
        }
        let resp = self
            .client
            .do_request(
                Method::GET,
                &join_path(CATEGORY_BASE_PATH, id)?,
                &[],
                RequestBody::Empty,
            )
            .await?;
        parse_response(resp, StatusCode::OK, "get category").await
    }
}
