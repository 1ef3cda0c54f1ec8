use reqwest::{Method, StatusCode};

use super::parse_response;
use crate::client::{Client, RequestBody};
use crate::errors::Result;
use crate::models::{MetadataResponse, SdbMetadata};

const METADATA_BASE_PATH: &str = "/v1/metadata";
const DEFAULT_LIMIT: u32 = 100;

/// Pagination for [`Metadata::list`]. A zero `limit` means the default page
/// size of 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataOpts {
    pub limit: u32,
    pub offset: u32,
}

/// Read box metadata (owners, permissions, timestamps) across all boxes.
pub struct Metadata<'a> {
    client: &'a Client,
}

impl<'a> Metadata<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch one page.
    pub async fn list(&self, opts: MetadataOpts) -> Result<MetadataResponse> {
        let limit = if opts.limit == 0 { DEFAULT_LIMIT } else { opts.limit };
        let limit = limit.to_string();
        let offset = opts.offset.to_string();
        let resp = self
            .client
            .do_request(
                Method::GET,
                METADATA_BASE_PATH,
                &[("limit", limit.as_str()), ("offset", offset.as_str())],
                RequestBody::Empty,
            )
            .await?;
        parse_response(resp, StatusCode::OK, "get metadata").await
    }

    /// Follow the pagination until the last page and return every entry.
    pub async fn list_all(&self) -> Result<Vec<SdbMetadata>> {
        let mut all = Vec::new();
        let mut opts = MetadataOpts::default();

        loop {
            let page = self.list(opts).await?;
            all.extend(page.metadata);

            match page.next_offset {
                // A server that does not move forward would loop forever.
                Some(next) if page.has_next && next > opts.offset => opts.offset = next,
                _ => break,
            }
        }

        Ok(all)
    }
}
