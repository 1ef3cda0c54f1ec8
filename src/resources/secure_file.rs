use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{check_status, join_path, parse_response};
use crate::client::{Client, RequestBody};
use crate::errors::Result;
use crate::models::SecureFilesResponse;

const SECURE_FILE_BASE_PATH: &str = "/v1/secure-file";
const SECURE_FILE_LIST_BASE_PATH: &str = "/v1/secure-files";
const FORM_FIELD: &str = "file-content";

/// Upload, download and list files stored in boxes.
pub struct SecureFile<'a> {
    client: &'a Client,
}

impl<'a> SecureFile<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Summaries of the files under `root_path` (usually a box path).
    pub async fn list(&self, root_path: &str) -> Result<SecureFilesResponse> {
        // The listing endpoint expects a trailing slash.
        let path = format!("{}/", join_path(SECURE_FILE_LIST_BASE_PATH, root_path)?);
        let resp = self
            .client
            .do_request(Method::GET, &path, &[("list", "true")], RequestBody::Empty)
            .await?;
        parse_response(resp, StatusCode::OK, "list secure files").await
    }

    /// Stream the file at `path` into `output`. Returns the number of bytes written.
    pub async fn get<W>(&self, path: &str, output: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let resp = self
            .client
            .do_request(
                Method::GET,
                &join_path(SECURE_FILE_BASE_PATH, path)?,
                &[],
                RequestBody::Empty,
            )
            .await?;
        let resp = check_status(resp, StatusCode::OK, "download secure file").await?;

        let mut written = 0u64;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            output.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        output.flush().await?;
        debug!(path, bytes = written, "secure file downloaded");
        Ok(written)
    }

    /// Upload `input` to `path` as `filename`. The content is streamed, not
    /// buffered, and the upload is sent once without retries.
    pub async fn put<R>(&self, path: &str, filename: &str, input: R) -> Result<()>
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let part = Part::stream(Body::wrap_stream(ReaderStream::new(input)))
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(FORM_FIELD, part);

        let resp = self
            .client
            .do_request(
                Method::POST,
                &join_path(SECURE_FILE_BASE_PATH, path)?,
                &[],
                RequestBody::Multipart(form),
            )
            .await?;
        check_status(resp, StatusCode::NO_CONTENT, "upload secure file").await?;
        debug!(path, filename, "secure file uploaded");
        Ok(())
    }
}
