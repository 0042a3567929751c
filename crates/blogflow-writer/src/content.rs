//! Client for the web app's content endpoints: image upload, approval
//! queue and publishing records.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

use crate::error::WriterError;
use crate::http::{build_client, join, parse_base_url, read_json};
use crate::types::{ApprovalRequest, CreatedRecord, PublishingRequest, UploadResponse};

const SERVICE: &str = "content";

pub struct ContentApiClient {
    client: Client,
    base_url: Url,
}

impl ContentApiClient {
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the `reqwest::Client` cannot be built
    /// or [`WriterError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, WriterError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Upload an image as multipart field `file`; returns its public URL.
    ///
    /// # Errors
    ///
    /// - [`WriterError::InvalidUpload`] for an empty body or a non-image MIME type.
    /// - [`WriterError::Api`] on a non-2xx status.
    /// - [`WriterError::Http`] / [`WriterError::Deserialize`] as usual.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String, WriterError> {
        if bytes.is_empty() {
            return Err(WriterError::InvalidUpload("file is empty".to_string()));
        }
        if !mime.starts_with("image/") {
            return Err(WriterError::InvalidUpload(format!(
                "unsupported content type '{mime}'"
            )));
        }

        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let url = join(&self.base_url, "api/images/upload")?;
        let response = self.client.post(url).multipart(form).send().await?;
        let uploaded: UploadResponse = read_json(response, SERVICE, "images/upload").await?;
        tracing::info!(file_name, size, url = %uploaded.url, "image uploaded");
        Ok(uploaded.url)
    }

    /// # Errors
    ///
    /// [`WriterError::Api`] on a non-2xx status, plus transport errors.
    pub async fn create_approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<CreatedRecord, WriterError> {
        let url = join(&self.base_url, "api/blog-approvals")?;
        tracing::debug!(queue_id = %request.queue_id, "creating blog approval");
        let response = self.client.post(url).json(request).send().await?;
        read_json(response, SERVICE, "blog-approvals").await
    }

    /// # Errors
    ///
    /// [`WriterError::Api`] on a non-2xx status, plus transport errors.
    pub async fn create_publishing(
        &self,
        request: &PublishingRequest,
    ) -> Result<CreatedRecord, WriterError> {
        let url = join(&self.base_url, "api/blog-publishing")?;
        tracing::debug!(post_id = %request.post_id, "creating publishing record");
        let response = self.client.post(url).json(request).send().await?;
        read_json(response, SERVICE, "blog-publishing").await
    }
}

/// Guess an image MIME type from a file extension.
#[must_use]
pub fn image_mime_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
