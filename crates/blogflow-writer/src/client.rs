//! HTTP client for the blog-writer service.

use reqwest::{Client, RequestBuilder, Url};

use crate::error::WriterError;
use crate::http::{build_client, join, parse_base_url, read_json};
use crate::retry::retry_with_backoff;
use crate::types::{BlogGenerationParams, GeneratedBlog, ListEnvelope, Preset, QualityLevel};

const SERVICE: &str = "blog writer";

/// Client for `/api/v1/blog/generate` and the catalogue endpoints.
///
/// The catalogue GETs are retried on transient errors; generation is not.
pub struct BlogWriterClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl BlogWriterClient {
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the `reqwest::Client` cannot be built
    /// or [`WriterError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, WriterError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.map(str::to_owned),
            max_retries: 3,
            backoff_base_ms: 1_000,
        })
    }

    /// Override the retry policy for the catalogue endpoints.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Generate a post. Never retried.
    ///
    /// # Errors
    ///
    /// - [`WriterError::Http`] on network failure or timeout.
    /// - [`WriterError::Api`] on a non-2xx status.
    /// - [`WriterError::Deserialize`] if the body is not a generated post.
    pub async fn generate_blog(
        &self,
        params: &BlogGenerationParams,
    ) -> Result<GeneratedBlog, WriterError> {
        let url = join(&self.base_url, "api/v1/blog/generate")?;
        tracing::info!(topic = %params.topic, keywords = params.keywords.len(), "generating blog post");
        let response = self.authorized(self.client.post(url)).json(params).send().await?;
        read_json(response, SERVICE, "blog/generate").await
    }

    /// # Errors
    ///
    /// Same as [`BlogWriterClient::generate_blog`], after retries are exhausted.
    pub async fn get_quality_levels(&self) -> Result<Vec<QualityLevel>, WriterError> {
        self.get_list("api/v1/quality-levels", "quality_levels").await
    }

    /// # Errors
    ///
    /// Same as [`BlogWriterClient::generate_blog`], after retries are exhausted.
    pub async fn get_presets(&self) -> Result<Vec<Preset>, WriterError> {
        self.get_list("api/v1/presets", "presets").await
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<Vec<T>, WriterError> {
        let url = join(&self.base_url, path)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.authorized(self.client.get(url)).send().await?;
                let envelope: ListEnvelope<T> = read_json(response, SERVICE, path).await?;
                envelope
                    .into_items(key)
                    .map_err(|e| WriterError::Deserialize {
                        context: path.to_string(),
                        source: e,
                    })
            }
        })
        .await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}
