use thiserror::Error;

/// Errors returned by the keyword-analysis client and research pipeline.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("keyword API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stream delivered an `error` frame.
    #[error("keyword analysis failed: {0}")]
    Stream(String),

    /// No usable seed keyword was supplied.
    #[error("search query is empty")]
    EmptyQuery,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
