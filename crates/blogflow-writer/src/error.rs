use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `message` comes from the body when it has one.
    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Neither a selected topic, a search query nor an explicit topic is available.
    #[error("no topic available for blog generation")]
    MissingTopic,

    #[error("invalid upload: {0}")]
    InvalidUpload(String),
}
