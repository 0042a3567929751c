//! Clients for the blog-writer service and the web app's content endpoints,
//! plus derivation of generation parameters from a workflow session.

pub mod client;
pub mod content;
pub mod editor;
pub mod error;
mod http;
mod retry;
pub mod types;

pub use client::BlogWriterClient;
pub use content::{image_mime_for, ContentApiClient};
pub use editor::{build_generation_params, EditorOverrides, MAX_GENERATION_KEYWORDS};
pub use error::WriterError;
pub use types::{
    ApprovalRequest, BlogGenerationParams, CreatedRecord, GeneratedBlog, Preset,
    PublishingRequest, QualityLevel,
};
