//! `editor` command: blog generation and the content endpoints.

use std::path::PathBuf;

use anyhow::Context;
use blogflow_core::{AppConfig, WorkflowData};
use blogflow_db::SessionLookup;
use blogflow_writer::{
    build_generation_params, image_mime_for, ApprovalRequest, BlogWriterClient,
    ContentApiClient, EditorOverrides, PublishingRequest,
};
use clap::Subcommand;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum EditorCommands {
    /// Generate a blog post from a session (or explicit options)
    Generate {
        /// Workflow session supplying topic, keywords and strategy
        #[arg(long)]
        session: Option<Uuid>,
        #[arg(long)]
        topic: Option<String>,
        /// Comma-separated keywords; replaces the session's saved keywords
        #[arg(long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,
        #[arg(long)]
        tone: Option<String>,
        /// Target length in words
        #[arg(long)]
        length: Option<u32>,
        #[arg(long)]
        audience: Option<String>,
        #[arg(long)]
        quality: Option<String>,
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// List the writer's quality levels
    QualityLevels,
    /// List the writer's generation presets
    Presets,
    /// Upload an image and print its URL
    UploadImage { path: PathBuf },
    /// Submit a queued post for approval
    Approve {
        queue_id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record a post for publishing
    Publish {
        post_id: String,
        #[arg(long)]
        platform: Option<String>,
        /// RFC 3339 timestamp
        #[arg(long)]
        scheduled_at: Option<String>,
    },
}

fn writer_client(config: &AppConfig) -> anyhow::Result<BlogWriterClient> {
    Ok(BlogWriterClient::new(
        &config.writer_api_url,
        config.writer_api_key.as_deref(),
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build blog writer client")?
    .with_retry(
        config.writer_max_retries,
        config.writer_retry_backoff_base_ms,
    ))
}

fn content_client(config: &AppConfig) -> anyhow::Result<ContentApiClient> {
    ContentApiClient::new(
        &config.app_base_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build content API client")
}

#[allow(clippy::too_many_lines)]
pub(crate) async fn run_editor(
    config: &AppConfig,
    user: Option<Uuid>,
    command: EditorCommands,
) -> anyhow::Result<()> {
    match command {
        EditorCommands::Generate {
            session,
            topic,
            keywords,
            tone,
            length,
            audience,
            quality,
            preset,
            instructions,
            json,
        } => {
            let overrides = EditorOverrides {
                topic,
                keywords,
                tone,
                length,
                target_audience: audience,
                quality_level: quality,
                preset,
                custom_instructions: instructions,
            };

            let (data, ctx_pool) = match session {
                Some(session_id) => {
                    let pool = crate::connect(config).await?;
                    let user_id = crate::acting_user(user, config)?;
                    let SessionLookup::Found { context, session } =
                        blogflow_db::resolve_session_context(&pool, user_id, session_id).await?
                    else {
                        anyhow::bail!("session {session_id} not found");
                    };
                    (session.data(), Some((context, pool)))
                }
                None => (WorkflowData::default(), None),
            };

            let params = build_generation_params(&data, &overrides)?;
            let blog = writer_client(config)?.generate_blog(&params).await?;

            if let Some((ctx, pool)) = ctx_pool {
                let patch = serde_json::json!({ "generated_blog": blog });
                blogflow_db::merge_workflow_data(&pool, &ctx, &patch).await?;
                blogflow_db::set_current_step(&pool, &ctx, crate::STEP_DRAFT_GENERATED).await?;
                tracing::info!(session_id = %ctx.session_id, "generated post stored on session");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&blog)?);
            } else {
                println!("# {}\n", blog.title);
                println!("{}", blog.content);
                if let Some(words) = blog.word_count {
                    eprintln!("\n{words} words");
                }
            }
        }
        EditorCommands::QualityLevels => {
            for level in writer_client(config)?.get_quality_levels().await? {
                match level.description {
                    Some(desc) => println!("{:<16} {}  ({desc})", level.id, level.name),
                    None => println!("{:<16} {}", level.id, level.name),
                }
            }
        }
        EditorCommands::Presets => {
            for preset in writer_client(config)?.get_presets().await? {
                println!("{:<16} {}", preset.id, preset.name);
            }
        }
        EditorCommands::UploadImage { path } => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("image path has no file name")?
                .to_string();
            let mime = image_mime_for(&file_name)
                .with_context(|| format!("unrecognised image type: {file_name}"))?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let url = content_client(config)?
                .upload_image(&file_name, bytes, mime)
                .await?;
            println!("{url}");
        }
        EditorCommands::Approve { queue_id, notes } => {
            let record = content_client(config)?
                .create_approval(&ApprovalRequest {
                    queue_id,
                    status: Some("pending".to_string()),
                    notes,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        EditorCommands::Publish {
            post_id,
            platform,
            scheduled_at,
        } => {
            if let Some(raw) = scheduled_at.as_deref() {
                chrono::DateTime::parse_from_rfc3339(raw)
                    .with_context(|| format!("--scheduled-at is not RFC 3339: {raw}"))?;
            }
            let record = content_client(config)?
                .create_publishing(&PublishingRequest {
                    post_id,
                    platform,
                    scheduled_at,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}
