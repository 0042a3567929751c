mod admin;
mod editor;
mod research;
mod session;

use anyhow::Context;
use blogflow_core::AppConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::admin::AdminCommands;
use crate::editor::EditorCommands;
use crate::research::ResearchArgs;
use crate::session::SessionCommands;

#[derive(Debug, Parser)]
#[command(name = "blogflow")]
#[command(about = "Blog content workflow: keyword research, sessions and drafting")]
struct Cli {
    /// Acting user id (defaults to BLOGFLOW_USER_ID)
    #[arg(long, global = true)]
    user: Option<Uuid>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Research keywords for one or more seed terms
    Research(ResearchArgs),
    /// Create or inspect workflow sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Blog writer: generate drafts, list options, upload and publish
    Editor {
        #[command(subcommand)]
        command: EditorCommands,
    },
    /// Platform-wide statistics (admin role required)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
}

/// Workflow step recorded once keywords are saved to a session.
pub(crate) const STEP_KEYWORDS_SAVED: i32 = 2;
/// Workflow step recorded once a draft is generated for a session.
pub(crate) const STEP_DRAFT_GENERATED: i32 = 3;

/// Acting user: `--user` first, then `BLOGFLOW_USER_ID`.
pub(crate) fn acting_user(flag: Option<Uuid>, config: &AppConfig) -> anyhow::Result<Uuid> {
    if let Some(id) = flag {
        return Ok(id);
    }
    let raw = config
        .user_id
        .as_deref()
        .context("no acting user; pass --user or set BLOGFLOW_USER_ID")?;
    Uuid::parse_str(raw).with_context(|| format!("BLOGFLOW_USER_ID is not a UUID: {raw}"))
}

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = blogflow_db::PoolConfig::from_app_config(config);
    let database_url = config.require_database_url()?;
    blogflow_db::connect_pool(database_url, pool_config)
        .await
        .context("failed to connect to database")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse first so `--help` and usage errors never depend on the environment.
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("blogflow: run with --help to list commands");
        return Ok(());
    };

    let config = blogflow_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Research(args) => {
            // The database is only needed when the run is saved.
            let pool = if args.save.is_some() {
                Some(connect(&config).await?)
            } else {
                None
            };
            research::run_research(pool.as_ref(), &config, cli.user, &args).await?;
        }
        Commands::Session { command } => {
            let pool = connect(&config).await?;
            session::run_session(&pool, &config, cli.user, command).await?;
        }
        Commands::Editor { command } => {
            editor::run_editor(&config, cli.user, command).await?;
        }
        Commands::Admin { command } => {
            let pool = connect(&config).await?;
            admin::run_admin(&pool, &config, cli.user, command).await?;
        }
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            let pool = connect(&config).await?;
            blogflow_db::ping(&pool).await?;
            println!("database ok");
        }
    }

    Ok(())
}
