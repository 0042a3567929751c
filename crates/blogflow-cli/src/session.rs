//! `session` command: create and inspect workflow sessions.

use blogflow_core::AppConfig;
use blogflow_db::SessionLookup;
use clap::Subcommand;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Start a new workflow session for the acting user
    Create,
    /// Show a session's progress and saved collection
    Show {
        id: Uuid,
        /// Print the stored workflow data as JSON
        #[arg(long)]
        json: bool,
    },
}

pub(crate) async fn run_session(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    user: Option<Uuid>,
    command: SessionCommands,
) -> anyhow::Result<()> {
    let user_id = crate::acting_user(user, config)?;
    match command {
        SessionCommands::Create => {
            let session = blogflow_db::create_workflow_session(pool, user_id).await?;
            println!("{}", session.id);
        }
        SessionCommands::Show { id, json } => {
            let SessionLookup::Found { context, session } =
                blogflow_db::resolve_session_context(pool, user_id, id).await?
            else {
                anyhow::bail!("session {id} not found; run `blogflow session create` to start one");
            };
            let data = session.data();

            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            let org = blogflow_db::get_organization(pool, context.org_id).await?;
            println!("session   {}", session.id);
            println!("org       {}", org.name);
            println!("step      {}", session.current_step.unwrap_or(1));
            println!(
                "updated   {}",
                session.updated_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!(
                "query     {}",
                data.search_query.as_deref().unwrap_or("\u{2014}")
            );
            println!("keywords  {}", data.saved_keywords.len());
            if !data.selected_topics.is_empty() {
                println!("topics    {}", data.selected_topics.join(", "));
            }

            match blogflow_db::get_keyword_collection(pool, session.id).await? {
                Some(collection) => println!(
                    "collection '{}' ({} keywords{})",
                    collection.name,
                    collection.keyword_metrics().len(),
                    collection
                        .niche
                        .as_deref()
                        .map(|n| format!(", niche {n}"))
                        .unwrap_or_default()
                ),
                None => println!("collection \u{2014}"),
            }
        }
    }
    Ok(())
}
