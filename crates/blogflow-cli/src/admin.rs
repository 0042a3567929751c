//! `admin` command: platform-wide counters.

use blogflow_core::AppConfig;
use clap::Subcommand;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Show user, organization, session and collection counts
    Stats {
        #[arg(long)]
        json: bool,
    },
}

pub(crate) async fn run_admin(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    user: Option<Uuid>,
    command: AdminCommands,
) -> anyhow::Result<()> {
    let user_id = crate::acting_user(user, config)?;
    let acting = blogflow_db::get_user(pool, user_id).await?;
    if !acting.is_admin() {
        anyhow::bail!("user {} is not an admin", acting.email);
    }

    match command {
        AdminCommands::Stats { json } => {
            let stats = blogflow_db::admin_stats(pool).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            println!("users                 {}", stats.total_users);
            println!("organizations         {}", stats.total_organizations);
            println!("workflow sessions     {}", stats.total_sessions);
            println!("  created last 7 days {}", stats.sessions_last_7_days);
            println!("keyword collections   {}", stats.total_collections);
            println!("saved keywords        {}", stats.total_saved_keywords);
        }
    }
    Ok(())
}
