//! `research` command: run keyword research, display a page of results and
//! optionally save them to a workflow session.

use std::path::Path;

use anyhow::Context;
use blogflow_core::{AppConfig, Difficulty, ResearchProfile, SessionContext, WorkflowData};
use blogflow_db::{NewKeywordCollection, SessionLookup, UpsertOutcome};
use blogflow_keywords::{
    apply_query, format_competition, format_cpc, format_volume, KeywordQuery, SortDirection,
    SortField,
};
use blogflow_research::{run_keyword_research, KeywordApiClient, ResearchOutcome};
use clap::Args;
use uuid::Uuid;

/// Clusters shown in the text report.
const MAX_CLUSTERS_SHOWN: usize = 10;

#[derive(Debug, Args)]
pub struct ResearchArgs {
    /// Seed keywords; separate several seeds with commas
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
    /// Workflow session to save into (a new one is created if it is missing)
    #[arg(long)]
    pub session: Option<Uuid>,
    /// Skip the streaming endpoint and use the plain request
    #[arg(long)]
    pub no_stream: bool,
    /// Save the results as a keyword collection with this name
    #[arg(long)]
    pub save: Option<String>,
    /// Niche label stored with a saved collection
    #[arg(long)]
    pub niche: Option<String>,
    /// Only show keywords containing this text
    #[arg(long)]
    pub filter: Option<String>,
    /// Only show keywords of this difficulty (easy, medium, hard)
    #[arg(long, value_parser = parse_difficulty)]
    pub difficulty: Option<Difficulty>,
    /// Only show keywords with at least this search volume
    #[arg(long)]
    pub min_volume: Option<u64>,
    /// Sort field: keyword, volume, competition, cpc, difficulty, score
    #[arg(long, default_value = "volume")]
    pub sort: SortField,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long, default_value_t = blogflow_keywords::view::DEFAULT_PER_PAGE)]
    pub per_page: usize,
    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    Difficulty::from_label(raw).ok_or_else(|| format!("unknown difficulty '{raw}'"))
}

/// Join the positional words and split on commas: `pet grooming, dog wash`
/// gives two seeds.
pub(crate) fn seeds_from_args(words: &[String]) -> Vec<String> {
    words
        .join(" ")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ResearchArgs {
    fn keyword_query(&self) -> KeywordQuery {
        KeywordQuery {
            text: self.filter.clone(),
            difficulty: self.difficulty,
            min_volume: self.min_volume,
            sort: self.sort,
            direction: if self.asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            },
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Profile from `research_profile_path`, or the built-in defaults when the
/// file does not exist.
fn load_profile(config: &AppConfig) -> anyhow::Result<ResearchProfile> {
    let path: &Path = &config.research_profile_path;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no research profile file; using defaults");
        return Ok(ResearchProfile::default());
    }
    blogflow_core::load_research_profile(path)
        .with_context(|| format!("failed to load research profile {}", path.display()))
}

/// # Errors
///
/// Returns an error if the client cannot be built, the analysis request
/// fails, the run is interrupted, or saving fails.
pub(crate) async fn run_research(
    pool: Option<&sqlx::PgPool>,
    config: &AppConfig,
    user: Option<Uuid>,
    args: &ResearchArgs,
) -> anyhow::Result<()> {
    let mut profile = load_profile(config)?;
    if args.no_stream {
        profile.capabilities.streaming = false;
    }

    let client = KeywordApiClient::new(
        &config.app_base_url,
        config.request_timeout_secs,
        config.stream_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build keyword API client")?;

    let seeds = seeds_from_args(&args.query);
    let show_progress = !args.json;
    let research = run_keyword_research(&client, &profile, &seeds, |event| {
        if show_progress {
            if let Some(progress) = event.progress {
                let stage = event.stage.as_deref().unwrap_or("working");
                eprintln!("[{progress:>3.0}%] {stage}");
            }
        }
    });

    // Dropping the research future on Ctrl-C closes the stream.
    let outcome = tokio::select! {
        result = research => result?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted"),
    };

    if let Some(name) = args.save.as_deref() {
        let pool = pool.context("database pool required to save a collection")?;
        let user_id = crate::acting_user(user, config)?;
        let ctx = save_collection(pool, user_id, args.session, name, args.niche.as_deref(), &outcome)
            .await?;
        if !args.json {
            println!("saved collection '{name}' to session {}", ctx.session_id);
        }
    }

    if args.json {
        print_json(&outcome, &args.keyword_query())?;
    } else {
        print_report(&outcome, &args.keyword_query());
    }
    Ok(())
}

/// Resolve (or create) the session, upsert its collection and record the
/// search on the workflow blob.
async fn save_collection(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    session_id: Option<Uuid>,
    name: &str,
    niche: Option<&str>,
    outcome: &ResearchOutcome,
) -> anyhow::Result<SessionContext> {
    let lookup = match session_id {
        Some(id) => blogflow_db::resolve_session_context(pool, user_id, id).await?,
        None => SessionLookup::NotFound,
    };
    let ctx = match lookup {
        SessionLookup::Found { context, .. } => context,
        SessionLookup::NotFound => {
            if let Some(id) = session_id {
                tracing::warn!(session_id = %id, "session not found; starting a new one");
            }
            blogflow_db::create_workflow_session(pool, user_id)
                .await?
                .context()
        }
    };

    let collection = NewKeywordCollection {
        name: name.to_string(),
        keywords: outcome.keywords.clone(),
        search_query: Some(outcome.query.clone()),
        niche: niche.map(str::to_string),
    };
    let saved = blogflow_db::upsert_keyword_collection(pool, &ctx, &collection).await?;
    if saved == UpsertOutcome::Updated {
        tracing::info!(session_id = %ctx.session_id, "replaced existing collection");
    }

    let patch = WorkflowData {
        search_query: Some(outcome.query.clone()),
        saved_keywords: outcome.keywords.clone(),
        ..WorkflowData::default()
    };
    blogflow_db::merge_workflow_data(pool, &ctx, &serde_json::to_value(&patch)?).await?;
    blogflow_db::set_current_step(pool, &ctx, crate::STEP_KEYWORDS_SAVED).await?;
    Ok(ctx)
}

fn print_json(outcome: &ResearchOutcome, query: &KeywordQuery) -> anyhow::Result<()> {
    let page = apply_query(&outcome.keywords, query);
    let body = serde_json::json!({
        "query": outcome.query,
        "source": outcome.source,
        "follow_up": outcome.follow_up,
        "summary": outcome.summary,
        "clusters": outcome.clusters,
        "page": page,
        "saved_search_id": outcome.saved_search_id,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_report(outcome: &ResearchOutcome, query: &KeywordQuery) {
    let summary = &outcome.summary;
    println!("Keyword research: {}", outcome.query);
    println!(
        "  total volume {}  |  avg difficulty {}  |  avg competition {}  |  avg CPC {}  |  traffic potential {:.0}",
        format_volume(Some(summary.total_search_volume)),
        summary.avg_difficulty,
        format_competition(summary.avg_competition),
        format_cpc(Some(summary.avg_cpc)),
        summary.traffic_potential,
    );
    if let Some(global) = summary.total_global_volume {
        println!("  global volume {}", format_volume(Some(global)));
    }

    println!();
    println!(
        "{:<32} {:>8} {:>10} {:>12} {:>7}",
        "CLUSTER", "KEYWORDS", "VOLUME", "COMPETITION", "SCORE"
    );
    for cluster in outcome.clusters.iter().take(MAX_CLUSTERS_SHOWN) {
        println!(
            "{:<32} {:>8} {:>10} {:>12} {:>7.1}",
            cluster.parent_topic,
            cluster.keyword_count,
            format_volume(Some(cluster.total_volume)),
            format_competition(cluster.avg_competition),
            cluster.cluster_score,
        );
    }

    let page = apply_query(&outcome.keywords, query);
    println!();
    println!(
        "{:<40} {:>10} {:>10} {:>12} {:>8}",
        "KEYWORD", "VOLUME", "DIFFICULTY", "COMPETITION", "CPC"
    );
    for keyword in &page.items {
        println!(
            "{:<40} {:>10} {:>10} {:>12} {:>8}",
            keyword.keyword,
            format_volume(keyword.search_volume),
            keyword.difficulty.to_string(),
            format_competition(keyword.competition),
            format_cpc(keyword.cpc),
        );
    }
    println!(
        "page {} of {} ({} keywords)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}
