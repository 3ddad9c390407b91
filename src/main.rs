use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_history::api::{build_router, state::AppState};
use match_history::assets;
use match_history::calculate::RankLookup;
use match_history::config::AppConfig;
use match_history::fetch::{MatchSource, ProxyClient};
use match_history::models::{
    format_game_duration, format_time_ago, MatchResult, PlayerSummaryStats,
};
use match_history::session::{LoadMoreOutcome, LoadMoreRejection, SearchSession};

#[derive(Parser)]
#[command(name = "match-history")]
#[command(about = "Match history, summaries and ranked standing from the game-data proxy")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a player's recent matches, summary and rank
    Search {
        /// Riot ID, e.g. "God of Wind#NA1"
        riot_id: String,

        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Print immediately instead of waiting for failed-match retries
        #[arg(long)]
        no_wait: bool,
    },

    /// Summary statistics over a player's recent matches
    Stats {
        /// Riot ID, e.g. "God of Wind#NA1"
        riot_id: String,

        /// Number of recent matches to summarize
        #[arg(long)]
        num_matches: Option<u32>,

        /// Ask the proxy for its summary instead of computing it locally
        #[arg(long)]
        server: bool,
    },

    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting match-history v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Search {
            riot_id,
            pages,
            no_wait,
        } => {
            let session = build_session(&config)?;
            session.search(&riot_id).await?;
            load_pages(&session, pages).await;

            if !no_wait && !session.snapshot().await.failed_matches.is_empty() {
                println!("Retrying failed matches...");
                session.settle_retries().await;
            }

            print_matches(&session).await;
            print_summary(&session.summary(None).await);
            print_rank(&session.rank().await);
        }
        Commands::Stats {
            riot_id,
            num_matches,
            server,
        } => {
            let session = build_session(&config)?;
            let num_matches = num_matches.unwrap_or(config.session.stats_window as u32);
            session.search(&riot_id).await?;

            let summary = if server {
                session.server_summary(num_matches).await?
            } else {
                let pages = num_matches.div_ceil(config.session.page_size);
                load_pages(&session, pages).await;
                session.settle_retries().await;
                session.summary(Some(num_matches as usize)).await
            };
            print_summary(&summary);
        }
        Commands::Serve { host, port } => {
            let session = Arc::new(build_session(&config)?);
            let state = AppState {
                session,
                assets: assets::global(),
            };
            let app = build_router(state, &config.server.cors_origin);
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn build_session(config: &AppConfig) -> Result<SearchSession> {
    let client = ProxyClient::new(config.proxy.to_client_config())?;
    tracing::debug!("Using proxy at {}", client.base_url());
    let source: Arc<dyn MatchSource> = Arc::new(client);
    Ok(SearchSession::new(source, config.session.to_session_config()))
}

/// Load up to `pages` pages in total, waiting out debounce and cooldowns.
async fn load_pages(session: &SearchSession, pages: u32) {
    let mut loaded = 1;
    while loaded < pages {
        match session.load_more().await {
            Ok(LoadMoreOutcome::Loaded(_)) => loaded += 1,
            Ok(LoadMoreOutcome::Rejected(LoadMoreRejection::Debounced { remaining_ms })) => {
                tokio::time::sleep(Duration::from_millis(remaining_ms)).await;
            }
            Ok(LoadMoreOutcome::Rejected(LoadMoreRejection::CoolingDown { remaining_secs })) => {
                println!("Rate limited, waiting {}s...", remaining_secs);
                tokio::time::sleep(Duration::from_secs(remaining_secs)).await;
            }
            Ok(LoadMoreOutcome::Rejected(reason)) => {
                tracing::debug!("Stopped loading: {}", reason);
                break;
            }
            Err(e) => {
                tracing::error!("Failed to load more matches: {}", e);
                break;
            }
        }
    }
}

async fn print_matches(session: &SearchSession) {
    let snapshot = session.snapshot().await;
    let matches = session.matches().await;
    let views = session.match_views().await;
    let now = Utc::now();

    if let Some(riot_id) = &snapshot.riot_id {
        println!("\n=== {} ===", riot_id);
    }
    for (view, m) in views
        .iter()
        .filter_map(|v| matches.iter().find(|m| m.match_id() == v.match_id).map(|m| (v, m)))
    {
        let result = match view.result {
            MatchResult::Win => "WIN",
            MatchResult::Loss => "LOSS",
            MatchResult::Unknown => "-",
        };
        println!(
            "{:<5} {:<14} {:>2}/{:>2}/{:>2}  KDA {:<5}  KP {:>3}%  CS {:>3}  {:<16} {:>5}  {}",
            result,
            view.champion,
            view.kills,
            view.deaths,
            view.assists,
            view.kda_label(),
            view.kill_participation_percent,
            view.cs,
            view.queue_name,
            format_game_duration(m.info.game_duration),
            format_time_ago(m.info.game_creation, now),
        );
    }

    println!(
        "\nLoaded {} matches (more available: {})",
        snapshot.matches_loaded, snapshot.has_more
    );
    if !snapshot.recovered_matches.is_empty() {
        println!("Recovered on retry: {}", snapshot.recovered_matches.join(", "));
    }
    if !snapshot.failed_matches.is_empty() {
        println!("Still retrying:     {}", snapshot.failed_matches.join(", "));
    }
    if !snapshot.unresolved_matches.is_empty() {
        println!("Could not load:     {}", snapshot.unresolved_matches.join(", "));
    }
}

fn print_summary(stats: &PlayerSummaryStats) {
    println!("\n=== Summary ({} matches) ===", stats.matches_analyzed);
    if stats.is_empty() {
        println!("No matches to summarize");
        return;
    }
    println!(
        "Record:   {}W {}L ({:.0}%)",
        stats.wins,
        stats.losses,
        stats.win_rate * 100.0
    );
    println!(
        "Average:  {:.1}/{:.1}/{:.1}  KDA {:.2}",
        stats.avg_kills,
        stats.avg_deaths,
        stats.avg_assists,
        stats.avg_kda()
    );
    for champion in stats.top_champions(5) {
        println!(
            "  {:<14} {:>2} games  {:>3.0}% WR  KDA {:.2}",
            champion.name,
            champion.games,
            champion.win_rate * 100.0,
            champion.kda()
        );
    }
}

fn print_rank(lookup: &RankLookup) {
    match lookup {
        RankLookup::Found {
            entry,
            display_name,
            win_rate,
        } => println!(
            "\nRanked Solo/Duo: {} {} LP  ({}W {}L, {:.0}%)",
            display_name,
            entry.league_points,
            entry.wins,
            entry.losses,
            win_rate * 100.0
        ),
        RankLookup::NoRank { .. } => println!("\nRanked Solo/Duo: Unranked"),
        RankLookup::IdentityMissing => println!("\nRanked Solo/Duo: unavailable"),
    }
}
