use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use puzzle_scoreboard::api::auth::AdminAuth;
use puzzle_scoreboard::api::state::AppState;
use puzzle_scoreboard::config::AppConfig;
use puzzle_scoreboard::models::{Game, GameScore, ScoringType};
use puzzle_scoreboard::storage::{StorageConfig, Store};

#[derive(Parser)]
#[command(name = "puzzle-scoreboard")]
#[command(about = "Leaderboard and analytics server for daily puzzle games")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
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
    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Seed the data directory with sample games and scores
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting puzzle-scoreboard v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let tz = config.reference_timezone()?;
            if config.admin.password.is_empty() {
                tracing::warn!("No admin password configured; admin endpoints are disabled");
            }

            let state = AppState {
                store: Arc::new(Store::new(StorageConfig::new(config.data_dir.clone()))),
                tz,
                auth: Arc::new(AdminAuth::new(
                    &config.admin.password,
                    config.admin.session_ttl_hours,
                )),
            };

            let app =
                puzzle_scoreboard::api::build_router(state).layer(cors_layer(&config)?);

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            tracing::info!("Listening on http://{} (reference timezone {})", addr, tz);
            axum::serve(listener, app).await?;
        }
        Commands::Seed => {
            let store = Store::new(StorageConfig::new(config.data_dir.clone()));
            seed(&store).await?;
        }
    }

    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
fn load_config(path: &str) -> Result<AppConfig> {
    let path = PathBuf::from(path);
    if path.exists() {
        let config = AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    } else {
        Ok(AppConfig::default())
    }
}

fn cors_layer(config: &AppConfig) -> Result<tower_http::cors::CorsLayer> {
    use tower_http::cors::{Any, CorsLayer};

    let layer = if config.server.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = config
            .server
            .cors_origin
            .parse::<axum::http::HeaderValue>()
            .with_context(|| format!("Invalid CORS origin: {}", config.server.cors_origin))?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };
    Ok(layer)
}

/// Write a small demo data set: three games and a week of scores.
/// Refuses to touch a data directory that already holds games.
async fn seed(store: &Store) -> Result<()> {
    if !store.games()?.is_empty() {
        println!("Data directory already contains games; nothing seeded");
        return Ok(());
    }

    let games = [
        ("Queens", "Place the queens without conflicts", ScoringType::Time),
        ("Pinpoint", "Guess the category", ScoringType::Guesses),
        ("Crossclimb", "Climb the word ladder", ScoringType::Time),
    ];
    let players = ["Alice", "Bob", "Carol", "Dave"];

    let mut game_count = 0;
    let mut score_count = 0;
    for (name, description, scoring_type) in games {
        let game = Game::new(name.to_string(), description.to_string(), scoring_type);
        store.insert_game(game.clone()).await?;
        game_count += 1;

        for day in 0..7i64 {
            for (i, player) in players.iter().enumerate() {
                // Deterministic-ish spread so the dashboards have shape.
                let wobble = ((day * 7 + i as i64 * 13) % 20) as f64;
                let (guesses, seconds) = match scoring_type {
                    ScoringType::Time => (None, Some(25.0 + wobble + i as f64 * 3.0)),
                    ScoringType::Guesses => (Some(1 + ((day + i as i64) % 5) as u32), None),
                };

                let mut score = GameScore::new(
                    game.id,
                    player.to_string(),
                    guesses,
                    seconds,
                    None,
                    None,
                );
                score.date_achieved = Utc::now() - Duration::days(day) - Duration::hours(i as i64);
                store.insert_score(score).await?;
                score_count += 1;
            }
        }
    }

    println!("Seeded {} games and {} scores", game_count, score_count);
    Ok(())
}
