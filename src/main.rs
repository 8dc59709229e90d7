use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use folio::app::{router, AppState};
use folio::config::AppConfig;
use folio::db::schema;
use folio::demo_seeder;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio and blog backend")]
struct Cli {
    /// Path to a configuration file (defaults to `folio.toml` if present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create the database schema and exit.
    Migrate,
    /// Load the demo categories and articles.
    Seed {
        /// Delete all existing content first.
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let pool = schema::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    schema::migrate(&pool)
        .await
        .context("Failed to apply database schema")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            tracing::info!("Database schema is up to date");
        }
        Command::Seed { reset } => {
            if reset {
                demo_seeder::reset(&pool).await?;
            }
            let state = AppState::new(pool, &config);
            let report = demo_seeder::seed_demo_data(&state).await?;
            tracing::info!(
                "Seeded {} categories and {} articles ({} skipped)",
                report.categories_created,
                report.articles_created,
                report.skipped
            );
        }
        Command::Serve => {
            tracing::info!("Starting Folio server...");
            if config.demo_mode {
                tracing::warn!("Demo mode is enabled, built-in demo users can sign in");
            }

            let app = router(AppState::new(pool, &config));

            let listener = tokio::net::TcpListener::bind(&config.server.addr)
                .await
                .with_context(|| format!("Failed to bind {}", config.server.addr))?;
            tracing::info!("Listening on http://{}", config.server.addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down");
}
