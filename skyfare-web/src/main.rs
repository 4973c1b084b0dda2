//! skyfare-web - Flight fare prediction web UI
//!
//! Resolves the fare model at startup, then serves the prediction form and
//! its JSON API. A missing or unreadable model aborts startup with the full
//! list of files and formats that were tried.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use skyfare_core::config;
use skyfare_core::FareService;
use skyfare_web::{build_router, AppState};
use tracing::{error, info, warn};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "skyfare-web", version, about = "Flight fare prediction web UI")]
struct Args {
    /// Directory containing the model artifact
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "SKYFARE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5730
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so its log level can seed the filter
    let toml = config::load_or_default(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml.logging.level)),
        )
        .init();

    info!(
        "Starting SkyFare Predictor (skyfare-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolver_config = config::resolver_config(args.model_dir.as_deref(), &toml)?;
    let bind_addr = config::resolve_bind_addr(args.bind.as_deref(), &toml)?;
    info!("Model directory: {}", resolver_config.model_dir.display());

    let service = Arc::new(FareService::new(&resolver_config));

    // Resolve eagerly; nothing can be served without a pipeline
    let loader = Arc::clone(&service);
    let resolved = tokio::task::spawn_blocking(move || {
        loader.resolve_pipeline()?;
        loader.get_vocabulary().cloned()
    })
    .await?;

    match resolved {
        Ok(vocabulary) => {
            if let Some(reason) = vocabulary.fallback_reason() {
                warn!("Vocabulary {} from defaults: {}", vocabulary.kind(), reason);
            }
        }
        Err(e) => {
            error!("{}", e);
            return Err(anyhow::anyhow!("Cannot start without a model: {}", e));
        }
    }

    let app = build_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("skyfare-web listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("skyfare-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
