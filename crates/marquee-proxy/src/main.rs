use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use marquee_api::TmdbClient;
use marquee_core::config::{AppConfig, API_KEY_ENV};
use marquee_proxy::AppState;

#[derive(Debug, Parser)]
#[command(name = "marquee-proxy", version, about = "TMDB proxy for marquee")]
struct Args {
    /// Address to listen on, overriding the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Config file to read instead of the user config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_proxy=info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => AppConfig::from_path(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let api_key = std::env::var(API_KEY_ENV).ok();
    if api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("{API_KEY_ENV} is not set; every request will fail");
    }

    let upstream = TmdbClient::new(
        api_key,
        config.proxy.upstream_url.as_str(),
        config.proxy.language.as_str(),
    );
    let app = marquee_proxy::router(AppState::new(upstream));

    let bind = args.bind.unwrap_or(config.proxy.bind);
    info!("Binding to {bind}");
    let listener = match TcpListener::bind(&bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {bind}: {e}");
            return ExitCode::FAILURE;
        }
    };

    match marquee_proxy::serve(listener, app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
