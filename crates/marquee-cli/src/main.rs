mod browse;
mod commands;
mod error;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use marquee_api::ProxyClient;
use marquee_core::config::AppConfig;
use marquee_core::models::MovieId;

use commands::{ConfigCommand, FavoritesCommand};
use error::CliError;

const DEFAULT_LOG_FILTER: &str = "marquee_cli=info,marquee_runtime=debug,marquee_api=debug,marquee_core=info";

#[derive(Debug, Parser)]
#[command(name = "marquee", version, about = "Search movies and keep a list of favorites")]
struct Cli {
    /// Base URL of the proxy routes, overriding the config file.
    #[arg(long, global = true)]
    proxy_url: Option<String>,

    /// Config file to read instead of the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search movies by title.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show details for one movie.
    Details { id: MovieId },
    /// Search interactively with debounced input.
    Browse,
    /// Manage favorites.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Inspect or create the config file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log to a daily file in the data directory so stdout stays clean.
fn init_logging() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("marquee")
        .filename_suffix("log")
        .build(AppConfig::log_dir());

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_writer(writer)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(EnvFilter::new("warn"))
                .init();
            error!("File logging unavailable: {e}");
            None
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        Command::Config(command) => return commands::config(command, cli.config.as_deref()),
        command => command,
    };

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::load()?,
    };
    let proxy_url = cli.proxy_url.unwrap_or(config.client.proxy_url);
    let client = ProxyClient::new(&proxy_url)?;
    let favorites = commands::open_favorites()?;
    info!(proxy = %client.base_url(), count = favorites.len(), "Session started");

    match command {
        Command::Search { query } => commands::search(client, favorites, &query.join(" ")).await,
        Command::Details { id } => commands::details(client, favorites, id).await,
        Command::Browse => browse::run(client, favorites).await,
        Command::Favorites(command) => commands::favorites(client, favorites, command).await,
        Command::Config(command) => commands::config(command, cli.config.as_deref()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_favorites_rate() {
        let cli = Cli::try_parse_from(["marquee", "favorites", "rate", "27205", "4"]).unwrap();
        match cli.command {
            Command::Favorites(FavoritesCommand::Rate { id, rating }) => {
                assert_eq!(id, 27205);
                assert_eq!(rating, Some(4));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["marquee", "favorites", "rate", "27205"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Favorites(FavoritesCommand::Rate { rating: None, .. })
        ));
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["marquee", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Init { force: true })
        ));

        let cli = Cli::try_parse_from(["marquee", "--config", "/tmp/m.toml", "config", "path"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/m.toml")));
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Path)));
    }

    #[test]
    fn test_global_proxy_url() {
        let cli = Cli::try_parse_from([
            "marquee",
            "search",
            "the",
            "matrix",
            "--proxy-url",
            "http://localhost:9000/api/tmdb",
        ])
        .unwrap();
        assert_eq!(cli.proxy_url.as_deref(), Some("http://localhost:9000/api/tmdb"));
        assert!(matches!(cli.command, Command::Search { ref query } if query == &["the", "matrix"]));
    }
}
