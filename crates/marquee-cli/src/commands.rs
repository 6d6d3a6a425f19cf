//! One-shot subcommands.

use std::path::Path;

use clap::Subcommand;
use tracing::info;

use marquee_api::{MovieSource, ProxyClient};
use marquee_core::config::AppConfig;
use marquee_core::favorites::FavoritesStore;
use marquee_core::models::{MovieId, MovieSummary, Rating};
use marquee_core::storage::Storage;
use marquee_runtime::details::{DETAILS_FAILED, DETAILS_NETWORK_ERROR};
use marquee_runtime::Session;

use crate::error::CliError;
use crate::render;

pub type Favorites = FavoritesStore<Storage>;

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites, most recently changed first.
    List,
    /// Fetch a movie and add it to favorites.
    Add { id: MovieId },
    Remove { id: MovieId },
    /// Set a 1-5 rating, or clear it when omitted.
    Rate { id: MovieId, rating: Option<u8> },
    /// Replace the note on a favorite.
    Note { id: MovieId, text: Vec<String> },
    /// Remove every favorite.
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location.
    Path,
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// `target` is the `--config` override; `None` means the user config file.
pub fn config(command: ConfigCommand, target: Option<&Path>) -> Result<(), CliError> {
    let path = target.map_or_else(AppConfig::config_path, Path::to_path_buf);
    match command {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Init { force } => {
            init_config(&AppConfig::default(), target, force)?;
            info!(path = %path.display(), "Wrote default config");
            println!("Wrote {}.", path.display());
        }
    }
    Ok(())
}

fn init_config(config: &AppConfig, target: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = target.map_or_else(AppConfig::config_path, Path::to_path_buf);
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path));
    }
    match target {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}

/// Open the favorites store in the user data directory.
pub fn open_favorites() -> Result<Favorites, CliError> {
    let path = AppConfig::ensure_db_path()?;
    let storage = Storage::open(&path)?;
    Ok(FavoritesStore::open(storage))
}

pub async fn search(client: ProxyClient, favorites: Favorites, query: &str) -> Result<(), CliError> {
    let mut session = Session::new(client, favorites);
    session.set_query(query);
    session.settle().await;

    if let Some(error) = session.search().error() {
        return Err(CliError::Failed(error.to_string()));
    }
    let favorites = session.favorites();
    println!(
        "{}",
        render::search_results(session.search(), |id| favorites.is_favorite(id))
    );
    Ok(())
}

pub async fn details(client: ProxyClient, favorites: Favorites, id: MovieId) -> Result<(), CliError> {
    let mut session = Session::new(client, favorites);
    session.open_details(MovieSummary {
        id,
        title: String::new(),
        overview: String::new(),
        release_date: None,
        poster_path: None,
    });
    session.settle().await;

    if let Some(error) = session.details().error() {
        return Err(CliError::Failed(error.to_string()));
    }
    if let Some(view) = session.details().view() {
        let favorite = session.favorites().is_favorite(id);
        println!("{}", render::detail_view(&view, favorite));
    }
    Ok(())
}

pub async fn favorites(
    client: ProxyClient,
    mut store: Favorites,
    command: FavoritesCommand,
) -> Result<(), CliError> {
    match command {
        FavoritesCommand::List => {
            println!("{}", render::favorites_list(&store.favorites()));
        }
        FavoritesCommand::Add { id } => {
            let details = client
                .movie_details(id)
                .await
                .map_err(|e| CliError::Failed(e.user_message(DETAILS_FAILED, DETAILS_NETWORK_ERROR)))?;
            store.add_favorite(&details.summary());
            info!(id, "Added favorite from CLI");
            println!("Added {} to favorites.", details.title);
        }
        FavoritesCommand::Remove { id } => {
            ensure_favorite(&store, id)?;
            store.remove_favorite(id);
            println!("Removed {id} from favorites.");
        }
        FavoritesCommand::Rate { id, rating } => {
            let rating = rating.map(Rating::new).transpose()?;
            ensure_favorite(&store, id)?;
            store.set_rating(id, rating);
            match rating {
                Some(rating) => println!("Rated {id} {rating}."),
                None => println!("Cleared rating for {id}."),
            }
        }
        FavoritesCommand::Note { id, text } => {
            ensure_favorite(&store, id)?;
            store.set_note(id, text.join(" "));
            println!("Saved note for {id}.");
        }
        FavoritesCommand::Clear => {
            let count = store.len();
            store.clear_all();
            println!("Cleared {count} favorites.");
        }
    }
    Ok(())
}

fn ensure_favorite(store: &Favorites, id: MovieId) -> Result<(), CliError> {
    if store.is_favorite(id) {
        Ok(())
    } else {
        Err(CliError::NotFavorite(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(&AppConfig::default(), Some(&path), false).unwrap();
        let written = AppConfig::from_path(&path).unwrap();
        assert_eq!(written.client.proxy_url, AppConfig::default().client.proxy_url);

        let err = init_config(&AppConfig::default(), Some(&path), false).unwrap_err();
        assert!(matches!(err, CliError::ConfigExists(ref p) if p == &path));

        let mut changed = AppConfig::default();
        changed.client.proxy_url = "http://10.0.0.2:3000/api/tmdb".into();
        init_config(&changed, Some(&path), true).unwrap();
        assert_eq!(
            AppConfig::from_path(&path).unwrap().client.proxy_url,
            "http://10.0.0.2:3000/api/tmdb"
        );
    }
}
