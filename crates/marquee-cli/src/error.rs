use std::path::PathBuf;

use thiserror::Error;

use marquee_api::ApiError;
use marquee_core::error::MarqueeError;
use marquee_core::models::{InvalidRating, MovieId};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] MarqueeError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rating(#[from] InvalidRating),

    #[error("{} already exists; pass --force to overwrite it", .0.display())]
    ConfigExists(PathBuf),

    #[error("movie {0} is not in favorites")]
    NotFavorite(MovieId),

    /// A request finished with a user-facing error message.
    #[error("{0}")]
    Failed(String),
}
