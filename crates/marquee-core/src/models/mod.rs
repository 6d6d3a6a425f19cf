mod favorite;
mod movie;

pub use favorite::{FavoriteItem, FavoritesState, InvalidRating, Rating};
pub use movie::{MovieDetails, MovieId, MovieSummary};
