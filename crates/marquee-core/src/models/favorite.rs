use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::movie::MovieId;

/// A user rating from 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRating(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// A favorited movie with the user's annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Milliseconds since the Unix epoch of the last mutation.
    pub updated_at: i64,
}

/// The whole persisted favorites collection.
///
/// Keys are the canonical decimal form of each item's id. Iteration order
/// of the map carries no meaning; use [`FavoritesState::sorted`] for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesState {
    pub items: BTreeMap<String, FavoriteItem>,
}

impl FavoritesState {
    pub fn key(id: MovieId) -> String {
        id.to_string()
    }

    pub fn get(&self, id: MovieId) -> Option<&FavoriteItem> {
        self.items.get(&Self::key(id))
    }

    pub fn get_mut(&mut self, id: MovieId) -> Option<&mut FavoriteItem> {
        self.items.get_mut(&Self::key(id))
    }

    pub fn insert(&mut self, item: FavoriteItem) {
        self.items.insert(Self::key(item.id), item);
    }

    pub fn remove(&mut self, id: MovieId) -> Option<FavoriteItem> {
        self.items.remove(&Self::key(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recently touched first; equal stamps fall back to ascending id.
    pub fn sorted(&self) -> Vec<FavoriteItem> {
        let mut all: Vec<FavoriteItem> = self.items.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        all
    }
}
