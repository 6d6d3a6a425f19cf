//! Locally persisted favorites.
//!
//! The whole [`FavoritesState`] is kept in memory and written back as one
//! JSON blob under [`FAVORITES_KEY`] after every mutation. Storage failures
//! never reach the caller: a bad or missing payload loads as an empty
//! collection and a failed write is logged and dropped.

use tracing::{debug, warn};

use crate::models::{FavoriteItem, FavoritesState, MovieId, MovieSummary, Rating};
use crate::storage::KvStore;

/// Storage slot for the serialized favorites collection.
pub const FAVORITES_KEY: &str = "movie-explorer:favorites:v1";

/// Read the persisted collection, falling back to empty on any problem.
///
/// The payload must be a JSON object with an `items` object. Entries that
/// fail to decode are skipped; the rest are re-keyed by their own id.
/// Skipped entries are not kept anywhere, so the next save drops them from
/// storage for good.
pub fn load_favorites(kv: &impl KvStore) -> FavoritesState {
    let raw = match kv.get(FAVORITES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return FavoritesState::default(),
        Err(e) => {
            warn!("Failed to read favorites: {e}");
            return FavoritesState::default();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Discarding unparseable favorites payload: {e}");
            return FavoritesState::default();
        }
    };

    let Some(items) = value.get("items").and_then(|v| v.as_object()) else {
        warn!("Discarding favorites payload without an `items` object");
        return FavoritesState::default();
    };

    let mut state = FavoritesState::default();
    for (key, entry) in items {
        match serde_json::from_value::<FavoriteItem>(entry.clone()) {
            Ok(item) => state.insert(item),
            Err(e) => warn!(key = %key, "Skipping malformed favorite: {e}"),
        }
    }
    state
}

/// Write the whole collection. Errors are logged, not propagated.
pub fn save_favorites(kv: &impl KvStore, state: &FavoritesState) {
    match serde_json::to_string(state) {
        Ok(json) => {
            if let Err(e) = kv.set(FAVORITES_KEY, &json) {
                warn!("Failed to save favorites: {e}");
            }
        }
        Err(e) => warn!("Failed to serialize favorites: {e}"),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The single owner of the favorites collection.
///
/// Mutations only go through the methods below. Nothing is written to the
/// backing store until [`FavoritesStore::load`] has run, so the empty
/// startup state can never clobber what is on disk.
pub struct FavoritesStore<K: KvStore> {
    kv: K,
    state: FavoritesState,
    ready: bool,
    last_stamp: i64,
    clock: fn() -> i64,
}

impl<K: KvStore> FavoritesStore<K> {
    /// Create an unloaded store. Call [`load`](Self::load) before relying on it.
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            state: FavoritesState::default(),
            ready: false,
            last_stamp: 0,
            clock: now_millis,
        }
    }

    /// Create a store and load it immediately.
    pub fn open(kv: K) -> Self {
        let mut store = Self::new(kv);
        store.load();
        store
    }

    /// Replace the wall clock, in milliseconds.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Load persisted state and mark the store ready.
    pub fn load(&mut self) {
        self.state = load_favorites(&self.kv);
        self.last_stamp = self
            .state
            .items
            .values()
            .map(|f| f.updated_at)
            .max()
            .unwrap_or(0);
        self.ready = true;
        debug!(count = self.state.len(), "Favorites loaded");
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn state(&self) -> &FavoritesState {
        &self.state
    }

    /// All favorites, most recently touched first.
    pub fn favorites(&self) -> Vec<FavoriteItem> {
        self.state.sorted()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.state.get(id).is_some()
    }

    pub fn get_favorite(&self, id: MovieId) -> Option<&FavoriteItem> {
        self.state.get(id)
    }

    /// Favorite a movie, keeping any rating and note already on it.
    pub fn add_favorite(&mut self, movie: &MovieSummary) {
        let updated_at = self.stamp();
        let existing = self.state.get(movie.id);
        let item = FavoriteItem {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            rating: existing.and_then(|f| f.rating),
            note: Some(existing.and_then(|f| f.note.clone()).unwrap_or_default()),
            updated_at,
        };
        debug!(id = movie.id, title = %movie.title, "Favorite added");
        self.state.insert(item);
        self.persist();
    }

    pub fn remove_favorite(&mut self, id: MovieId) {
        if self.state.remove(id).is_some() {
            debug!(id, "Favorite removed");
            self.persist();
        }
    }

    /// Set or clear the rating. Does nothing for movies not in favorites.
    pub fn set_rating(&mut self, id: MovieId, rating: Option<Rating>) {
        if !self.is_favorite(id) {
            return;
        }
        let updated_at = self.stamp();
        if let Some(item) = self.state.get_mut(id) {
            item.rating = rating;
            item.updated_at = updated_at;
        }
        self.persist();
    }

    /// Replace the note text. Does nothing for movies not in favorites.
    pub fn set_note(&mut self, id: MovieId, note: impl Into<String>) {
        if !self.is_favorite(id) {
            return;
        }
        let updated_at = self.stamp();
        if let Some(item) = self.state.get_mut(id) {
            item.note = Some(note.into());
            item.updated_at = updated_at;
        }
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.state = FavoritesState::default();
        debug!("Favorites cleared");
        self.persist();
    }

    /// Next `updated_at` value: wall clock, but always past the last one issued.
    fn stamp(&mut self) -> i64 {
        let now = (self.clock)();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }

    fn persist(&self) {
        if self.ready {
            save_favorites(&self.kv, &self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::error::MarqueeError;
    use crate::storage::Storage;

    /// In-memory store that records writes and can be told to fail them.
    #[derive(Default)]
    struct RecordingStore {
        slots: RefCell<HashMap<String, String>>,
        writes: RefCell<u32>,
        fail_writes: bool,
    }

    impl RecordingStore {
        fn with(key: &str, value: &str) -> Self {
            let store = Self::default();
            store.slots.borrow_mut().insert(key.into(), value.into());
            store
        }

        fn writes(&self) -> u32 {
            *self.writes.borrow()
        }
    }

    impl KvStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>, MarqueeError> {
            Ok(self.slots.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), MarqueeError> {
            *self.writes.borrow_mut() += 1;
            if self.fail_writes {
                return Err(MarqueeError::Io(std::io::Error::other("quota exceeded")));
            }
            self.slots.borrow_mut().insert(key.into(), value.into());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), MarqueeError> {
            self.slots.borrow_mut().remove(key);
            Ok(())
        }
    }

    fn inception() -> MovieSummary {
        MovieSummary {
            id: 27205,
            title: "Inception".into(),
            overview: "A thief who steals corporate secrets...".into(),
            release_date: Some("2010-07-16".into()),
            poster_path: Some("/poster.jpg".into()),
        }
    }

    fn movie(id: MovieId) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {id}"),
            overview: String::new(),
            release_date: None,
            poster_path: None,
        }
    }

    fn rating(n: u8) -> Option<Rating> {
        Some(Rating::new(n).unwrap())
    }

    fn open_memory() -> FavoritesStore<Storage> {
        FavoritesStore::open(Storage::open_memory().unwrap())
    }

    #[test]
    fn test_add_then_remove() {
        let mut store = open_memory();
        store.add_favorite(&inception());
        assert!(store.is_favorite(27205));

        let fav = store.get_favorite(27205).unwrap();
        assert_eq!(fav.title, "Inception");
        assert_eq!(fav.rating, None);
        assert_eq!(fav.note.as_deref(), Some(""));

        store.remove_favorite(27205);
        assert!(!store.is_favorite(27205));
        assert!(store.get_favorite(27205).is_none());
    }

    #[test]
    fn test_re_add_keeps_annotations() {
        let mut store = open_memory();
        store.add_favorite(&inception());
        store.set_rating(27205, rating(5));
        store.set_note(27205, "great");

        let mut renamed = inception();
        renamed.title = "Inception (2010)".into();
        store.add_favorite(&renamed);

        let fav = store.get_favorite(27205).unwrap();
        assert_eq!(fav.title, "Inception (2010)");
        assert_eq!(fav.rating, rating(5));
        assert_eq!(fav.note.as_deref(), Some("great"));
    }

    #[test]
    fn test_remove_then_add_starts_fresh() {
        let mut store = open_memory();
        store.add_favorite(&inception());
        store.set_rating(27205, rating(5));
        store.set_note(27205, "great");
        store.remove_favorite(27205);
        store.add_favorite(&inception());

        let fav = store.get_favorite(27205).unwrap();
        assert_eq!(fav.rating, None);
        assert_eq!(fav.note.as_deref(), Some(""));
    }

    #[test]
    fn test_annotations_on_missing_id_are_noops() {
        let kv = RecordingStore::default();
        let mut store = FavoritesStore::open(kv);
        store.add_favorite(&movie(1));
        let before = store.state().clone();
        let writes = store.kv.writes();

        store.set_rating(2, rating(3));
        store.set_note(2, "never");
        store.remove_favorite(2);

        assert_eq!(store.state(), &before);
        assert!(!store.is_favorite(2));
        assert_eq!(store.kv.writes(), writes);
    }

    #[test]
    fn test_clear_all_empties() {
        let mut store = open_memory();
        for id in 1..=4 {
            store.add_favorite(&movie(id));
        }
        store.clear_all();
        assert!(store.favorites().is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_updated_at_strictly_increases_on_frozen_clock() {
        let mut store = open_memory().with_clock(|| 1_000);
        store.add_favorite(&movie(1));
        let first = store.get_favorite(1).unwrap().updated_at;
        store.set_note(1, "a");
        let second = store.get_favorite(1).unwrap().updated_at;
        store.set_rating(1, rating(2));
        let third = store.get_favorite(1).unwrap().updated_at;

        assert!(first < second && second < third);
    }

    #[test]
    fn test_favorites_most_recent_first() {
        let mut store = open_memory();
        store.add_favorite(&movie(1));
        store.add_favorite(&movie(2));
        store.add_favorite(&movie(3));
        store.set_note(1, "touched last");

        let ids: Vec<MovieId> = store.favorites().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_no_save_before_ready() {
        let kv = RecordingStore::with(FAVORITES_KEY, r#"{"items":{}}"#);
        let mut store = FavoritesStore::new(kv);
        assert!(!store.ready());

        store.add_favorite(&movie(1));
        assert_eq!(store.kv.writes(), 0);

        store.load();
        assert!(store.ready());
        store.add_favorite(&movie(2));
        assert_eq!(store.kv.writes(), 1);
    }

    #[test]
    fn test_every_mutation_saves_whole_state() {
        let mut store = FavoritesStore::open(RecordingStore::default());
        store.add_favorite(&inception());
        store.set_rating(27205, rating(4));

        let raw = store.kv.get(FAVORITES_KEY).unwrap().unwrap();
        let reloaded = load_favorites(&store.kv);
        assert_eq!(&reloaded, store.state());
        assert!(raw.contains("\"27205\""));
    }

    #[test]
    fn test_persisted_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marquee.db");

        {
            let mut store = FavoritesStore::open(Storage::open(&path).unwrap());
            store.add_favorite(&inception());
            store.set_note(27205, "rewatch");
        }

        let store = FavoritesStore::open(Storage::open(&path).unwrap());
        assert_eq!(
            store.get_favorite(27205).unwrap().note.as_deref(),
            Some("rewatch")
        );
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let kv = RecordingStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = FavoritesStore::open(kv);
        store.add_favorite(&movie(7));
        store.clear_all();

        assert_eq!(store.kv.writes(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_payloads_load_empty() {
        for payload in [
            "not json",
            "null",
            "42",
            "[]",
            r#"{"favorites":{}}"#,
            r#"{"items":[]}"#,
            r#"{"items":"x"}"#,
        ] {
            let kv = RecordingStore::with(FAVORITES_KEY, payload);
            let store = FavoritesStore::open(kv);
            assert!(store.ready(), "payload {payload:?}");
            assert!(store.is_empty(), "payload {payload:?}");
        }
    }

    #[test]
    fn test_malformed_entries_skipped_and_rekeyed() {
        let payload = r#"{"items":{
            "1": {"id": 1, "title": "Kept", "updatedAt": 5},
            "2": {"id": 2, "updatedAt": 6},
            "legacy": {"id": 3, "title": "Re-keyed", "updatedAt": 7}
        }}"#;
        let store = FavoritesStore::open(RecordingStore::with(FAVORITES_KEY, payload));

        assert!(store.is_favorite(1));
        assert!(!store.is_favorite(2));
        assert!(store.is_favorite(3));
        assert!(store.state().items.contains_key("3"));
    }

    #[test]
    fn test_malformed_entries_gone_after_next_write() {
        let payload = r#"{"items":{
            "1": {"id": 1, "title": "Kept", "updatedAt": 5},
            "2": {"id": 2, "updatedAt": 6}
        }}"#;
        let mut store = FavoritesStore::open(RecordingStore::with(FAVORITES_KEY, payload));
        assert_eq!(store.kv.writes(), 0);

        store.add_favorite(&movie(7));

        let raw = store.kv.get(FAVORITES_KEY).unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<&String> = saved["items"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(saved["items"].get("1").is_some());
        assert!(saved["items"].get("7").is_some());
        assert!(saved["items"].get("2").is_none());
    }

    #[test]
    fn test_load_resumes_stamps_after_persisted_max() {
        let payload = r#"{"items":{"1":{"id":1,"title":"Old","updatedAt":9000}}}"#;
        let mut store =
            FavoritesStore::new(RecordingStore::with(FAVORITES_KEY, payload)).with_clock(|| 10);
        store.load();
        store.add_favorite(&movie(2));

        assert!(store.get_favorite(2).unwrap().updated_at > 9000);
        assert_eq!(store.favorites()[0].id, 2);
    }
}
