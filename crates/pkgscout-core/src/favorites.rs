// Favorites list persisted as one JSON array in a key-value slot
//
// Every mutation is a full read-modify-write of the array. No caching, no
// partial updates, no schema version.
use crate::{models::Favorite, notice::Notice, Result};
use pkgscout_store::KeyValueStore;
use tracing::{debug, warn};

/// Storage key the favorites array lives under
pub const FAVORITES_KEY: &str = "favorites";

/// A reason is acceptable once it has something besides whitespace
pub fn is_valid_reason(reason: &str) -> bool {
    !reason.trim().is_empty()
}

/// What a favorites operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added(String),
    /// Name already present; nothing written
    Duplicate(String),
    Removed(String),
    Updated(String),
    /// New reason identical to the stored one; nothing written
    Unchanged(String),
    /// No favorite with that name; nothing written
    NotFound(String),
    /// Blank reason; nothing written
    EmptyReason(String),
}

impl FavoriteOutcome {
    /// Did the persisted collection change?
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            FavoriteOutcome::Added(_) | FavoriteOutcome::Removed(_) | FavoriteOutcome::Updated(_)
        )
    }

    /// The message the user should see
    pub fn notice(&self) -> Notice {
        match self {
            FavoriteOutcome::Added(name) => {
                Notice::success(format!("{} has been added to favorites!", name))
            }
            FavoriteOutcome::Duplicate(name) => {
                Notice::error(format!("{} has not been added to favorites!", name))
            }
            FavoriteOutcome::Removed(name) => {
                Notice::success(format!("{} has been removed from favorites!", name))
            }
            FavoriteOutcome::Updated(name) => {
                Notice::success(format!("Favorite reason for {} has been updated!", name))
            }
            FavoriteOutcome::Unchanged(_) => Notice::warning("You haven't updated the reason."),
            FavoriteOutcome::NotFound(name) => {
                Notice::error(format!("{} is not in your favorites.", name))
            }
            FavoriteOutcome::EmptyReason(_) => Notice::warning("Please provide a reason"),
        }
    }
}

/// Favorites collection on top of any KeyValueStore
pub struct FavoritesStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read the whole collection.
    ///
    /// A missing slot is an empty list. So is a slot that doesn't parse as a
    /// list of favorites; that case is only logged. Storage failures are
    /// still errors.
    pub fn load(&self) -> Result<Vec<Favorite>> {
        let Some(raw) = self.backend.read(FAVORITES_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Favorite>>(&raw) {
            Ok(favorites) => Ok(favorites),
            Err(e) => {
                warn!("Error parsing favorites from storage, starting empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Append a favorite unless one with the same name exists
    pub fn add(&self, name: &str, reason: &str) -> Result<FavoriteOutcome> {
        if !is_valid_reason(reason) {
            return Ok(FavoriteOutcome::EmptyReason(name.to_string()));
        }

        let mut favorites = self.load()?;
        if favorites.iter().any(|fav| fav.name == name) {
            debug!("{} is already a favorite", name);
            return Ok(FavoriteOutcome::Duplicate(name.to_string()));
        }

        favorites.push(Favorite::new(name, reason));
        self.persist(&favorites)?;
        Ok(FavoriteOutcome::Added(name.to_string()))
    }

    /// Drop the favorite with exactly this name and persist the rest
    pub fn remove(&self, name: &str) -> Result<FavoriteOutcome> {
        let mut favorites = self.load()?;
        favorites.retain(|fav| fav.name != name);
        self.persist(&favorites)?;
        Ok(FavoriteOutcome::Removed(name.to_string()))
    }

    /// Replace the reason of an existing favorite
    pub fn edit(&self, name: &str, new_reason: &str) -> Result<FavoriteOutcome> {
        if !is_valid_reason(new_reason) {
            return Ok(FavoriteOutcome::EmptyReason(name.to_string()));
        }

        let mut favorites = self.load()?;
        let Some(favorite) = favorites.iter_mut().find(|fav| fav.name == name) else {
            return Ok(FavoriteOutcome::NotFound(name.to_string()));
        };

        if favorite.reason == new_reason {
            return Ok(FavoriteOutcome::Unchanged(name.to_string()));
        }

        favorite.reason = new_reason.to_string();
        self.persist(&favorites)?;
        Ok(FavoriteOutcome::Updated(name.to_string()))
    }

    fn persist(&self, favorites: &[Favorite]) -> Result<()> {
        let json = serde_json::to_string(favorites)?;
        self.backend.write(FAVORITES_KEY, &json)?;
        debug!("Persisted {} favorites", favorites.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use pkgscout_store::{MemoryStore, SqliteStore};

    fn names(favorites: &[Favorite]) -> Vec<&str> {
        favorites.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_load_missing_slot_is_empty() {
        let store = FavoritesStore::new(MemoryStore::new());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_json_is_empty() {
        for raw in ["{not json", r#"{"name":"lodash"}"#, r#"[{"name":"lodash"}]"#, "42"] {
            let store = FavoritesStore::new(MemoryStore::with_value(FAVORITES_KEY, raw));
            assert!(store.load().unwrap().is_empty(), "should degrade for {}", raw);
        }
    }

    #[test]
    fn test_duplicate_add_keeps_first_reason() {
        let store = FavoritesStore::new(MemoryStore::new());

        let first = store.add("lodash", "utility functions").unwrap();
        assert_eq!(first, FavoriteOutcome::Added("lodash".into()));

        let writes = store.backend().write_count();
        let second = store.add("lodash", "different reason").unwrap();
        assert_eq!(second, FavoriteOutcome::Duplicate("lodash".into()));
        assert_eq!(second.notice().level, NoticeLevel::Error);
        assert_eq!(store.backend().write_count(), writes);

        let favorites = store.load().unwrap();
        assert_eq!(favorites, vec![Favorite::new("lodash", "utility functions")]);
    }

    #[test]
    fn test_add_rejects_blank_reason() {
        let store = FavoritesStore::new(MemoryStore::new());

        let outcome = store.add("express", "   ").unwrap();
        assert_eq!(outcome, FavoriteOutcome::EmptyReason("express".into()));
        assert_eq!(outcome.notice().message, "Please provide a reason");
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let store = FavoritesStore::new(MemoryStore::new());
        for name in ["zod", "axios", "moment"] {
            store.add(name, "because").unwrap();
        }

        assert_eq!(names(&store.load().unwrap()), vec!["zod", "axios", "moment"]);
    }

    #[test]
    fn test_edit_to_same_reason_writes_nothing() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("react", "ui").unwrap();

        let before = store.backend().read(FAVORITES_KEY).unwrap();
        let writes = store.backend().write_count();

        let outcome = store.edit("react", "ui").unwrap();
        assert_eq!(outcome, FavoriteOutcome::Unchanged("react".into()));
        assert_eq!(outcome.notice().message, "You haven't updated the reason.");
        assert_eq!(store.backend().write_count(), writes);
        assert_eq!(store.backend().read(FAVORITES_KEY).unwrap(), before);
    }

    #[test]
    fn test_edit_replaces_reason_in_place() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("a", "one").unwrap();
        store.add("b", "two").unwrap();
        store.add("c", "three").unwrap();

        let outcome = store.edit("b", "TWO").unwrap();
        assert_eq!(outcome, FavoriteOutcome::Updated("b".into()));
        assert_eq!(
            outcome.notice().message,
            "Favorite reason for b has been updated!"
        );

        assert_eq!(
            store.load().unwrap(),
            vec![
                Favorite::new("a", "one"),
                Favorite::new("b", "TWO"),
                Favorite::new("c", "three"),
            ]
        );
    }

    #[test]
    fn test_edit_unknown_name() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("a", "one").unwrap();
        let writes = store.backend().write_count();

        assert_eq!(
            store.edit("nope", "x").unwrap(),
            FavoriteOutcome::NotFound("nope".into())
        );
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn test_remove_exactly_one_entry() {
        let store = FavoritesStore::new(MemoryStore::new());
        for name in ["lodash", "lodash-es", "react", "lodash.get"] {
            store.add(name, "r").unwrap();
        }

        let outcome = store.remove("lodash").unwrap();
        assert_eq!(
            outcome.notice().message,
            "lodash has been removed from favorites!"
        );
        assert_eq!(
            names(&store.load().unwrap()),
            vec!["lodash-es", "react", "lodash.get"]
        );
    }

    #[test]
    fn test_persisted_json_shape() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.add("lodash", "utility functions").unwrap();

        assert_eq!(
            store.backend().read(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"[{"name":"lodash","reason":"utility functions"}]"#)
        );
    }

    #[test]
    fn test_add_over_corrupt_slot_starts_fresh() {
        let store = FavoritesStore::new(MemoryStore::with_value(FAVORITES_KEY, "garbage"));
        store.add("lodash", "utils").unwrap();
        assert_eq!(names(&store.load().unwrap()), vec!["lodash"]);
    }

    #[test]
    fn test_load_matches_replayed_operations() {
        // Replay the same script against the store and a plain Vec model
        enum Op {
            Add(&'static str, &'static str),
            Edit(&'static str, &'static str),
            Remove(&'static str),
        }

        let script = [
            Op::Add("a", "1"),
            Op::Add("b", "2"),
            Op::Add("a", "dup"),
            Op::Edit("b", "22"),
            Op::Add("c", "3"),
            Op::Remove("a"),
            Op::Edit("c", "3"),
            Op::Add("a", "again"),
            Op::Remove("zzz"),
        ];

        let store = FavoritesStore::new(SqliteStore::in_memory().unwrap());
        let mut model: Vec<Favorite> = Vec::new();

        for op in script {
            match op {
                Op::Add(name, reason) => {
                    store.add(name, reason).unwrap();
                    if !model.iter().any(|f| f.name == name) {
                        model.push(Favorite::new(name, reason));
                    }
                }
                Op::Edit(name, reason) => {
                    store.edit(name, reason).unwrap();
                    if let Some(f) = model.iter_mut().find(|f| f.name == name) {
                        f.reason = reason.to_string();
                    }
                }
                Op::Remove(name) => {
                    store.remove(name).unwrap();
                    model.retain(|f| f.name != name);
                }
            }
        }

        assert_eq!(store.load().unwrap(), model);
        assert_eq!(names(&model), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_reason_validation() {
        assert!(is_valid_reason("x"));
        assert!(is_valid_reason("  padded  "));
        assert!(!is_valid_reason(""));
        assert!(!is_valid_reason(" \n\t "));
    }
}
