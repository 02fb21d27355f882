//! Ordered, de-duplicated favorites list.
//!
//! Order is user-visible and persisted: `add` appends, `reorder` and
//! `move_favorite` are the only operations that permute.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use foodiesnap_core::kv::keys;
use foodiesnap_core::{Error, KeyValueStore, Notification, Notifier, Recipe, RecipeId, Result};

use crate::persist::{load_json, write_through};

pub const HYDRATE_ERROR: &str = "Failed to load favorites from storage";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FavoritesState {
    pub favorites: Vec<Recipe>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct FavoritesStore {
    kv: Arc<dyn KeyValueStore>,
    notifier: Notifier,
    state: watch::Sender<FavoritesState>,
}

impl FavoritesStore {
    /// Empty store; call [`hydrate`](Self::hydrate) to load persisted favorites.
    pub fn new(kv: Arc<dyn KeyValueStore>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(FavoritesState::default());
        Self { kv, notifier, state }
    }

    pub fn open(kv: Arc<dyn KeyValueStore>, notifier: Notifier) -> Self {
        let store = Self::new(kv, notifier);
        store.hydrate();
        store
    }

    /// Replaces the in-memory list with the persisted one. Malformed data
    /// sets `error`, leaves the list empty and emits an error notification.
    pub fn hydrate(&self) {
        self.state.send_modify(|s| s.loading = true);
        let loaded = load_json::<Vec<Recipe>>(self.kv.as_ref(), keys::FAVORITES);
        let failed = loaded.is_err();
        self.state.send_modify(|s| {
            s.loading = false;
            match loaded {
                Ok(saved) => {
                    s.favorites = saved.unwrap_or_default();
                    s.error = None;
                    debug!(count = s.favorites.len(), "favorites hydrated");
                }
                Err(e) => {
                    warn!(error = %e, "failed to load favorites from storage");
                    s.favorites.clear();
                    s.error = Some(HYDRATE_ERROR.to_string());
                }
            }
        });
        if failed {
            self.notifier.emit(Notification::error(HYDRATE_ERROR));
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesState> { self.state.subscribe() }

    pub fn snapshot(&self) -> FavoritesState { self.state.borrow().clone() }

    pub fn favorites(&self) -> Vec<Recipe> { self.state.borrow().favorites.clone() }

    pub fn is_favorite(&self, id: RecipeId) -> bool { self.state.borrow().favorites.iter().any(|r| r.id == id) }

    /// Appends `recipe` unless its id is already saved. Returns whether it was added.
    pub fn add(&self, recipe: Recipe) -> bool {
        let title = recipe.title.clone();
        let added = self.state.send_if_modified(|s| {
            if s.favorites.iter().any(|r| r.id == recipe.id) {
                return false;
            }
            s.favorites.push(recipe);
            s.error = None;
            true
        });
        if added {
            info!(%title, "added favorite");
            self.persist();
            self.notifier.emit(Notification::success(format!("{title} added to favorites!")));
        }
        added
    }

    /// Removes the recipe with `id`, returning it when it was saved.
    pub fn remove(&self, id: RecipeId) -> Option<Recipe> {
        let mut removed = None;
        self.state.send_if_modified(|s| {
            let pos = s.favorites.iter().position(|r| r.id == id);
            removed = pos.map(|p| s.favorites.remove(p));
            s.error = None;
            removed.is_some()
        });
        if let Some(recipe) = &removed {
            info!(title = %recipe.title, "removed favorite");
            self.persist();
            self.notifier.emit(Notification::info(format!("{} removed from favorites", recipe.title)));
        }
        removed
    }

    /// Replaces the order wholesale. `reordered` must hold exactly the
    /// currently saved recipe ids; anything else is rejected untouched.
    pub fn reorder(&self, reordered: Vec<Recipe>) -> Result<()> {
        check_permutation(&self.state.borrow().favorites, &reordered)?;
        self.state.send_modify(|s| {
            s.favorites = reordered;
            s.error = None;
        });
        self.persist();
        self.notifier.emit(Notification::info("Favorites reordered"));
        Ok(())
    }

    /// Drag-and-drop move of the entry at `from` to position `to`.
    pub fn move_favorite(&self, from: usize, to: usize) -> Result<()> {
        let mut reordered = self.favorites();
        let len = reordered.len();
        if from >= len || to >= len {
            return Err(Error::InvalidPermutation(format!("cannot move {from} -> {to} in a list of {len}")));
        }
        let item = reordered.remove(from);
        reordered.insert(to, item);
        self.reorder(reordered)
    }

    pub fn clear_all(&self) {
        self.state.send_modify(|s| {
            s.favorites.clear();
            s.error = None;
        });
        info!("cleared favorites");
        self.persist();
        self.notifier.emit(Notification::info("All favorites cleared"));
    }

    fn persist(&self) {
        let favorites = self.state.borrow().favorites.clone();
        write_through(self.kv.as_ref(), keys::FAVORITES, &favorites);
    }
}

fn check_permutation(current: &[Recipe], reordered: &[Recipe]) -> Result<()> {
    if current.len() != reordered.len() {
        return Err(Error::InvalidPermutation(format!(
            "expected {} recipes, got {}",
            current.len(),
            reordered.len()
        )));
    }
    let mut before: Vec<RecipeId> = current.iter().map(|r| r.id).collect();
    let mut after: Vec<RecipeId> = reordered.iter().map(|r| r.id).collect();
    before.sort_unstable();
    after.sort_unstable();
    match before.iter().zip(&after).find(|(b, a)| b != a) {
        Some((_, a)) => Err(Error::InvalidPermutation(format!("recipe {a} is not a saved favorite"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipes(ids: &[RecipeId]) -> Vec<Recipe> { ids.iter().map(|&id| Recipe::new(id, format!("r{id}"))).collect() }

    #[test]
    fn permutation_accepts_any_order_of_same_ids() {
        assert!(check_permutation(&recipes(&[1, 2, 3]), &recipes(&[3, 1, 2])).is_ok());
        assert!(check_permutation(&[], &[]).is_ok());
    }

    #[test]
    fn permutation_rejects_changed_sets() {
        assert!(check_permutation(&recipes(&[1, 2, 3]), &recipes(&[1, 2])).is_err());
        assert!(check_permutation(&recipes(&[1, 2, 3]), &recipes(&[1, 2, 4])).is_err());
        assert!(check_permutation(&recipes(&[1, 2]), &recipes(&[1, 1])).is_err());
    }
}
