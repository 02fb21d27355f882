use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Recipe, RecipeId};

/// Device-local string key/value storage.
///
/// No ordering or transactional guarantees across keys. Callers treat a
/// failed `set` as non-fatal.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stateless access to a remote recipe catalogue.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Full result set for a name query. An unknown name is an empty list.
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>>;
    /// One independently drawn random recipe.
    async fn fetch_random(&self) -> Result<Recipe>;
    /// `Ok(None)` when the source has no recipe with this id.
    async fn fetch_by_id(&self, id: RecipeId) -> Result<Option<Recipe>>;
}
