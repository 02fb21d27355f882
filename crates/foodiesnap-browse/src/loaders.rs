//! One-shot loads for screens that are not paginated.

use futures::future::try_join_all;
use tracing::debug;

use foodiesnap_core::{Error, Recipe, RecipeId, RecipeSource, Result};

/// Loads one recipe for the detail view.
pub async fn load_recipe(source: &dyn RecipeSource, id: RecipeId) -> Result<Recipe> {
    source.fetch_by_id(id).await?.ok_or_else(|| Error::NotFound(format!("recipe {id}")))
}

/// Fetches the given ids concurrently and returns them in the same order.
/// Ids the source no longer knows are dropped; any fetch error fails the
/// whole load.
pub async fn load_top_rated(source: &dyn RecipeSource, ids: &[RecipeId]) -> Result<Vec<Recipe>> {
    let fetched = try_join_all(ids.iter().map(|&id| source.fetch_by_id(id))).await?;
    let recipes: Vec<Recipe> = fetched.into_iter().flatten().collect();
    if recipes.len() < ids.len() {
        debug!(requested = ids.len(), found = recipes.len(), "some rated recipes are gone");
    }
    Ok(recipes)
}
