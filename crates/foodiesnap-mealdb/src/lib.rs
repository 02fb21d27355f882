//! foodiesnap-mealdb
//!
//! Recipe sources: the TheMealDB HTTP client and a built-in offline catalog.
//! `FOODIESNAP_OFFLINE=1` makes [`get_default_source`] pick the catalog.

use std::sync::Arc;

use tracing::info;

use foodiesnap_core::config::ApiConfig;
use foodiesnap_core::{RecipeSource, Result};

pub mod catalog;
pub mod client;
pub mod meal;

pub use catalog::StaticCatalog;
pub use client::MealDbClient;
pub use meal::{Category, Meal};

pub fn offline_requested() -> bool {
    std::env::var("FOODIESNAP_OFFLINE").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_source(config: &ApiConfig) -> Result<Arc<dyn RecipeSource>> {
    if offline_requested() {
        info!("using built-in offline catalog");
        return Ok(Arc::new(StaticCatalog::builtin()));
    }
    info!(base_url = %config.base_url, "using TheMealDB");
    Ok(Arc::new(MealDbClient::new(config)?))
}
