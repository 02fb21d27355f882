//! HTTP client for TheMealDB's public JSON API.
//!
//! Stateless apart from the connection pool: no caching, no retries. Every
//! transport, status or decoding failure becomes [`Error::Fetch`] so the
//! browse layer can treat them uniformly as retryable.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use foodiesnap_core::config::ApiConfig;
use foodiesnap_core::{Error, Recipe, RecipeId, RecipeSource, Result};

use crate::meal::{CategoriesResponse, Category, Meal, MealsResponse};

const SERVICE: &str = "TheMealDB";

#[derive(Debug, Clone)]
pub struct MealDbClient {
    base_url: String,
    http: reqwest::Client,
}

impl MealDbClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), http })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, ?query, "requesting");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("{SERVICE} {endpoint}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "request failed");
            return Err(Error::Fetch(format!("{SERVICE} {endpoint}: HTTP {status}")));
        }

        response.json().await.map_err(|e| Error::Fetch(format!("{SERVICE} {endpoint}: JSON parse error: {e}")))
    }

    async fn meals(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Meal>> {
        let body: MealsResponse = self.get_json(endpoint, query).await?;
        Ok(body.meals.unwrap_or_default())
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let body: CategoriesResponse = self.get_json("categories.php", &[]).await?;
        Ok(body.categories)
    }

    /// Summaries only: description, ingredients and instructions are empty.
    pub async fn filter_by_category(&self, category: &str) -> Result<Vec<Recipe>> {
        self.meals("filter.php", &[("c", category)])
            .await?
            .into_iter()
            .map(|meal| meal.into_summary(category))
            .collect()
    }
}

#[async_trait]
impl RecipeSource for MealDbClient {
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>> {
        self.meals("search.php", &[("s", query)]).await?.into_iter().map(Meal::into_recipe).collect()
    }

    async fn fetch_random(&self) -> Result<Recipe> {
        self.meals("random.php", &[])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("no random recipe returned".to_string()))?
            .into_recipe()
    }

    async fn fetch_by_id(&self, id: RecipeId) -> Result<Option<Recipe>> {
        let id = id.to_string();
        self.meals("lookup.php", &[("i", id.as_str())]).await?.into_iter().next().map(Meal::into_recipe).transpose()
    }
}
