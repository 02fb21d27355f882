#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use foodiesnap_core::config::BrowseConfig;
use foodiesnap_core::{Error, Recipe, RecipeId, RecipeSource, Result};

/// Scriptable in-memory source. Random recipes get increasing ids and
/// titles "Random N"; searches return two hits titled after the query.
#[derive(Default)]
pub struct FakeSource {
    next_id: AtomicU64,
    random_calls: AtomicUsize,
    searches: Mutex<Vec<String>>,
    missing: Mutex<Vec<RecipeId>>,
    latency: Mutex<Duration>,
    pub fail_random: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_lookup: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub fn set_latency(&self, latency: Duration) { *self.latency.lock().unwrap() = latency; }

    pub fn set_missing(&self, ids: &[RecipeId]) { *self.missing.lock().unwrap() = ids.to_vec(); }

    pub fn random_calls(&self) -> usize { self.random_calls.load(Ordering::SeqCst) }

    pub fn searches(&self) -> Vec<String> { self.searches.lock().unwrap().clone() }

    async fn wait(&self) {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RecipeSource for FakeSource {
    async fn search_by_name(&self, query: &str) -> Result<Vec<Recipe>> {
        self.searches.lock().unwrap().push(query.to_string());
        self.wait().await;
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(Error::Fetch("search unavailable".to_string()));
        }
        Ok(vec![Recipe::new(9001, format!("{query} one")), Recipe::new(9002, format!("{query} two"))])
    }

    async fn fetch_random(&self) -> Result<Recipe> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.fail_random.load(Ordering::SeqCst) {
            return Err(Error::Fetch("random unavailable".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Recipe::new(id, format!("Random {id}")))
    }

    async fn fetch_by_id(&self, id: RecipeId) -> Result<Option<Recipe>> {
        self.wait().await;
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Error::Fetch("lookup unavailable".to_string()));
        }
        if self.missing.lock().unwrap().contains(&id) {
            return Ok(None);
        }
        Ok(Some(Recipe::new(id, format!("Recipe {id}"))))
    }
}

pub fn browse_config(max_pages: u32) -> BrowseConfig {
    BrowseConfig { initial_batch: 8, page_batch: 4, max_pages, debounce_ms: 500 }
}
