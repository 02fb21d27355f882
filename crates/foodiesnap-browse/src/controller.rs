//! Random-batch pagination with a debounced search that supersedes it.
//!
//! Every change of view (a keystroke, a reload, disposal) bumps a generation
//! counter. Fetches capture the generation they started under and drop their
//! result if it has moved on by the time they complete, so a slow response
//! can never overwrite newer state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use foodiesnap_core::config::BrowseConfig;
use foodiesnap_core::{Recipe, RecipeSource, Result};

use crate::schedule::{schedule, ScheduledTask};
use crate::state::SearchResultState;

pub const INITIAL_LOAD_ERROR: &str = "Failed to load recipes. Please try again later.";
pub const LOAD_MORE_ERROR: &str = "Failed to load more recipes. Please try again.";
pub const SEARCH_ERROR: &str = "Failed to search recipes. Please try again.";

/// What happened to a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was written to state.
    Applied,
    /// The view moved on while the fetch was in flight; result discarded.
    Stale,
    /// Preconditions did not hold; nothing was fetched.
    Skipped,
    /// The fetch failed; `error` is set and earlier items are kept.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    RandomView,
    LoadMore,
    Search(String),
}

struct Inner {
    source: Arc<dyn RecipeSource>,
    config: BrowseConfig,
    state: watch::Sender<SearchResultState>,
    generation: AtomicU64,
    disposed: AtomicBool,
    debounce: Mutex<Option<ScheduledTask>>,
    failed: Mutex<Option<Operation>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> { m.lock().unwrap_or_else(PoisonError::into_inner) }

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        !self.disposed.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Supersedes the current view. In-flight fetches become stale.
    fn begin_view(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = false;
            s.loading_more = false;
        });
        debug!(generation, "new view");
        generation
    }

    fn set_failed(&self, op: Option<Operation>) { *lock(&self.failed) = op; }

    fn replace_debounce(&self, task: Option<ScheduledTask>) {
        // dropping the previous handle aborts it
        let _previous = std::mem::replace(&mut *lock(&self.debounce), task);
    }

    async fn random_batch(&self, count: usize) -> Result<Vec<Recipe>> {
        try_join_all((0..count).map(|_| self.source.fetch_random())).await
    }

    async fn run_query(&self, generation: u64, query: &str) -> LoadOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.load_random_view(generation).await
        } else {
            self.run_search(generation, trimmed.to_string()).await
        }
    }

    async fn load_random_view(&self, generation: u64) -> LoadOutcome {
        if !self.is_current(generation) {
            return LoadOutcome::Stale;
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.random_batch(self.config.initial_batch).await;
        if !self.is_current(generation) {
            debug!(generation, "discarding stale random batch");
            return LoadOutcome::Stale;
        }

        let max_pages = self.config.max_pages;
        match result {
            Ok(items) => {
                info!(count = items.len(), "loaded random recipes");
                self.set_failed(None);
                self.state.send_modify(|s| {
                    s.items = items;
                    s.page = 1;
                    s.has_more = 1 < max_pages;
                    s.loading = false;
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "random batch failed");
                self.set_failed(Some(Operation::RandomView));
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(INITIAL_LOAD_ERROR.to_string());
                });
                LoadOutcome::Failed
            }
        }
    }

    /// `retrying` lets the page run over a standing page error, which it
    /// clears only once the fetch has actually started.
    async fn load_more(&self, retrying: bool) -> LoadOutcome {
        if self.disposed.load(Ordering::SeqCst) {
            return LoadOutcome::Skipped;
        }
        let max_pages = self.config.max_pages;
        let started = self.state.send_if_modified(|s| {
            let allowed = !s.is_searching()
                && s.has_more
                && s.page > 0
                && s.page < max_pages
                && !s.loading
                && !s.loading_more
                && (retrying || s.error.is_none());
            if allowed {
                s.loading_more = true;
                s.error = None;
            }
            allowed
        });
        if !started {
            return LoadOutcome::Skipped;
        }
        let generation = self.generation.load(Ordering::SeqCst);

        let result = self.random_batch(self.config.page_batch).await;
        if !self.is_current(generation) {
            debug!(generation, "discarding stale page");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(batch) => {
                self.set_failed(None);
                self.state.send_modify(|s| {
                    s.items.extend(batch);
                    s.page += 1;
                    s.has_more = s.page < max_pages;
                    s.loading_more = false;
                    debug!(page = s.page, has_more = s.has_more, "appended page");
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "load more failed");
                self.set_failed(Some(Operation::LoadMore));
                self.state.send_modify(|s| {
                    s.loading_more = false;
                    s.error = Some(LOAD_MORE_ERROR.to_string());
                });
                LoadOutcome::Failed
            }
        }
    }

    async fn run_search(&self, generation: u64, query: String) -> LoadOutcome {
        if !self.is_current(generation) {
            return LoadOutcome::Stale;
        }
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.source.search_by_name(&query).await;
        if !self.is_current(generation) {
            debug!(generation, %query, "discarding stale search");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(items) => {
                info!(%query, count = items.len(), "search results");
                self.set_failed(None);
                self.state.send_modify(|s| {
                    s.items = items;
                    s.page = 1;
                    s.has_more = false;
                    s.loading = false;
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(%query, error = %e, "search failed");
                self.set_failed(Some(Operation::Search(query)));
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(SEARCH_ERROR.to_string());
                });
                LoadOutcome::Failed
            }
        }
    }
}

/// Owns the browse view for one screen. Dropping it disposes the view.
///
/// [`set_query`](Self::set_query) spawns its debounce timer on the current
/// Tokio runtime.
pub struct BrowseController {
    inner: Arc<Inner>,
}

impl BrowseController {
    pub fn new(source: Arc<dyn RecipeSource>, config: BrowseConfig) -> Self {
        let (state, _) = watch::channel(SearchResultState::default());
        let inner = Inner {
            source,
            config,
            state,
            generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            debounce: Mutex::new(None),
            failed: Mutex::new(None),
        };
        Self { inner: Arc::new(inner) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResultState> { self.inner.state.subscribe() }

    pub fn snapshot(&self) -> SearchResultState { self.inner.state.borrow().clone() }

    /// (Re)loads the view for the current query from scratch: random
    /// recipes from page 1 when it is empty, the search results otherwise.
    pub async fn load_initial(&self) -> LoadOutcome {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return LoadOutcome::Skipped;
        }
        self.inner.replace_debounce(None);
        let query = self.inner.state.borrow().query.clone();
        let generation = self.inner.begin_view();
        self.inner.run_query(generation, &query).await
    }

    /// Appends the next random page. Skipped while searching, at the page
    /// cap, while anything is loading, or after an unretried failure.
    pub async fn load_more(&self) -> LoadOutcome { self.inner.load_more(false).await }

    /// Scroll-proximity signal: only the last rendered item triggers a page.
    pub async fn item_visible(&self, index: usize) -> LoadOutcome {
        let len = self.inner.state.borrow().items.len();
        if index.saturating_add(1) < len {
            return LoadOutcome::Skipped;
        }
        self.load_more().await
    }

    /// Records a keystroke. The text is visible immediately; the fetch
    /// runs once no further keystroke arrives within the debounce window.
    pub fn set_query(&self, raw: impl Into<String>) {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return;
        }
        let raw = raw.into();
        self.inner.state.send_modify(|s| s.query.clone_from(&raw));
        let generation = self.inner.begin_view();

        let weak = Arc::downgrade(&self.inner);
        let task = schedule(self.inner.config.debounce(), async move {
            let Some(inner) = weak.upgrade() else { return };
            if !inner.is_current(generation) {
                return;
            }
            // pages started during the debounce window belong to the old view
            let generation = inner.begin_view();
            inner.run_query(generation, &raw).await;
        });
        self.inner.replace_debounce(Some(task));
    }

    /// Clears the search box and reloads random recipes without waiting.
    pub async fn clear_search(&self) -> LoadOutcome {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return LoadOutcome::Skipped;
        }
        self.inner.replace_debounce(None);
        self.inner.state.send_modify(|s| s.query.clear());
        let generation = self.inner.begin_view();
        self.inner.load_random_view(generation).await
    }

    /// Re-runs the operation that last failed, if it still applies. A
    /// skipped retry leaves the failure in place for a later attempt.
    pub async fn retry(&self) -> LoadOutcome {
        let failed = lock(&self.inner.failed).clone();
        let active = self.inner.state.borrow().active_query().to_string();
        match failed {
            Some(Operation::RandomView) if active.is_empty() => {
                let generation = self.inner.begin_view();
                self.inner.load_random_view(generation).await
            }
            Some(Operation::LoadMore) if active.is_empty() => self.inner.load_more(true).await,
            Some(Operation::Search(query)) if query == active => {
                let generation = self.inner.begin_view();
                self.inner.run_search(generation, query).await
            }
            _ => LoadOutcome::Skipped,
        }
    }

    pub fn has_pending_search(&self) -> bool {
        lock(&self.inner.debounce).as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancels the pending debounce and discards every in-flight fetch.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.replace_debounce(None);
        self.inner.set_failed(None);
        debug!("browse view disposed");
    }
}

impl Drop for BrowseController {
    fn drop(&mut self) { self.dispose(); }
}
