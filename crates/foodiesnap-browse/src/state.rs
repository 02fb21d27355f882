use foodiesnap_core::Recipe;

/// Snapshot published by [`BrowseController`](crate::BrowseController).
///
/// While the trimmed `query` is non-empty, `items` is the complete result of
/// that search and `has_more` is false. Otherwise `items` accumulates
/// random-batch pages up to the configured page cap. Duplicate ids across
/// pages are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultState {
    pub items: Vec<Recipe>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    /// Raw text as typed, kept for display.
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingInitial,
    Searching,
    LoadingMore,
    Ready,
    Error,
}

impl SearchResultState {
    pub fn active_query(&self) -> &str { self.query.trim() }

    pub fn is_searching(&self) -> bool { !self.active_query().is_empty() }

    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            Phase::Error
        } else if self.loading && self.is_searching() {
            Phase::Searching
        } else if self.loading {
            Phase::LoadingInitial
        } else if self.loading_more {
            Phase::LoadingMore
        } else if self.page == 0 && self.items.is_empty() {
            Phase::Idle
        } else {
            Phase::Ready
        }
    }
}
