//! foodiesnap-store
//!
//! Device-local state: favorites, ratings and theme preference. Each store
//! hydrates from a [`KeyValueStore`](foodiesnap_core::KeyValueStore) once,
//! writes every mutation through to it, and publishes state snapshots over a
//! `tokio::sync::watch` channel.

pub mod favorites;
pub mod persist;
pub mod ratings;
pub mod theme;

pub use favorites::{FavoritesState, FavoritesStore};
pub use ratings::{RatingAggregate, RatingState, RatingStore, RatingSummary};
pub use theme::ThemeStore;
