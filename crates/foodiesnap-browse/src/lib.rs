//! foodiesnap-browse
//!
//! Incremental recipe loading over a [`RecipeSource`](foodiesnap_core::RecipeSource):
//! the random-batch / debounced-search controller, the cancellable timer it
//! debounces with, and one-shot loaders for recipe detail and top-rated lists.

pub mod controller;
pub mod loaders;
pub mod schedule;
pub mod state;

pub use controller::{BrowseController, LoadOutcome};
pub use loaders::{load_recipe, load_top_rated};
pub use schedule::{schedule, ScheduledTask};
pub use state::{Phase, SearchResultState};
