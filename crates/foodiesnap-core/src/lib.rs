#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod kv;
pub mod notify;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use notify::Notifier;
pub use traits::{KeyValueStore, RecipeSource};
pub use types::{Notification, NotificationKind, Recipe, RecipeId, ThemeMode};
