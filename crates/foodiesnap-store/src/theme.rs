use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use foodiesnap_core::kv::keys;
use foodiesnap_core::{KeyValueStore, ThemeMode};

/// Light/dark preference, persisted as the bare string `light` or `dark`.
pub struct ThemeStore {
    kv: Arc<dyn KeyValueStore>,
    mode: watch::Sender<ThemeMode>,
}

impl ThemeStore {
    /// Resolves the starting mode from storage, falling back to the
    /// platform preference, and writes it back.
    pub fn open(kv: Arc<dyn KeyValueStore>, prefer_dark: bool) -> Self {
        let saved = match kv.get(keys::THEME) {
            Ok(raw) => raw.and_then(|s| s.trim().parse::<ThemeMode>().ok()),
            Err(e) => {
                warn!(error = %e, "failed to read theme preference");
                None
            }
        };
        let initial = saved.unwrap_or(if prefer_dark { ThemeMode::Dark } else { ThemeMode::Light });
        debug!(theme = %initial, from_storage = saved.is_some(), "theme resolved");
        let (mode, _) = watch::channel(initial);
        let store = Self { kv, mode };
        store.persist(initial);
        store
    }

    pub fn mode(&self) -> ThemeMode { *self.mode.borrow() }

    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> { self.mode.subscribe() }

    pub fn toggle(&self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set(next);
        next
    }

    pub fn set(&self, mode: ThemeMode) {
        self.mode.send_replace(mode);
        self.persist(mode);
    }

    fn persist(&self, mode: ThemeMode) {
        if let Err(e) = self.kv.set(keys::THEME, mode.as_str()) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }
}
