//! JSON read/write helpers shared by the stores.
//!
//! Writes are write-through and never fatal: a failure is logged and the
//! in-memory state stays authoritative for the session.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use foodiesnap_core::{Error, KeyValueStore, Result};

/// `Ok(None)` when the key is absent; `Err` when present but unreadable.
pub fn load_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match kv.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` under `key`. Returns whether the write landed.
pub fn write_through<T: Serialize + ?Sized>(kv: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value).map_err(Error::from).and_then(|json| kv.set(key, &json));
    match result {
        Ok(()) => {
            debug!(key, "persisted");
            true
        }
        Err(e) => {
            warn!(key, error = %e, "failed to persist; keeping in-memory state");
            false
        }
    }
}

pub fn remove_key(kv: &dyn KeyValueStore, key: &str) {
    if let Err(e) = kv.remove(key) {
        warn!(key, error = %e, "failed to remove persisted key");
    }
}
