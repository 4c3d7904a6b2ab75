//! Fail-soft JSON persistence on top of a key/value store.
//!
//! Reads never fail: a missing key, a corrupted payload or a broken store all
//! fall back to the caller's default. Writes log and carry on. Each aggregate
//! lives under its own key, so one bad entry never poisons another.

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;

use crate::db::Database;

pub(crate) const RATES_KEY: &str = "currency_rates_cache";
pub(crate) const EXPENSES_KEY: &str = "expenses_log";
pub(crate) const BUDGET_KEY: &str = "budget_limits";
pub(crate) const GOALS_KEY: &str = "savings_goals";

pub(crate) trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
    fn entries(&self) -> Result<Vec<(String, String)>>;
}

impl KeyValueStore for Database {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.put_value(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.delete_value(key)
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        self.get_entries()
    }
}

/// Load the value stored under `key`, or `default` if it is absent or unreadable.
pub(crate) fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match try_load(store, key) {
        Some(value) => value,
        None => default,
    }
}

/// Like [`load`], but tells the caller whether anything usable was stored.
pub(crate) fn try_load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key, "no stored value");
            return None;
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read from storage");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding malformed stored value");
            None
        }
    }
}

/// Load a JSON array stored under `key`, keeping every element that
/// deserializes as `T`. Unreadable elements are dropped with a warning so one
/// bad record does not cost the rest.
pub(crate) fn load_records<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw: Vec<serde_json::Value> = load(store, key, Vec::new());
    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(key, error = %e, "dropping unreadable stored record");
                None
            }
        })
        .collect();
    if records.len() != total {
        tracing::warn!(key, kept = records.len(), total, "some stored records were unreadable");
    }
    records
}

/// Serialize `value` as JSON under `key`. Failures are logged, never returned.
pub(crate) fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to serialize value for storage");
            return;
        }
    };
    match store.write(key, &payload) {
        Ok(()) => tracing::debug!(key, bytes = payload.len(), "saved"),
        Err(e) => tracing::error!(key, error = %e, "failed to save to storage"),
    }
}

/// Remove a single key. Returns whether anything was removed.
pub(crate) fn clear(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.remove(key) {
        Ok(removed) => removed,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to clear storage key");
            false
        }
    }
}

/// Every stored entry as parsed JSON. Unparseable payloads show up as `null`.
pub(crate) fn dump(store: &dyn KeyValueStore) -> BTreeMap<String, serde_json::Value> {
    let entries = match store.entries() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "failed to read storage entries");
            return BTreeMap::new();
        }
    };
    entries
        .into_iter()
        .map(|(key, raw)| {
            let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);
            (key, value)
        })
        .collect()
}
