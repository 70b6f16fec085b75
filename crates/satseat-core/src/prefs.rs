//! Persisted user inputs: the last zip code and distance threshold.
//!
//! Both are stored as the raw strings the user typed, each under its own key,
//! and restored on start-up.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::cache::KeyValueStore;

pub const ZIP_KEY: &str = "zipInput";
pub const DISTANCE_KEY: &str = "distanceInput";

/// Distance threshold in miles when none has been saved.
pub const DEFAULT_DISTANCE_MILES: f64 = 25.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub zip: Option<String>,
    pub distance: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            zip: None,
            distance: DEFAULT_DISTANCE_MILES,
        }
    }
}

pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Restore saved preferences. An unreadable or unparseable distance falls
    /// back to the default rather than failing start-up.
    pub fn load(&self) -> Result<Preferences> {
        let zip = self
            .store
            .get(ZIP_KEY)?
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty());

        let distance = match self.store.get(DISTANCE_KEY)? {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(d) if d.is_finite() && d >= 0.0 => d,
                _ => {
                    warn!(value = %raw, "Ignoring saved distance");
                    DEFAULT_DISTANCE_MILES
                }
            },
            None => DEFAULT_DISTANCE_MILES,
        };

        Ok(Preferences { zip, distance })
    }

    pub fn save_zip(&self, zip: &str) -> Result<()> {
        self.store.set(ZIP_KEY, zip).context("Failed to save zip code")
    }

    pub fn save_distance(&self, raw: &str) -> Result<()> {
        self.store
            .set(DISTANCE_KEY, raw)
            .context("Failed to save distance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[test]
    fn test_defaults_when_empty() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStore::new()));
        let loaded = prefs.load().unwrap();
        assert_eq!(loaded, Preferences::default());
        assert_eq!(loaded.distance, 25.0);
    }

    #[test]
    fn test_saved_values_are_restored() {
        let store = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(store.clone());
        prefs.save_zip("10001").unwrap();
        prefs.save_distance("10").unwrap();

        let reopened = PreferenceStore::new(store);
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.zip.as_deref(), Some("10001"));
        assert_eq!(loaded.distance, 10.0);
    }

    #[test]
    fn test_bad_distance_falls_back_to_default() {
        let store = Arc::new(MemoryStore::new());
        store.set(DISTANCE_KEY, "far").unwrap();
        store.set(ZIP_KEY, "   ").unwrap();
        let loaded = PreferenceStore::new(store).load().unwrap();
        assert_eq!(loaded.distance, DEFAULT_DISTANCE_MILES);
        assert_eq!(loaded.zip, None);
    }
}
