use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::DateGroup;

use super::KeyValueStore;

/// Store key holding the serialized date groups.
pub const DATA_KEY: &str = "data";

/// Store key holding the fetch timestamp in milliseconds since the epoch.
pub const TIME_KEY: &str = "time";

/// Cached data older than this triggers a background refresh on start-up.
pub const DEFAULT_STALE_AFTER_HOURS: i64 = 12;

/// Everything one successful fetch produced, plus when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Ascending by date.
    pub groups: Vec<DateGroup>,
    pub fetched_at_ms: i64,
}

impl CacheEntry {
    pub fn new(groups: Vec<DateGroup>) -> Self {
        Self {
            groups,
            fetched_at_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        elapsed_since(Some(self.fetched_at_ms), now.timestamp_millis())
    }

    /// Age for the status bar, e.g. `just now`, `42m ago`, `3h ago`.
    pub fn age_display(&self) -> String {
        format_age(self.age(Utc::now()))
    }

    pub fn school_count(&self) -> usize {
        self.groups.iter().map(|g| g.schools.len()).sum()
    }
}

/// Coarse age rounded to the nearest unit: minutes under an hour, hours
/// under a day, days beyond.
fn format_age(age: Duration) -> String {
    let rounded = |half: Duration| age.checked_add(&half).unwrap_or(age);
    if age < Duration::minutes(1) {
        "just now".to_string()
    } else if age < Duration::hours(1) {
        format!("{}m ago", age.num_minutes())
    } else if age < Duration::days(1) {
        format!("{}h ago", rounded(Duration::minutes(30)).num_hours())
    } else {
        format!("{}d ago", rounded(Duration::hours(12)).num_days())
    }
}

/// Time elapsed since `then_ms`. A missing timestamp counts as "now", and a
/// timestamp in the future (clock skew) counts as zero.
pub fn elapsed_since(then_ms: Option<i64>, now_ms: i64) -> Duration {
    match then_ms {
        Some(then) => Duration::milliseconds(now_ms.saturating_sub(then).max(0)),
        None => Duration::zero(),
    }
}

/// Reads and writes the cache entry under the `data` and `time` keys.
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the stored entry.
    pub fn save_entry(&self, entry: &CacheEntry) -> Result<()> {
        let contents = serde_json::to_string(&entry.groups)?;
        self.store
            .set(DATA_KEY, &contents)
            .context("Failed to write cached data")?;
        self.store
            .set(TIME_KEY, &entry.fetched_at_ms.to_string())
            .context("Failed to write cache timestamp")?;
        debug!(groups = entry.groups.len(), "Cache entry saved");
        Ok(())
    }

    /// Load the stored entry, if any. A missing timestamp is read as "now".
    pub fn load_entry(&self) -> Result<Option<CacheEntry>> {
        let Some(contents) = self.store.get(DATA_KEY)? else {
            return Ok(None);
        };
        let groups: Vec<DateGroup> =
            serde_json::from_str(&contents).context("Failed to parse cached data")?;
        let fetched_at_ms = self
            .last_fetch_ms()?
            .unwrap_or_else(|| Utc::now().timestamp_millis());
        Ok(Some(CacheEntry {
            groups,
            fetched_at_ms,
        }))
    }

    /// Timestamp of the last successful fetch. Unparseable values are
    /// logged and treated as missing.
    pub fn last_fetch_ms(&self) -> Result<Option<i64>> {
        let Some(raw) = self.store.get(TIME_KEY)? else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        let parsed = trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64));
        if parsed.is_none() {
            warn!(value = %trimmed, "Ignoring unparseable cache timestamp");
        }
        Ok(parsed)
    }

    /// Time since the last successful fetch, zero if none is recorded.
    pub fn elapsed_since_fetch(&self, now: DateTime<Utc>) -> Duration {
        let then = match self.last_fetch_ms() {
            Ok(then) => then,
            Err(e) => {
                debug!(error = %e, "Failed to read cache timestamp");
                None
            }
        };
        elapsed_since(then, now.timestamp_millis())
    }
}

// ============================================================================
// Tests
// ============================================================================
