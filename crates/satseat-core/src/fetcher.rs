//! Fetching seat availability for a zip code.
//!
//! One sessions request lists the test dates; then one test-center search
//! per date runs with bounded concurrency. The result is all-or-nothing: if
//! any request fails, no groups are returned and nothing is cached.

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::ApiError;
use crate::cache::{CacheEntry, CacheManager};
use crate::models::{is_eligible, normalize_school, sort_by_date, DateGroup, RawSchool, Session};

/// Default number of test-center searches in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 6;

/// Where availability comes from. Implemented by [`crate::api::ApiClient`].
pub trait AvailabilitySource: Sync {
    fn sessions(&self) -> impl Future<Output = Result<Vec<Session>, ApiError>> + Send;

    fn test_centers(
        &self,
        date_key: &str,
        zip: &str,
    ) -> impl Future<Output = Result<Vec<RawSchool>, ApiError>> + Send;
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to store fetched data: {0:#}")]
    Storage(anyhow::Error),
}

/// Fetch every test date and its eligible schools near `zip`, sorted by date.
pub async fn fetch_availability<S: AvailabilitySource>(
    source: &S,
    zip: &str,
    max_concurrent: usize,
) -> Result<Vec<DateGroup>, ApiError> {
    info!(zip = %zip, "Fetching seat availability");

    let sessions = source.sessions().await?;
    debug!(count = sessions.len(), "Received testing dates, scanning for centers");

    let searches = sessions.into_iter().map(|session| async move {
        let raw = source.test_centers(&session.date_key, zip).await?;
        let schools: Vec<_> = raw.iter().filter(|s| is_eligible(s)).map(normalize_school).collect();
        debug!(date = %session.date_key, schools = schools.len(), "Added schools for date");
        Ok::<_, ApiError>(DateGroup::new(session, schools))
    });

    let mut groups: Vec<DateGroup> = stream::iter(searches)
        .buffer_unordered(max_concurrent.max(1))
        .try_collect()
        .await?;

    sort_by_date(&mut groups);

    info!(
        zip = %zip,
        dates = groups.len(),
        schools = groups.iter().map(|g| g.schools.len()).sum::<usize>(),
        "Finished fetching availability"
    );
    Ok(groups)
}

/// Fetch availability and overwrite the cache entry with it.
/// The cache is only written once every request has succeeded.
pub async fn fetch_and_store<S: AvailabilitySource>(
    source: &S,
    cache: &CacheManager,
    zip: &str,
    max_concurrent: usize,
) -> Result<CacheEntry, FetchError> {
    let groups = fetch_availability(source, zip, max_concurrent).await?;
    let entry = CacheEntry::new(groups);
    cache.save_entry(&entry).map_err(FetchError::Storage)?;
    Ok(entry)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cache::MemoryStore;

    /// In-memory stand-in for the College Board endpoints.
    #[derive(Default)]
    struct FakeSource {
        sessions: Vec<Session>,
        centers: HashMap<String, Vec<RawSchool>>,
        failing_date: Option<String>,
        fail_sessions: bool,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        queried: Mutex<Vec<(String, String)>>,
    }

    impl FakeSource {
        fn with_dates(dates: &[(&str, &str)]) -> Self {
            Self {
                sessions: dates.iter().map(|(k, d)| Session::new(*k, *d)).collect(),
                ..Default::default()
            }
        }

        fn centers(mut self, date: &str, schools: Vec<RawSchool>) -> Self {
            self.centers.insert(date.to_string(), schools);
            self
        }
    }

    impl AvailabilitySource for FakeSource {
        async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
            if self.fail_sessions {
                return Err(ApiError::InvalidResponse("not json".into()));
            }
            Ok(self.sessions.clone())
        }

        async fn test_centers(&self, date_key: &str, zip: &str) -> Result<Vec<RawSchool>, ApiError> {
            self.queried
                .lock()
                .unwrap()
                .push((date_key.to_string(), zip.to_string()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing_date.as_deref() == Some(date_key) {
                return Err(ApiError::ServerError("boom".into()));
            }
            Ok(self.centers.get(date_key).cloned().unwrap_or_default())
        }
    }

    fn open_school(distance: f64) -> RawSchool {
        RawSchool {
            distance: Some(distance),
            seat_availability: Some(true),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_date_with_defaulted_school() {
        let source = FakeSource::with_dates(&[("2024-03-09", "March 9, 2024")])
            .centers("2024-03-09", vec![open_school(3.14)]);

        let groups = fetch_availability(&source, "10001", 4).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].session.display_date, "March 9, 2024");
        assert_eq!(groups[0].schools.len(), 1);
        let school = &groups[0].schools[0];
        assert_eq!(school.name, "Unknown School");
        assert_eq!(school.address, "Address City State Zip");
        assert_eq!(school.distance_display(), "3.14");

        let queried = source.queried.lock().unwrap().clone();
        assert_eq!(queried, vec![("2024-03-09".to_string(), "10001".to_string())]);
    }

    #[tokio::test]
    async fn test_only_schools_with_seats_are_kept() {
        let full = RawSchool {
            name: Some("FULL HIGH".into()),
            seat_availability: Some(false),
            ..Default::default()
        };
        let unknown = RawSchool {
            name: Some("MAYBE HIGH".into()),
            ..Default::default()
        };
        let source = FakeSource::with_dates(&[("2024-03-09", "March 9")])
            .centers("2024-03-09", vec![full, open_school(1.0), unknown, open_school(2.0)]);

        let groups = fetch_availability(&source, "10001", 4).await.unwrap();
        let distances: Vec<f64> = groups[0].schools.iter().map(|s| s.distance).collect();
        assert_eq!(distances, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_groups_sorted_by_date_regardless_of_completion_order() {
        let source = FakeSource::with_dates(&[
            ("2024-12-07", "December 7"),
            ("2024-03-09", "March 9"),
            ("2024-10-05", "October 5"),
            ("2024-05-04", "May 4"),
        ]);

        let groups = fetch_availability(&source, "10001", 2).await.unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.session.date_key.as_str()).collect();
        assert_eq!(keys, ["2024-03-09", "2024-05-04", "2024-10-05", "2024-12-07"]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let dates: Vec<(String, String)> = (1..=9)
            .map(|d| (format!("2024-03-0{}", d), format!("March {}", d)))
            .collect();
        let refs: Vec<(&str, &str)> = dates.iter().map(|(k, d)| (k.as_str(), d.as_str())).collect();
        let source = FakeSource::with_dates(&refs);

        let groups = fetch_availability(&source, "10001", 3).await.unwrap();
        assert_eq!(groups.len(), 9);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_sessions_failure_is_api_error() {
        let source = FakeSource {
            fail_sessions: true,
            ..Default::default()
        };
        let err = fetch_availability(&source, "10001", 4).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_one_failed_date_fails_whole_fetch_and_skips_cache() {
        let mut source = FakeSource::with_dates(&[("2024-03-09", "March 9"), ("2024-05-04", "May 4")])
            .centers("2024-03-09", vec![open_school(1.0)]);
        source.failing_date = Some("2024-05-04".into());

        let cache = CacheManager::new(Arc::new(MemoryStore::new()));
        let previous = CacheEntry {
            groups: vec![],
            fetched_at_ms: 42,
        };
        cache.save_entry(&previous).unwrap();

        let err = fetch_and_store(&source, &cache, "10001", 4).await.unwrap_err();
        assert!(matches!(err, FetchError::Api(ApiError::ServerError(_))));
        assert_eq!(cache.load_entry().unwrap().unwrap(), previous);
    }

    #[tokio::test]
    async fn test_fetch_and_store_writes_entry() {
        let source = FakeSource::with_dates(&[("2024-03-09", "March 9, 2024")])
            .centers("2024-03-09", vec![open_school(3.14)]);
        let cache = CacheManager::new(Arc::new(MemoryStore::new()));

        let entry = fetch_and_store(&source, &cache, "10001", 4).await.unwrap();
        assert_eq!(cache.load_entry().unwrap().unwrap(), entry);
        assert_eq!(cache.last_fetch_ms().unwrap(), Some(entry.fetched_at_ms));
    }

    #[tokio::test]
    async fn test_no_sessions_yields_empty_result() {
        let source = FakeSource::default();
        let groups = fetch_availability(&source, "10001", 4).await.unwrap();
        assert!(groups.is_empty());
    }
}
