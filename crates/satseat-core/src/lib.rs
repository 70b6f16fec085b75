//! satseat-core: shared logic for finding SAT test centers with open seats.
//!
//! This crate contains:
//! - API client for the College Board test-date and test-center endpoints
//! - Data models and normalization of raw test-center records
//! - The availability fetcher (bounded, all-or-nothing fan-out)
//! - Key-value store, cache manager and saved preferences
//! - The results-table row model and controller decisions
//! - Configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod fetcher;
pub mod models;
pub mod prefs;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheEntry, CacheManager, FileStore, KeyValueStore, MemoryStore};
pub use config::Config;
pub use controller::{AppState, Completion, FetchTicket, LoadPlan, SubmitAction, ValidationError};
pub use fetcher::{fetch_and_store, fetch_availability, AvailabilitySource, FetchError};
pub use models::{DateGroup, RawSchool, School, Session};
pub use prefs::{PreferenceStore, Preferences};
pub use view::{build_rows, header_text, map_search_url, ResultRow};
