//! Decisions behind the user-facing triggers: submitting a zip code,
//! changing the distance threshold, and start-up.
//!
//! `AppState` holds the loaded cache entry and the last zip code that was
//! fetched successfully. Every fetch gets a generation number; a completion
//! that is no longer the newest is discarded, so two overlapping fetches can
//! never leave the older result on screen.

use chrono::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cache::CacheEntry;

/// Zip codes are US five-digit codes.
const ZIP_LEN: usize = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Zip code must be 5 digits")]
    InvalidZip,

    #[error("Distance must be a non-negative number")]
    InvalidDistance,
}

/// Validate a zip code the way the search form does: exactly five digits.
pub fn validate_zip(input: &str) -> Result<String, ValidationError> {
    let zip = input.trim();
    if zip.len() == ZIP_LEN && zip.chars().all(|c| c.is_ascii_digit()) {
        Ok(zip.to_string())
    } else {
        Err(ValidationError::InvalidZip)
    }
}

/// Parse a distance threshold in miles.
pub fn parse_distance(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(d) if d.is_finite() && d >= 0.0 => Ok(d),
        _ => Err(ValidationError::InvalidDistance),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    /// The zip differs from the last successful fetch.
    Fetch,
    /// Same zip: redraw from what is already loaded.
    Render,
}

pub fn submit_action(zip: &str, last_fetched_zip: Option<&str>) -> SubmitAction {
    if last_fetched_zip == Some(zip) {
        SubmitAction::Render
    } else {
        SubmitAction::Fetch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPlan {
    /// Show the cached entry right away.
    pub render_cached: bool,
    /// Start a background refresh.
    pub refresh: bool,
}

/// What to do on start-up given the cache age. Cached data is always shown
/// when present; a refresh is due once the age exceeds `stale_after`.
pub fn load_plan(elapsed: Duration, has_cache: bool, stale_after: Duration) -> LoadPlan {
    LoadPlan {
        render_cached: has_cache,
        refresh: elapsed > stale_after,
    }
}

/// Identifies one fetch so its completion can be matched to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub zip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// A newer fetch was started after this one.
    Stale,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub entry: Option<CacheEntry>,
    /// Zip code the current `entry` was fetched for.
    pub last_fetched_zip: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl AppState {
    pub fn new(entry: Option<CacheEntry>, last_fetched_zip: Option<String>) -> Self {
        Self {
            entry,
            last_fetched_zip,
            ..Default::default()
        }
    }

    pub fn begin_fetch(&mut self, zip: &str) -> FetchTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        debug!(generation = self.generation, zip = %zip, "Fetch started");
        FetchTicket {
            generation: self.generation,
            zip: zip.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply a finished fetch. Stale completions change nothing; a failure
    /// keeps the previous entry and zip marker.
    pub fn complete_fetch<E>(&mut self, ticket: &FetchTicket, result: Result<CacheEntry, E>) -> Completion {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, latest = self.generation, "Discarding stale fetch");
            return Completion::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(entry) => {
                self.entry = Some(entry);
                self.last_fetched_zip = Some(ticket.zip.clone());
                Completion::Applied
            }
            Err(_) => Completion::Failed,
        }
    }
}
