//! Application state management for satseat.
//!
//! This module contains the `App` struct that owns the UI state, the loaded
//! cache entry and the channel that background fetches report back on.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use satseat_core::cache::CacheManager;
use satseat_core::controller::{self, AppState, Completion, FetchTicket, SubmitAction};
use satseat_core::fetcher::{fetch_availability, FetchError};
use satseat_core::view::{build_rows, header_text, ResultRow};
use satseat_core::{ApiClient, ApiError, CacheEntry, Config, DateGroup, FileStore, KeyValueStore, PreferenceStore};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background fetch channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Longest distance input accepted, in characters.
const MAX_DISTANCE_INPUT_LENGTH: usize = 8;

/// Zip codes are five digits.
const MAX_ZIP_INPUT_LENGTH: usize = 5;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Editing(Field),
    ShowingHelp,
    /// Blocking notification; any other input is ignored until dismissed.
    ShowingAlert,
    ConfirmingQuit,
    Quitting,
}

/// Search form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Zip,
    Distance,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Zip => Field::Distance,
            Field::Distance => Field::Zip,
        }
    }
}

/// Result of a background fetch, tagged with the ticket it was started with.
struct FetchMessage {
    ticket: FetchTicket,
    result: Result<Vec<DateGroup>, ApiError>,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub cache: CacheManager,
    pub prefs: PreferenceStore,

    /// Loaded entry, last fetched zip and fetch generations
    pub state: AppState,

    // UI State
    pub mode: AppMode,
    pub zip_input: String,
    pub distance_input: String,
    pub input_error: Option<String>,
    pub alert: Option<String>,
    pub status_message: Option<String>,

    /// Zip code the table is showing results for
    pub active_zip: Option<String>,
    /// Distance threshold in miles
    pub distance: f64,

    // Rendered table
    pub header: String,
    pub rows: Vec<ResultRow>,
    pub selection: usize,

    // Background fetch channel
    fetch_rx: mpsc::Receiver<FetchMessage>,
    fetch_tx: mpsc::Sender<FetchMessage>,
}

impl App {
    /// Create the application from the on-disk config and store
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(cache_dir)?);
        let api = ApiClient::with_urls(config.sessions_url(), config.test_centers_url())?;
        Self::with_parts(config, api, store)
    }

    /// Assemble the application from explicit parts and restore saved state
    pub fn with_parts(config: Config, api: ApiClient, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let cache = CacheManager::new(Arc::clone(&store));
        let prefs = PreferenceStore::new(store);

        let saved = prefs.load()?;
        let entry = match cache.load_entry() {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache");
                None
            }
        };
        // Without an entry there is nothing the saved zip was fetched for
        let last_fetched_zip = entry.as_ref().and(saved.zip.clone());

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            api,
            cache,
            prefs,

            state: AppState::new(entry, last_fetched_zip),

            mode: AppMode::Normal,
            zip_input: saved.zip.clone().unwrap_or_default(),
            distance_input: format_distance_input(saved.distance),
            input_error: None,
            alert: None,
            status_message: None,

            active_zip: saved.zip,
            distance: saved.distance,

            header: String::new(),
            rows: Vec::new(),
            selection: 0,

            fetch_rx: rx,
            fetch_tx: tx,
        })
    }

    // =========================================================================
    // Start-up
    // =========================================================================

    /// Show cached results and kick off a refresh when they are stale.
    pub fn start(&mut self) {
        let elapsed = self.cache.elapsed_since_fetch(Utc::now());
        let plan = controller::load_plan(elapsed, self.state.entry.is_some(), self.config.stale_after());
        info!(
            elapsed_hours = elapsed.num_minutes() as f64 / 60.0,
            render_cached = plan.render_cached,
            refresh = plan.refresh,
            "Start-up plan"
        );

        if plan.render_cached {
            self.render_view();
        }

        if plan.refresh {
            match self.active_zip.clone() {
                Some(zip) => self.start_fetch(&zip),
                None => debug!("Cache is stale but no zip code is saved"),
            }
        }
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// Submit the zip field. Invalid input is reported and nothing else happens.
    pub fn submit_zip(&mut self) {
        let zip = match controller::validate_zip(&self.zip_input) {
            Ok(zip) => zip,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return;
            }
        };
        self.input_error = None;
        self.zip_input = zip.clone();
        self.mode = AppMode::Normal;

        if let Err(e) = self.prefs.save_zip(&zip) {
            warn!(error = %e, "Failed to save zip code");
        }
        self.active_zip = Some(zip.clone());

        match controller::submit_action(&zip, self.state.last_fetched_zip.as_deref()) {
            SubmitAction::Fetch => self.start_fetch(&zip),
            SubmitAction::Render => self.render_view(),
        }
    }

    /// Submit the distance field. Filtering is local, so this never fetches.
    pub fn submit_distance(&mut self) {
        let distance = match controller::parse_distance(&self.distance_input) {
            Ok(d) => d,
            Err(e) => {
                self.input_error = Some(e.to_string());
                return;
            }
        };
        self.input_error = None;
        self.mode = AppMode::Normal;
        self.distance = distance;

        if let Err(e) = self.prefs.save_distance(self.distance_input.trim()) {
            warn!(error = %e, "Failed to save distance");
        }
        self.render_view();
    }

    /// Fetch again for the current zip code regardless of cache age.
    pub fn refresh(&mut self) {
        match self.active_zip.clone() {
            Some(zip) => self.start_fetch(&zip),
            None => {
                self.status_message = Some("Enter a zip code first".to_string());
            }
        }
    }

    // =========================================================================
    // Background Fetch
    // =========================================================================

    /// Spawn a background fetch for `zip`. Results arrive through
    /// `check_background_tasks`.
    pub fn start_fetch(&mut self, zip: &str) {
        let ticket = self.state.begin_fetch(zip);
        info!(zip = %zip, generation = ticket.generation, "Starting background fetch");

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let max_concurrent = self.config.max_concurrent_requests();

        tokio::spawn(async move {
            let result = fetch_availability(&api, &ticket.zip, max_concurrent).await;
            if let Err(e) = tx.send(FetchMessage { ticket, result }).await {
                error!(error = %e, "Failed to send fetch result - channel closed");
            }
        });

        self.status_message = Some("Fetching data...".to_string());
    }

    /// Process every fetch result that has arrived since the last call
    pub fn check_background_tasks(&mut self) {
        while let Ok(message) = self.fetch_rx.try_recv() {
            self.process_fetch_result(message);
        }
    }

    /// Wait for the next fetch result and process it.
    #[cfg(test)]
    async fn wait_for_fetch(&mut self) {
        if let Some(message) = self.fetch_rx.recv().await {
            self.process_fetch_result(message);
        }
    }

    fn process_fetch_result(&mut self, message: FetchMessage) {
        let FetchMessage { ticket, result } = message;
        if !self.state.is_current(&ticket) {
            debug!(generation = ticket.generation, zip = %ticket.zip, "Discarding superseded fetch");
            return;
        }

        // Only the newest fetch may overwrite the cache
        let result = result.map_err(FetchError::from).and_then(|groups| {
            let entry = CacheEntry::new(groups);
            self.cache
                .save_entry(&entry)
                .map_err(FetchError::Storage)?;
            Ok(entry)
        });

        let alert = match &result {
            Ok(_) => None,
            Err(FetchError::Api(e)) => {
                error!(error = %e, zip = %ticket.zip, "Fetch failed");
                Some(ApiError::USER_MESSAGE.to_string())
            }
            Err(e @ FetchError::Storage(_)) => {
                error!(error = %e, "Failed to cache fetched data");
                Some(e.to_string())
            }
        };

        match self.state.complete_fetch(&ticket, result) {
            Completion::Applied => {
                let count = self.state.entry.as_ref().map_or(0, |e| e.school_count());
                info!(zip = %ticket.zip, schools = count, "Fetch applied");
                self.status_message = None;
                self.render_view();
            }
            Completion::Failed => {
                self.status_message = None;
                self.show_alert(alert.unwrap_or_else(|| ApiError::USER_MESSAGE.to_string()));
            }
            Completion::Stale => {}
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Rebuild the table from the loaded entry and distance threshold.
    /// Does nothing until an entry has been loaded.
    pub fn render_view(&mut self) {
        let Some(entry) = self.state.entry.as_ref() else {
            return;
        };

        let zip = self
            .state
            .last_fetched_zip
            .as_deref()
            .or(self.active_zip.as_deref())
            .unwrap_or("");
        self.header = header_text(zip);
        self.rows = build_rows(&entry.groups, self.distance);
        self.selection = self.first_school_row().unwrap_or(0);
        debug!(rows = self.rows.len(), distance = self.distance, "Table rebuilt");
    }

    pub fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.mode = AppMode::ShowingAlert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mode = AppMode::Normal;
    }

    /// Age of the loaded data for the status bar
    pub fn last_updated(&self) -> String {
        self.state
            .entry
            .as_ref()
            .map(|e| e.age_display())
            .unwrap_or_else(|| "never".to_string())
    }

    pub fn selected_row(&self) -> Option<&ResultRow> {
        self.rows.get(self.selection)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn first_school_row(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.is_school())
    }

    /// Move the selection by `delta` school rows, skipping date headers.
    pub fn move_selection(&mut self, delta: isize) {
        let schools: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_school())
            .map(|(i, _)| i)
            .collect();
        if schools.is_empty() {
            return;
        }

        let current = schools
            .iter()
            .position(|&i| i >= self.selection)
            .unwrap_or(schools.len() - 1);
        let target = (current as isize + delta).clamp(0, schools.len() as isize - 1);
        self.selection = schools[target as usize];
    }

    pub fn select_first(&mut self) {
        self.selection = self.first_school_row().unwrap_or(0);
    }

    pub fn select_last(&mut self) {
        self.selection = self.rows.iter().rposition(|r| r.is_school()).unwrap_or(0);
    }

    // =========================================================================
    // Form editing
    // =========================================================================

    pub fn start_editing(&mut self, field: Field) {
        self.input_error = None;
        self.mode = AppMode::Editing(field);
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        match field {
            Field::Zip => {
                if can_add_zip_char(self.zip_input.len(), c) {
                    self.zip_input.push(c);
                }
            }
            Field::Distance => {
                if can_add_distance_char(self.distance_input.len(), c) {
                    self.distance_input.push(c);
                }
            }
        }
    }

    pub fn pop_char(&mut self, field: Field) {
        match field {
            Field::Zip => self.zip_input.pop(),
            Field::Distance => self.distance_input.pop(),
        };
    }

    /// Leave the form, restoring the fields to the values in effect.
    pub fn cancel_editing(&mut self) {
        self.zip_input = self.active_zip.clone().unwrap_or_default();
        self.distance_input = format_distance_input(self.distance);
        self.input_error = None;
        self.mode = AppMode::Normal;
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a zip code character should be accepted
pub fn can_add_zip_char(current_len: usize, c: char) -> bool {
    current_len < MAX_ZIP_INPUT_LENGTH && c.is_ascii_digit()
}

/// Check if a distance character should be accepted
pub fn can_add_distance_char(current_len: usize, c: char) -> bool {
    current_len < MAX_DISTANCE_INPUT_LENGTH && (c.is_ascii_digit() || c == '.')
}

/// `25.0` displays as `25`, `7.5` as `7.5`
fn format_distance_input(distance: f64) -> String {
    if distance.fract() == 0.0 {
        format!("{:.0}", distance)
    } else {
        distance.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
