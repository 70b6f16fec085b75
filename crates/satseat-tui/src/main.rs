//! satseat - find SAT test centers with open seats from the terminal.
//!
//! Runs the interactive TUI by default. `--refresh [ZIP]` and `--print`
//! run headless and write a plain-text table to stdout.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use satseat_core::controller::validate_zip;
use satseat_core::{
    build_rows, fetch_and_store, header_text, ApiClient, CacheManager, Config, FileStore,
    KeyValueStore, PreferenceStore, ResultRow,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppMode};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_NAME: &str = "satseat.log";

const USAGE: &str = "\
Usage: satseat [OPTIONS]

Options:
  --refresh [ZIP]  Fetch availability, update the cache and print the table
  --print          Print the cached table without touching the network
  -h, --help       Show this message

Set RUST_LOG (e.g. RUST_LOG=debug) to control logging.";

/// What the command line asked for
#[derive(Debug, PartialEq)]
enum Command {
    Tui,
    Refresh(Option<String>),
    Print,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Tui),
        [flag] if flag == "--print" => Ok(Command::Print),
        [flag] if flag == "--help" || flag == "-h" => Ok(Command::Help),
        [flag] if flag == "--refresh" => Ok(Command::Refresh(None)),
        [flag, zip] if flag == "--refresh" => Ok(Command::Refresh(Some(zip.clone()))),
        _ => bail!("Unrecognized arguments: {}\n\n{}", args.join(" "), USAGE),
    }
}

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a file so output does not tear the terminal UI.
/// The returned guard flushes pending lines when dropped.
fn init_file_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Print => {
            init_stderr_tracing();
            let store = open_store(&load_config())?;
            print!("{}", cached_table(store)?);
            Ok(())
        }
        Command::Refresh(zip) => {
            init_stderr_tracing();
            refresh(zip).await
        }
        Command::Tui => run_tui().await,
    }
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: failed to load config ({:#}), using defaults", e);
        Config::default()
    })
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(FileStore::new(config.cache_dir()?)?))
}

// ============================================================================
// Headless commands
// ============================================================================

async fn refresh(zip_arg: Option<String>) -> Result<()> {
    let config = load_config();
    let store = open_store(&config)?;
    let prefs = PreferenceStore::new(Arc::clone(&store));
    let cache = CacheManager::new(Arc::clone(&store));

    let saved = prefs.load()?;
    let zip = match zip_arg {
        Some(raw) => {
            let zip = validate_zip(&raw)?;
            prefs.save_zip(&zip)?;
            zip
        }
        None => saved
            .zip
            .clone()
            .context("No saved zip code; pass one with --refresh ZIP")?,
    };

    let api = ApiClient::with_urls(config.sessions_url(), config.test_centers_url())?;
    eprintln!("Fetching availability near {}...", zip);
    let entry = fetch_and_store(&api, &cache, &zip, config.max_concurrent_requests()).await?;
    info!(zip = %zip, schools = entry.school_count(), "Headless refresh complete");

    print!(
        "{}",
        format_table(&header_text(&zip), &build_rows(&entry.groups, saved.distance))
    );
    Ok(())
}

/// The cached table for the saved zip code and distance.
fn cached_table(store: Arc<dyn KeyValueStore>) -> Result<String> {
    let prefs = PreferenceStore::new(Arc::clone(&store)).load()?;
    let Some(entry) = CacheManager::new(store).load_entry()? else {
        bail!("Nothing cached yet; run with --refresh ZIP first");
    };
    let header = header_text(prefs.zip.as_deref().unwrap_or(""));
    let mut out = format_table(&header, &build_rows(&entry.groups, prefs.distance));
    out.push_str(&format!("\nUpdated {}\n", entry.age_display()));
    Ok(out)
}

fn format_table(header: &str, rows: &[ResultRow]) -> String {
    let mut out = format!("{}\n", header);
    if !rows.iter().any(ResultRow::is_school) {
        out.push_str("No test centers with open seats within this distance.\n");
        return out;
    }
    for row in rows {
        match row {
            ResultRow::Date { display_date } => out.push_str(&format!("\n{}\n", display_date)),
            ResultRow::School {
                name,
                address,
                distance,
                ..
            } => out.push_str(&format!("  {:<40} {:<50} {:>10}\n", name, address, distance)),
        }
    }
    out
}

// ============================================================================
// Terminal UI
// ============================================================================

async fn run_tui() -> Result<()> {
    let config = load_config();
    let _guard = init_file_tracing(&config.log_dir()?)?;
    info!("satseat starting");

    let mut app = App::new()?;
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("satseat shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so finished fetches show up without a key press
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if matches!(app.mode, AppMode::Quitting) {
            return Ok(());
        }
    }
}
