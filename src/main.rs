// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Book Summary Browser TUI.
//!
//! A terminal client for a book summary service: browse the curated lists,
//! search by title or author, preview audio samples and listen to full
//! summaries.
//!
//! This application coordinates a TUI frontend built with `ratatui` and a
//! background processing layer.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle, UI rendering, the
//!   sample controller and the summary player.
//! * **Background Workers** handle content API requests and audio output via
//!   asynchronous command processing.
//! * **Event Loops** capture user input and system ticks to drive the UI
//!   state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.

mod api;
mod commander;
mod components;
mod config;
mod events;
mod logging;
mod model;
mod player;
mod render;
mod tasks;
mod theme;
mod util;

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};
use tracing::{error, info};

use crate::{
    commander::Commander,
    components::{CatalogView, SearchView},
    config::AppConfig,
    events::{AppEvent, process_events},
    model::{BookSummary, catalog::Catalog, search::Search},
    player::{
        PlatformOutput, PlatformTrackOutput, SampleAudioController, SummaryPlayer,
        platform_output, platform_track_output,
    },
    tasks::AppTask,
    theme::Theme,
};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq)]
enum MainView {
    Catalog,
    Search,
}

/// Application state.
struct App {
    pub config: AppConfig,

    pub theme: Theme,
    pub main_view: MainView,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub task_tx: Sender<AppTask>,

    pub catalog: Catalog,
    pub search: Search,

    pub catalog_view: CatalogView,
    pub search_view: SearchView,

    pub commander: Commander,

    pub sampler: SampleAudioController<PlatformOutput>,
    pub listener: SummaryPlayer<PlatformTrackOutput>,

    /// The most recently selected or fetched book.
    pub details: Option<BookSummary>,
    /// The latest error or notice for the status line.
    pub status: Option<String>,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: AppConfig, task_tx: Sender<AppTask>) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();

        let output = platform_output(event_tx.clone()).context("Failed to initialise audio output")?;
        let sampler = SampleAudioController::new(output, config.sample_volume);

        let track_output =
            platform_track_output(event_tx.clone()).context("Failed to initialise summary output")?;
        let listener = SummaryPlayer::new(track_output, config.summary_volume);

        let search = Search::new(config.search_debounce());

        Ok(Self {
            config,
            theme: Theme::default(),
            main_view: MainView::Catalog,
            event_tx,
            event_rx,
            task_tx,
            catalog: Catalog::new(),
            search,
            catalog_view: CatalogView::new(),
            search_view: SearchView::new(),
            commander: Commander::new(),
            sampler,
            listener,
            details: None,
            status: None,
        })
    }
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state, manages the terminal lifecycle, and returns an error if
/// any part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    // The guard flushes the log file on exit.
    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };

    info!(version = env!("CARGO_PKG_VERSION"), "Starting");

    let (task_tx, task_rx) = mpsc::channel();

    let mut app = App::new(config, task_tx).context("Failed to initalise application")?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut app, task_rx);

    // Silence the audio before handing the terminal back.
    app.sampler.shutdown();
    app.listener.shutdown();
    restore_terminal(&mut terminal);

    if let Err(e) = &res {
        error!(error = %format!("{e:#}"), "Application error");
    }
    info!("Exiting");

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`] and makes the cursor
/// visible again.
///
/// This function is "best-effort" and does not return a result, as it is
/// typically called during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
}

/// Starts the application's background workers and enters the main event loop.
///
/// This function spawns several long-running background threads:
/// * A task worker to process asynchronous [`AppTask`]s.
/// * An input thread to poll for system keyboard events.
/// * A tick thread that drives the search debounce, the preview limit and
///   the elapsed time display.
///
/// After spawning the workers, it hands control to [`process_events`] to
/// manage the UI and state updates.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    task_rx: Receiver<AppTask>,
) -> Result<()> {
    tasks::spawn_task_worker(&app.config, task_rx, app.event_tx.clone());

    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event::Event::Key(key)) = event::read() {
                if tx_keys.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
        }
    });

    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    // Initial trigger to populate the catalog from every status list
    app.task_tx
        .send(AppTask::LoadCatalog(None))
        .context("Failed to start loading the catalog")?;

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
