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

//! Application event distribution and orchestration.
//!
//! This module defines the central event-handling logic for the application,
//! bridging the gap between user input (keyboard), background worker updates
//! (content API, audio output), and the UI rendering pipeline.
//!
//! # Architecture
//!
//! The system follows a reactive event-loop pattern:
//!
//! 1. **Capture**: Events are received via the [`AppEvent`] enum through an
//!    asynchronous channel.
//! 2. **Process**: The [`process_events`] function updates the [`App`] state,
//!    triggers tasks on the background worker and drives the sample
//!    controller and the summary player.
//! 3. **Render**: After each event is processed, the UI is re-drawn using the
//!    `ratatui` terminal.
//!
//! Everything here runs on the UI thread, which makes it the only thread
//! that touches the sample controller or the summary player.

mod handlers;
mod key_handlers;

use handlers::*;
use key_handlers::process_key_event;

use std::{io::Stdout, time::Duration};

use anyhow::{Result, bail};
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};

use crate::{
    App, MainView,
    model::{BookStatus, BookSummary},
    player::{SampleEvent, TrackEvent},
    render::draw,
};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    SetMainView(MainView),

    CatalogLoading(Option<BookStatus>),
    CatalogLoaded(Vec<BookSummary>),
    CatalogFailed(String),

    SearchResultsReady(u64, Vec<BookSummary>),
    SearchFailed(u64, String),
    BookDetailsReady(BookSummary),

    PlaySample(String),
    StopSample,
    Sample(SampleEvent),

    ListenBook(String),
    ToggleSummary,
    SeekSummary(Duration),
    CloseSummary,
    Track(TrackEvent),

    Tick,

    ExitApplication,

    Error(String),
    FatalError(String),
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
///
/// # Errors
///
/// Returns an error on a fatal worker failure, if a task cannot be handed to
/// the task worker, or if drawing fails.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::FatalError(message) => bail!(message),

            AppEvent::Key(key) => process_key_event(app, key)?,
            AppEvent::SetMainView(view) => handle_set_main_view(app, view),
            AppEvent::CatalogLoading(only) => handle_catalog_loading(app, only),
            AppEvent::CatalogLoaded(books) => handle_catalog_loaded(app, books),
            AppEvent::CatalogFailed(reason) => handle_catalog_failed(app, reason),
            AppEvent::SearchResultsReady(generation, books) => {
                handle_search_results_ready(app, generation, books)
            }
            AppEvent::SearchFailed(generation, message) => {
                handle_search_failed(app, generation, message)
            }
            AppEvent::BookDetailsReady(book) => handle_book_details_ready(app, book),
            AppEvent::PlaySample(id) => handle_play_sample(app, &id),
            AppEvent::StopSample => app.sampler.stop_sample(),
            AppEvent::Sample(sample_event) => app.sampler.handle_event(sample_event),
            AppEvent::ListenBook(id) => handle_listen_book(app, &id),
            AppEvent::ToggleSummary => toggle_summary(app),
            AppEvent::SeekSummary(position) => app.listener.seek_to(position),
            AppEvent::CloseSummary => app.listener.close(),
            AppEvent::Track(track_event) => app.listener.handle_event(track_event),
            AppEvent::Tick => handle_tick(app)?,
            AppEvent::Error(message) => handle_error(app, message),
        }

        collect_playback_errors(app);

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}
