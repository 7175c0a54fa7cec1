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

use std::time::Instant;

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    App, MainView,
    config::SearchMode,
    model::{BookStatus, BookSummary, matcher::filter_books, search::SearchRequest},
    tasks::AppTask,
};

pub(super) fn handle_set_main_view(app: &mut App, main_view: MainView) {
    app.search_view.editing = matches!(main_view, MainView::Search) && app.search_view.editing;
    app.main_view = main_view;
}

pub(super) fn handle_catalog_loading(app: &mut App, only: Option<BookStatus>) {
    app.catalog.begin_load(only);
}

pub(super) fn handle_catalog_loaded(app: &mut App, books: Vec<BookSummary>) {
    debug!(count = books.len(), "Catalog loaded");
    app.catalog.finish_load(books);
    app.catalog_view.reset_selection(app.catalog.books().len());

    // A blank search shows the whole catalog, so it has to follow reloads.
    if app.search.query().trim().is_empty() {
        let request = app.search.submit();
        dispatch_search(app, request);
    }
}

pub(super) fn handle_catalog_failed(app: &mut App, reason: String) {
    warn!(%reason, "Catalog failed to load");
    app.status = Some(format!("Could not load books: {reason}"));
    app.catalog.fail_load(reason);
}

pub(super) fn handle_search_results_ready(app: &mut App, generation: u64, books: Vec<BookSummary>) {
    if app.search.accept(generation, books) {
        app.search_view.reset_selection(app.search.results().len());
    } else {
        debug!(generation, "Dropping results of superseded search");
    }
}

/// A failed search clears the previous query's results, so they are not
/// shown as matches for the new one.
pub(super) fn handle_search_failed(app: &mut App, generation: u64, message: String) {
    if app.search.fail(generation) {
        app.search_view.reset_selection(0);
        handle_error(app, format!("Search failed: {message}"));
    } else {
        debug!(generation, "Dropping failure of superseded search");
    }
}

pub(super) fn handle_book_details_ready(app: &mut App, book: BookSummary) {
    app.details = Some(book);
}

/// Plays the sample of the book with this id, if the book is on screen.
pub(super) fn handle_play_sample(app: &mut App, id: &str) {
    match find_listed(app, id) {
        Some(book) if !app.sampler.is_playing(&book.id) => toggle_sample(app, &book),
        Some(_) => {}
        None => app.status = Some(format!("No book with id {id}")),
    }
}

/// Opens the full summary of the book with this id, if the book is on
/// screen or was fetched with `book <id>`.
pub(super) fn handle_listen_book(app: &mut App, id: &str) {
    let book = find_listed(app, id).or_else(|| app.details.clone().filter(|b| b.id == id));

    match book {
        Some(book) => listen_to(app, &book),
        None => app.status = Some(format!("No book with id {id}")),
    }
}

/// Runs timers: issues the debounced search and enforces the preview limit.
pub(super) fn handle_tick(app: &mut App) -> Result<()> {
    if let Some(request) = app.search.poll(Instant::now()) {
        dispatch_search(app, request);
    }

    if let Some(limit) = app.config.preview_limit() {
        app.sampler.enforce_limit(limit);
    }

    Ok(())
}

pub(super) fn handle_error(app: &mut App, message: String) {
    warn!(%message, "Application error");
    app.status = Some(message);
}

/// Moves the latest playback failure, if any, to the status line.
pub(super) fn collect_playback_errors(app: &mut App) {
    if let Some(error) = app.sampler.take_error() {
        app.status = Some(error.to_string());
    }
    if let Some(error) = app.listener.take_error() {
        app.status = Some(error.to_string());
    }
}

/// Answers a search request locally, or hands it to the task worker.
///
/// A blank query shows the catalog unfiltered.
pub(super) fn dispatch_search(app: &mut App, request: SearchRequest) {
    let local = app.catalog.books();

    if request.query.is_empty() || app.config.search_mode == SearchMode::Local {
        let results = filter_books(local, &request.query).into_owned();
        handle_search_results_ready(app, request.generation, results);
        return;
    }

    let task = AppTask::Search {
        request,
        local: local.to_vec(),
    };
    if app.task_tx.send(task).is_err() {
        handle_error(app, "Search is unavailable".to_string());
    }
}

/// Plays the sample of `book`, or stops it if it is the one playing.
pub(super) fn toggle_sample(app: &mut App, book: &BookSummary) {
    if app.sampler.is_playing(&book.id) {
        app.sampler.stop_sample();
        return;
    }

    match book.sample_uri() {
        Some(uri) => {
            // Samples and the summary never talk over each other.
            app.listener.pause();
            app.sampler.play_sample(&book.id, uri);
        }
        None => app.status = Some(format!("\"{}\" has no audio sample", book.title)),
    }
}

/// Opens the full summary of `book` in the summary player.
pub(super) fn listen_to(app: &mut App, book: &BookSummary) {
    match book.sample_uri() {
        Some(uri) => {
            app.sampler.stop_sample();
            app.details = Some(book.clone());
            app.listener.open(&book.id, &book.title, uri);
        }
        None => app.status = Some(format!("\"{}\" has no audio summary", book.title)),
    }
}

/// Pauses or resumes the summary, stopping any sample before it resumes.
pub(super) fn toggle_summary(app: &mut App) {
    if app.listener.track().is_none() {
        app.status = Some("No summary open, press l on a book to listen".to_string());
        return;
    }
    if !app.listener.is_playing() {
        app.sampler.stop_sample();
    }
    app.listener.toggle_pause();
}

fn find_listed(app: &App, id: &str) -> Option<BookSummary> {
    app.catalog
        .find(id)
        .or_else(|| app.search.results().iter().find(|b| b.id == id))
        .cloned()
}
