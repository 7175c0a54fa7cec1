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
use crossterm::event::{Event, KeyCode, KeyEvent};

use crate::{
    App, MainView,
    components::{BookTableAction, SearchInputAction},
    player::SKIP_STEP,
    events::{
        AppEvent,
        handlers::{dispatch_search, listen_to, toggle_sample, toggle_summary},
    },
};

/// Maps keyboard input to application actions and playback.
///
/// Input is offered, in order, to:
///
/// * **Search input**: while editing, it consumes every key.
/// * **Command line**: opened with `:`, then it consumes every key.
/// * **Global keys**: quitting, switching views, stopping the sample,
///   controlling the summary player.
/// * **Book table**: navigation, toggling the selected book's sample and
///   opening its full summary.
///
/// # Errors
///
/// Returns an error if an event cannot be sent to the event loop.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let event = Event::Key(key);

    // A message stays up until the next key.
    app.status = None;

    if app.main_view == MainView::Search && app.search_view.editing {
        match app.search_view.process_input(&event) {
            SearchInputAction::Changed(text) => app.search.set_query(&text, Instant::now()),
            SearchInputAction::Submit => {
                let request = app.search.submit();
                dispatch_search(app, request);
            }
            SearchInputAction::None => {}
        }
        return Ok(());
    }

    if app
        .commander
        .handle_event(&event, &app.task_tx, &app.event_tx)
    {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => app.event_tx.send(AppEvent::ExitApplication)?,

        KeyCode::Char('/') => {
            app.main_view = MainView::Search;
            app.search_view.editing = true;
        }

        KeyCode::Char('1') => app.event_tx.send(AppEvent::SetMainView(MainView::Catalog))?,
        KeyCode::Char('2') => app.event_tx.send(AppEvent::SetMainView(MainView::Search))?,

        KeyCode::Char('s') => app.sampler.stop_sample(),

        KeyCode::Char(' ') => toggle_summary(app),
        KeyCode::Left => app.listener.skip(false, SKIP_STEP),
        KeyCode::Right => app.listener.skip(true, SKIP_STEP),
        KeyCode::Char('x') => app.listener.close(),

        _ => process_table_key_event(app, &event),
    }

    Ok(())
}

fn process_table_key_event(app: &mut App, event: &Event) {
    let playing_id = app.sampler.playing_id();

    let action = match app.main_view {
        MainView::Catalog => app
            .catalog_view
            .table(app.catalog.books(), playing_id)
            .process_event(event),
        MainView::Search => app
            .search_view
            .table(app.search.results(), playing_id)
            .process_event(event),
    };

    match action {
        Some(BookTableAction::ToggleSample(book)) => toggle_sample(app, &book),
        Some(BookTableAction::Listen(book)) => listen_to(app, &book),
        Some(BookTableAction::Select(book)) => app.details = Some(book),
        None => {}
    }
}
