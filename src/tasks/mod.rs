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

//! Asynchronous application task processing.
//!
//! This module offloads blocking content API requests from the main UI
//! thread. A dedicated worker loop translates [`AppTask`] requests into API
//! calls and broadcasts the results back to the application via
//! [`AppEvent`]s.
//!
//! Only actions that may block, or may take more than a trivial amount of time
//! to process, should be implemented as tasks. Other actions are likely more
//! suited to events.

mod handlers;

use handlers::*;

use anyhow::Result;
use std::{
    sync::mpsc::{Receiver, Sender},
    thread,
};
use tracing::{error, info};

use crate::{
    api::{ContentApi, HttpContentApi},
    config::AppConfig,
    events::AppEvent,
    model::{BookStatus, BookSummary, search::SearchRequest},
};

#[derive(Debug)]
pub(crate) enum AppTask {
    /// Fetch every status list, or just one.
    LoadCatalog(Option<BookStatus>),

    /// Run a remote search; `local` is matched instead if it fails.
    Search {
        request: SearchRequest,
        local: Vec<BookSummary>,
    },

    FetchBook(String),
}

/// Spawns a background thread to process application tasks.
///
/// The worker builds its own HTTP client and enters a blocking loop,
/// listening for incoming [`AppTask`]s until the task channel closes.
///
/// # Arguments
///
/// * `config` - The application configuration.
/// * `task_rx` - The receiving end of the task channel.
/// * `event_tx` - The sending end of the channel for broadcasting results.
pub(crate) fn spawn_task_worker(
    config: &AppConfig,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) {
    let config = config.clone();

    thread::spawn(move || {
        let api = match HttpContentApi::new(&config) {
            Ok(api) => api,
            Err(e) => {
                error!(error = %e, "Failed to create content API client");
                let _ = event_tx.send(AppEvent::FatalError(format!("{e:#}")));
                return;
            }
        };

        info!(base_url = %config.api_base_url, "Task worker started");

        while let Ok(task) = task_rx.recv() {
            let ctx = TaskContext {
                api: &api,
                event_tx: &event_tx,
            };

            if let Err(e) = handle_task(task, &ctx) {
                let _ = event_tx.send(AppEvent::Error(e.to_string()));
            }
        }

        info!("Task worker stopped");
    });
}

/// Bundles shared resources required by task handlers to simplify resource
/// passing when invoking those handler functions.
struct TaskContext<'a> {
    api: &'a dyn ContentApi,
    event_tx: &'a Sender<AppEvent>,
}

/// Orchestrates the execution of a single task.
fn handle_task(task: AppTask, ctx: &TaskContext) -> Result<()> {
    match task {
        AppTask::LoadCatalog(only) => load_catalog(ctx, only),
        AppTask::Search { request, local } => search(ctx, request, &local),
        AppTask::FetchBook(id) => fetch_book(ctx, &id),
    }
}
