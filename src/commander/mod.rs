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

//! Command-line input logic and state management.
//!
//! `:` opens the command line. While open it owns the keyboard: `Esc` closes
//! it, `Enter` runs the typed command and closes it. A command either becomes
//! a background task or an application event.
//!
//! `seek` takes a position as seconds, `M:SS` or `H:MM:SS`.

use std::{sync::mpsc::Sender, time::Duration};

use anyhow::Result;
use crossterm::event::{Event, KeyCode};
use tracing::debug;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    MainView, events::AppEvent, model::BookStatus, tasks::AppTask, util::format::parse_duration,
};

#[derive(Debug, PartialEq)]
enum Command {
    Quit,
    StopSample,
    PlaySample(String),
    Listen(String),
    ToggleSummary,
    Seek(Duration),
    CloseSummary,
    FetchBook(String),
    LoadCatalog(Option<BookStatus>),
    SetMainView(MainView),
}

pub(crate) struct Commander {
    active: bool,
    pub(crate) input: Input,
}

impl Commander {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            input: Input::default(),
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.active
    }

    /// Offers a terminal event to the command line.
    ///
    /// Returns `true` if the event was consumed.
    pub(crate) fn handle_event(
        &mut self,
        event: &Event,
        task_tx: &Sender<AppTask>,
        event_tx: &Sender<AppEvent>,
    ) -> bool {
        let Event::Key(key_event) = event else {
            return false;
        };

        if !self.active {
            if key_event.code == KeyCode::Char(':') {
                self.active = true;
                return true;
            }
            return false;
        }

        match key_event.code {
            KeyCode::Esc => {
                self.active = false;
                self.input.reset();
            }

            KeyCode::Enter => {
                let buffer = self.input.value().trim().to_string();
                self.input.reset();
                self.active = false;

                if !buffer.is_empty() {
                    let outcome = parse_command(&buffer)
                        .and_then(|command| run_command(command, task_tx, event_tx).map_err(|e| e.to_string()));
                    if let Err(message) = outcome {
                        let _ = event_tx.send(AppEvent::Error(message));
                    }
                }
            }

            _ => {
                self.input.handle_event(event);
            }
        }

        true
    }
}

fn parse_command(buffer: &str) -> Result<Command, String> {
    let parts: Vec<&str> = buffer.split_whitespace().collect();

    let command = match parts.as_slice() {
        ["q"] => Command::Quit,

        ["stop"] => Command::StopSample,
        ["play", id] => Command::PlaySample(id.to_string()),

        ["listen", id] => Command::Listen(id.to_string()),
        ["pause"] => Command::ToggleSummary,
        ["seek", position] => match parse_duration(position) {
            Some(position) => Command::Seek(position),
            None => return Err(format!("Not a position: {position}")),
        },
        ["close"] => Command::CloseSummary,

        ["book", id] => Command::FetchBook(id.to_string()),

        ["reload"] => Command::LoadCatalog(None),
        ["status", status] => match BookStatus::parse(status) {
            Some(status) => Command::LoadCatalog(Some(status)),
            None => return Err(format!("Unknown book status: {status}")),
        },

        ["1"] => Command::SetMainView(MainView::Catalog),
        ["2"] => Command::SetMainView(MainView::Search),

        [cmd, ..] => return Err(format!("Unknown command: {cmd}")),
        [] => return Err("Empty command".to_string()),
    };

    Ok(command)
}

fn run_command(
    command: Command,
    task_tx: &Sender<AppTask>,
    event_tx: &Sender<AppEvent>,
) -> Result<()> {
    debug!(?command, "Running command");

    match command {
        Command::Quit => event_tx.send(AppEvent::ExitApplication)?,
        Command::StopSample => event_tx.send(AppEvent::StopSample)?,
        Command::PlaySample(id) => event_tx.send(AppEvent::PlaySample(id))?,
        Command::Listen(id) => event_tx.send(AppEvent::ListenBook(id))?,
        Command::ToggleSummary => event_tx.send(AppEvent::ToggleSummary)?,
        Command::Seek(position) => event_tx.send(AppEvent::SeekSummary(position))?,
        Command::CloseSummary => event_tx.send(AppEvent::CloseSummary)?,
        Command::FetchBook(id) => task_tx.send(AppTask::FetchBook(id))?,
        Command::LoadCatalog(only) => task_tx.send(AppTask::LoadCatalog(only))?,
        Command::SetMainView(view) => event_tx.send(AppEvent::SetMainView(view))?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_command(commander: &mut Commander, text: &str, task_tx: &Sender<AppTask>, event_tx: &Sender<AppEvent>) {
        assert!(commander.handle_event(&key(KeyCode::Char(':')), task_tx, event_tx));
        for c in text.chars() {
            commander.handle_event(&key(KeyCode::Char(c)), task_tx, event_tx);
        }
        commander.handle_event(&key(KeyCode::Enter), task_tx, event_tx);
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("stop"), Ok(Command::StopSample));
        assert_eq!(parse_command("play abc"), Ok(Command::PlaySample("abc".to_string())));
        assert_eq!(parse_command("book 42"), Ok(Command::FetchBook("42".to_string())));
        assert_eq!(parse_command("reload"), Ok(Command::LoadCatalog(None)));
        assert_eq!(
            parse_command("status Suggested"),
            Ok(Command::LoadCatalog(Some(BookStatus::Suggested)))
        );
        assert_eq!(parse_command("2"), Ok(Command::SetMainView(MainView::Search)));
    }

    #[test]
    fn parses_summary_player_commands() {
        assert_eq!(parse_command("listen f9gy1gpai8"), Ok(Command::Listen("f9gy1gpai8".to_string())));
        assert_eq!(parse_command("pause"), Ok(Command::ToggleSummary));
        assert_eq!(parse_command("seek 2:05"), Ok(Command::Seek(Duration::from_secs(125))));
        assert_eq!(parse_command("close"), Ok(Command::CloseSummary));
        assert!(parse_command("seek soon").is_err());
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse_command("dance").is_err());
        assert!(parse_command("status banned").is_err());
        assert!(parse_command("book").is_err());
    }

    #[test]
    fn keys_pass_through_while_inactive() {
        let (task_tx, _task_rx) = mpsc::channel();
        let (event_tx, _event_rx) = mpsc::channel();
        let mut commander = Commander::new();

        assert!(!commander.handle_event(&key(KeyCode::Char('q')), &task_tx, &event_tx));
        assert!(!commander.active());
    }

    #[test]
    fn submitted_command_reaches_the_task_worker() {
        let (task_tx, task_rx) = mpsc::channel();
        let (event_tx, _event_rx) = mpsc::channel();
        let mut commander = Commander::new();

        type_command(&mut commander, "book 7", &task_tx, &event_tx);

        assert!(!commander.active());
        assert!(commander.input.value().is_empty());
        assert!(matches!(task_rx.try_recv(), Ok(AppTask::FetchBook(id)) if id == "7"));
    }

    #[test]
    fn seek_command_reaches_the_event_loop() {
        let (task_tx, _task_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let mut commander = Commander::new();

        type_command(&mut commander, "seek 90", &task_tx, &event_tx);

        assert!(matches!(
            event_rx.try_recv(),
            Ok(AppEvent::SeekSummary(position)) if position == Duration::from_secs(90)
        ));
    }

    #[test]
    fn unknown_command_reports_an_error() {
        let (task_tx, _task_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let mut commander = Commander::new();

        type_command(&mut commander, "dance", &task_tx, &event_tx);

        assert!(matches!(event_rx.try_recv(), Ok(AppEvent::Error(message)) if message.contains("dance")));
    }
}
