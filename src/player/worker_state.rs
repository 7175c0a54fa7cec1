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

//! Attribution of MPV notifications to playback sessions.
//!
//! MPV reports `start-file`, `file-loaded` and `end-file` without saying
//! which `loadfile` they belong to. [`WorkerState`] keeps the issued loads in
//! a FIFO and pairs every `start-file` with the oldest one. MPV may skip a
//! file that is replaced before it starts, so at most one load is ever in
//! flight: a newer load waits until MPV has started the previous one and
//! then replaces it.
//!
//! Released sessions stay in the books, marked dead, until MPV is done with
//! them. Their notifications are dropped instead of being reported against
//! whichever session is live by then.
//!
//! MPV always ends the old file before it starts the next one, so an
//! `end-file` belongs to the most recently started file.

use std::{collections::VecDeque, time::Duration};

use crate::player::Generation;

/// An instruction for the worker, tagged with the session it is for.
#[derive(Debug, PartialEq)]
pub(super) enum WorkerCommand {
    Load {
        generation: Generation,
        uri: String,
        volume: u8,
    },
    SetPause(Generation, bool),
    Seek(Generation, Duration),
    Release(Generation),
}

/// What the worker must do to MPV.
#[derive(Debug, PartialEq)]
pub(super) enum MpvAction {
    /// Load paused, replacing whatever MPV has.
    LoadFile {
        generation: Generation,
        uri: String,
        volume: u8,
    },
    SetPause(bool),
    Seek(Duration),
    Stop,
}

#[derive(Debug, PartialEq)]
pub(super) enum EndReason {
    Eof,
    Error(String),
    /// Stopped, replaced or quit.
    Interrupted,
}

/// The MPV notifications the worker cares about.
#[derive(Debug, PartialEq)]
pub(super) enum Notice {
    StartFile,
    FileLoaded,
    EndFile(EndReason),
    Duration(Duration),
    Position(Duration),
}

/// A notification attributed to a live session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WorkerEventKind {
    Ready,
    Ended,
    Failed(String),
    Duration(Duration),
    Position(Duration),
}

pub(super) type Attributed = Option<(Generation, WorkerEventKind)>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Session {
    generation: Generation,
    live: bool,
}

#[derive(Debug)]
struct QueuedLoad {
    generation: Generation,
    uri: String,
    volume: u8,
}

#[derive(Debug, Default)]
pub(super) struct WorkerState {
    /// Sent to MPV with `loadfile`, `start-file` not seen yet.
    issued: VecDeque<Session>,
    /// Started by MPV and not ended yet.
    current: Option<Session>,
    /// Requested while another load was in flight.
    queued: Option<QueuedLoad>,
}

impl WorkerState {
    pub(super) fn command(&mut self, command: WorkerCommand) -> Vec<MpvAction> {
        match command {
            WorkerCommand::Load {
                generation,
                uri,
                volume,
            } => {
                self.retire_all();
                let load = QueuedLoad {
                    generation,
                    uri,
                    volume,
                };
                if self.issued.is_empty() {
                    self.issue(load)
                } else {
                    self.queued = Some(load);
                    vec![]
                }
            }

            WorkerCommand::SetPause(generation, paused) => match self.live_current() {
                Some(live) if live == generation => vec![MpvAction::SetPause(paused)],
                _ => vec![],
            },

            WorkerCommand::Seek(generation, position) => match self.live_current() {
                Some(live) if live == generation => vec![MpvAction::Seek(position)],
                _ => vec![],
            },

            WorkerCommand::Release(generation) => {
                if self
                    .queued
                    .as_ref()
                    .is_some_and(|q| q.generation == generation)
                {
                    self.queued = None;
                }
                for session in self.issued.iter_mut().filter(|s| s.generation == generation) {
                    session.live = false;
                }
                match self.current.as_mut() {
                    Some(session) if session.generation == generation && session.live => {
                        session.live = false;
                        vec![MpvAction::Stop]
                    }
                    _ => vec![],
                }
            }
        }
    }

    pub(super) fn notice(&mut self, notice: Notice) -> (Vec<MpvAction>, Attributed) {
        match notice {
            Notice::StartFile => {
                self.current = self.issued.pop_front();
                let actions = match self.live_current() {
                    Some(_) => vec![],
                    None => self.replace_dead_start(),
                };
                (actions, None)
            }

            Notice::FileLoaded => (vec![], self.attribute(WorkerEventKind::Ready)),

            Notice::EndFile(reason) => {
                let event = match self.current.take() {
                    Some(session) if session.live => {
                        let kind = match reason {
                            EndReason::Eof | EndReason::Interrupted => WorkerEventKind::Ended,
                            EndReason::Error(reason) => WorkerEventKind::Failed(reason),
                        };
                        Some((session.generation, kind))
                    }
                    _ => None,
                };
                (vec![], event)
            }

            Notice::Duration(duration) => (vec![], self.attribute(WorkerEventKind::Duration(duration))),

            Notice::Position(position) => (vec![], self.attribute(WorkerEventKind::Position(position))),
        }
    }

    /// MPV refused a `loadfile` outright, so no notifications will follow
    /// for it.
    pub(super) fn load_rejected(&mut self, generation: Generation, reason: String) -> (Vec<MpvAction>, Attributed) {
        let position = self.issued.iter().position(|s| s.generation == generation);
        let event = position
            .and_then(|index| self.issued.remove(index))
            .filter(|session| session.live)
            .map(|session| (session.generation, WorkerEventKind::Failed(reason)));

        let actions = match self.queued.take() {
            Some(load) if self.issued.is_empty() => self.issue(load),
            queued => {
                self.queued = queued;
                vec![]
            }
        };

        (actions, event)
    }

    /// The started session that notifications are reported for.
    pub(super) fn live_current(&self) -> Option<Generation> {
        self.current.filter(|s| s.live).map(|s| s.generation)
    }

    fn attribute(&self, kind: WorkerEventKind) -> Attributed {
        self.live_current().map(|generation| (generation, kind))
    }

    fn issue(&mut self, load: QueuedLoad) -> Vec<MpvAction> {
        self.issued.push_back(Session {
            generation: load.generation,
            live: true,
        });
        vec![MpvAction::LoadFile {
            generation: load.generation,
            uri: load.uri,
            volume: load.volume,
        }]
    }

    /// MPV started a file nobody wants any more. Replace it with the queued
    /// load, or stop it.
    fn replace_dead_start(&mut self) -> Vec<MpvAction> {
        match self.queued.take() {
            Some(load) => self.issue(load),
            None => vec![MpvAction::Stop],
        }
    }

    fn retire_all(&mut self) {
        for session in self.issued.iter_mut().chain(self.current.as_mut()) {
            session.live = false;
        }
        self.queued = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(state: &mut WorkerState, generation: u64) -> Vec<MpvAction> {
        state.command(WorkerCommand::Load {
            generation: Generation(generation),
            uri: format!("https://cdn/{generation}.mp3"),
            volume: 80,
        })
    }

    fn loads_file(actions: &[MpvAction], generation: u64) -> bool {
        matches!(actions, [MpvAction::LoadFile { generation: g, .. }] if *g == Generation(generation))
    }

    fn attributed(state: &mut WorkerState, notice: Notice) -> Attributed {
        let (actions, event) = state.notice(notice);
        assert!(actions.is_empty(), "unexpected actions: {actions:?}");
        event
    }

    /// Drives one load through to `file-loaded`.
    fn started(generation: u64) -> WorkerState {
        let mut state = WorkerState::default();
        assert!(loads_file(&load(&mut state, generation), generation));
        assert_eq!(attributed(&mut state, Notice::StartFile), None);
        assert_eq!(
            attributed(&mut state, Notice::FileLoaded),
            Some((Generation(generation), WorkerEventKind::Ready))
        );
        state
    }

    #[test]
    fn single_load_reports_ready_then_end() {
        let mut state = started(1);

        assert_eq!(
            state.command(WorkerCommand::SetPause(Generation(1), false)),
            vec![MpvAction::SetPause(false)]
        );
        assert_eq!(
            attributed(&mut state, Notice::EndFile(EndReason::Eof)),
            Some((Generation(1), WorkerEventKind::Ended))
        );
        assert_eq!(state.live_current(), None);
    }

    #[test]
    fn replacing_a_playing_file_drops_its_end() {
        let mut state = started(1);

        state.command(WorkerCommand::Release(Generation(1)));
        assert!(loads_file(&load(&mut state, 2), 2));

        assert_eq!(attributed(&mut state, Notice::EndFile(EndReason::Interrupted)), None);
        assert_eq!(attributed(&mut state, Notice::StartFile), None);
        assert_eq!(
            attributed(&mut state, Notice::FileLoaded),
            Some((Generation(2), WorkerEventKind::Ready))
        );
    }

    #[test]
    fn load_while_loading_waits_for_the_first_to_start() {
        let mut state = WorkerState::default();
        assert!(loads_file(&load(&mut state, 1), 1));

        state.command(WorkerCommand::Release(Generation(1)));
        assert!(load(&mut state, 2).is_empty());

        // MPV starts the first file, which nobody wants any more.
        let (actions, event) = state.notice(Notice::StartFile);
        assert!(loads_file(&actions, 2));
        assert_eq!(event, None);

        assert_eq!(state.notice(Notice::FileLoaded), (vec![], None));
        assert_eq!(state.notice(Notice::EndFile(EndReason::Interrupted)), (vec![], None));

        assert_eq!(attributed(&mut state, Notice::StartFile), None);
        assert_eq!(
            attributed(&mut state, Notice::FileLoaded),
            Some((Generation(2), WorkerEventKind::Ready))
        );
    }

    #[test]
    fn only_the_newest_queued_load_is_issued() {
        let mut state = WorkerState::default();
        load(&mut state, 1);
        load(&mut state, 2);
        load(&mut state, 3);

        let (actions, _) = state.notice(Notice::StartFile);
        assert!(loads_file(&actions, 3));
    }

    #[test]
    fn stop_then_load_reports_only_the_new_file() {
        let mut state = started(1);

        assert_eq!(state.command(WorkerCommand::Release(Generation(1))), vec![MpvAction::Stop]);
        assert!(loads_file(&load(&mut state, 2), 2));

        assert_eq!(attributed(&mut state, Notice::EndFile(EndReason::Interrupted)), None);
        assert_eq!(attributed(&mut state, Notice::StartFile), None);
        assert_eq!(
            attributed(&mut state, Notice::EndFile(EndReason::Eof)),
            Some((Generation(2), WorkerEventKind::Ended))
        );
    }

    #[test]
    fn released_file_that_starts_late_is_stopped() {
        let mut state = WorkerState::default();
        load(&mut state, 1);
        state.command(WorkerCommand::Release(Generation(1)));

        let (actions, event) = state.notice(Notice::StartFile);
        assert_eq!(actions, vec![MpvAction::Stop]);
        assert_eq!(event, None);
        assert_eq!(state.notice(Notice::FileLoaded), (vec![], None));
    }

    #[test]
    fn error_of_a_released_file_is_not_blamed_on_the_live_one() {
        let mut state = WorkerState::default();
        load(&mut state, 1);
        state.command(WorkerCommand::Release(Generation(1)));
        load(&mut state, 2);

        state.notice(Notice::StartFile);
        assert_eq!(
            attributed(&mut state, Notice::EndFile(EndReason::Error("403".to_string()))),
            None
        );

        assert_eq!(attributed(&mut state, Notice::StartFile), None);
        assert_eq!(
            attributed(&mut state, Notice::EndFile(EndReason::Error("404".to_string()))),
            Some((Generation(2), WorkerEventKind::Failed("404".to_string())))
        );
    }

    #[test]
    fn commands_for_other_generations_are_ignored() {
        let mut state = started(2);

        assert!(state.command(WorkerCommand::SetPause(Generation(1), false)).is_empty());
        assert!(state.command(WorkerCommand::Seek(Generation(1), Duration::from_secs(5))).is_empty());
        assert!(state.command(WorkerCommand::Release(Generation(1))).is_empty());
        assert_eq!(
            state.command(WorkerCommand::Seek(Generation(2), Duration::from_secs(5))),
            vec![MpvAction::Seek(Duration::from_secs(5))]
        );
    }

    #[test]
    fn positions_are_reported_for_the_live_file_only() {
        let mut state = started(1);
        let second = Duration::from_secs(1);

        assert_eq!(
            attributed(&mut state, Notice::Position(second)),
            Some((Generation(1), WorkerEventKind::Position(second)))
        );

        state.command(WorkerCommand::Release(Generation(1)));
        assert_eq!(attributed(&mut state, Notice::Position(second)), None);
        assert_eq!(attributed(&mut state, Notice::Duration(second)), None);
    }

    #[test]
    fn rejected_load_fails_and_issues_the_queued_one() {
        let mut state = WorkerState::default();
        load(&mut state, 1);

        let (actions, event) = state.load_rejected(Generation(1), "bad uri".to_string());
        assert!(actions.is_empty());
        assert_eq!(event, Some((Generation(1), WorkerEventKind::Failed("bad uri".to_string()))));

        load(&mut state, 2);
        load(&mut state, 3);
        let (actions, event) = state.load_rejected(Generation(2), "bad uri".to_string());
        assert!(loads_file(&actions, 3));
        assert_eq!(event, None);
    }
}
