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

//! Full summary playback.
//!
//! The [`SummaryPlayer`] plays one book's complete audio summary with
//! pause, resume, seeking and ten second skips. It is independent of the
//! sample controller and has its own output, so previews never disturb the
//! summary's position.
//!
//! Like samples, every file is stamped with a [`Generation`] and events for
//! any other generation are dropped.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::player::Generation;

/// How far the skip keys move.
pub(crate) const SKIP_STEP: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Error, PartialEq)]
pub(crate) enum TrackError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("summary playback failed: {0}")]
    Playback(String),
}

/// The platform capability used to play a full summary.
///
/// Loading is always paused. Readiness, duration, position and the end of
/// the file are reported later as [`TrackEvent`]s carrying `generation`.
pub(crate) trait TrackOutput {
    fn load(&mut self, uri: &str, generation: Generation, volume: u8) -> Result<(), TrackError>;

    fn set_paused(&mut self, generation: Generation, paused: bool);

    /// Moves to an absolute position.
    fn seek(&mut self, generation: Generation, position: Duration);

    fn release(&mut self, generation: Generation);
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TrackEventKind {
    Ready,
    Duration(Duration),
    Position(Duration),
    Ended,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TrackEvent {
    pub(crate) generation: Generation,
    pub(crate) kind: TrackEventKind,
}

impl TrackEvent {
    pub(crate) fn new(generation: Generation, kind: TrackEventKind) -> Self {
        Self { generation, kind }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TrackState {
    Loading,
    Playing,
    Paused,
    /// Played to the end. Resuming starts again from the beginning.
    Finished,
}

/// The summary that is open in the player.
#[derive(Debug)]
pub(crate) struct OpenTrack {
    pub(crate) book_id: String,
    pub(crate) title: String,
    uri: String,
    generation: Generation,
    pub(crate) state: TrackState,
    pub(crate) position: Duration,
    pub(crate) duration: Option<Duration>,
    /// Whether to start playing once the output is ready.
    play_when_ready: bool,
}

pub(crate) struct SummaryPlayer<O: TrackOutput> {
    output: O,
    track: Option<OpenTrack>,
    last_generation: u64,
    volume: u8,
    last_error: Option<TrackError>,
}

impl<O: TrackOutput> SummaryPlayer<O> {
    pub(crate) fn new(output: O, volume: u8) -> Self {
        Self {
            output,
            track: None,
            last_generation: 0,
            volume: volume.min(100),
            last_error: None,
        }
    }

    pub(crate) fn track(&self) -> Option<&OpenTrack> {
        self.track.as_ref()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.track
            .as_ref()
            .is_some_and(|t| t.state == TrackState::Playing)
    }

    /// Opens the summary at `audio_ref` and plays it as soon as it is
    /// loaded, replacing any open summary. A blank `audio_ref` is reported
    /// and changes nothing.
    pub(crate) fn open(&mut self, book_id: &str, title: &str, audio_ref: &str) {
        let uri = audio_ref.trim();
        if uri.is_empty() {
            self.report(TrackError::Playback(format!("no audio for {title}")));
            return;
        }

        self.close();

        let Some(generation) = self.load(uri) else {
            return;
        };

        info!(book_id, %generation, uri, "Opening summary");

        self.track = Some(OpenTrack {
            book_id: book_id.to_string(),
            title: title.to_string(),
            uri: uri.to_string(),
            generation,
            state: TrackState::Loading,
            position: Duration::ZERO,
            duration: None,
            play_when_ready: true,
        });
    }

    /// Plays when paused, pauses when playing. A finished summary starts
    /// again from the beginning.
    pub(crate) fn toggle_pause(&mut self) {
        let Some(track) = self.track.as_mut() else {
            return;
        };

        match track.state {
            TrackState::Loading => track.play_when_ready = !track.play_when_ready,
            TrackState::Playing => {
                self.output.set_paused(track.generation, true);
                track.state = TrackState::Paused;
            }
            TrackState::Paused => {
                self.output.set_paused(track.generation, false);
                track.state = TrackState::Playing;
            }
            TrackState::Finished => self.restart(),
        }
    }

    /// Pauses if playing, or cancels playing once loaded.
    pub(crate) fn pause(&mut self) {
        let Some(track) = self.track.as_mut() else {
            return;
        };

        match track.state {
            TrackState::Loading => track.play_when_ready = false,
            TrackState::Playing => {
                self.output.set_paused(track.generation, true);
                track.state = TrackState::Paused;
            }
            TrackState::Paused | TrackState::Finished => {}
        }
    }

    /// Moves by `delta` seconds from the current position, staying within
    /// the summary.
    pub(crate) fn skip(&mut self, forward: bool, delta: Duration) {
        let Some(track) = self.track.as_ref() else {
            return;
        };

        let target = if forward {
            track.position.saturating_add(delta)
        } else {
            track.position.saturating_sub(delta)
        };
        self.seek_to(target);
    }

    /// Moves to `position`, clamped to the summary's duration once known.
    /// Ignored until the summary is loaded.
    pub(crate) fn seek_to(&mut self, position: Duration) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        if !matches!(track.state, TrackState::Playing | TrackState::Paused) {
            return;
        }

        let target = match track.duration {
            Some(duration) => position.min(duration),
            None => position,
        };

        debug!(generation = %track.generation, ?target, "Seeking summary");
        self.output.seek(track.generation, target);
        track.position = target;
    }

    /// Closes the open summary, if any.
    pub(crate) fn close(&mut self) {
        if let Some(track) = self.track.take() {
            debug!(book_id = %track.book_id, generation = %track.generation, "Closing summary");
            self.output.release(track.generation);
        }
    }

    /// Applies a platform event, discarding it unless it belongs to the open
    /// summary.
    pub(crate) fn handle_event(&mut self, event: TrackEvent) {
        let Some(track) = self.track.as_mut() else {
            debug!(generation = %event.generation, kind = ?event.kind, "Discarding summary event while closed");
            return;
        };

        if track.generation != event.generation {
            debug!(
                generation = %event.generation,
                live = %track.generation,
                kind = ?event.kind,
                "Discarding stale summary event"
            );
            return;
        }

        match event.kind {
            TrackEventKind::Ready => {
                if track.state != TrackState::Loading {
                    return;
                }
                if track.play_when_ready {
                    self.output.set_paused(track.generation, false);
                    track.state = TrackState::Playing;
                } else {
                    track.state = TrackState::Paused;
                }
            }
            TrackEventKind::Duration(duration) => track.duration = Some(duration),
            TrackEventKind::Position(position) => {
                if track.state != TrackState::Finished {
                    track.position = match track.duration {
                        Some(duration) => position.min(duration),
                        None => position,
                    };
                }
            }
            TrackEventKind::Ended => {
                debug!(book_id = %track.book_id, "Summary finished");
                track.state = TrackState::Finished;
                track.position = Duration::ZERO;
            }
            TrackEventKind::Failed(reason) => {
                self.close();
                self.report(TrackError::Playback(reason));
            }
        }
    }

    /// Returns and clears the most recent playback failure.
    pub(crate) fn take_error(&mut self) -> Option<TrackError> {
        self.last_error.take()
    }

    pub(crate) fn shutdown(&mut self) {
        self.close();
    }

    fn restart(&mut self) {
        let Some(uri) = self.track.as_ref().map(|t| t.uri.clone()) else {
            return;
        };

        match self.load(&uri) {
            Some(generation) => {
                if let Some(track) = self.track.as_mut() {
                    track.generation = generation;
                    track.state = TrackState::Loading;
                    track.position = Duration::ZERO;
                    track.play_when_ready = true;
                }
            }
            None => self.track = None,
        }
    }

    fn load(&mut self, uri: &str) -> Option<Generation> {
        self.last_generation += 1;
        let generation = Generation(self.last_generation);

        match self.output.load(uri, generation, self.volume) {
            Ok(()) => Some(generation),
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    fn report(&mut self, error: TrackError) {
        warn!(error = %error, "Summary playback failed");
        self.last_error = Some(error);
    }
}

impl<O: TrackOutput> Drop for SummaryPlayer<O> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Load(String, Generation),
        Pause(Generation, bool),
        Seek(Generation, Duration),
        Release(Generation),
    }

    struct MockOutput {
        calls: Rc<RefCell<Vec<Call>>>,
        available: bool,
    }

    impl TrackOutput for MockOutput {
        fn load(&mut self, uri: &str, generation: Generation, _volume: u8) -> Result<(), TrackError> {
            if !self.available {
                return Err(TrackError::Unavailable("no device".to_string()));
            }
            self.calls.borrow_mut().push(Call::Load(uri.to_string(), generation));
            Ok(())
        }

        fn set_paused(&mut self, generation: Generation, paused: bool) {
            self.calls.borrow_mut().push(Call::Pause(generation, paused));
        }

        fn seek(&mut self, generation: Generation, position: Duration) {
            self.calls.borrow_mut().push(Call::Seek(generation, position));
        }

        fn release(&mut self, generation: Generation) {
            self.calls.borrow_mut().push(Call::Release(generation));
        }
    }

    fn player(available: bool) -> (SummaryPlayer<MockOutput>, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(vec![]));
        let output = MockOutput {
            calls: Rc::clone(&calls),
            available,
        };
        (SummaryPlayer::new(output, 80), calls)
    }

    fn secs(seconds: u64) -> Duration {
        Duration::from_secs(seconds)
    }

    /// Opens a summary and reports it ready with a five minute duration.
    fn playing() -> (SummaryPlayer<MockOutput>, Rc<RefCell<Vec<Call>>>, Generation) {
        let (mut player, calls) = player(true);
        player.open("a", "Alpha", "https://cdn/a.mp3");
        let generation = Generation(1);
        player.handle_event(TrackEvent::new(generation, TrackEventKind::Duration(secs(300))));
        player.handle_event(TrackEvent::new(generation, TrackEventKind::Ready));
        (player, calls, generation)
    }

    fn state(player: &SummaryPlayer<MockOutput>) -> Option<TrackState> {
        player.track().map(|t| t.state)
    }

    #[test]
    fn open_loads_then_plays_when_ready() {
        let (mut player, calls) = player(true);

        player.open("a", "Alpha", "https://cdn/a.mp3");
        assert_eq!(state(&player), Some(TrackState::Loading));

        player.handle_event(TrackEvent::new(Generation(1), TrackEventKind::Ready));

        assert_eq!(state(&player), Some(TrackState::Playing));
        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Load("https://cdn/a.mp3".to_string(), Generation(1)),
                Call::Pause(Generation(1), false),
            ]
        );
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let (mut player, calls, generation) = playing();

        player.toggle_pause();
        assert_eq!(state(&player), Some(TrackState::Paused));
        player.toggle_pause();
        assert_eq!(state(&player), Some(TrackState::Playing));

        let calls = calls.borrow();
        assert_eq!(calls[calls.len() - 2..], [Call::Pause(generation, true), Call::Pause(generation, false)]);
    }

    #[test]
    fn pausing_while_loading_stays_paused_when_ready() {
        let (mut player, calls) = player(true);

        player.open("a", "Alpha", "https://cdn/a.mp3");
        player.pause();
        player.handle_event(TrackEvent::new(Generation(1), TrackEventKind::Ready));

        assert_eq!(state(&player), Some(TrackState::Paused));
        assert!(!calls.borrow().contains(&Call::Pause(Generation(1), false)));
    }

    #[test]
    fn skip_moves_ten_seconds_within_bounds() {
        let (mut player, calls, generation) = playing();
        player.handle_event(TrackEvent::new(generation, TrackEventKind::Position(secs(5))));

        player.skip(true, SKIP_STEP);
        assert_eq!(player.track().map(|t| t.position), Some(secs(15)));

        player.skip(false, SKIP_STEP);
        player.skip(false, SKIP_STEP);
        assert_eq!(player.track().map(|t| t.position), Some(Duration::ZERO));

        player.handle_event(TrackEvent::new(generation, TrackEventKind::Position(secs(295))));
        player.skip(true, SKIP_STEP);
        assert_eq!(player.track().map(|t| t.position), Some(secs(300)));

        assert_eq!(calls.borrow().last(), Some(&Call::Seek(generation, secs(300))));
    }

    #[test]
    fn seek_is_clamped_to_the_duration() {
        let (mut player, calls, generation) = playing();

        player.seek_to(secs(1000));

        assert_eq!(player.track().map(|t| t.position), Some(secs(300)));
        assert_eq!(calls.borrow().last(), Some(&Call::Seek(generation, secs(300))));
    }

    #[test]
    fn seek_is_ignored_while_loading() {
        let (mut player, calls) = player(true);

        player.open("a", "Alpha", "https://cdn/a.mp3");
        player.seek_to(secs(30));

        assert!(!calls.borrow().iter().any(|c| matches!(c, Call::Seek(..))));
    }

    #[test]
    fn end_resets_position_and_resume_starts_over() {
        let (mut player, calls, generation) = playing();
        player.handle_event(TrackEvent::new(generation, TrackEventKind::Position(secs(299))));

        player.handle_event(TrackEvent::new(generation, TrackEventKind::Ended));
        assert_eq!(state(&player), Some(TrackState::Finished));
        assert_eq!(player.track().map(|t| t.position), Some(Duration::ZERO));

        player.toggle_pause();
        assert_eq!(state(&player), Some(TrackState::Loading));
        assert_eq!(
            calls.borrow().last(),
            Some(&Call::Load("https://cdn/a.mp3".to_string(), Generation(2)))
        );

        // The first file's late events no longer apply.
        player.handle_event(TrackEvent::new(generation, TrackEventKind::Ready));
        assert_eq!(state(&player), Some(TrackState::Loading));
    }

    #[test]
    fn stale_events_are_discarded() {
        let (mut player, _calls, first) = playing();

        player.open("b", "Beta", "https://cdn/b.mp3");
        player.handle_event(TrackEvent::new(first, TrackEventKind::Position(secs(42))));
        player.handle_event(TrackEvent::new(first, TrackEventKind::Failed("aborted".to_string())));

        let track = player.track().map(|t| (t.book_id.as_str(), t.position));
        assert_eq!(track, Some(("b", Duration::ZERO)));
        assert_eq!(player.take_error(), None);
    }

    #[test]
    fn opening_another_summary_releases_the_first() {
        let (mut player, calls, first) = playing();

        player.open("b", "Beta", "https://cdn/b.mp3");

        assert!(calls.borrow().contains(&Call::Release(first)));
        assert_eq!(player.track().map(|t| t.title.as_str()), Some("Beta"));
    }

    #[test]
    fn failure_closes_and_is_reported() {
        let (mut player, _calls, generation) = playing();

        player.handle_event(TrackEvent::new(generation, TrackEventKind::Failed("network".to_string())));

        assert!(player.track().is_none());
        assert_eq!(player.take_error(), Some(TrackError::Playback("network".to_string())));
    }

    #[test]
    fn blank_audio_is_reported_without_loading() {
        let (mut player, calls) = player(true);

        player.open("a", "Alpha", "  ");

        assert!(player.track().is_none());
        assert!(calls.borrow().is_empty());
        assert!(matches!(player.take_error(), Some(TrackError::Playback(_))));
    }

    #[test]
    fn unavailable_output_leaves_player_closed() {
        let (mut player, _calls) = player(false);

        player.open("a", "Alpha", "https://cdn/a.mp3");

        assert!(player.track().is_none());
        assert!(matches!(player.take_error(), Some(TrackError::Unavailable(_))));
    }

    #[test]
    fn teardown_releases_the_open_summary() {
        let (player, calls, generation) = playing();

        drop(player);

        assert_eq!(calls.borrow().last(), Some(&Call::Release(generation)));
    }
}
