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

//! Sample audio playback control.
//!
//! This module provides the [`SampleAudioController`], the single owner of
//! the one audio output session used to preview books. Any number of list
//! rows may ask it to play or stop a sample, and all of them observe the same
//! [`SampleAudioController::playing_id`], so at most one "now playing"
//! marker is ever shown.
//!
//! # State
//!
//! The controller is either **Idle** (no session, no resource held) or
//! **Playing** (one session holding one platform handle). Playing a new
//! sample always stops the previous one first. There is no paused state,
//! stopping discards the position.
//!
//! # Asynchronous completions
//!
//! The platform reports readiness, natural end and errors later, as
//! [`SampleEvent`]s delivered back on the UI thread. Every session is
//! stamped with a fresh [`Generation`] and every event carries the
//! generation of the session it belongs to. Events for any other generation
//! are discarded, so a late callback from a replaced session can never
//! resurrect it.
//!
//! Full summaries are played by the separate [`SummaryPlayer`].

#[cfg(feature = "mpv")]
mod libmpv;
#[cfg(not(feature = "mpv"))]
mod null;
mod track;
#[cfg(any(feature = "mpv", test))]
mod worker_state;

pub(crate) use track::{
    SKIP_STEP, SummaryPlayer, TrackError, TrackEvent, TrackEventKind, TrackOutput, TrackState,
};

use std::{
    fmt,
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::AppEvent;

#[cfg(feature = "mpv")]
pub(crate) type PlatformOutput = libmpv::MpvOutput;
#[cfg(not(feature = "mpv"))]
pub(crate) type PlatformOutput = null::NullOutput;

#[cfg(feature = "mpv")]
pub(crate) type PlatformTrackOutput = libmpv::MpvTrackOutput;
#[cfg(not(feature = "mpv"))]
pub(crate) type PlatformTrackOutput = null::NullTrackOutput;

/// Creates the sample output for this build, reporting its events to the
/// application event loop.
pub(crate) fn platform_output(event_tx: Sender<AppEvent>) -> Result<PlatformOutput> {
    PlatformOutput::new(event_tx)
}

/// Creates the full summary output for this build.
pub(crate) fn platform_track_output(event_tx: Sender<AppEvent>) -> Result<PlatformTrackOutput> {
    PlatformTrackOutput::new(event_tx)
}

/// Identifies one playback session. Assigned in strictly increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub(crate) enum SampleError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("could not open sample {uri}: {reason}")]
    Open { uri: String, reason: String },

    #[error("could not start sample: {0}")]
    Start(String),

    #[error("sample playback failed: {0}")]
    Playback(String),
}

/// Outcome of asking a handle to start playing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlayStart {
    /// Audio is playing now.
    Started,
    /// The resource is not ready yet. A [`SampleEventKind::Ready`] event will
    /// follow, after which playing is attempted again.
    AwaitingReady,
}

/// One playable resource created by an [`AudioOutput`].
///
/// Dropping the handle releases the underlying resource.
pub(crate) trait SampleHandle {
    fn play(&mut self) -> Result<PlayStart, SampleError>;

    fn pause(&mut self);
}

/// The platform capability used to turn a URI into a playable session.
pub(crate) trait AudioOutput {
    type Handle: SampleHandle;

    /// Creates a session for `uri`. Events for the session must be reported
    /// with `generation`.
    fn open(
        &mut self,
        uri: &str,
        generation: Generation,
        volume: u8,
    ) -> Result<Self::Handle, SampleError>;
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SampleEventKind {
    Ready,
    Ended,
    Failed(String),
}

/// A completion reported by the platform for one session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SampleEvent {
    pub(crate) generation: Generation,
    pub(crate) kind: SampleEventKind,
}

impl SampleEvent {
    pub(crate) fn new(generation: Generation, kind: SampleEventKind) -> Self {
        Self { generation, kind }
    }
}

struct PlaybackSession<H> {
    book_id: String,
    handle: H,
    generation: Generation,
    awaiting_ready: bool,
    /// Set once audio is actually playing, not while it loads.
    started_at: Option<Instant>,
}

/// Coordinates sample playback so that at most one sample plays at a time.
pub(crate) struct SampleAudioController<O: AudioOutput> {
    output: O,
    session: Option<PlaybackSession<O::Handle>>,
    last_generation: u64,
    volume: u8,
    last_error: Option<SampleError>,
}

impl<O: AudioOutput> SampleAudioController<O> {
    pub(crate) fn new(output: O, volume: u8) -> Self {
        Self {
            output,
            session: None,
            last_generation: 0,
            volume: volume.min(100),
            last_error: None,
        }
    }

    /// The identifier of the book whose sample is live, if any.
    pub(crate) fn playing_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.book_id.as_str())
    }

    pub(crate) fn is_playing(&self, book_id: &str) -> bool {
        self.playing_id() == Some(book_id)
    }

    /// Time since the live session started playing. Zero while it is still
    /// loading.
    pub(crate) fn elapsed(&self) -> Option<Duration> {
        self.session
            .as_ref()
            .map(|s| s.started_at.map_or(Duration::ZERO, |t| t.elapsed()))
    }

    /// Plays the sample at `audio_ref` for `book_id`, replacing any live
    /// sample.
    ///
    /// A blank `audio_ref` is ignored and leaves the current state alone.
    /// Requesting the book that is already playing restarts it. Failures are
    /// logged and kept in [`Self::take_error`], leaving the controller idle.
    pub(crate) fn play_sample(&mut self, book_id: &str, audio_ref: &str) {
        let uri = audio_ref.trim();
        if uri.is_empty() {
            debug!(book_id, "Ignoring sample request without audio");
            return;
        }

        self.release_session();

        self.last_generation += 1;
        let generation = Generation(self.last_generation);

        let mut handle = match self.output.open(uri, generation, self.volume) {
            Ok(handle) => handle,
            Err(e) => {
                self.report(book_id, e);
                return;
            }
        };

        let awaiting_ready = match handle.play() {
            Ok(PlayStart::Started) => false,
            Ok(PlayStart::AwaitingReady) => true,
            Err(e) => {
                handle.pause();
                drop(handle);
                self.report(book_id, e);
                return;
            }
        };

        info!(book_id, %generation, uri, awaiting_ready, "Playing sample");

        self.session = Some(PlaybackSession {
            book_id: book_id.to_string(),
            handle,
            generation,
            awaiting_ready,
            started_at: (!awaiting_ready).then(Instant::now),
        });
    }

    /// Stops and releases the live sample, if any.
    pub(crate) fn stop_sample(&mut self) {
        self.release_session();
    }

    /// Applies a platform completion, discarding it if it belongs to a
    /// session that is no longer live.
    pub(crate) fn handle_event(&mut self, event: SampleEvent) {
        let Some(session) = self.session.as_mut() else {
            debug!(generation = %event.generation, kind = ?event.kind, "Discarding sample event while idle");
            return;
        };

        if session.generation != event.generation {
            debug!(
                generation = %event.generation,
                live = %session.generation,
                kind = ?event.kind,
                "Discarding stale sample event"
            );
            return;
        }

        match event.kind {
            SampleEventKind::Ready => {
                if !session.awaiting_ready {
                    return;
                }
                match session.handle.play() {
                    Ok(PlayStart::Started) => {
                        session.awaiting_ready = false;
                        session.started_at = Some(Instant::now());
                    }
                    Ok(PlayStart::AwaitingReady) => {
                        let book_id = session.book_id.clone();
                        self.release_session();
                        self.report(&book_id, SampleError::Start("not playable when ready".to_string()));
                    }
                    Err(e) => {
                        let book_id = session.book_id.clone();
                        self.release_session();
                        self.report(&book_id, e);
                    }
                }
            }
            SampleEventKind::Ended => {
                debug!(book_id = %session.book_id, "Sample finished");
                self.release_session();
            }
            SampleEventKind::Failed(reason) => {
                let book_id = session.book_id.clone();
                self.release_session();
                self.report(&book_id, SampleError::Playback(reason));
            }
        }
    }

    /// Stops the live sample once it has played for `limit`. Returns true if
    /// it was stopped. Time spent loading does not count.
    pub(crate) fn enforce_limit(&mut self, limit: Duration) -> bool {
        let played = self
            .session
            .as_ref()
            .and_then(|s| s.started_at)
            .map(|t| t.elapsed());

        match played {
            Some(elapsed) if elapsed >= limit => {
                debug!(?limit, "Sample reached preview limit");
                self.stop_sample();
                true
            }
            _ => false,
        }
    }

    /// Returns and clears the most recent playback failure.
    pub(crate) fn take_error(&mut self) -> Option<SampleError> {
        self.last_error.take()
    }

    /// Stops any live sample. Called when the owning page goes away.
    pub(crate) fn shutdown(&mut self) {
        self.release_session();
    }

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!(book_id = %session.book_id, generation = %session.generation, "Releasing sample");
            session.handle.pause();
        }
    }

    fn report(&mut self, book_id: &str, error: SampleError) {
        warn!(book_id, error = %error, "Sample playback failed");
        self.last_error = Some(error);
    }
}

impl<O: AudioOutput> Drop for SampleAudioController<O> {
    fn drop(&mut self) {
        self.release_session();
    }
}
