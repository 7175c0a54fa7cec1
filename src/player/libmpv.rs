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

//! MPV-backed audio outputs.
//!
//! This module implements [`AudioOutput`] for samples and [`TrackOutput`]
//! for full summaries on top of `libmpv`. Each output has a background
//! worker thread that owns its own MPV context, so opening network streams
//! never blocks the UI thread and a sample never interrupts the summary
//! player's file.
//!
//! # Architecture
//!
//! Each output uses a dual-channel communication pattern:
//! 1. **Command Channel**: handles send [`WorkerCommand`]s to the worker,
//!    each tagged with the generation of the session it belongs to.
//! 2. **Event Channel**: the worker reports readiness, position, end of file
//!    and failures as [`AppEvent`]s, tagged with the generation of the file
//!    MPV was playing at the time.
//!
//! Which session an MPV notification belongs to is decided by
//! [`WorkerState`], the worker only translates between it and MPV.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    collections::VecDeque,
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
    time::Duration,
};
use tracing::{debug, error, warn};

use crate::{
    events::AppEvent,
    player::{
        AudioOutput, Generation, PlayStart, SampleError, SampleEvent, SampleEventKind,
        SampleHandle, TrackError, TrackEvent, TrackEventKind, TrackOutput,
        worker_state::{
            Attributed, EndReason, MpvAction, Notice, WorkerCommand, WorkerEventKind,
            WorkerState,
        },
    },
};

/// How long the worker waits for the first MPV event of a round, in seconds.
const EVENT_WAIT: f64 = 0.05;

/// Turns a notification for a live session into an application event, or
/// `None` if the output does not report that kind.
type EventMapper = fn(Generation, WorkerEventKind) -> Option<AppEvent>;

/// A handle to the MPV worker thread used for samples.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but hands out [`MpvHandle`]s that send instructions to the worker.
pub(crate) struct MpvOutput {
    command_tx: Sender<WorkerCommand>,
}

impl MpvOutput {
    /// Spawns the sample worker thread and returns a new output.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send sample events (readiness, end of file,
    ///   errors) back to the main event loop.
    pub(crate) fn new(event_tx: Sender<AppEvent>) -> Result<Self> {
        let command_tx = spawn_worker("sample", false, event_tx, sample_event);
        Ok(Self { command_tx })
    }
}

impl AudioOutput for MpvOutput {
    type Handle = MpvHandle;

    fn open(
        &mut self,
        uri: &str,
        generation: Generation,
        volume: u8,
    ) -> Result<MpvHandle, SampleError> {
        Ok(MpvHandle {
            command_tx: self.command_tx.clone(),
            generation,
            uri: uri.to_string(),
            volume,
            loaded: false,
        })
    }
}

/// One sample session on the MPV worker.
///
/// The first [`SampleHandle::play`] loads the file paused and waits for MPV
/// to report it loaded. The second unpauses it.
pub(crate) struct MpvHandle {
    command_tx: Sender<WorkerCommand>,
    generation: Generation,
    uri: String,
    volume: u8,
    loaded: bool,
}

impl MpvHandle {
    fn send(&self, command: WorkerCommand) -> Result<(), SampleError> {
        self.command_tx
            .send(command)
            .map_err(|_| SampleError::Unavailable("MPV worker has stopped".to_string()))
    }
}

impl SampleHandle for MpvHandle {
    fn play(&mut self) -> Result<PlayStart, SampleError> {
        if self.loaded {
            self.send(WorkerCommand::SetPause(self.generation, false))?;
            return Ok(PlayStart::Started);
        }

        self.send(WorkerCommand::Load {
            generation: self.generation,
            uri: self.uri.clone(),
            volume: self.volume,
        })?;
        self.loaded = true;

        Ok(PlayStart::AwaitingReady)
    }

    fn pause(&mut self) {
        let _ = self.send(WorkerCommand::SetPause(self.generation, true));
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.send(WorkerCommand::Release(self.generation));
    }
}

/// The MPV worker used for full summaries. It also reports the duration and
/// playback position of the live file.
pub(crate) struct MpvTrackOutput {
    command_tx: Sender<WorkerCommand>,
}

impl MpvTrackOutput {
    pub(crate) fn new(event_tx: Sender<AppEvent>) -> Result<Self> {
        let command_tx = spawn_worker("summary", true, event_tx, track_event);
        Ok(Self { command_tx })
    }

    fn send(&self, command: WorkerCommand) {
        if self.command_tx.send(command).is_err() {
            debug!("Summary worker has stopped");
        }
    }
}

impl TrackOutput for MpvTrackOutput {
    fn load(&mut self, uri: &str, generation: Generation, volume: u8) -> Result<(), TrackError> {
        self.command_tx
            .send(WorkerCommand::Load {
                generation,
                uri: uri.to_string(),
                volume,
            })
            .map_err(|_| TrackError::Unavailable("MPV worker has stopped".to_string()))
    }

    fn set_paused(&mut self, generation: Generation, paused: bool) {
        self.send(WorkerCommand::SetPause(generation, paused));
    }

    fn seek(&mut self, generation: Generation, position: Duration) {
        self.send(WorkerCommand::Seek(generation, position));
    }

    fn release(&mut self, generation: Generation) {
        self.send(WorkerCommand::Release(generation));
    }
}

fn sample_event(generation: Generation, kind: WorkerEventKind) -> Option<AppEvent> {
    let kind = match kind {
        WorkerEventKind::Ready => SampleEventKind::Ready,
        WorkerEventKind::Ended => SampleEventKind::Ended,
        WorkerEventKind::Failed(reason) => SampleEventKind::Failed(reason),
        WorkerEventKind::Duration(_) | WorkerEventKind::Position(_) => return None,
    };
    Some(AppEvent::Sample(SampleEvent::new(generation, kind)))
}

fn track_event(generation: Generation, kind: WorkerEventKind) -> Option<AppEvent> {
    let kind = match kind {
        WorkerEventKind::Ready => TrackEventKind::Ready,
        WorkerEventKind::Ended => TrackEventKind::Ended,
        WorkerEventKind::Failed(reason) => TrackEventKind::Failed(reason),
        WorkerEventKind::Duration(duration) => TrackEventKind::Duration(duration),
        WorkerEventKind::Position(position) => TrackEventKind::Position(position),
    };
    Some(AppEvent::Track(TrackEvent::new(generation, kind)))
}

/// Spawns a worker thread and returns its command channel.
///
/// If the internal worker returns an error, it is caught here and reported as
/// a recoverable application error. Later requests then fail as unavailable.
fn spawn_worker(
    role: &'static str,
    observe_time: bool,
    event_tx: Sender<AppEvent>,
    map: EventMapper,
) -> Sender<WorkerCommand> {
    let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = run_worker(observe_time, command_rx, event_tx, map) {
            error!(role, error = ?e, "MPV worker failure");
            let _ = error_tx.send(AppEvent::Error(format!("Audio unavailable: {e:#}")));
        }
    });

    command_tx
}

/// The primary execution loop for an MPV output.
///
/// This function initializes a local `libmpv` context and alternates between
/// draining the MPV event queue and draining incoming commands. It returns
/// when every command sender has been dropped.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialize or the event
/// channel is closed.
fn run_worker(
    observe_time: bool,
    command_rx: Receiver<WorkerCommand>,
    event_tx: Sender<AppEvent>,
    map: EventMapper,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    if observe_time {
        handler
            .observe_property::<f64>("duration", 0)
            .context("Failed to observe duration")?;
        handler
            .observe_property::<f64>("time-pos", 0)
            .context("Failed to observe time-pos")?;
    }

    let mut worker = Worker {
        handler,
        state: WorkerState::default(),
        event_tx,
        map,
    };

    loop {
        worker.process_mpv_events()?;
        if !worker.process_commands(&command_rx)? {
            debug!("MPV worker shutting down");
            let _ = worker.handler.command(&["stop"]);
            return Ok(());
        }
    }
}

struct Worker {
    handler: mpv::MpvHandler,
    state: WorkerState,
    event_tx: Sender<AppEvent>,
    map: EventMapper,
}

impl Worker {
    /// Drains and executes all pending commands. Returns false once the
    /// command channel is disconnected.
    fn process_commands(&mut self, command_rx: &Receiver<WorkerCommand>) -> Result<bool> {
        loop {
            let command = match command_rx.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => return Ok(true),
                Err(TryRecvError::Disconnected) => return Ok(false),
            };

            let actions = self.state.command(command);
            self.apply(actions)?;
        }
    }

    /// Waits up to [`EVENT_WAIT`] for an MPV event, then drains every event
    /// already queued so none is left behind a later command.
    fn process_mpv_events(&mut self) -> Result<()> {
        let mut timeout = EVENT_WAIT;

        loop {
            let notice = match self.handler.wait_event(timeout) {
                Some(mpv_event) => notice_from(mpv_event),
                None => return Ok(()),
            };
            timeout = 0.0;

            if let Some(notice) = notice {
                let (actions, event) = self.state.notice(notice);
                self.report(event)?;
                self.apply(actions)?;
            }
        }
    }

    fn apply(&mut self, actions: Vec<MpvAction>) -> Result<()> {
        let mut pending = VecDeque::from(actions);

        while let Some(action) = pending.pop_front() {
            match action {
                MpvAction::LoadFile {
                    generation,
                    uri,
                    volume,
                } => {
                    if let Err(e) = load_paused(&mut self.handler, &uri, volume) {
                        let (more, event) = self.state.load_rejected(generation, format!("{e:#}"));
                        pending.extend(more);
                        self.report(event)?;
                    }
                }
                MpvAction::SetPause(paused) => {
                    if let Err(e) = self.handler.set_property("pause", paused) {
                        let event = self
                            .state
                            .live_current()
                            .map(|g| (g, WorkerEventKind::Failed(format!("{e:?}"))));
                        self.report(event)?;
                    }
                }
                MpvAction::Seek(position) => {
                    let seconds = format!("{:.3}", position.as_secs_f64());
                    if let Err(e) = self.handler.command(&["seek", &seconds, "absolute"]) {
                        warn!(error = ?e, %seconds, "Failed to seek");
                    }
                }
                MpvAction::Stop => self
                    .handler
                    .command(&["stop"])
                    .context("Failed to stop playback")?,
            }
        }

        Ok(())
    }

    fn report(&self, event: Attributed) -> Result<()> {
        let Some(app_event) = event.and_then(|(generation, kind)| (self.map)(generation, kind)) else {
            return Ok(());
        };
        self.event_tx
            .send(app_event)
            .context("Failed to send playback event")
    }
}

fn notice_from(mpv_event: mpv::Event) -> Option<Notice> {
    match mpv_event {
        mpv::Event::StartFile => Some(Notice::StartFile),
        mpv::Event::FileLoaded => Some(Notice::FileLoaded),
        mpv::Event::EndFile(result) => {
            let reason = match result {
                Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF) => EndReason::Eof,
                Ok(mpv::EndFileReason::MPV_END_FILE_REASON_ERROR) => {
                    EndReason::Error("could not play stream".to_string())
                }
                Ok(_) => EndReason::Interrupted,
                Err(e) => EndReason::Error(format!("{e:?}")),
            };
            Some(Notice::EndFile(reason))
        }
        mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
            ("duration", Format::Double(seconds)) => {
                Duration::try_from_secs_f64(seconds).ok().map(Notice::Duration)
            }
            ("time-pos", Format::Double(seconds)) => {
                Duration::try_from_secs_f64(seconds).ok().map(Notice::Position)
            }
            _ => None,
        },
        _ => None,
    }
}

fn load_paused(handler: &mut mpv::MpvHandler, uri: &str, volume: u8) -> Result<()> {
    handler
        .command(&["set", "volume", &volume.to_string()])
        .context("Failed to set volume")?;
    handler
        .set_property("pause", true)
        .context("Failed to pause before loading")?;
    handler
        .command(&["loadfile", uri, "replace"])
        .context(format!("Failed to load audio: {uri}"))?;
    Ok(())
}
