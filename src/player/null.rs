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

//! Audio outputs for builds without an audio backend.

use std::{sync::mpsc::Sender, time::Duration};

use anyhow::Result;

use crate::{
    events::AppEvent,
    player::{AudioOutput, Generation, PlayStart, SampleError, SampleHandle, TrackError, TrackOutput},
};

pub(crate) struct NullOutput;

pub(crate) enum NullHandle {}

impl NullOutput {
    pub(crate) fn new(_event_tx: Sender<AppEvent>) -> Result<Self> {
        tracing::info!("Built without the mpv feature, audio is disabled");
        Ok(Self)
    }
}

impl AudioOutput for NullOutput {
    type Handle = NullHandle;

    fn open(
        &mut self,
        _uri: &str,
        _generation: Generation,
        _volume: u8,
    ) -> Result<NullHandle, SampleError> {
        Err(SampleError::Unavailable(
            "built without audio support".to_string(),
        ))
    }
}

impl SampleHandle for NullHandle {
    fn play(&mut self) -> Result<PlayStart, SampleError> {
        match *self {}
    }

    fn pause(&mut self) {
        match *self {}
    }
}

pub(crate) struct NullTrackOutput;

impl NullTrackOutput {
    pub(crate) fn new(_event_tx: Sender<AppEvent>) -> Result<Self> {
        Ok(Self)
    }
}

impl TrackOutput for NullTrackOutput {
    fn load(&mut self, _uri: &str, _generation: Generation, _volume: u8) -> Result<(), TrackError> {
        Err(TrackError::Unavailable(
            "built without audio support".to_string(),
        ))
    }

    fn set_paused(&mut self, _generation: Generation, _paused: bool) {}

    fn seek(&mut self, _generation: Generation, _position: Duration) {}

    fn release(&mut self, _generation: Generation) {}
}
