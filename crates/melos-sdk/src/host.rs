// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The `AudioHost` facade: the surface exposed to scripting bindings.

use anyhow::{anyhow, Context, Result};
use melos_agents::AudioAgent;
use melos_core::asset::AssetHandle;
use melos_core::audio::{AudioDevice, AudioError, ChannelId, SAMPLE_RATE};
use melos_data::{SoundBank, SoundData};
use melos_infra::CpalAudioDevice;
use melos_lanes::asset_lane::{AssetLoaderLane, WavLoaderLane};
use melos_lanes::audio_lane::{SampleProps, SampleSource};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Volume a channel plays at when the caller does not specify one.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// The host-facing audio engine facade.
///
/// Wires a device backend into the [`AudioAgent`] and keeps the two pieces
/// of host-side bookkeeping the engine core stays ignorant of: the sound
/// bank (name → decoded data) and the per-channel prop handles that make
/// volume/pan/loop setters lock-free.
///
/// Call [`update`](Self::update) once per host frame; every other method
/// may be called at any time from the same thread.
pub struct AudioHost {
    agent: AudioAgent,
    bank: SoundBank,
    wav_loader: WavLoaderLane,
    props: HashMap<ChannelId, Arc<SampleProps>>,
}

impl AudioHost {
    /// Opens the default output device and starts the engine.
    ///
    /// # Errors
    ///
    /// [`AudioError::DeviceUnavailable`] when no output stream can be
    /// opened; nothing is partially constructed in that case.
    pub fn new() -> Result<Self, AudioError> {
        Self::with_device(Box::new(CpalAudioDevice::default()))
    }

    /// Starts the engine over a caller-supplied device backend.
    pub fn with_device(device: Box<dyn AudioDevice>) -> Result<Self, AudioError> {
        let mut agent = AudioAgent::new(device);
        agent.start()?;
        Ok(Self {
            agent,
            bank: SoundBank::new(),
            wav_loader: WavLoaderLane::new(),
            props: HashMap::new(),
        })
    }

    // --- Sound registry ---

    /// Loads a WAV file and registers it under `name`.
    pub fn load(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read sound file {}", path.display()))?;
        let data = self
            .wav_loader
            .load(&bytes)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        self.register(name, data);
        Ok(())
    }

    /// Registers already-decoded data under `name`.
    pub fn register(&mut self, name: &str, data: SoundData) {
        if data.sample_rate != SAMPLE_RATE {
            // The engine does not resample; a mismatched source plays at
            // the wrong pitch.
            log::warn!(
                "Sound {:?} is {} Hz, device runs at {} Hz",
                name,
                data.sample_rate,
                SAMPLE_RATE
            );
        }
        log::info!("Registered sound {:?} ({} frames)", name, data.frame_count());
        self.bank.insert(name, AssetHandle::new(data));
    }

    /// Drops the bank's reference to `name`. Channels already playing the
    /// sound keep their borrow until they finish. Returns whether the name
    /// was registered.
    pub fn unload(&mut self, name: &str) -> bool {
        self.bank.remove(name).is_some()
    }

    /// Drops every bank entry.
    pub fn unload_all(&mut self) {
        self.bank.clear();
    }

    // --- Playback ---

    /// Plays `name` at the default volume, centered.
    pub fn play(&mut self, name: &str) -> ChannelId {
        self.play_with(name, DEFAULT_VOLUME, 0.0)
    }

    /// Plays `name` with explicit volume (`[0, 1]`) and pan (`[-1, 1]`).
    ///
    /// Returns [`ChannelId::INVALID`] when `name` is not registered. The
    /// channel becomes audible after the next [`update`](Self::update).
    pub fn play_with(&mut self, name: &str, volume: f32, pan: f32) -> ChannelId {
        let Some(handle) = self.bank.get(name) else {
            log::warn!("Cannot play unknown sound {name:?}");
            return ChannelId::INVALID;
        };

        let source = SampleSource::new(name, handle.clone());
        let props = Arc::clone(source.props());
        props.set_volume(volume);
        props.set_pan(pan);

        let id = self.agent.channel_init(Box::new(source));
        self.props.insert(id, props);
        id
    }

    /// Requests a cooperative stop; the channel fades out. Idempotent,
    /// no-op on dead ids.
    pub fn stop_channel(&self, id: ChannelId) {
        self.agent.stop(id);
    }

    /// Stops every channel, pending ones included.
    pub fn stop_all_channels(&self) {
        self.agent.stop_all();
    }

    /// Retargets a channel's volume. Takes effect at the next update tick;
    /// the mixer ramps toward it to avoid clicks. No-op on dead ids.
    pub fn set_channel_volume(&self, id: ChannelId, volume: f32) {
        if let Some(props) = self.props.get(&id) {
            props.set_volume(volume);
        }
    }

    /// Retargets a channel's pan. No-op on dead ids.
    pub fn set_channel_pan(&self, id: ChannelId, pan: f32) {
        if let Some(props) = self.props.get(&id) {
            props.set_pan(pan);
        }
    }

    /// Sets a channel's loop flag. No-op on dead ids.
    pub fn set_channel_loop(&self, id: ChannelId, looping: bool) {
        if let Some(props) = self.props.get(&id) {
            props.set_looping(looping);
        }
    }

    /// Whether `id` refers to a channel that has not finished. Once this
    /// returns `false` the id is dead and setters ignore it.
    pub fn is_playing(&self, id: ChannelId) -> bool {
        self.agent.is_playing(id)
    }

    // --- Lifecycle ---

    /// The per-frame tick: promotes pending channels, runs channel updates,
    /// and reaps finished ones.
    pub fn update(&mut self) {
        self.agent.update();
        let agent = &self.agent;
        self.props.retain(|id, _| agent.is_playing(*id));
    }

    /// Suspends the device callback.
    pub fn pause(&mut self) {
        self.agent.pause();
    }

    /// Resumes the device callback.
    pub fn resume(&mut self) {
        self.agent.resume();
    }
}
