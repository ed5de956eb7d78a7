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

//! The audio agent: device lifecycle, channel tables, and the per-frame
//! update walk.

use melos_core::audio::{
    AudioDevice, AudioError, Channel, ChannelControls, ChannelId, ChannelSource, ChannelState,
    MixCallback, STREAM_CHANNELS,
};
use melos_data::ChannelTable;
use melos_lanes::audio_lane::{AudioMixingLane, BufferMixingLane};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the audio thread touches, kept behind a single mutex.
///
/// The mutex *is* the engine's device lock: the mix callback holds it for
/// the duration of each buffer fill, and [`AudioAgent::update`] holds it
/// for the whole pending merge / tick / finish walk. Nothing else ever
/// takes it.
pub struct MixerShared {
    playing: ChannelTable,
    scratch: Vec<f32>,
}

/// A held device lock, giving the control thread a consistent view of the
/// playing set while callbacks are excluded.
pub struct MixerGuard<'a> {
    inner: MutexGuard<'a, MixerShared>,
}

impl MixerGuard<'_> {
    /// The playing table, frozen for the duration of the guard.
    pub fn playing(&self) -> &ChannelTable {
        &self.inner.playing
    }
}

/// The agent that orchestrates the entire audio system.
///
/// Channel creation lands in a control-thread-private *pending* table and
/// costs no lock. Once per host frame, [`update`](Self::update) takes the
/// device lock, merges *pending* into *playing*, ticks every channel's
/// lifecycle, and finishes the ones that stopped. The device callback walks
/// *playing* only, so a channel can never be observed half-registered.
pub struct AudioAgent {
    /// The audio device used for playback.
    device: Box<dyn AudioDevice>,
    /// Shared with the device callback; guarded by the device lock.
    shared: Arc<Mutex<MixerShared>>,
    /// The mixing lane responsible for summing channels.
    mixing_lane: Arc<BufferMixingLane>,
    /// Channels created since the last update, not yet visible to the mixer.
    pending: ChannelTable,
    /// Live control handles for every channel in either table.
    controls: HashMap<ChannelId, Arc<ChannelControls>>,
    /// Next channel id; zero stays reserved for the invalid sentinel.
    next_id: u64,
    started: bool,
}

impl AudioAgent {
    /// Creates an agent around a device backend.
    ///
    /// The scratch buffer is sized once from the device spec and never
    /// reallocated. The stream stays closed until [`start`](Self::start).
    pub fn new(device: Box<dyn AudioDevice>) -> Self {
        let scratch_len = device.spec().buffer_frames * STREAM_CHANNELS as usize;
        Self {
            device,
            shared: Arc::new(Mutex::new(MixerShared {
                playing: ChannelTable::new(),
                scratch: vec![0.0; scratch_len],
            })),
            mixing_lane: Arc::new(BufferMixingLane::new()),
            pending: ChannelTable::new(),
            controls: HashMap::new(),
            next_id: 1,
            started: false,
        }
    }

    /// Opens the device stream and unpauses it.
    ///
    /// # Errors
    ///
    /// [`AudioError::DeviceUnavailable`] when the backend cannot open an
    /// output stream. Calling `start` again after success is a no-op.
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.started {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let mixing_lane = Arc::clone(&self.mixing_lane);
        let on_mix_needed: MixCallback = Box::new(move |output: &mut [f32]| {
            output.fill(0.0);
            // A poisoned lock means the control thread died mid-update;
            // the stream keeps running and plays silence.
            if let Ok(mut guard) = shared.lock() {
                let MixerShared { playing, scratch } = &mut *guard;
                mixing_lane.mix(playing, scratch, output);
            }
        });

        self.device.start(on_mix_needed)?;
        self.device.resume();
        self.started = true;

        let spec = self.device.spec();
        log::info!(
            "Audio device started: {} Hz, {} ch, {} frames/buffer",
            spec.sample_rate,
            spec.channels,
            spec.buffer_frames
        );
        Ok(())
    }

    /// Registers a new channel and returns its id.
    ///
    /// The record lands in *pending* with state `Initialize`; the mixer will
    /// not see it before the next [`update`](Self::update). Does not take
    /// the device lock.
    pub fn channel_init(&mut self, source: Box<dyn ChannelSource>) -> ChannelId {
        let id = ChannelId::new(self.next_id);
        self.next_id += 1;

        let controls = Arc::new(ChannelControls::new());
        self.controls.insert(id, Arc::clone(&controls));
        self.pending.insert(Channel::new(id, controls, source));
        id
    }

    /// The control handle for `id`, whether the channel is still pending or
    /// already playing. `None` once the channel is dead.
    pub fn controls(&self, id: ChannelId) -> Option<Arc<ChannelControls>> {
        self.controls.get(&id).cloned()
    }

    /// Whether `id` refers to a channel that has not yet stopped.
    pub fn is_playing(&self, id: ChannelId) -> bool {
        self.controls
            .get(&id)
            .map(|ctl| ctl.state().is_alive())
            .unwrap_or(false)
    }

    /// Takes the device lock, excluding the mix callback while held.
    pub fn lock(&self) -> MixerGuard<'_> {
        MixerGuard {
            inner: match self.shared.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            },
        }
    }

    /// Number of channels awaiting promotion.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The per-frame control tick.
    ///
    /// Under the device lock: moves all of *pending* into *playing*, runs
    /// every channel's update hook, then finishes and removes the channels
    /// that reached `Stopped`. Pending storage is released after the lock
    /// drops, so the critical section stays a move plus one table walk.
    pub fn update(&mut self) {
        let mut finished = 0usize;
        {
            let mut shared = match self.shared.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            shared.playing.merge_from(&mut self.pending);
            shared.playing.retain(|channel| {
                channel.update();
                if channel.state() == ChannelState::Stopped {
                    channel.finish();
                    finished += 1;
                    false
                } else {
                    true
                }
            });
        }
        self.pending.release();
        if finished > 0 {
            self.controls.retain(|_, ctl| ctl.state() != ChannelState::Last);
            log::debug!("Finished {finished} channel(s)");
        }
    }

    /// Requests a cooperative stop. Idempotent; unknown ids are ignored.
    ///
    /// The channel fades itself out and is removed by a later update. Does
    /// not take the device lock — the flag is monotonic, so the worst case
    /// is the mixer observing it one buffer late.
    pub fn stop(&self, id: ChannelId) {
        if let Some(ctl) = self.controls.get(&id) {
            ctl.request_stop();
        }
    }

    /// Requests a stop on every live channel, pending ones included.
    pub fn stop_all(&self) {
        for ctl in self.controls.values() {
            ctl.request_stop();
        }
    }

    /// Flips a channel's immediate-silence switch. Unknown ids are ignored.
    pub fn set_enabled(&self, id: ChannelId, enabled: bool) {
        if let Some(ctl) = self.controls.get(&id) {
            ctl.set_enabled(enabled);
        }
    }

    /// Evicts a playing channel from the audible mix; it keeps advancing
    /// but contributes silence. Returns whether the transition happened.
    pub fn virtualize(&self, id: ChannelId) -> bool {
        self.controls
            .get(&id)
            .map(|ctl| ctl.transition(ChannelState::Playing, ChannelState::Virtualizing))
            .unwrap_or(false)
    }

    /// Brings a virtualized channel back toward the audible mix, routing
    /// through `Devirtualize` so its props re-apply on the next tick.
    pub fn devirtualize(&self, id: ChannelId) -> bool {
        self.controls
            .get(&id)
            .map(|ctl| ctl.transition(ChannelState::Virtualizing, ChannelState::Devirtualize))
            .unwrap_or(false)
    }

    /// Suspends device callbacks.
    pub fn pause(&mut self) {
        self.device.pause();
    }

    /// Resumes device callbacks.
    pub fn resume(&mut self) {
        self.device.resume();
    }

    /// Pauses and closes the device. Terminal; errors are swallowed by the
    /// backend.
    pub fn halt(&mut self) {
        self.device.pause();
        self.device.close();
        self.started = false;
        log::info!("Audio device halted");
    }
}

impl Drop for AudioAgent {
    fn drop(&mut self) {
        self.halt();
        // Channels still in the tables are dropped with them; their sources
        // release decoded-data borrows on drop.
    }
}
