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

//! The sample-buffer channel source: plays decoded audio with per-channel
//! volume, pan, loop, and position.

use melos_core::asset::AssetHandle;
use melos_core::audio::{ChannelControls, ChannelSource, ChannelState, AUDIO_BUFFER_SIZE};
use melos_data::SoundData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Per-frame smoothing factor applied while `actual_volume` chases the
/// target volume.
const VOLUME_RAMP: f32 = 1.0 / 64.0;

/// Per-frame decrement of the stopping fade; the fade spans one device
/// buffer.
const FADE_STEP: f32 = 1.0 / AUDIO_BUFFER_SIZE as f32;

/// The control-thread side of a sample channel's properties.
///
/// This is the "new" snapshot of the double-buffered props: setters store
/// into word-sized atomics without taking the mixer lock, and the channel's
/// `update` hook promotes the values into the snapshot the mixer reads.
/// A half-promoted set of props is therefore never observable from the
/// audio thread.
#[derive(Debug)]
pub struct SampleProps {
    volume: AtomicU32,
    pan: AtomicU32,
    looping: AtomicBool,
}

impl SampleProps {
    fn new() -> Self {
        Self {
            volume: AtomicU32::new(0.0f32.to_bits()),
            pan: AtomicU32::new(0.0f32.to_bits()),
            looping: AtomicBool::new(false),
        }
    }

    /// Target volume, clamped to `[0, 1]` on write.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Sets the target volume. Values outside `[0, 1]` are clamped.
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.volume.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Stereo pan, clamped to `[-1, 1]` on write. `-1` is hard left.
    pub fn pan(&self) -> f32 {
        f32::from_bits(self.pan.load(Ordering::Relaxed))
    }

    /// Sets the pan. Values outside `[-1, 1]` are clamped.
    pub fn set_pan(&self, pan: f32) {
        let clamped = pan.clamp(-1.0, 1.0);
        self.pan.store(clamped.to_bits(), Ordering::Relaxed);
    }

    /// Whether playback wraps to the start on reaching the end.
    pub fn looping(&self) -> bool {
        self.looping.load(Ordering::Relaxed)
    }

    /// Sets the loop flag.
    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Relaxed);
    }

    fn snapshot(&self) -> PropSnapshot {
        PropSnapshot {
            volume: self.volume(),
            pan: self.pan(),
            looping: self.looping(),
        }
    }
}

/// The promoted, mixer-visible copy of the props.
#[derive(Debug, Clone, Copy)]
struct PropSnapshot {
    volume: f32,
    pan: f32,
    looping: bool,
}

impl PropSnapshot {
    fn zero() -> Self {
        Self {
            volume: 0.0,
            pan: 0.0,
            looping: false,
        }
    }
}

/// A [`ChannelSource`] that draws interleaved frames from a decoded sample
/// buffer.
///
/// The source owns the sound name it was created from and borrows the
/// decoded data through an [`AssetHandle`]. Playback applies smoothed
/// volume, linear pan, and optional looping; a stop request fades the
/// channel out over one device buffer instead of cutting it.
pub struct SampleSource {
    sound_id: String,
    audio: Option<AssetHandle<SoundData>>,
    props: Arc<SampleProps>,
    current: PropSnapshot,
    actual_volume: f32,
    fade: f32,
    position: usize,
}

impl SampleSource {
    /// Creates a source over already-decoded data.
    ///
    /// Props start zeroed; callers set volume/pan/loop through
    /// [`props`](Self::props) and the values take effect at the next
    /// control tick.
    pub fn new(sound_id: impl Into<String>, audio: AssetHandle<SoundData>) -> Self {
        Self {
            sound_id: sound_id.into(),
            audio: Some(audio),
            props: Arc::new(SampleProps::new()),
            current: PropSnapshot::zero(),
            actual_volume: 0.0,
            fade: 1.0,
            position: 0,
        }
    }

    /// The name this source was created from.
    pub fn sound_id(&self) -> &str {
        &self.sound_id
    }

    /// The shared prop block. Clone the `Arc` to keep a setter handle that
    /// outlives the engine's ownership of the source.
    pub fn props(&self) -> &Arc<SampleProps> {
        &self.props
    }

    /// Current playback position, in frames.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl ChannelSource for SampleSource {
    fn mix(&mut self, ctl: &ChannelControls, out: &mut [f32]) {
        let mut state = ctl.state();
        if !state.is_audible() {
            return;
        }
        let Some(audio) = self.audio.as_ref() else {
            return;
        };
        let frame_count = audio.frame_count();
        if frame_count == 0 {
            ctl.set_state(ChannelState::Stopped);
            return;
        }

        let left_gain = 1.0 - self.current.pan.max(0.0);
        let right_gain = 1.0 + self.current.pan.min(0.0);

        for frame in out.chunks_exact_mut(2) {
            if self.position >= frame_count {
                if self.current.looping {
                    self.position = 0;
                } else {
                    // Out of material: the rest of the buffer stays silent.
                    state = if state == ChannelState::Stopping {
                        ChannelState::Stopped
                    } else {
                        ChannelState::Stopping
                    };
                    ctl.set_state(state);
                    break;
                }
            }

            self.actual_volume += (self.current.volume - self.actual_volume) * VOLUME_RAMP;
            let mut gain = self.actual_volume;

            if state == ChannelState::Stopping {
                self.fade = (self.fade - FADE_STEP).max(0.0);
                if self.fade == 0.0 {
                    ctl.set_state(ChannelState::Stopped);
                    break;
                }
                gain *= self.fade;
            }

            let (left, right) = audio.frame(self.position);
            frame[0] = left * gain * left_gain;
            frame[1] = right * gain * right_gain;
            self.position += 1;
        }
    }

    fn update(&mut self, ctl: &ChannelControls) {
        if ctl.state() == ChannelState::Initialize && self.audio.is_some() {
            ctl.set_state(ChannelState::Devirtualize);
        }
        if ctl.state() == ChannelState::Devirtualize {
            // First promotion seeds the smoothed volume so a fresh channel
            // starts at its target level instead of ramping from silence.
            self.current = self.props.snapshot();
            self.actual_volume = self.current.volume;
            self.fade = 1.0;
            ctl.set_state(ChannelState::Playing);
        }

        match ctl.state() {
            ChannelState::Playing | ChannelState::Virtualizing => {
                self.current = self.props.snapshot();
                if ctl.stop_requested() {
                    ctl.set_state(ChannelState::Stopping);
                }
            }
            ChannelState::Stopping => {
                self.current = self.props.snapshot();
            }
            _ => {}
        }
    }

    fn finish(&mut self, ctl: &ChannelControls) {
        self.audio = None;
        ctl.set_state(ChannelState::Last);
    }
}
