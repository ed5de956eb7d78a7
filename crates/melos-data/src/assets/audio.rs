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

//! Defines the core asset type for decoded audio data.

use melos_core::asset::Asset;

/// A sound, decoded and ready for playback.
///
/// Samples are interleaved `f32` in `[-1.0, 1.0]` — for stereo, ordered
/// `[L, R, L, R, ...]`. The engine consumes this buffer as-is: sources must
/// already match the device sample rate (resampling is out of scope) and
/// carry one or two channels.
#[derive(Debug, Clone)]
pub struct SoundData {
    /// The raw, interleaved samples.
    pub samples: Vec<f32>,
    /// Channels in the data: 1 (mono) or 2 (stereo).
    pub channels: u16,
    /// Samples per second (e.g. 44100 Hz).
    pub sample_rate: u32,
}

impl SoundData {
    /// Number of frames (samples per channel) in the buffer.
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// The left/right sample pair at `frame`. Mono data is duplicated to
    /// both sides. `frame` must be below [`frame_count`](Self::frame_count).
    pub fn frame(&self, frame: usize) -> (f32, f32) {
        let base = frame * self.channels as usize;
        match self.channels {
            1 => (self.samples[base], self.samples[base]),
            _ => (self.samples[base], self.samples[base + 1]),
        }
    }
}

impl Asset for SoundData {}
