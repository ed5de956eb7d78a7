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

//! Defines the abstract `AudioDevice` trait and the output stream contract.

use super::error::AudioError;

/// Samples per second of the output stream.
pub const SAMPLE_RATE: u32 = 44_100;

/// Number of interleaved output channels. The engine mixes stereo only.
pub const STREAM_CHANNELS: u16 = 2;

/// Frames per device buffer. Also the length of the stopping fade and the
/// capacity of the engine's scratch buffer.
pub const AUDIO_BUFFER_SIZE: usize = 2048;

/// The shape of an output stream a backend is asked to open.
///
/// The sample format is fixed: `f32`, little-endian, interleaved
/// (`[L, R, L, R, ...]` for stereo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    /// Samples per second (e.g. 44100 Hz).
    pub sample_rate: u32,
    /// Number of interleaved channels (e.g. 2 for stereo).
    pub channels: u16,
    /// Requested buffer length, in frames.
    pub buffer_frames: usize,
}

impl Default for DeviceSpec {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: STREAM_CHANNELS,
            buffer_frames: AUDIO_BUFFER_SIZE,
        }
    }
}

/// The function a backend calls, on its own thread, whenever it needs the
/// next buffer of interleaved `f32` samples.
pub type MixCallback = Box<dyn FnMut(&mut [f32]) + Send + 'static>;

/// The abstract contract for a hardware audio device backend.
///
/// This trait is the boundary between the engine's mixing logic and the
/// platform infrastructure that talks to the sound card. Its design is
/// callback-driven: the engine hands the backend a [`MixCallback`] and the
/// backend invokes it at device cadence on a dedicated audio thread.
///
/// Callback exclusion — the "device lock" of the engine's concurrency
/// model — is provided by the engine itself: the callback closure acquires
/// the engine's mixer mutex for the duration of each fill, so pausing the
/// stream or holding that mutex both keep the mixer off the shared state.
///
/// Devices are driven only from the control thread, so the trait carries no
/// `Send` bound; backend stream handles frequently are not `Send`.
pub trait AudioDevice {
    /// The stream shape this device was configured for.
    fn spec(&self) -> &DeviceSpec;

    /// Opens the output stream and starts pulling from `on_mix_needed`.
    ///
    /// # Errors
    ///
    /// [`AudioError::DeviceUnavailable`] if no suitable output device can be
    /// opened. The device is unusable afterwards.
    fn start(&mut self, on_mix_needed: MixCallback) -> Result<(), AudioError>;

    /// Suspends callback invocations. Safe to call when already paused.
    fn pause(&mut self);

    /// Resumes callback invocations after [`pause`](AudioDevice::pause).
    fn resume(&mut self);

    /// Tears down the output stream. Errors are terminal and swallowed.
    fn close(&mut self);
}
