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

//! The core mixing lane: sums playing channels into the device buffer.

use super::AudioMixingLane;
use melos_core::audio::{ChannelState, STREAM_CHANNELS};
use melos_data::ChannelTable;

/// A lane that sums sample-producing channels into an interleaved stereo
/// output buffer.
///
/// One pass over the playing table per invocation. Channels outside the
/// audible states are skipped entirely; `Virtualizing` channels are drawn
/// from (so their position keeps advancing) but contribute silence. Each
/// channel is drained in chunks bounded by the scratch capacity, gated on
/// its `enabled` flag so a disabled channel falls silent within one chunk.
///
/// Summation is plain addition: two channels at full scale can exceed
/// ±1.0, and clipping is left to the device.
#[derive(Default)]
pub struct BufferMixingLane;

impl BufferMixingLane {
    /// Creates a new `BufferMixingLane`.
    pub fn new() -> Self {
        Self
    }
}

impl AudioMixingLane for BufferMixingLane {
    fn mix(&self, channels: &mut ChannelTable, scratch: &mut [f32], output: &mut [f32]) {
        output.fill(0.0);

        let width = STREAM_CHANNELS as usize;
        let total_frames = output.len() / width;
        let scratch_frames = scratch.len() / width;
        if scratch_frames == 0 {
            return;
        }

        for channel in channels.iter_mut() {
            if !channel.state().is_audible() {
                continue;
            }

            let mut served = 0;
            while channel.is_enabled() && served < total_frames {
                let request = scratch_frames.min(total_frames - served);
                let chunk = &mut scratch[..request * width];
                chunk.fill(0.0);
                channel.mix(chunk);

                if channel.state() != ChannelState::Virtualizing {
                    let out = &mut output[served * width..(served + request) * width];
                    for (acc, sample) in out.iter_mut().zip(chunk.iter()) {
                        *acc += *sample;
                    }
                }
                served += request;
            }
        }
    }
}
