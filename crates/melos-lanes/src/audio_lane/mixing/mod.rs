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

//! Groups the audio mixing lanes.

mod buffer_mixing_lane;

pub use buffer_mixing_lane::*;

use melos_data::ChannelTable;

/// A trait defining the behavior of an audio mixing lane.
///
/// A mixing lane is the body of the device callback: given the set of
/// playing channels and an engine-owned scratch buffer, it produces the
/// interleaved output buffer the device asked for. Implementations run on
/// the audio thread under the mixer lock and must not allocate or block.
pub trait AudioMixingLane: Send + Sync {
    /// Mixes every eligible channel in `channels` into `output`.
    ///
    /// # Arguments
    /// * `channels`: The *playing* table. Channels advance their playback
    ///   state as they are drawn from.
    /// * `scratch`: Engine-owned intermediate buffer; its capacity bounds
    ///   the chunk size requested from any single channel.
    /// * `output`: The device buffer, interleaved stereo `f32`. Zeroed by
    ///   the lane before summation.
    fn mix(&self, channels: &mut ChannelTable, scratch: &mut [f32], output: &mut [f32]);
}
