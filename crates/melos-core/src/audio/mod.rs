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

//! Audio contracts: the device boundary and the channel model.

pub mod channel;
pub mod device;
pub mod error;

pub use channel::{Channel, ChannelControls, ChannelId, ChannelSource, ChannelState};
pub use device::{AudioDevice, DeviceSpec, MixCallback, AUDIO_BUFFER_SIZE, SAMPLE_RATE, STREAM_CHANNELS};
pub use error::AudioError;
