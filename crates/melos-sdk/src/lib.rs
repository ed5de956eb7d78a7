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

//! The public-facing SDK for the Melos audio engine.
//!
//! This crate provides a simple and stable API for hosts and scripting
//! bindings: load sounds by name, play them as channels, adjust channels
//! while they run, and tick the engine once per frame.

#![warn(missing_docs)]

mod host;

pub use host::{AudioHost, DEFAULT_VOLUME};

/// Publicly re-exported types for ease of use.
pub mod prelude {
    pub use crate::{AudioHost, DEFAULT_VOLUME};
    pub use melos_core::audio::{AudioDevice, AudioError, ChannelId, DeviceSpec};
    pub use melos_data::SoundData;
}
