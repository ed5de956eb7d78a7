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

//! Error type for audio engine operations.

use super::channel::ChannelId;
use std::fmt;

/// Error type for audio engine operations.
///
/// The audio callback itself never reports errors; malformed channels are
/// skipped. These variants surface from control-plane operations only.
#[derive(Debug)]
pub enum AudioError {
    /// No output device could be opened. The engine is not usable.
    DeviceUnavailable {
        /// Backend description of what went wrong.
        reason: String,
    },
    /// A playback request referenced a sound name that is not loaded.
    UnknownSound(String),
    /// An operation referenced a channel id that is invalid or already dead.
    InvalidChannelRef(ChannelId),
    /// Decoded audio data does not fit the engine's fixed stream shape.
    UnsupportedFormat {
        /// What the engine supports.
        expected: &'static str,
        /// Description of what was provided.
        received: String,
    },
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::DeviceUnavailable { reason } => {
                write!(f, "Audio device unavailable: {reason}")
            }
            AudioError::UnknownSound(name) => write!(f, "Unknown sound: {name:?}"),
            AudioError::InvalidChannelRef(id) => write!(f, "Invalid channel reference: {id}"),
            AudioError::UnsupportedFormat { expected, received } => {
                write!(f, "Unsupported audio format: expected {expected}, got {received}")
            }
        }
    }
}

impl std::error::Error for AudioError {}

impl AudioError {
    /// Convenience constructor for a failed device open.
    pub fn device_unavailable(reason: impl Into<String>) -> Self {
        AudioError::DeviceUnavailable {
            reason: reason.into(),
        }
    }
}
