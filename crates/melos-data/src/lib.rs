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

//! # Melos Data
//!
//! Data layer of the audio engine: decoded sound assets, the name → handle
//! sound bank, and the channel table the mixer iterates.

#![warn(missing_docs)]

pub mod assets;
pub mod channel;

pub use assets::{SoundBank, SoundData};
pub use channel::ChannelTable;
