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

//! A name-keyed registry of loaded sounds.

use super::SoundData;
use melos_core::asset::AssetHandle;
use std::collections::HashMap;

/// A central, in-memory cache of decoded sounds keyed by host-chosen name.
///
/// Each sound is loaded once; playback channels receive clones of the cached
/// handle. Removing a name drops only the bank's reference — channels still
/// playing that sound keep theirs until they finish.
#[derive(Default)]
pub struct SoundBank {
    sounds: HashMap<String, AssetHandle<SoundData>>,
}

impl SoundBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self {
            sounds: HashMap::new(),
        }
    }

    /// Registers a decoded sound under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, handle: AssetHandle<SoundData>) {
        self.sounds.insert(name.into(), handle);
    }

    /// The handle registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&AssetHandle<SoundData>> {
        self.sounds.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    /// Unregisters `name`. Returns the handle that was stored, if any.
    pub fn remove(&mut self, name: &str) -> Option<AssetHandle<SoundData>> {
        self.sounds.remove(name)
    }

    /// Unregisters everything.
    pub fn clear(&mut self) {
        self.sounds.clear();
    }

    /// Number of registered sounds.
    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}
