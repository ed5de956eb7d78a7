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

//! The id → channel record table backing the pending/playing sets.

use melos_core::audio::{Channel, ChannelId};
use std::collections::HashMap;

/// A mapping from channel id to channel record.
///
/// Two of these back the engine: *pending* (control-thread private) and
/// *playing* (walked by the mixer under the device lock). Growth and rehash
/// happen only on [`insert`](Self::insert), which the engine calls only on
/// the control thread outside the device lock — iteration never allocates.
///
/// Dropping or [`release`](Self::release)-ing a table drops the records it
/// still holds; a record's source is released by the channel `finish` hook
/// before the engine removes it on the normal path.
#[derive(Default)]
pub struct ChannelTable {
    entries: HashMap<ChannelId, Channel>,
}

impl ChannelTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts a record, keyed by its id. An existing record under the same
    /// id is replaced — which cannot happen under the engine's id-uniqueness
    /// invariant.
    pub fn insert(&mut self, channel: Channel) {
        self.entries.insert(channel.id(), channel);
    }

    /// The record for `id`, if present.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.entries.get(&id)
    }

    /// Mutable access to the record for `id`, if present.
    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.entries.get_mut(&id)
    }

    /// Whether a record for `id` is present.
    pub fn contains(&self, id: ChannelId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Removes and returns the record for `id`.
    pub fn remove(&mut self, id: ChannelId) -> Option<Channel> {
        self.entries.remove(&id)
    }

    /// Single-pass iteration over all records. Order is unspecified but
    /// stable across non-mutating passes.
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.entries.values()
    }

    /// Single-pass mutable iteration over all records.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.entries.values_mut()
    }

    /// Keeps only the records for which `keep` returns `true`.
    ///
    /// This is the engine's iterate-and-delete-current primitive: the update
    /// walk ticks each record inside `keep` and returns `false` for the ones
    /// that finished.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut Channel) -> bool) {
        self.entries.retain(|_, channel| keep(channel));
    }

    /// Moves every record out of `src` into `self`.
    ///
    /// The pending → playing promotion. `src` is left empty but keeps its
    /// storage; the engine releases that separately, outside the lock.
    pub fn merge_from(&mut self, src: &mut ChannelTable) {
        for (id, channel) in src.entries.drain() {
            self.entries.insert(id, channel);
        }
    }

    /// Drops the table's storage, leaving a fresh empty table. Records still
    /// present are dropped with it.
    pub fn release(&mut self) {
        self.entries = HashMap::new();
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no records are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
