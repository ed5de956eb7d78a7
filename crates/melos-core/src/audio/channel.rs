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

//! The channel model: ids, the lifecycle state machine, cross-thread control
//! flags, and the `ChannelSource` capability trait.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Identifier of a logical playback channel.
///
/// Ids are allocated by the engine, strictly increasing, and never reused
/// for the lifetime of an engine instance. Zero is reserved as the invalid
/// sentinel returned when channel creation fails (e.g. unknown sound name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    /// The reserved "no channel" sentinel.
    pub const INVALID: ChannelId = ChannelId(0);

    /// Wraps a raw id value. Engine-internal callers only.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// `false` for the reserved sentinel.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a channel.
///
/// The happy path advances strictly in declaration order:
/// `Initialize → Devirtualize → Playing → Stopping → Stopped → Last`.
/// `Virtualizing` sits outside the line: the channel keeps ticking and
/// advancing its position but contributes silence to the mix; leaving it
/// routes back through `Devirtualize` so props re-apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelState {
    /// Freshly created; waiting for its first control-plane tick.
    Initialize = 0,
    /// Audio handle bound; props are about to be applied.
    Devirtualize = 1,
    /// Producing samples.
    Playing = 2,
    /// Logically alive and advancing, but mixed as silence.
    Virtualizing = 3,
    /// Fading out; becomes `Stopped` when the fade or the source runs out.
    Stopping = 4,
    /// Done producing; the next update walk finishes and removes it.
    Stopped = 5,
    /// Terminal. Resources released.
    Last = 6,
}

impl ChannelState {
    /// States the mixer visits. `Virtualizing` is visited but summed as
    /// silence.
    pub fn is_audible(self) -> bool {
        matches!(
            self,
            ChannelState::Playing | ChannelState::Virtualizing | ChannelState::Stopping
        )
    }

    /// `true` until the channel reaches `Stopped`.
    pub fn is_alive(self) -> bool {
        !matches!(self, ChannelState::Stopped | ChannelState::Last)
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ChannelState::Initialize,
            1 => ChannelState::Devirtualize,
            2 => ChannelState::Playing,
            3 => ChannelState::Virtualizing,
            4 => ChannelState::Stopping,
            5 => ChannelState::Stopped,
            _ => ChannelState::Last,
        }
    }
}

/// Word-sized control flags shared between the control thread and the audio
/// thread.
///
/// Everything here is a relaxed atomic. That is sufficient because the flags
/// are either monotonic (`stop_requested`), tolerate one buffer of staleness
/// (`enabled`), or are written under the mixer lock (`state`, except for the
/// virtualization compare-and-swap hooks).
#[derive(Debug)]
pub struct ChannelControls {
    state: AtomicU8,
    enabled: AtomicBool,
    stop_requested: AtomicBool,
}

impl ChannelControls {
    /// Fresh controls for a channel about to enter the pending table.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ChannelState::Initialize as u8),
            enabled: AtomicBool::new(true),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        ChannelState::from_raw(self.state.load(Ordering::Relaxed))
    }

    /// Stores a new lifecycle state. Callers are expected to only ever
    /// advance the machine.
    pub fn set_state(&self, state: ChannelState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    /// Atomically moves `from → to`; returns whether the swap happened.
    ///
    /// Used by the virtualization hooks, which run without the mixer lock
    /// and must not clobber a concurrent `Stopping`/`Stopped` transition.
    pub fn transition(&self, from: ChannelState, to: ChannelState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Whether the mixer may draw samples from this channel at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Flips the immediate-silence switch. Honored by the mixer within one
    /// chunk.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether a cooperative stop has been requested.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }

    /// Requests a cooperative stop. Monotonic: there is no way to clear it.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }
}

impl Default for ChannelControls {
    fn default() -> Self {
        Self::new()
    }
}

/// The capability trio a concrete sample producer supplies.
///
/// This is the engine's polymorphism seam: a sample-buffer source, a
/// streaming source, or a synthesized source each implement these three
/// hooks and the engine drives them identically. The trait object owns
/// whatever per-channel data the source needs; dropping the channel record
/// after [`finish`](ChannelSource::finish) releases it.
pub trait ChannelSource: Send {
    /// Fills `out` with exactly `out.len() / 2` interleaved stereo frames.
    ///
    /// Runs on the audio thread under the mixer lock. Must not allocate,
    /// block, or write beyond `out`. Under-production must be left as the
    /// silence already present in the (zeroed) buffer.
    fn mix(&mut self, ctl: &ChannelControls, out: &mut [f32]);

    /// Control-plane tick, run under the mixer lock once per host frame.
    ///
    /// Advances the lifecycle machine and publishes pending prop changes to
    /// the snapshot [`mix`](ChannelSource::mix) reads.
    fn update(&mut self, ctl: &ChannelControls);

    /// Runs on the control thread after the channel reached
    /// [`ChannelState::Stopped`]; releases resources and must leave the
    /// state at [`ChannelState::Last`].
    fn finish(&mut self, ctl: &ChannelControls);
}

/// A channel record: id, shared control flags, and the boxed source.
///
/// Records live in the engine's pending/playing tables. The controls are
/// behind an `Arc` so the control plane can keep setter/query handles that
/// outlive its own borrow of the tables.
pub struct Channel {
    id: ChannelId,
    controls: Arc<ChannelControls>,
    source: Box<dyn ChannelSource>,
}

impl Channel {
    /// Assembles a record. The id must come from the engine's allocator.
    pub fn new(id: ChannelId, controls: Arc<ChannelControls>, source: Box<dyn ChannelSource>) -> Self {
        Self { id, controls, source }
    }

    /// The channel's id.
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// The shared control flags.
    pub fn controls(&self) -> &Arc<ChannelControls> {
        &self.controls
    }

    /// Shortcut for `controls().state()`.
    pub fn state(&self) -> ChannelState {
        self.controls.state()
    }

    /// Shortcut for `controls().is_enabled()`.
    pub fn is_enabled(&self) -> bool {
        self.controls.is_enabled()
    }

    /// Delegates to the source's mix hook.
    pub fn mix(&mut self, out: &mut [f32]) {
        self.source.mix(&self.controls, out);
    }

    /// Delegates to the source's update hook.
    pub fn update(&mut self) {
        self.source.update(&self.controls);
    }

    /// Delegates to the source's finish hook.
    pub fn finish(&mut self) {
        self.source.finish(&self.controls);
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("state", &self.controls.state())
            .finish()
    }
}
