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

//! Proves the mixing hot path performs zero heap allocations.

use melos_core::asset::AssetHandle;
use melos_core::audio::{Channel, ChannelControls, ChannelId, ChannelState};
use melos_data::{ChannelTable, SoundData};
use melos_lanes::audio_lane::{AudioMixingLane, BufferMixingLane, SampleSource};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Forwards to the system allocator while counting every allocation.
struct CountingAllocator;

static ALLOCATION_COUNT: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATION_COUNT.fetch_add(1, Ordering::SeqCst);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        ALLOCATION_COUNT.fetch_add(1, Ordering::SeqCst);
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn playing_channel(raw_id: u64, looping: bool) -> Channel {
    let sound = AssetHandle::new(SoundData {
        samples: vec![0.5; 600 * 2],
        channels: 2,
        sample_rate: 44_100,
    });
    let source = SampleSource::new(format!("voice-{raw_id}"), sound);
    source.props().set_volume(1.0);
    source.props().set_looping(looping);

    let mut channel = Channel::new(
        ChannelId::new(raw_id),
        Arc::new(ChannelControls::new()),
        Box::new(source),
    );
    channel.update();
    channel
}

#[test]
fn test_mix_callback_allocates_nothing() {
    // All setup allocation happens up front, the way the engine does it:
    // scratch and output sized once, channels created on the control plane.
    let mut table = ChannelTable::new();
    table.insert(playing_channel(1, true));
    table.insert(playing_channel(2, false));
    let stopping = playing_channel(3, false);
    stopping.controls().request_stop();
    table.insert(stopping);
    table.get_mut(ChannelId::new(3)).unwrap().update();
    assert_eq!(
        table.get(ChannelId::new(3)).unwrap().state(),
        ChannelState::Stopping
    );

    let lane = BufferMixingLane::new();
    let mut scratch = vec![0.0f32; 1024 * 2];
    let mut output = vec![0.0f32; 1024 * 2];

    let before = ALLOCATION_COUNT.load(Ordering::SeqCst);
    for _ in 0..8 {
        lane.mix(&mut table, &mut scratch, &mut output);
    }
    let after = ALLOCATION_COUNT.load(Ordering::SeqCst);

    assert_eq!(
        after - before,
        0,
        "The mixer callback must not touch the allocator"
    );
    assert!(
        output.iter().any(|&s| s != 0.0) || table.iter().all(|c| !c.state().is_audible()),
        "Sanity: the mix actually ran"
    );
}
