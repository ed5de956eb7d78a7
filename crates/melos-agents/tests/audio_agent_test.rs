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

//! Lifecycle scenarios for the audio agent, driven through a manual test
//! device.

use melos_agents::AudioAgent;
use melos_core::asset::AssetHandle;
use melos_core::audio::{
    AudioDevice, AudioError, ChannelControls, ChannelId, ChannelSource, ChannelState, DeviceSpec,
    MixCallback,
};
use melos_data::SoundData;
use melos_lanes::audio_lane::{SampleProps, SampleSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- TEST DOUBLES FOR THIS SUITE ---

/// Backend state shared with the test body so callbacks can be pumped by
/// hand, the way a device thread would.
#[derive(Default)]
struct TestDeviceState {
    callback: Mutex<Option<MixCallback>>,
    paused: AtomicBool,
    closed: AtomicBool,
}

impl TestDeviceState {
    /// Invokes the installed mix callback for `frames` stereo frames.
    fn pump(&self, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0f32; frames * 2];
        if self.paused.load(Ordering::SeqCst) {
            return buffer;
        }
        if let Some(callback) = self.callback.lock().unwrap().as_mut() {
            callback(&mut buffer);
        }
        buffer
    }
}

struct TestDevice {
    spec: DeviceSpec,
    state: Arc<TestDeviceState>,
}

impl TestDevice {
    fn new() -> (Self, Arc<TestDeviceState>) {
        let state = Arc::new(TestDeviceState::default());
        (
            Self {
                spec: DeviceSpec::default(),
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl AudioDevice for TestDevice {
    fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    fn start(&mut self, on_mix_needed: MixCallback) -> Result<(), AudioError> {
        *self.state.callback.lock().unwrap() = Some(on_mix_needed);
        Ok(())
    }

    fn pause(&mut self) {
        self.state.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.state.paused.store(false, Ordering::SeqCst);
    }

    fn close(&mut self) {
        self.state.closed.store(true, Ordering::SeqCst);
        *self.state.callback.lock().unwrap() = None;
    }
}

/// A device that never opens, for the construction-failure path.
struct UnavailableDevice {
    spec: DeviceSpec,
}

impl AudioDevice for UnavailableDevice {
    fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    fn start(&mut self, _on_mix_needed: MixCallback) -> Result<(), AudioError> {
        Err(AudioError::device_unavailable("no output device in test"))
    }

    fn pause(&mut self) {}
    fn resume(&mut self) {}
    fn close(&mut self) {}
}

/// A source that stops on request without fading and counts its finishes.
struct CountingSource {
    finishes: Arc<AtomicUsize>,
}

impl ChannelSource for CountingSource {
    fn mix(&mut self, _ctl: &ChannelControls, out: &mut [f32]) {
        out.fill(0.25);
    }

    fn update(&mut self, ctl: &ChannelControls) {
        if ctl.state() == ChannelState::Initialize {
            ctl.set_state(ChannelState::Playing);
        }
        if ctl.stop_requested() && ctl.state() == ChannelState::Playing {
            ctl.set_state(ChannelState::Stopped);
        }
    }

    fn finish(&mut self, ctl: &ChannelControls) {
        self.finishes.fetch_add(1, Ordering::SeqCst);
        ctl.set_state(ChannelState::Last);
    }
}

fn tone(frames: usize, value: f32) -> AssetHandle<SoundData> {
    AssetHandle::new(SoundData {
        samples: vec![value; frames * 2],
        channels: 2,
        sample_rate: 44_100,
    })
}

/// Registers a sample channel the way the host facade does: create the
/// source, keep the prop handle, set volume/pan.
fn play(agent: &mut AudioAgent, sound: AssetHandle<SoundData>, volume: f32) -> (ChannelId, Arc<SampleProps>) {
    let source = SampleSource::new("tone", sound);
    let props = Arc::clone(source.props());
    props.set_volume(volume);
    let id = agent.channel_init(Box::new(source));
    (id, props)
}

fn started_agent() -> (AudioAgent, Arc<TestDeviceState>) {
    let (device, state) = TestDevice::new();
    let mut agent = AudioAgent::new(Box::new(device));
    agent.start().expect("test device always opens");
    (agent, state)
}

// --- SCENARIOS ---

#[test]
fn test_channel_ids_are_monotone_and_nonzero() {
    let (mut agent, _state) = started_agent();

    let mut previous = 0u64;
    for _ in 0..32 {
        let id = agent.channel_init(Box::new(CountingSource {
            finishes: Arc::new(AtomicUsize::new(0)),
        }));
        assert!(id.is_valid(), "Allocated ids must never be the zero sentinel");
        assert!(id.raw() > previous, "Ids must be strictly increasing");
        previous = id.raw();
    }
}

#[test]
fn test_pending_channel_is_visible_to_get_but_not_mixed() {
    let (mut agent, state) = started_agent();
    let (id, _props) = play(&mut agent, tone(4096, 0.5), 1.0);

    assert!(agent.controls(id).is_some(), "A pending channel must be findable");
    assert!(agent.is_playing(id));

    let output = state.pump(256);
    assert!(
        output.iter().all(|&s| s == 0.0),
        "A channel must not be mixed before promotion"
    );
    assert_eq!(agent.pending_count(), 1);

    agent.update();
    let output = state.pump(256);
    assert!(
        output.iter().any(|&s| s != 0.0),
        "After one update the channel must reach the mix"
    );
}

#[test]
fn test_update_promotes_every_pending_channel_atomically() {
    let (mut agent, _state) = started_agent();
    let (first, _) = play(&mut agent, tone(1024, 0.1), 1.0);
    let (second, _) = play(&mut agent, tone(1024, 0.2), 1.0);
    assert_eq!(agent.pending_count(), 2);

    agent.update();

    assert_eq!(agent.pending_count(), 0, "Pending must be empty after update");
    let guard = agent.lock();
    assert!(guard.playing().contains(first));
    assert!(guard.playing().contains(second));
}

#[test]
fn test_stop_request_is_monotonic_until_finish() {
    let (mut agent, _state) = started_agent();
    let (id, _props) = play(&mut agent, tone(4096, 0.5), 1.0);
    agent.update();

    agent.stop(id);
    agent.stop(id); // idempotent
    let ctl = agent.controls(id).unwrap();
    assert!(ctl.stop_requested());

    agent.update();
    assert!(
        ctl.stop_requested(),
        "A stop request must stay set across updates"
    );
}

#[test]
fn test_finish_runs_exactly_once_and_record_disappears() {
    let (mut agent, _state) = started_agent();
    let finishes = Arc::new(AtomicUsize::new(0));
    let id = agent.channel_init(Box::new(CountingSource {
        finishes: Arc::clone(&finishes),
    }));

    agent.update(); // promote + reach Playing
    agent.stop(id);
    agent.update(); // observe Stopped, finish, delete

    assert_eq!(finishes.load(Ordering::SeqCst), 1, "Finish must run exactly once");
    assert!(!agent.is_playing(id));
    assert!(agent.controls(id).is_none(), "Dead ids must resolve to nothing");
    {
        let guard = agent.lock();
        assert!(!guard.playing().contains(id));
    }
    assert_eq!(agent.pending_count(), 0);

    agent.update();
    assert_eq!(finishes.load(Ordering::SeqCst), 1, "Later updates must not re-finish");
}

#[test]
fn test_stop_fades_to_silence_then_finishes() {
    let (mut agent, state) = started_agent();
    let frames = DeviceSpec::default().buffer_frames;
    let (id, _props) = play(&mut agent, tone(frames * 16, 0.5), 1.0);
    agent.update();

    let steady = state.pump(frames);
    assert!((steady[0] - 0.5).abs() < 0.01, "Steady state should sit at the source level");

    agent.stop(id);
    agent.update();

    let fading = state.pump(frames);
    assert!(fading[0] > fading[frames / 2 * 2], "Amplitude must decrease while stopping");

    let silent = state.pump(frames);
    assert!(
        silent.iter().all(|&s| s == 0.0),
        "The fade must complete within one buffer"
    );

    agent.update();
    assert!(!agent.is_playing(id), "A faded channel must read as dead");
}

#[test]
fn test_stop_all_reaches_pending_and_playing() {
    let (mut agent, _state) = started_agent();
    let (promoted, _) = play(&mut agent, tone(4096, 0.5), 1.0);
    agent.update();
    let (still_pending, _) = play(&mut agent, tone(4096, 0.5), 1.0);

    agent.stop_all();

    assert!(agent.controls(promoted).unwrap().stop_requested());
    assert!(agent.controls(still_pending).unwrap().stop_requested());
}

#[test]
fn test_disabled_channel_is_silenced_between_callbacks() {
    let (mut agent, state) = started_agent();
    let (id, _props) = play(&mut agent, tone(8192, 0.5), 1.0);
    agent.update();

    assert!(state.pump(128).iter().any(|&s| s != 0.0));

    agent.set_enabled(id, false);
    let muted = state.pump(128);
    assert!(
        muted.iter().all(|&s| s == 0.0),
        "A disabled channel must be silent on the next callback"
    );
}

#[test]
fn test_virtualized_channel_stays_alive_but_silent() {
    let (mut agent, state) = started_agent();
    let (id, _props) = play(&mut agent, tone(8192, 0.5), 1.0);
    agent.update();

    assert!(agent.virtualize(id), "A playing channel can be virtualized");
    assert!(
        state.pump(128).iter().all(|&s| s == 0.0),
        "A virtualized channel must contribute silence"
    );
    assert!(agent.is_playing(id), "Virtualization must not kill the channel");

    assert!(agent.devirtualize(id));
    agent.update();
    assert!(state.pump(128).iter().any(|&s| s != 0.0));
}

#[test]
fn test_unavailable_device_reports_construction_error() {
    let mut agent = AudioAgent::new(Box::new(UnavailableDevice {
        spec: DeviceSpec::default(),
    }));

    let result = agent.start();
    assert!(
        matches!(result, Err(AudioError::DeviceUnavailable { .. })),
        "A failed open must surface as DeviceUnavailable"
    );
}

#[test]
fn test_pause_and_halt_drive_the_device() {
    let (mut agent, state) = started_agent();
    let (_id, _props) = play(&mut agent, tone(8192, 0.5), 1.0);
    agent.update();

    agent.pause();
    assert!(state.pump(64).iter().all(|&s| s == 0.0), "Paused devices emit nothing");

    agent.resume();
    assert!(state.pump(64).iter().any(|&s| s != 0.0));

    agent.halt();
    assert!(state.closed.load(Ordering::SeqCst), "Halt must close the device");
}

#[test]
fn test_setters_are_noops_on_dead_ids() {
    let (mut agent, _state) = started_agent();
    let finishes = Arc::new(AtomicUsize::new(0));
    let id = agent.channel_init(Box::new(CountingSource {
        finishes: Arc::clone(&finishes),
    }));
    agent.update();
    agent.stop(id);
    agent.update();

    // All of these must silently do nothing.
    agent.stop(id);
    agent.set_enabled(id, false);
    assert!(!agent.virtualize(id));
    assert!(!agent.is_playing(id));
    assert!(!agent.is_playing(ChannelId::INVALID));
}
