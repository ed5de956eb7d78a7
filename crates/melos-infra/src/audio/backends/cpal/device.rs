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

//! Contains the `CpalAudioDevice` struct.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use melos_core::audio::{AudioDevice, AudioError, DeviceSpec, MixCallback};

/// An `AudioDevice` implementation that drives the host's default output
/// device via CPAL.
///
/// The stream handle is kept so the device can be paused, resumed, and
/// closed for the lifetime of the engine. CPAL streams are not `Send`;
/// like every `AudioDevice`, this one is owned and driven by the control
/// thread only, while CPAL runs the mix callback on its own audio thread.
pub struct CpalAudioDevice {
    spec: DeviceSpec,
    stream: Option<cpal::Stream>,
}

impl CpalAudioDevice {
    /// Creates a backend that will request the given stream shape.
    pub fn new(spec: DeviceSpec) -> Self {
        Self { spec, stream: None }
    }
}

impl Default for CpalAudioDevice {
    fn default() -> Self {
        Self::new(DeviceSpec::default())
    }
}

impl AudioDevice for CpalAudioDevice {
    fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    fn start(&mut self, mut on_mix_needed: MixCallback) -> Result<(), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::device_unavailable("no default output device"))?;

        let default_config = device
            .default_output_config()
            .map_err(|e| AudioError::device_unavailable(e.to_string()))?;
        if default_config.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::device_unavailable(format!(
                "unsupported sample format: {}",
                default_config.sample_format()
            )));
        }

        let config = cpal::StreamConfig {
            channels: self.spec.channels,
            sample_rate: cpal::SampleRate(self.spec.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.spec.buffer_frames as u32),
        };

        let audio_callback = move |output: &mut [f32], _: &cpal::OutputCallbackInfo| {
            on_mix_needed(output);
        };
        let error_callback = |err| {
            log::error!("An error occurred on the audio stream: {err}");
        };

        let stream = device
            .build_output_stream(&config, audio_callback, error_callback, None)
            .map_err(|e| AudioError::device_unavailable(e.to_string()))?;
        stream
            .play()
            .map_err(|e| AudioError::device_unavailable(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.pause() {
                log::warn!("Failed to pause audio stream: {e}");
            }
        }
    }

    fn resume(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(e) = stream.play() {
                log::warn!("Failed to resume audio stream: {e}");
            }
        }
    }

    fn close(&mut self) {
        // Dropping the stream tears it down; failures past this point are
        // terminal anyway.
        if self.stream.take().is_some() {
            log::info!("Audio stream closed");
        }
    }
}
