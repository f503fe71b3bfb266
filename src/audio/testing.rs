//! In-memory audio platform for tests: counts contexts and connected chains
//! and lets a test pull samples the way the output mixer would.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rodio::Source;
use rodio::buffer::SamplesBuffer;

use crate::error::PlayerError;

use super::media::MediaElement;
use super::platform::{AudioContext, AudioPlatform, GraphInput, OutputNode};
use super::types::ContextState;

#[derive(Default)]
pub struct FakeDevice {
    pub unavailable: bool,
    pub start_suspended: bool,
    pub contexts_created: usize,
    pub resumes: usize,
    pub closes: usize,
    pub live_chains: usize,
    pub peak_live_chains: usize,
    pub connects: usize,
    pub paused: bool,
    input: Option<GraphInput>,
    samples_per_second: u64,
    seek_base: Duration,
    pulled_since_seek: u64,
}

impl FakeDevice {
    fn position(&self) -> Duration {
        let rate = self.samples_per_second.max(1) as f64;
        self.seek_base + Duration::from_secs_f64(self.pulled_since_seek as f64 / rate)
    }
}

#[derive(Clone, Default)]
pub struct FakePlatform {
    pub device: Rc<RefCell<FakeDevice>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let p = Self::default();
        p.device.borrow_mut().unavailable = true;
        p
    }

    /// Pull up to `n` samples from the connected chain the way the mixer
    /// would. A paused stage yields nothing.
    pub fn pull_samples(&self, n: usize) -> Vec<f32> {
        let mut device = self.device.borrow_mut();
        if device.paused {
            return Vec::new();
        }
        let Some(input) = device.input.as_mut() else {
            return Vec::new();
        };
        let samples: Vec<f32> = input.by_ref().take(n).collect();
        device.pulled_since_seek += samples.len() as u64;
        samples
    }

    /// Like `pull_samples`, returning how many came.
    pub fn pull(&self, n: usize) -> usize {
        self.pull_samples(n).len()
    }

    /// Pull until the connected chain ends (bounded).
    pub fn drain(&self) -> usize {
        self.pull(10_000_000)
    }

    pub fn live_chains(&self) -> usize {
        self.device.borrow().live_chains
    }

    pub fn peak_live_chains(&self) -> usize {
        self.device.borrow().peak_live_chains
    }
}

pub struct FakeContext {
    device: Rc<RefCell<FakeDevice>>,
    state: ContextState,
}

impl AudioPlatform for FakePlatform {
    type Context = FakeContext;

    fn create_context(&mut self) -> Result<FakeContext, PlayerError> {
        let mut device = self.device.borrow_mut();
        if device.unavailable {
            return Err(PlayerError::AudioUnavailable("no fake device".into()));
        }
        device.contexts_created += 1;
        let state = if device.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(FakeContext {
            device: self.device.clone(),
            state,
        })
    }
}

impl AudioContext for FakeContext {
    type Output = FakeOutput;

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), PlayerError> {
        if self.state == ContextState::Closed {
            return Err(PlayerError::PlaybackRejected("closed".into()));
        }
        self.device.borrow_mut().resumes += 1;
        self.state = ContextState::Running;
        Ok(())
    }

    fn suspend(&mut self) {
        if self.state == ContextState::Running {
            self.state = ContextState::Suspended;
        }
    }

    fn connect(&mut self, input: GraphInput) -> Result<FakeOutput, PlayerError> {
        let mut device = self.device.borrow_mut();
        device.connects += 1;
        device.live_chains += 1;
        device.peak_live_chains = device.peak_live_chains.max(device.live_chains);
        device.samples_per_second = input.sample_rate() as u64 * input.channels() as u64;
        device.seek_base = Duration::ZERO;
        device.pulled_since_seek = 0;
        device.paused = true;
        device.input = Some(input);
        Ok(FakeOutput {
            device: self.device.clone(),
            gain: 1.0,
            connected: true,
        })
    }

    fn close(&mut self) {
        self.device.borrow_mut().closes += 1;
        self.state = ContextState::Closed;
    }
}

pub struct FakeOutput {
    device: Rc<RefCell<FakeDevice>>,
    gain: f32,
    connected: bool,
}

impl OutputNode for FakeOutput {
    fn set_gain(&mut self, level: f32) {
        self.gain = level;
    }

    fn gain(&self) -> f32 {
        self.gain
    }

    fn play(&mut self) {
        if self.connected {
            self.device.borrow_mut().paused = false;
        }
    }

    fn pause(&mut self) {
        if self.connected {
            self.device.borrow_mut().paused = true;
        }
    }

    fn is_paused(&self) -> bool {
        !self.connected || self.device.borrow().paused
    }

    fn seek(&mut self, pos: Duration) -> Result<(), PlayerError> {
        let mut device = self.device.borrow_mut();
        let Some(input) = device.input.as_mut() else {
            return Err(PlayerError::Unbound);
        };
        input
            .try_seek(pos)
            .map_err(|e| PlayerError::DecodeError(e.to_string()))?;
        device.seek_base = pos;
        device.pulled_since_seek = 0;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.device.borrow().position()
    }

    fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            let mut device = self.device.borrow_mut();
            device.live_chains -= 1;
            device.input = None;
        }
    }
}

/// An element over `secs` seconds of a constant stereo signal.
pub fn element(track_id: &str, secs: f32) -> MediaElement {
    let rate = 8_000u32;
    let frames = (rate as f32 * secs) as usize;
    stereo_element(track_id, rate, vec![0.25_f32; frames * 2])
}

/// An element whose left channel is always `1.0` and right always `-1.0`.
pub fn left_right_element(track_id: &str, secs: f32) -> MediaElement {
    let rate = 8_000u32;
    let frames = (rate as f32 * secs) as usize;
    let samples = (0..frames).flat_map(|_| [1.0_f32, -1.0]).collect();
    stereo_element(track_id, rate, samples)
}

fn stereo_element(track_id: &str, rate: u32, samples: Vec<f32>) -> MediaElement {
    let secs = samples.len() as f32 / (2 * rate) as f32;
    MediaElement::from_source(
        track_id,
        Box::new(SamplesBuffer::new(2, rate, samples)),
        Some(Duration::from_secs_f32(secs)),
        Duration::from_millis(250),
    )
}

/// Write a mono 16-bit PCM WAV of `secs` seconds at 8 kHz.
pub fn write_wav(path: &std::path::Path, secs: f32) {
    let rate = 8_000u32;
    let frames = (rate as f32 * secs) as u32;
    let data_len = frames * 2;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&rate.to_le_bytes());
    bytes.extend_from_slice(&(rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for n in 0..frames {
        let s = ((n as f32 * 0.05).sin() * 8_000.0) as i16;
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}
