//! Frequency analysis of the signal flowing to the output.
//!
//! `AnalyserTap` sits in the signal path and copies a mono down-mix of every
//! frame into a short ring; `Analyser` turns the newest `FFT_SIZE` frames
//! into `BIN_COUNT` byte magnitudes on demand.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::types::{BIN_COUNT, FFT_SIZE};

type SampleRing = Arc<Mutex<VecDeque<f32>>>;

const SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Pass-through source that records what it yields.
pub struct AnalyserTap<S> {
    inner: S,
    ring: SampleRing,
    frame_sum: f32,
    frame_fill: u16,
}

impl<S: Source> AnalyserTap<S> {
    fn push_frame(&mut self, mono: f32) {
        // The mixer thread must never block here.
        if let Ok(mut ring) = self.ring.try_lock() {
            if ring.len() >= FFT_SIZE {
                ring.pop_front();
            }
            ring.push_back(mono);
        }
    }
}

impl<S: Source> Iterator for AnalyserTap<S> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        let channels = self.inner.channels().max(1);

        self.frame_sum += sample;
        self.frame_fill += 1;
        if self.frame_fill >= channels {
            let mono = self.frame_sum / channels as f32;
            self.frame_sum = 0.0;
            self.frame_fill = 0;
            self.push_frame(mono);
        }

        Some(sample)
    }
}

impl<S: Source> Source for AnalyserTap<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.inner.try_seek(pos)
    }
}

/// Graph-side half of the analyser node.
pub struct Analyser {
    ring: SampleRing,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    /// Build an analyser and the tap that feeds it from `source`.
    pub fn tap<S: Source>(source: S) -> (Self, AnalyserTap<S>) {
        let ring: SampleRing = Arc::new(Mutex::new(VecDeque::with_capacity(FFT_SIZE)));
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);

        let analyser = Self {
            ring: ring.clone(),
            fft,
            window: blackman(FFT_SIZE),
            smoothed: vec![0.0; BIN_COUNT],
        };
        let tap = AnalyserTap {
            inner: source,
            ring,
            frame_sum: 0.0,
            frame_fill: 0,
        };
        (analyser, tap)
    }

    /// Current magnitudes, one byte per bin, scaled from the decibel range.
    pub fn byte_frequency_data(&mut self) -> Vec<u8> {
        let mut buf: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];
        if let Ok(ring) = self.ring.lock() {
            // Right-align so the newest frame is always last.
            let offset = FFT_SIZE - ring.len().min(FFT_SIZE);
            for (i, &s) in ring.iter().take(FFT_SIZE).enumerate() {
                buf[offset + i].re = s;
            }
        }
        for (c, w) in buf.iter_mut().zip(&self.window) {
            c.re *= w;
        }

        self.fft.process(&mut buf);

        let norm = 1.0 / FFT_SIZE as f32;
        self.smoothed
            .iter_mut()
            .zip(&buf[..BIN_COUNT])
            .map(|(prev, c)| {
                let magnitude = c.norm() * norm;
                *prev = SMOOTHING * *prev + (1.0 - SMOOTHING) * magnitude;
                to_byte(*prev)
            })
            .collect()
    }
}

fn to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

fn blackman(n: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42_f32, 0.5_f32, 0.08_f32);
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}
