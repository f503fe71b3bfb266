//! The platform audio subsystem the graph is built on.
//!
//! `AudioGraphService` only talks to these traits. `RodioPlatform` opens the
//! default output device; tests substitute a recording fake.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, info};

use crate::error::PlayerError;

use super::analyser::AnalyserTap;
use super::media::ElementSource;
use super::types::ContextState;

/// What the graph hands to the output: the element's source behind the analyser.
pub type GraphInput = AnalyserTap<ElementSource>;

pub trait AudioPlatform {
    type Context: AudioContext;

    /// Open a new processing context. `AudioUnavailable` when there is no device.
    fn create_context(&mut self) -> Result<Self::Context, PlayerError>;
}

pub trait AudioContext {
    type Output: OutputNode;

    fn state(&self) -> ContextState;
    fn resume(&mut self) -> Result<(), PlayerError>;
    fn suspend(&mut self);
    /// Connect `input` through a fresh gain stage to the destination.
    fn connect(&mut self, input: GraphInput) -> Result<Self::Output, PlayerError>;
    fn close(&mut self);
}

/// Gain stage between the analyser and the destination. It also owns the
/// transport: a freshly connected stage is paused at position zero.
pub trait OutputNode {
    fn set_gain(&mut self, level: f32);
    fn gain(&self) -> f32;
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn seek(&mut self, pos: Duration) -> Result<(), PlayerError>;
    /// Time played since the start of the source, seeks included.
    fn position(&self) -> Duration;
    /// Stop feeding the destination. Idempotent.
    fn disconnect(&mut self);
}

/// Default output device through rodio.
#[derive(Debug, Default)]
pub struct RodioPlatform;

impl AudioPlatform for RodioPlatform {
    type Context = RodioContext;

    fn create_context(&mut self) -> Result<RodioContext, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::AudioUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);
        info!("audio output opened");

        Ok(RodioContext {
            stream: Some(stream),
            state: ContextState::Running,
            suspended: Arc::new(AtomicBool::new(false)),
            stages: Vec::new(),
        })
    }
}

/// A sink plus whether its owner wants it playing. The context may hold it
/// paused regardless while suspended.
struct GainStage {
    sink: Sink,
    playing: AtomicBool,
}

pub struct RodioContext {
    stream: Option<OutputStream>,
    state: ContextState,
    suspended: Arc<AtomicBool>,
    stages: Vec<Weak<GainStage>>,
}

impl RodioContext {
    fn live_stages(&mut self) -> Vec<Arc<GainStage>> {
        self.stages.retain(|w| w.strong_count() > 0);
        self.stages.iter().filter_map(Weak::upgrade).collect()
    }
}

impl AudioContext for RodioContext {
    type Output = RodioOutput;

    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), PlayerError> {
        match self.state {
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.suspended.store(false, Ordering::Release);
                for stage in self.live_stages() {
                    if stage.playing.load(Ordering::Acquire) {
                        stage.sink.play();
                    }
                }
                self.state = ContextState::Running;
                debug!("audio context resumed");
                Ok(())
            }
            ContextState::Closed => Err(PlayerError::PlaybackRejected(
                "audio context is closed".into(),
            )),
        }
    }

    fn suspend(&mut self) {
        if self.state == ContextState::Running {
            self.suspended.store(true, Ordering::Release);
            for stage in self.live_stages() {
                stage.sink.pause();
            }
            self.state = ContextState::Suspended;
            debug!("audio context suspended");
        }
    }

    fn connect(&mut self, input: GraphInput) -> Result<RodioOutput, PlayerError> {
        let Some(stream) = self.stream.as_ref() else {
            return Err(PlayerError::BindFailure("audio context is closed".into()));
        };

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();
        sink.append(input);
        let stage = Arc::new(GainStage {
            sink,
            playing: AtomicBool::new(false),
        });
        self.stages.retain(|w| w.strong_count() > 0);
        self.stages.push(Arc::downgrade(&stage));

        Ok(RodioOutput {
            stage,
            suspended: self.suspended.clone(),
        })
    }

    fn close(&mut self) {
        for stage in self.live_stages() {
            stage.sink.stop();
        }
        self.stages.clear();
        self.stream = None;
        self.state = ContextState::Closed;
        info!("audio output closed");
    }
}

pub struct RodioOutput {
    stage: Arc<GainStage>,
    suspended: Arc<AtomicBool>,
}

impl OutputNode for RodioOutput {
    fn set_gain(&mut self, level: f32) {
        self.stage.sink.set_volume(level);
    }

    fn gain(&self) -> f32 {
        self.stage.sink.volume()
    }

    fn play(&mut self) {
        self.stage.playing.store(true, Ordering::Release);
        if !self.suspended.load(Ordering::Acquire) {
            self.stage.sink.play();
        }
    }

    fn pause(&mut self) {
        self.stage.playing.store(false, Ordering::Release);
        self.stage.sink.pause();
    }

    fn is_paused(&self) -> bool {
        !self.stage.playing.load(Ordering::Acquire)
    }

    fn seek(&mut self, pos: Duration) -> Result<(), PlayerError> {
        self.stage
            .sink
            .try_seek(pos)
            .map_err(|e| PlayerError::DecodeError(format!("seek to {pos:?} failed: {e}")))
    }

    fn position(&self) -> Duration {
        self.stage.sink.get_pos()
    }

    fn disconnect(&mut self) {
        self.stage.playing.store(false, Ordering::Release);
        self.stage.sink.stop();
    }
}
