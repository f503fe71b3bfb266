use tracing::trace;

use crate::audio::{AudioGraphService, AudioPlatform};

/// Permission to sample once, valid for the generation it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// Samples the spectrum once per redraw while playback runs.
///
/// There is at most one pending ticket. `stop` bumps the generation, which
/// turns the pending ticket stale; the next frame drops it instead of
/// sampling.
#[derive(Debug, Default)]
pub struct VisualizationLoop {
    generation: u64,
    pending: Option<FrameTicket>,
    frame: Option<Vec<u8>>,
}

impl VisualizationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.pending
            .is_some_and(|t| t.generation == self.generation)
    }

    /// Schedule the first frame. No-op while already running.
    pub fn start(&mut self) {
        if !self.is_running() {
            self.pending = Some(FrameTicket {
                generation: self.generation,
            });
            trace!(generation = self.generation, "visualizer started");
        }
    }

    /// Cancel the pending frame and clear the last one.
    pub fn stop(&mut self) {
        if self.pending.is_none() && self.frame.is_none() {
            return;
        }
        self.generation += 1;
        self.frame = None;
        trace!(generation = self.generation, "visualizer stopped");
    }

    /// Handle one display refresh. Returns whether a frame was sampled.
    pub fn on_frame<P: AudioPlatform>(&mut self, graph: &mut AudioGraphService<P>) -> bool {
        let Some(ticket) = self.pending.take() else {
            return false;
        };
        if ticket.generation != self.generation {
            return false;
        }
        // All zeros just means nothing is bound yet.
        self.frame = Some(graph.sample_frequencies());
        self.pending = Some(FrameTicket {
            generation: self.generation,
        });
        true
    }

    /// Magnitudes of the last sampled frame, if any.
    pub fn frame(&self) -> Option<&[u8]> {
        self.frame.as_deref()
    }
}
