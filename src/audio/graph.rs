use std::time::Duration;

use tracing::debug;

use crate::error::PlayerError;

use super::analyser::Analyser;
use super::media::MediaElement;
use super::platform::{AudioContext, AudioPlatform, OutputNode};
use super::types::{BIN_COUNT, ContextState, clamp_volume};

type OutputOf<P> = <<P as AudioPlatform>::Context as AudioContext>::Output;

struct NodeChain<O> {
    analyser: Analyser,
    gain: O,
}

/// Owner of the audio context and the single source → analyser → gain chain.
///
/// At most one chain is connected at any time: `bind` disconnects the old
/// chain before the new one is connected.
pub struct AudioGraphService<P: AudioPlatform> {
    platform: P,
    context: Option<P::Context>,
    chain: Option<NodeChain<OutputOf<P>>>,
}

impl<P: AudioPlatform> AudioGraphService<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            context: None,
            chain: None,
        }
    }

    /// Create the context if needed and make sure it is running.
    pub fn ensure_context(&mut self) -> Result<(), PlayerError> {
        let needs_new = self
            .context
            .as_ref()
            .map(|c| c.state() == ContextState::Closed)
            .unwrap_or(true);
        if needs_new {
            self.context = Some(self.platform.create_context()?);
        }

        match self.context.as_mut() {
            Some(ctx) if ctx.state() == ContextState::Suspended => ctx.resume(),
            Some(_) => Ok(()),
            None => Err(PlayerError::AudioUnavailable("no audio context".into())),
        }
    }

    /// Rebuild the node chain around `element`.
    pub fn bind(&mut self, element: &mut MediaElement) -> Result<(), PlayerError> {
        self.release();
        self.ensure_context()?;

        let source = element.take_source().ok_or_else(|| {
            PlayerError::BindFailure(format!(
                "media element for {} is already bound",
                element.track_id()
            ))
        })?;
        let (analyser, tap) = Analyser::tap(source);

        let Some(ctx) = self.context.as_mut() else {
            return Err(PlayerError::AudioUnavailable("no audio context".into()));
        };
        let gain = ctx.connect(tap)?;

        self.chain = Some(NodeChain { analyser, gain });
        debug!(track = %element.track_id(), "audio graph bound");
        Ok(())
    }

    /// Clamp `level` to [0, 1] and apply it to the gain stage.
    pub fn set_volume(&mut self, level: f32) -> Result<f32, PlayerError> {
        let Some(chain) = self.chain.as_mut() else {
            return Err(PlayerError::Unbound);
        };
        let level = clamp_volume(level);
        chain.gain.set_gain(level);
        Ok(level)
    }

    /// Start feeding the bound chain to the destination.
    pub fn play(&mut self) -> Result<(), PlayerError> {
        let chain = self.chain.as_mut().ok_or(PlayerError::Unbound)?;
        chain.gain.play();
        Ok(())
    }

    pub fn pause(&mut self) {
        if let Some(chain) = self.chain.as_mut() {
            chain.gain.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.chain.as_ref().map(|c| c.gain.is_paused()).unwrap_or(true)
    }

    /// Move the bound source to `pos`.
    pub fn seek(&mut self, pos: Duration) -> Result<(), PlayerError> {
        let chain = self.chain.as_mut().ok_or(PlayerError::Unbound)?;
        chain.gain.seek(pos)
    }

    pub fn position(&self) -> Option<Duration> {
        self.chain.as_ref().map(|c| c.gain.position())
    }

    pub fn volume(&self) -> Option<f32> {
        self.chain.as_ref().map(|c| c.gain.gain())
    }

    /// Latest magnitudes, `BIN_COUNT` long; all zero when nothing is bound.
    pub fn sample_frequencies(&mut self) -> Vec<u8> {
        match self.chain.as_mut() {
            Some(chain) => chain.analyser.byte_frequency_data(),
            None => vec![0; BIN_COUNT],
        }
    }

    /// Drop the node chain; the context stays for the next `bind`.
    pub fn release(&mut self) {
        if let Some(mut chain) = self.chain.take() {
            chain.gain.disconnect();
            debug!("audio graph released");
        }
    }

    /// Put the context into its low-power state.
    pub fn suspend(&mut self) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.suspend();
        }
    }

    /// Release nodes and close the context. Later calls start over.
    pub fn shutdown(&mut self) {
        self.release();
        if let Some(mut ctx) = self.context.take() {
            ctx.close();
        }
    }

    pub fn is_bound(&self) -> bool {
        self.chain.is_some()
    }

    pub fn context_state(&self) -> Option<ContextState> {
        self.context.as_ref().map(|c| c.state())
    }
}

impl<P: AudioPlatform> Drop for AudioGraphService<P> {
    fn drop(&mut self) {
        if self.context.is_some() {
            debug!("audio graph dropped without shutdown");
            self.shutdown();
        }
    }
}
