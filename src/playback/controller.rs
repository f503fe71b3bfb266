use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{AudioGraphService, AudioPlatform, MediaElement, MediaEvent, clamp_volume};
use crate::error::PlayerError;
use crate::library::Track;

use super::state::{PlaybackNotice, PlaybackState};

/// Drives one media element at a time through the playback states.
///
/// The controller owns the element; the graph is borrowed for each call so
/// the application root stays the single owner of audio resources. An
/// element is only bound into the graph on the first `play`, so loading a
/// track never touches the output device.
pub struct PlaybackController {
    state: PlaybackState,
    element: Option<MediaElement>,
    bound: bool,
    pending_seek: Option<Duration>,
    volume: f32,
    track: Option<Track>,
    current_time: f64,
    duration: f64,
    error: Option<String>,
    autoplay: bool,
    duration_reported: bool,
    time_update: Duration,
}

impl PlaybackController {
    pub fn new(time_update: Duration) -> Self {
        Self {
            state: PlaybackState::Empty,
            element: None,
            bound: false,
            pending_seek: None,
            volume: 1.0,
            track: None,
            current_time: 0.0,
            duration: 0.0,
            error: None,
            autoplay: false,
            duration_reported: false,
            time_update,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Id of the loaded track, if any (also set while Errored).
    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.id.as_str())
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Tear down the current binding and open a fresh element for `track`.
    ///
    /// On failure the controller is left `Errored` with the message kept.
    pub fn load<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
        track: &Track,
    ) -> Result<(), PlayerError> {
        self.teardown(graph);

        self.state = PlaybackState::Loading;
        self.track = Some(track.clone());
        self.current_time = 0.0;
        self.duration = track.duration.max(0.0);
        self.error = None;
        self.autoplay = false;
        self.duration_reported = false;

        match MediaElement::open(track, self.time_update) {
            Ok(element) => {
                debug!(track = %track.id, name = %track.name, "track loaded");
                self.element = Some(element);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Start or resume playback.
    ///
    /// While Loading this only queues autoplay for when metadata arrives.
    /// An Ended track is reloaded from the start.
    pub fn play<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
    ) -> Result<(), PlayerError> {
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Loading => {
                self.autoplay = true;
                Ok(())
            }
            PlaybackState::Ready | PlaybackState::Paused => {
                if let Err(e) = graph.ensure_context() {
                    return Err(self.fail(PlayerError::PlaybackRejected(e.to_string())));
                }
                self.bind(graph)?;
                if let Err(e) = graph.play() {
                    return Err(self.fail(PlayerError::PlaybackRejected(e.to_string())));
                }
                self.state = PlaybackState::Playing;
                Ok(())
            }
            PlaybackState::Ended => {
                self.reload(graph)?;
                self.autoplay = true;
                Ok(())
            }
            PlaybackState::Empty | PlaybackState::Errored => {
                Err(PlayerError::PlaybackRejected("nothing loaded".into()))
            }
        }
    }

    pub fn pause<P: AudioPlatform>(&mut self, graph: &mut AudioGraphService<P>) {
        self.autoplay = false;
        if self.state != PlaybackState::Playing {
            return;
        }
        graph.pause();
        if let Some(pos) = graph.position() {
            self.current_time = self.clamp_time(pos.as_secs_f64());
        }
        self.state = PlaybackState::Paused;
    }

    pub fn toggle<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
    ) -> Result<(), PlayerError> {
        if self.is_playing() {
            self.pause(graph);
            Ok(())
        } else {
            self.play(graph)
        }
    }

    /// Jump to `fraction` of the duration, clamped to the track bounds.
    ///
    /// Before the element is bound the position is applied on the first
    /// `play`. An Ended track is reopened first, since its source is spent.
    pub fn seek_fraction<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
        fraction: f64,
    ) -> Result<f64, PlayerError> {
        if self.element.is_none() {
            return Err(PlayerError::Unbound);
        }
        let fraction = if fraction.is_nan() { 0.0 } else { fraction };
        let target = (fraction * self.duration).clamp(0.0, self.duration.max(0.0));
        let pos = Duration::from_secs_f64(target);

        if self.state == PlaybackState::Ended {
            let duration = self.duration;
            self.reload(graph)?;
            self.duration = duration;
            self.pending_seek = Some(pos);
        } else if self.bound {
            graph.seek(pos)?;
        } else {
            self.pending_seek = Some(pos);
        }
        self.current_time = target;
        Ok(target)
    }

    /// Apply `level` to the graph. The level is kept and reapplied to every
    /// chain bound later.
    pub fn set_volume<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
        level: f32,
    ) -> Result<f32, PlayerError> {
        self.volume = clamp_volume(level);
        graph.set_volume(level)
    }

    /// Drop the element and the node chain; back to Empty.
    pub fn unload<P: AudioPlatform>(&mut self, graph: &mut AudioGraphService<P>) {
        self.teardown(graph);
        self.state = PlaybackState::Empty;
        self.track = None;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.error = None;
        self.autoplay = false;
    }

    /// Apply element events reported since the last call.
    pub fn pump_events<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
    ) -> Vec<PlaybackNotice> {
        let events = match self.element.as_ref() {
            Some(element) => element.poll_events(),
            None => return Vec::new(),
        };

        let mut notices = Vec::new();
        for event in events {
            match event {
                MediaEvent::MetadataReady { duration } => {
                    self.on_metadata(duration, &mut notices);
                    if self.autoplay {
                        self.autoplay = false;
                        if let Err(e) = self.play(graph) {
                            notices.push(PlaybackNotice::Failed {
                                message: e.to_string(),
                            });
                        }
                    }
                }
                MediaEvent::TimeUpdate(pos) => {
                    self.current_time = self.clamp_time(pos.as_secs_f64());
                }
                MediaEvent::Ended => {
                    if self.state == PlaybackState::Ended {
                        continue;
                    }
                    self.state = PlaybackState::Ended;
                    if self.duration > 0.0 {
                        self.current_time = self.duration;
                    }
                    if let Some(id) = self.track_id() {
                        info!(track = %id, "track ended");
                        notices.push(PlaybackNotice::Ended {
                            track_id: id.to_string(),
                        });
                    }
                }
                MediaEvent::Error(message) => {
                    let e = self.fail(PlayerError::DecodeError(message));
                    notices.push(PlaybackNotice::Failed {
                        message: e.to_string(),
                    });
                }
            }
        }
        notices
    }

    fn on_metadata(&mut self, duration: Option<Duration>, notices: &mut Vec<PlaybackNotice>) {
        if self.state == PlaybackState::Loading {
            self.state = PlaybackState::Ready;
        }
        let Some(duration) = duration else {
            return;
        };
        self.duration = duration.as_secs_f64();
        if self.duration_reported {
            return;
        }
        self.duration_reported = true;
        if let Some(id) = self.track_id() {
            notices.push(PlaybackNotice::DurationResolved {
                track_id: id.to_string(),
                seconds: self.duration,
            });
        }
    }

    fn clamp_time(&self, secs: f64) -> f64 {
        if self.duration > 0.0 {
            secs.min(self.duration)
        } else {
            secs
        }
    }

    /// Connect the loaded element, then apply the kept volume and any seek
    /// requested before it was bound.
    fn bind<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
    ) -> Result<(), PlayerError> {
        if self.bound {
            return Ok(());
        }
        let Some(element) = self.element.as_mut() else {
            return Err(self.fail(PlayerError::PlaybackRejected("no media element".into())));
        };
        if let Err(e) = graph.bind(element) {
            return Err(self.fail(e));
        }
        self.bound = true;

        let _ = graph.set_volume(self.volume);
        if let Some(pos) = self.pending_seek.take() {
            if let Err(e) = graph.seek(pos) {
                warn!(error = %e, "could not apply start position");
            }
        }
        Ok(())
    }

    fn reload<P: AudioPlatform>(
        &mut self,
        graph: &mut AudioGraphService<P>,
    ) -> Result<(), PlayerError> {
        let Some(track) = self.track.clone() else {
            return Err(PlayerError::PlaybackRejected("nothing loaded".into()));
        };
        self.load(graph, &track)
    }

    fn teardown<P: AudioPlatform>(&mut self, graph: &mut AudioGraphService<P>) {
        self.element = None;
        self.bound = false;
        self.pending_seek = None;
        graph.release();
    }

    fn fail(&mut self, error: PlayerError) -> PlayerError {
        warn!(error = %error, "playback failed");
        self.state = PlaybackState::Errored;
        self.error = Some(error.to_string());
        self.autoplay = false;
        error
    }
}
