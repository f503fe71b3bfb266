//! Media elements: one decoded file and the events it reports.
//!
//! The decoding half (`ElementSource`) runs inside the output mixer and
//! reports progress over a channel that exists only as long as the element
//! does. Pause, resume and seeking are the gain stage's business.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::source::SeekError;
use rodio::{Decoder, Source};
use tracing::{debug, warn};

use crate::error::PlayerError;
use crate::library::Track;

use super::types::{MediaEvent, SourceBox};

/// Decoded samples of one element, as pulled by the output mixer.
///
/// Reports `Ended` once when the decoder runs dry, or `Error` if it ran dry
/// without producing anything.
pub struct ElementSource {
    inner: SourceBox,
    events: Sender<MediaEvent>,
    samples_per_second: u64,
    samples_per_update: u64,
    samples_played: u64,
    produced_any: bool,
    since_update: u64,
    ended: bool,
}

impl ElementSource {
    fn position(&self) -> Duration {
        Duration::from_secs_f64(self.samples_played as f64 / self.samples_per_second as f64)
    }
}

impl Iterator for ElementSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.ended {
            return None;
        }

        match self.inner.next() {
            Some(sample) => {
                self.samples_played += 1;
                self.produced_any = true;
                self.since_update += 1;
                if self.since_update >= self.samples_per_update {
                    self.since_update = 0;
                    let _ = self.events.send(MediaEvent::TimeUpdate(ElementSource::position(self)));
                }
                Some(sample)
            }
            None => {
                self.ended = true;
                let event = if self.produced_any {
                    MediaEvent::Ended
                } else {
                    MediaEvent::Error("stream contains no decodable audio".into())
                };
                let _ = self.events.send(event);
                None
            }
        }
    }
}

impl Source for ElementSource {
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

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        if let Err(e) = self.inner.try_seek(pos) {
            warn!(error = %e, "seek rejected by decoder");
            return Err(e);
        }
        self.samples_played = (pos.as_secs_f64() * self.samples_per_second as f64) as u64;
        self.since_update = 0;
        let _ = self.events.send(MediaEvent::TimeUpdate(pos));
        Ok(())
    }
}

/// Controlling half of a media element.
///
/// Its source can be taken exactly once, by `AudioGraphService::bind`.
pub struct MediaElement {
    track_id: String,
    source: Option<ElementSource>,
    events: Receiver<MediaEvent>,
    duration: Option<Duration>,
}

impl MediaElement {
    /// Open and start decoding the file behind `track`.
    pub fn open(track: &Track, time_update: Duration) -> Result<Self, PlayerError> {
        let file = File::open(&track.source)
            .map_err(|e| PlayerError::DecodeError(format!("{}: {e}", track.source.display())))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| PlayerError::DecodeError(format!("{}: {e}", track.source.display())))?;

        let duration = decoder
            .total_duration()
            .or_else(|| probe_duration(&track.source));

        debug!(track = %track.id, ?duration, "media element opened");
        Ok(Self::from_source(
            &track.id,
            Box::new(decoder),
            duration,
            time_update,
        ))
    }

    /// Wrap an already decoded source. Queues `MetadataReady` immediately.
    pub fn from_source(
        track_id: &str,
        source: SourceBox,
        duration: Option<Duration>,
        time_update: Duration,
    ) -> Self {
        let samples_per_second =
            (source.sample_rate() as u64 * source.channels().max(1) as u64).max(1);
        let samples_per_update =
            ((samples_per_second as f64 * time_update.as_secs_f64()) as u64).max(1);

        let (tx, rx) = mpsc::channel();
        let _ = tx.send(MediaEvent::MetadataReady { duration });

        let source = ElementSource {
            inner: source,
            events: tx,
            samples_per_second,
            samples_per_update,
            samples_played: 0,
            produced_any: false,
            since_update: 0,
            ended: false,
        };

        Self {
            track_id: track_id.to_string(),
            source: Some(source),
            events: rx,
            duration,
        }
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Hand the decoding half to the audio graph. `None` once taken.
    pub fn take_source(&mut self) -> Option<ElementSource> {
        self.source.take()
    }

    /// Drain events reported since the last call.
    pub fn poll_events(&self) -> Vec<MediaEvent> {
        self.events.try_iter().collect()
    }
}

fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no container duration");
            None
        }
    }
}
