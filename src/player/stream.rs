use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use super::backend::{AudioBackend, PlaybackError, SampleTap};

/// Samples retained for the analysis tap; one FFT window with headroom.
const TAP_CAPACITY: usize = 8192;

/// Source wrapper copying every sample into the shared tap ring buffer on
/// its way to the mixer.
struct TapSource<S> {
    inner: S,
    tap: SampleTap,
}

impl<S> TapSource<S>
where
    S: Source,
{
    fn new(inner: S, tap: SampleTap) -> Self {
        Self { inner, tap }
    }
}

impl<S> Iterator for TapSource<S>
where
    S: Source,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        // try_lock: the mixer thread must never stall on the visualizer.
        if let Ok(mut buf) = self.tap.try_lock() {
            if buf.len() >= TAP_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(sample);
        }
        Some(sample)
    }
}

impl<S> Source for TapSource<S>
where
    S: Source,
{
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
}

/// Rodio-backed output for remote tracks.
///
/// The track bytes are downloaded once and decoded from memory; seeking
/// rebuilds the sink with `skip_duration`, which is also how position is
/// tracked (accumulated time plus the running stopwatch).
pub struct StreamBackend {
    stream: OutputStream,
    http: reqwest::blocking::Client,
    sink: Option<Sink>,
    bytes: Option<Vec<u8>>,
    duration: Option<Duration>,
    accumulated: Duration,
    started_at: Option<Instant>,
    paused: bool,
    volume: f32,
    tap: SampleTap,
}

impl StreamBackend {
    pub fn new() -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped; noisy in a TUI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            http: reqwest::blocking::Client::new(),
            sink: None,
            bytes: None,
            duration: None,
            accumulated: Duration::ZERO,
            started_at: None,
            paused: true,
            volume: 1.0,
            tap: Arc::new(Mutex::new(VecDeque::with_capacity(TAP_CAPACITY))),
        })
    }

    /// Build a fresh paused sink over the bound bytes, starting at `position`.
    fn spawn_sink_at(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let bytes = self.bytes.clone().ok_or(PlaybackError::NoTrack)?;
        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(PlaybackError::Decode)?
            .skip_duration(position);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(TapSource::new(decoder, self.tap.clone()));
        sink.pause();

        self.sink = Some(sink);
        self.accumulated = position;
        self.started_at = None;
        self.paused = true;
        Ok(())
    }
}

impl AudioBackend for StreamBackend {
    fn bind(&mut self, url: &str) -> Result<(), PlaybackError> {
        self.stop();
        debug!("fetching {url}");
        let response = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(PlaybackError::Fetch)?;
        let bytes = response.bytes().map_err(PlaybackError::Fetch)?.to_vec();

        // Probe once so an undecodable payload fails at bind time.
        let probe = Decoder::new(Cursor::new(bytes.clone())).map_err(PlaybackError::Decode)?;
        self.duration = probe.total_duration();
        self.bytes = Some(bytes);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.sink.is_none() {
            self.spawn_sink_at(self.accumulated)?;
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.paused = false;
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
        self.paused = true;
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.bytes = None;
        self.duration = None;
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.paused = true;
        if let Ok(mut buf) = self.tap.lock() {
            buf.clear();
        }
    }

    fn seek(&mut self, position: Duration) {
        if self.bytes.is_none() {
            return;
        }
        let position = match self.duration {
            Some(total) => position.min(total),
            None => position,
        };

        let was_paused = self.paused;
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if let Err(e) = self.spawn_sink_at(position) {
            warn!("seek failed: {e}");
            return;
        }
        if !was_paused {
            if let Some(sink) = &self.sink {
                sink.play();
            }
            self.paused = false;
            self.started_at = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn position(&self) -> Duration {
        let elapsed = self
            .accumulated
            .saturating_add(self.started_at.map_or(Duration::ZERO, |t| t.elapsed()));
        match self.duration {
            Some(total) => elapsed.min(total),
            None => elapsed,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn finished(&self) -> bool {
        !self.paused && self.sink.as_ref().is_some_and(Sink::empty)
    }

    fn sample_tap(&self) -> SampleTap {
        self.tap.clone()
    }
}
