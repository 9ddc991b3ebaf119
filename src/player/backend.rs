use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ring buffer of recent output samples. The visualizer holds this as a
/// non-owning read handle; only the backend writes to it.
pub type SampleTap = Arc<Mutex<VecDeque<f32>>>;

#[derive(Debug)]
pub enum PlaybackError {
    /// No track is bound to the output.
    NoTrack,
    /// Fetching the stream bytes failed.
    Fetch(reqwest::Error),
    /// The media could not be decoded.
    Decode(rodio::decoder::DecoderError),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::NoTrack => write!(f, "no track bound"),
            PlaybackError::Fetch(e) => write!(f, "stream fetch failed: {e}"),
            PlaybackError::Decode(e) => write!(f, "decode failed: {e}"),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::NoTrack => None,
            PlaybackError::Fetch(e) => Some(e),
            PlaybackError::Decode(e) => Some(e),
        }
    }
}

/// Opaque transport surface the controller drives.
///
/// Implementations own the whole output graph (source, volume stage,
/// analysis tap, device); callers only see transport operations.
pub trait AudioBackend {
    /// Load the audio resource at `url`, replacing the current source and
    /// resetting the position to zero.
    fn bind(&mut self, url: &str) -> Result<(), PlaybackError>;

    /// Start or resume output.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Drop the current source entirely.
    fn stop(&mut self);

    /// Jump to `position`, clamped to `[0, duration]`; playing/paused state
    /// is preserved. No-op while nothing is bound.
    fn seek(&mut self, position: Duration);

    /// Idempotent, last write wins; survives track changes.
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    /// Total duration of the bound source, when the decoder knows it.
    fn duration(&self) -> Option<Duration>;

    /// True once the bound source has played through to its end.
    fn finished(&self) -> bool;

    /// Read handle onto the live signal downstream of the volume stage.
    fn sample_tap(&self) -> SampleTap;
}
