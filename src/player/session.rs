use crate::catalog::Track;

/// Transport states of the playback state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportState {
    /// No playlist loaded; every transport operation is a no-op.
    Empty,
    /// A track is selected but output has not started.
    Stopped,
    Playing,
    Paused,
    /// The current track played to its end.
    Ended,
}

/// Playlist plus cursor, owned exclusively by the controller.
///
/// Replaced wholesale whenever the playlist changes, never merged; the
/// cursor is only meaningful while the playlist is non-empty.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    playlist: Vec<Track>,
    pub current: usize,
}

impl PlaybackSession {
    pub fn new(playlist: Vec<Track>) -> Self {
        Self {
            playlist,
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.playlist.get(index)
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.current)
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }
}
