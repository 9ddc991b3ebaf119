use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{error, warn};
use rand::Rng;

use crate::catalog::Track;

use super::backend::{AudioBackend, PlaybackError, SampleTap};
use super::session::{PlaybackSession, TransportState};

/// Draws before random selection falls back to a deterministic neighbor,
/// so a degenerate RNG can never loop unbounded.
const RANDOM_RETRY_LIMIT: usize = 8;

/// Minimum spacing between position notifications.
const POSITION_EVENT_INTERVAL: Duration = Duration::from_secs(1);

/// Notifications pushed to the UI collaborator; drained once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackChanged { index: usize },
    StateChanged(TransportState),
    /// Throttled to roughly once per second.
    Position(Duration),
    TrackEnded,
    /// The track at `index` failed to load or decode and was skipped.
    TrackError { index: usize },
}

/// The transport state machine over one [`PlaybackSession`].
///
/// All operations are safe no-ops on an empty playlist and on out-of-range
/// indices; provider- and media-level failures are absorbed here (logged,
/// recovered by skipping) and never reach the caller.
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    session: PlaybackSession,
    state: TransportState,
    random: bool,
    autoplay: bool,
    volume: f32,
    /// Binding is lazy: `select` records the track, the next `play` binds it,
    /// so fetch/decode failures surface where error-skip can recover.
    needs_bind: bool,
    events: VecDeque<PlayerEvent>,
    last_position_event: Option<Instant>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: PlaybackSession::default(),
            state: TransportState::Empty,
            random: false,
            autoplay: false,
            volume: 1.0,
            needs_bind: true,
            events: VecDeque::new(),
            last_position_event: None,
        }
    }

    /// Replace the session with `playlist`, cursor reset to the first track.
    /// Does not auto-start playback.
    pub fn load(&mut self, playlist: Vec<Track>) {
        self.backend.stop();
        self.session = PlaybackSession::new(playlist);
        self.needs_bind = true;
        if self.session.is_empty() {
            self.set_state(TransportState::Empty);
        } else {
            self.select(0);
        }
    }

    /// Move the cursor to `index` and stage that track for playback.
    /// Out-of-range indices are no-ops.
    pub fn select(&mut self, index: usize) {
        if self.session.track(index).is_none() {
            return;
        }
        self.backend.stop();
        self.session.current = index;
        self.needs_bind = true;
        self.set_state(TransportState::Stopped);
        self.events.push_back(PlayerEvent::TrackChanged { index });
    }

    /// Start or resume output. A fetch/decode failure of the current track
    /// is not surfaced: it is logged and recovered by skipping forward.
    pub fn play(&mut self) {
        if self.session.is_empty() {
            return;
        }
        match self.try_start() {
            Ok(()) => self.set_state(TransportState::Playing),
            Err(e) => {
                warn!("track {} failed to start: {e}", self.session.current);
                self.error_skip();
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.backend.pause();
            self.set_state(TransportState::Paused);
        }
    }

    pub fn toggle_play(&mut self) {
        match self.state {
            TransportState::Empty => {}
            TransportState::Playing => self.pause(),
            TransportState::Ended => self.replay(),
            TransportState::Stopped | TransportState::Paused => self.play(),
        }
    }

    /// Advance to the next track. `auto` marks advances requested by the
    /// end-of-track handler, which the autoplay flag gates; manual advances
    /// are never gated. At the last index of a non-random playlist this is
    /// a no-op (no wrap-around).
    pub fn next(&mut self, auto: bool) {
        if self.session.is_empty() {
            return;
        }
        if auto && !self.autoplay {
            return;
        }
        let Some(target) = self.pick_next() else {
            return;
        };
        self.select(target);
        self.play();
    }

    /// Step back one track; only valid when the cursor is past the start.
    /// Starts playback only when autoplay is on.
    pub fn prev(&mut self) {
        if self.session.current == 0 {
            return;
        }
        let target = self.session.current - 1;
        self.select(target);
        if self.autoplay {
            self.play();
        }
    }

    /// Restart the current track from the beginning.
    pub fn replay(&mut self) {
        if self.session.is_empty() {
            return;
        }
        self.backend.seek(Duration::ZERO);
        self.play();
    }

    /// Jump to `position`, clamped by the backend to `[0, duration]`.
    /// Only meaningful once the current track is bound.
    pub fn seek(&mut self, position: Duration) {
        if self.session.is_empty() || self.needs_bind {
            return;
        }
        self.backend.seek(position);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.backend.set_volume(self.volume);
    }

    /// Takes effect on the next advance decision; no retroactive effect.
    pub fn set_random(&mut self, random: bool) {
        self.random = random;
    }

    /// Takes effect on the next advance/ended decision.
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// Drive the machine once per tick: detects end-of-track and emits the
    /// throttled position notification.
    pub fn poll(&mut self) {
        if self.state != TransportState::Playing {
            return;
        }
        if self.backend.finished() {
            self.handle_track_ended();
            return;
        }
        let due = self
            .last_position_event
            .is_none_or(|t| t.elapsed() >= POSITION_EVENT_INTERVAL);
        if due {
            self.last_position_event = Some(Instant::now());
            self.events
                .push_back(PlayerEvent::Position(self.backend.position()));
        }
    }

    /// Drain pending notifications for the UI collaborator.
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain(..).collect()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Cursor position; inactive while the playlist is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.session.is_empty()).then_some(self.session.current)
    }

    pub fn playlist(&self) -> &[Track] {
        self.session.playlist()
    }

    pub fn position(&self) -> Duration {
        self.backend.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.backend.duration()
    }

    pub fn is_random(&self) -> bool {
        self.random
    }

    pub fn is_autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether the UI should offer the replay affordance.
    pub fn can_replay(&self) -> bool {
        self.state == TransportState::Ended
    }

    pub fn sample_tap(&self) -> SampleTap {
        self.backend.sample_tap()
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state;
            self.events.push_back(PlayerEvent::StateChanged(state));
        }
    }

    fn try_start(&mut self) -> Result<(), PlaybackError> {
        if self.needs_bind {
            let url = self
                .session
                .current_track()
                .ok_or(PlaybackError::NoTrack)?
                .url
                .clone();
            self.backend.bind(&url)?;
            self.backend.set_volume(self.volume);
            self.needs_bind = false;
        }
        self.backend.play()
    }

    /// Selection rule shared by manual advance, autoplay and error-skip.
    fn pick_next(&self) -> Option<usize> {
        let len = self.session.len();
        if self.random {
            if len <= 1 {
                return Some(self.session.current);
            }
            let mut rng = rand::rng();
            for _ in 0..RANDOM_RETRY_LIMIT {
                let candidate = rng.random_range(0..len);
                if candidate != self.session.current {
                    return Some(candidate);
                }
            }
            // Degenerate RNG: settle for the deterministic neighbor.
            Some((self.session.current + 1) % len)
        } else if self.session.current + 1 < len {
            Some(self.session.current + 1)
        } else {
            None
        }
    }

    fn handle_track_ended(&mut self) {
        self.set_state(TransportState::Ended);
        self.events.push_back(PlayerEvent::TrackEnded);
        self.next(true);
    }

    /// Skip forward past a broken track. Unlike end-of-track advance this is
    /// never gated by autoplay: playing broken media was never the intent.
    /// Tries at most one start per playlist entry before giving up.
    fn error_skip(&mut self) {
        self.events.push_back(PlayerEvent::TrackError {
            index: self.session.current,
        });
        self.set_state(TransportState::Stopped);

        let len = self.session.len();
        for _ in 1..len {
            let Some(target) = self.pick_next() else {
                break;
            };
            self.select(target);
            match self.try_start() {
                Ok(()) => {
                    self.set_state(TransportState::Playing);
                    return;
                }
                Err(e) => {
                    warn!("skipping unplayable track {}: {e}", self.session.current);
                    self.events.push_back(PlayerEvent::TrackError {
                        index: self.session.current,
                    });
                }
            }
        }
        error!("no playable track in the playlist, stopping");
        self.set_state(TransportState::Stopped);
    }
}
