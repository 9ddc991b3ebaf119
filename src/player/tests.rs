use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::catalog::Track;

#[derive(Default)]
struct FakeState {
    bound: Option<String>,
    binds: Vec<String>,
    playing: bool,
    finished: bool,
    position: Duration,
    duration: Option<Duration>,
    volume: f32,
    fail_urls: HashSet<String>,
}

/// Test double for the transport surface; the test keeps a handle onto the
/// shared state to inject end-of-track and failures.
#[derive(Clone, Default)]
struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    fn failing(urls: &[&str]) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().fail_urls =
            urls.iter().map(|u| u.to_string()).collect();
        backend
    }

    fn with_duration(self, duration: Duration) -> Self {
        self.state.lock().unwrap().duration = Some(duration);
        self
    }

    fn finish_track(&self) {
        self.state.lock().unwrap().finished = true;
    }

    fn bound(&self) -> Option<String> {
        self.state.lock().unwrap().bound.clone()
    }

    fn binds(&self) -> Vec<String> {
        self.state.lock().unwrap().binds.clone()
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }
}

impl AudioBackend for FakeBackend {
    fn bind(&mut self, url: &str) -> Result<(), PlaybackError> {
        let mut s = self.state.lock().unwrap();
        s.binds.push(url.to_string());
        if s.fail_urls.contains(url) {
            return Err(PlaybackError::NoTrack);
        }
        s.bound = Some(url.to_string());
        s.playing = false;
        s.finished = false;
        s.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut s = self.state.lock().unwrap();
        if s.bound.is_none() {
            return Err(PlaybackError::NoTrack);
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.bound = None;
        s.playing = false;
        s.finished = false;
        s.position = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) {
        let mut s = self.state.lock().unwrap();
        if s.bound.is_none() {
            return;
        }
        s.position = match s.duration {
            Some(total) => position.min(total),
            None => position,
        };
        s.finished = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().unwrap().duration
    }

    fn finished(&self) -> bool {
        let s = self.state.lock().unwrap();
        s.playing && s.finished
    }

    fn sample_tap(&self) -> SampleTap {
        Arc::new(Mutex::new(VecDeque::new()))
    }
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| Track::new(format!("Artist - Song {i}"), format!("https://t.test/{i}")))
        .collect()
}

fn controller(n: usize) -> (PlaybackController<FakeBackend>, FakeBackend) {
    let backend = FakeBackend::default();
    let mut ctl = PlaybackController::new(backend.clone());
    ctl.load(tracks(n));
    (ctl, backend)
}

#[test]
fn select_sets_cursor_and_play_binds_that_track() {
    let (mut ctl, backend) = controller(3);
    ctl.select(1);
    assert_eq!(ctl.current_index(), Some(1));
    assert_eq!(ctl.state(), TransportState::Stopped);

    ctl.play();
    assert_eq!(backend.bound().as_deref(), Some("https://t.test/1"));
    assert_eq!(ctl.state(), TransportState::Playing);
}

#[test]
fn select_out_of_range_is_a_noop() {
    let (mut ctl, _) = controller(3);
    ctl.select(1);
    ctl.select(99);
    assert_eq!(ctl.current_index(), Some(1));
}

#[test]
fn load_resets_cursor_and_reports_the_new_track() {
    let (mut ctl, _) = controller(3);
    ctl.select(2);
    ctl.take_events();

    ctl.load(tracks(2));
    assert_eq!(ctl.current_index(), Some(0));
    assert_eq!(ctl.state(), TransportState::Stopped);
    assert!(
        ctl.take_events()
            .contains(&PlayerEvent::TrackChanged { index: 0 })
    );
}

#[test]
fn empty_playlist_makes_every_operation_a_noop() {
    let backend = FakeBackend::default();
    let mut ctl = PlaybackController::new(backend.clone());
    ctl.load(Vec::new());
    assert_eq!(ctl.state(), TransportState::Empty);
    assert_eq!(ctl.current_index(), None);

    ctl.play();
    ctl.pause();
    ctl.next(false);
    ctl.prev();
    ctl.replay();
    ctl.seek(Duration::from_secs(10));
    assert_eq!(ctl.state(), TransportState::Empty);
    assert!(backend.binds().is_empty());
}

#[test]
fn sequential_next_never_decreases_and_stops_at_the_last_index() {
    let (mut ctl, _) = controller(3);
    ctl.play();

    ctl.next(false);
    assert_eq!(ctl.current_index(), Some(1));
    ctl.next(false);
    assert_eq!(ctl.current_index(), Some(2));
    // Last index of a non-random playlist: no wrap-around.
    ctl.next(false);
    assert_eq!(ctl.current_index(), Some(2));
}

#[test]
fn random_next_never_repeats_the_immediately_prior_index() {
    let (mut ctl, _) = controller(3);
    ctl.set_random(true);
    for _ in 0..50 {
        let before = ctl.current_index();
        ctl.next(false);
        assert_ne!(ctl.current_index(), before);
    }
}

#[test]
fn auto_advance_is_gated_by_autoplay() {
    let (mut ctl, _) = controller(3);
    ctl.play();
    ctl.next(true);
    assert_eq!(ctl.current_index(), Some(0));

    ctl.set_autoplay(true);
    ctl.next(true);
    assert_eq!(ctl.current_index(), Some(1));
}

#[test]
fn ended_track_auto_advances_then_rests_ended_at_the_playlist_end() {
    let (mut ctl, backend) = controller(3);
    ctl.set_autoplay(true);
    ctl.select(1);
    ctl.play();

    backend.finish_track();
    ctl.poll();
    assert_eq!(ctl.current_index(), Some(2));
    assert_eq!(ctl.state(), TransportState::Playing);

    // End of the last track: next(auto) is a no-op, the session stays Ended.
    backend.finish_track();
    ctl.poll();
    assert_eq!(ctl.current_index(), Some(2));
    assert_eq!(ctl.state(), TransportState::Ended);
}

#[test]
fn ended_without_autoplay_offers_replay() {
    let (mut ctl, backend) = controller(2);
    ctl.play();
    backend.finish_track();
    ctl.poll();

    assert_eq!(ctl.state(), TransportState::Ended);
    assert!(ctl.can_replay());
    assert_eq!(ctl.current_index(), Some(0));

    ctl.replay();
    assert_eq!(ctl.state(), TransportState::Playing);
    assert_eq!(backend.state.lock().unwrap().position, Duration::ZERO);
}

#[test]
fn broken_track_skips_forward_without_autoplay() {
    let backend = FakeBackend::failing(&["https://t.test/0"]);
    let mut ctl = PlaybackController::new(backend.clone());
    ctl.load(tracks(3));

    ctl.play();
    assert_eq!(ctl.current_index(), Some(1));
    assert_eq!(ctl.state(), TransportState::Playing);
    assert!(!ctl.is_autoplay());
    assert_eq!(backend.binds(), vec!["https://t.test/0", "https://t.test/1"]);
}

#[test]
fn error_skip_gives_up_after_one_attempt_per_track() {
    let backend = FakeBackend::failing(&[
        "https://t.test/0",
        "https://t.test/1",
        "https://t.test/2",
    ]);
    let mut ctl = PlaybackController::new(backend.clone());
    ctl.load(tracks(3));

    ctl.play();
    assert_eq!(ctl.state(), TransportState::Stopped);
    assert_eq!(backend.binds().len(), 3);

    let errors = ctl
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, PlayerEvent::TrackError { .. }))
        .count();
    assert_eq!(errors, 3);
}

#[test]
fn prev_is_gated_at_the_start_and_respects_autoplay() {
    let (mut ctl, backend) = controller(3);
    ctl.prev();
    assert_eq!(ctl.current_index(), Some(0));

    ctl.select(2);
    ctl.prev();
    assert_eq!(ctl.current_index(), Some(1));
    // Autoplay off: loaded but not playing.
    assert_eq!(ctl.state(), TransportState::Stopped);
    assert!(!backend.is_playing());

    ctl.set_autoplay(true);
    ctl.prev();
    assert_eq!(ctl.current_index(), Some(0));
    assert_eq!(ctl.state(), TransportState::Playing);
}

#[test]
fn seek_clamps_to_the_track_duration() {
    let backend = FakeBackend::default().with_duration(Duration::from_secs(100));
    let mut ctl = PlaybackController::new(backend.clone());
    ctl.load(tracks(1));
    ctl.play();

    ctl.seek(Duration::from_secs(500));
    assert_eq!(backend.state.lock().unwrap().position, Duration::from_secs(100));

    ctl.seek(Duration::from_secs(47));
    assert_eq!(backend.state.lock().unwrap().position, Duration::from_secs(47));
}

#[test]
fn seek_before_first_play_is_a_noop() {
    let (mut ctl, backend) = controller(2);
    ctl.seek(Duration::from_secs(5));
    assert_eq!(backend.state.lock().unwrap().position, Duration::ZERO);
}

#[test]
fn pause_only_transitions_out_of_playing() {
    let (mut ctl, _) = controller(2);
    ctl.pause();
    assert_eq!(ctl.state(), TransportState::Stopped);

    ctl.play();
    ctl.pause();
    assert_eq!(ctl.state(), TransportState::Paused);
    ctl.pause();
    assert_eq!(ctl.state(), TransportState::Paused);
}

#[test]
fn volume_is_clamped_and_forwarded() {
    let (mut ctl, backend) = controller(1);
    ctl.set_volume(1.8);
    assert_eq!(ctl.volume(), 1.0);
    ctl.set_volume(0.25);
    assert_eq!(backend.state.lock().unwrap().volume, 0.25);
}

#[test]
fn state_changes_are_pushed_to_the_collaborator() {
    let (mut ctl, _) = controller(2);
    ctl.take_events();

    ctl.play();
    let events = ctl.take_events();
    assert!(events.contains(&PlayerEvent::StateChanged(TransportState::Playing)));
}
