use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Runtime;

use crate::catalog::{Aggregator, Track};
use crate::config;
use crate::player::{AudioBackend, PlaybackController, PlayerEvent, TransportState};
use crate::ui;
use crate::visualizer::Visualizer;

const TICK: Duration = Duration::from_millis(33);

const VOLUME_STEP: f32 = 0.05;

/// Search result delivered back from the worker task.
struct SearchOutcome {
    query: String,
    tracks: Vec<Track>,
}

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// List cursor, moved with j/k independently of the playing track.
    selected: usize,
    search_mode: bool,
    search_input: String,
    list_title: String,
    notice: Option<String>,
    search_tx: mpsc::Sender<SearchOutcome>,
    search_rx: mpsc::Receiver<SearchOutcome>,
}

impl EventLoopState {
    pub fn new() -> Self {
        let (search_tx, search_rx) = mpsc::channel();
        Self {
            selected: 0,
            search_mode: false,
            search_input: String::new(),
            list_title: "trending".to_string(),
            notice: None,
            search_tx,
            search_rx,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and playback polling.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<B: AudioBackend>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    runtime: &Runtime,
    aggregator: &Arc<Aggregator>,
    controller: &mut PlaybackController<B>,
    visualizer: &mut Visualizer,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let size = terminal.size()?;
        let screen = Rect::new(0, 0, size.width, size.height);

        // Narrow terminals get fewer, wider bars.
        let bars_count = if size.width < settings.visualizer.narrow_below_cols {
            settings.visualizer.bars_narrow
        } else {
            settings.visualizer.bars_wide
        };
        visualizer.set_bars_count(bars_count);

        controller.poll();
        for ev in controller.take_events() {
            match ev {
                PlayerEvent::TrackChanged { index } => {
                    visualizer.reset();
                    state.selected = index;
                }
                PlayerEvent::TrackError { index } => {
                    state.notice = Some(format!("track #{} failed, skipped", index + 1));
                }
                PlayerEvent::StateChanged(_)
                | PlayerEvent::Position(_)
                | PlayerEvent::TrackEnded => {}
            }
        }

        while let Ok(outcome) = state.search_rx.try_recv() {
            if outcome.tracks.is_empty() {
                state.list_title = format!("no results for \"{}\"", outcome.query);
            } else {
                state.list_title =
                    format!("results for \"{}\" ({})", outcome.query, outcome.tracks.len());
                controller.load(outcome.tracks);
                state.selected = 0;
                visualizer.reset();
            }
        }

        if controller.state() == TransportState::Playing {
            visualizer.on_frame(controller.position(), controller.duration());
        }

        let view = ui::View {
            bars: visualizer.bars(),
            playlist: controller.playlist(),
            playing: controller.current_index(),
            selected: state.selected,
            state: controller.state(),
            position: controller.position(),
            duration: controller.duration(),
            random: controller.is_random(),
            autoplay: controller.is_autoplay(),
            can_replay: controller.can_replay(),
            volume: controller.volume(),
            list_title: &state.list_title,
            search_input: state.search_mode.then_some(state.search_input.as_str()),
            notice: state.notice.as_deref(),
        };
        terminal.draw(|f| ui::draw(f, &view))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, runtime, aggregator, controller, visualizer, state) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, screen, controller, visualizer);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Returns `true` when shutdown is requested.
fn handle_key_event<B: AudioBackend>(
    key: KeyEvent,
    runtime: &Runtime,
    aggregator: &Arc<Aggregator>,
    controller: &mut PlaybackController<B>,
    visualizer: &mut Visualizer,
    state: &mut EventLoopState,
) -> bool {
    if state.search_mode {
        match key.code {
            KeyCode::Esc => {
                // Leave search and restore the trending playlist.
                state.search_mode = false;
                state.search_input.clear();
                state.list_title = "trending".to_string();
                controller.load(aggregator.trending().to_vec());
                state.selected = 0;
                visualizer.reset();
            }
            KeyCode::Backspace => {
                state.search_input.pop();
            }
            KeyCode::Enter => {
                let query = state.search_input.trim().to_string();
                if !query.is_empty() {
                    state.list_title = format!("searching \"{query}\"...");
                    let agg = Arc::clone(aggregator);
                    let tx = state.search_tx.clone();
                    runtime.spawn(async move {
                        let tracks = agg.search(&query).await;
                        let _ = tx.send(SearchOutcome { query, tracks });
                    });
                }
                state.search_mode = false;
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    state.search_input.push(c);
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => {
            state.search_mode = true;
            state.search_input.clear();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = controller.playlist().len();
            if len > 0 && state.selected + 1 < len {
                state.selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.selected = state.selected.saturating_sub(1);
        }
        KeyCode::Enter => {
            state.notice = None;
            controller.select(state.selected);
            controller.play();
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            controller.toggle_play();
        }
        KeyCode::Char('l') => {
            controller.next(false);
        }
        KeyCode::Char('h') => {
            controller.prev();
        }
        KeyCode::Char('r') => {
            controller.set_random(!controller.is_random());
        }
        KeyCode::Char('a') => {
            controller.set_autoplay(!controller.is_autoplay());
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            controller.set_volume(controller.volume() + VOLUME_STEP);
        }
        KeyCode::Char('-') => {
            controller.set_volume(controller.volume() - VOLUME_STEP);
        }
        _ => {}
    }

    false
}

/// A click on the bar strip seeks to the start of the clicked bar.
fn handle_mouse_event<B: AudioBackend>(
    mouse: MouseEvent,
    screen: Rect,
    controller: &mut PlaybackController<B>,
    visualizer: &mut Visualizer,
) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let chunks = ui::screen_chunks(screen);
    let strip = ui::bar_strip_inner(chunks[0]);
    if !strip.contains(ratatui::layout::Position::new(mouse.column, mouse.row)) {
        return;
    }

    let duration = controller.duration();
    let Some(target) = visualizer.seek_target(mouse.column - strip.x, strip.width, duration) else {
        return;
    };
    controller.seek(target);
    if controller.state() != TransportState::Playing {
        // No live frame will run; repaint the played partition now.
        visualizer.mark_played(target, duration);
    }
}
