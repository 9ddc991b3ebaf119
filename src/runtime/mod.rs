use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::catalog::{Aggregator, Audius, CatalogProvider, Jamendo};
use crate::player::{PlaybackController, StreamBackend};
use crate::visualizer::Visualizer;

mod event_loop;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let runtime = tokio::runtime::Runtime::new()?;
    let http = reqwest::Client::new();
    let p = &settings.providers;
    // Vec order is the merge priority order.
    let providers: Vec<Box<dyn CatalogProvider>> = vec![
        Box::new(Audius::new(
            http.clone(),
            p.audius_directory.clone(),
            p.app_name.clone(),
            p.trending_limit as usize,
        )),
        Box::new(Jamendo::new(
            http,
            p.jamendo_base_url.clone(),
            p.jamendo_client_id.clone(),
            p.trending_limit,
            p.search_limit,
        )),
    ];

    let mut aggregator = Aggregator::new(providers);
    let trending = runtime.block_on(aggregator.aggregate_trending());
    let aggregator = Arc::new(aggregator);

    let backend = StreamBackend::new()?;
    let mut controller = PlaybackController::new(backend);
    controller.set_random(settings.playback.random);
    controller.set_autoplay(settings.playback.autoplay);
    controller.set_volume(settings.playback.volume);
    controller.load(trending);

    let mut visualizer = Visualizer::new(
        controller.sample_tap(),
        settings.visualizer.fft_size,
        settings.visualizer.bars_wide,
    );

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &runtime,
            &aggregator,
            &mut controller,
            &mut visualizer,
            &mut state,
        )
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
