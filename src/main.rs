mod catalog;
mod config;
mod player;
mod runtime;
mod ui;
mod visualizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging stays quiet unless RUST_LOG is set; the terminal belongs to
    // the TUI.
    env_logger::init();
    runtime::run()
}
