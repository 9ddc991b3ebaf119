//! Spectral visualizer: projects the live signal onto a strip of frequency
//! bars with a playback-position color sweep.

mod bars;
mod spectrum;

pub use bars::{Bar, bar_at_offset, mark_played, played_boundary, project, seek_time};
pub use spectrum::{SpectrumAnalyzer, SpectrumFrame};


use std::time::Duration;

use crate::player::SampleTap;

/// Drives the bar model from the live sample tap.
///
/// The runtime calls [`on_frame`] once per rendered frame while the
/// controller reports playing; stopping the calls is how the loop
/// terminates. [`mark_played`] keeps the played partition consistent after
/// a seek while paused, when no live frame runs.
///
/// [`on_frame`]: Visualizer::on_frame
/// [`mark_played`]: Visualizer::mark_played
pub struct Visualizer {
    analyzer: SpectrumAnalyzer,
    tap: SampleTap,
    bars_count: usize,
    bars: Vec<Bar>,
}

impl Visualizer {
    pub fn new(tap: SampleTap, fft_size: usize, bars_count: usize) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(fft_size),
            tap,
            bars_count,
            bars: silent_bars(bars_count),
        }
    }

    /// Visual density. A pure rendering parameter: analysis fidelity is
    /// unaffected, only how coarsely bins are bucketed into bars.
    pub fn set_bars_count(&mut self, bars_count: usize) {
        if bars_count != self.bars_count {
            self.bars_count = bars_count;
            self.bars = silent_bars(bars_count);
        }
    }

    /// Reset the strip to silence (track change).
    pub fn reset(&mut self) {
        self.bars = silent_bars(self.bars_count);
    }

    /// Compute one frame from the latest samples in the tap.
    pub fn on_frame(&mut self, position: Duration, duration: Option<Duration>) {
        let samples: Vec<f32> = match self.tap.lock() {
            Ok(buf) => buf.iter().copied().collect(),
            Err(_) => return,
        };
        let frame = self.analyzer.frame(&samples);
        self.bars = project(&frame, self.bars_count, position, duration);
    }

    /// Recompute only the played/unplayed partition from a new position.
    pub fn mark_played(&mut self, position: Duration, duration: Option<Duration>) {
        mark_played(&mut self.bars, position, duration);
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Map a click at column `x` within a strip `width` cells wide to the
    /// playback position at the start of the clicked bar.
    pub fn seek_target(&self, x: u16, width: u16, duration: Option<Duration>) -> Option<Duration> {
        let duration = duration?;
        let index = bar_at_offset(f32::from(x), f32::from(width), self.bars_count);
        Some(seek_time(index, duration, self.bars_count))
    }
}

fn silent_bars(n: usize) -> Vec<Bar> {
    vec![
        Bar {
            height: 0.0,
            played: false
        };
        n
    ]
}
