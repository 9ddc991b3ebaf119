use std::time::Duration;

use super::spectrum::SpectrumFrame;

/// One visual unit: the aggregated magnitude of a contiguous frequency band
/// plus its played/unplayed status. Recomputed every frame, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Height percentage: the band's mean byte magnitude halved, so at most
    /// 127.5.
    pub height: f32,
    pub played: bool,
}

/// Project a spectrum frame onto `bars_count` bars.
///
/// The frame is cut into equal buckets of `floor(len / bars_count)` bins;
/// remainder bins at the tail are ignored by design, not an error.
pub fn project(
    frame: &SpectrumFrame,
    bars_count: usize,
    position: Duration,
    duration: Option<Duration>,
) -> Vec<Bar> {
    if bars_count == 0 {
        return Vec::new();
    }
    let step = frame.len() / bars_count;
    let boundary = played_boundary(position, duration, bars_count);

    (0..bars_count)
        .map(|index| {
            let height = if step == 0 {
                0.0
            } else {
                let bucket = &frame.bins()[index * step..(index + 1) * step];
                let sum: u32 = bucket.iter().map(|&b| u32::from(b)).sum();
                (sum as f32 / step as f32) / 2.0
            };
            Bar {
                height,
                played: boundary.is_some_and(|b| index <= b),
            }
        })
        .collect()
}

/// Index of the last played bar, or `None` while the duration is unknown
/// or zero (then no bar is marked played).
pub fn played_boundary(
    position: Duration,
    duration: Option<Duration>,
    bars_count: usize,
) -> Option<usize> {
    if bars_count == 0 {
        return None;
    }
    let total = duration?.as_secs_f64();
    if total <= 0.0 {
        return None;
    }
    let per_bar = total / bars_count as f64;
    Some((position.as_secs_f64() / per_bar).floor() as usize)
}

/// Rewrite only the played flags of an existing strip.
pub fn mark_played(bars: &mut [Bar], position: Duration, duration: Option<Duration>) {
    let boundary = played_boundary(position, duration, bars.len());
    for (index, bar) in bars.iter_mut().enumerate() {
        bar.played = boundary.is_some_and(|b| index <= b);
    }
}

/// Map a horizontal offset within the bar strip to a bar index, clamped to
/// the strip.
pub fn bar_at_offset(x: f32, strip_width: f32, bars_count: usize) -> usize {
    if bars_count == 0 || strip_width <= 0.0 {
        return 0;
    }
    let bar_width = strip_width / bars_count as f32;
    let index = (x / bar_width).floor() as isize;
    index.clamp(0, bars_count as isize - 1) as usize
}

/// Playback position at the start of `bar_index`.
pub fn seek_time(bar_index: usize, duration: Duration, bars_count: usize) -> Duration {
    if bars_count == 0 {
        return Duration::ZERO;
    }
    duration.mul_f64(bar_index as f64 / bars_count as f64)
}
