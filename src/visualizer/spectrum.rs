use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Frequency-domain magnitude snapshot of the live signal: one byte per
/// bin, regenerated every visual frame and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumFrame {
    bins: Vec<u8>,
}

impl SpectrumFrame {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }
}

// Byte mapping window, the dB range the bar heights were designed around.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Turns raw output samples into [`SpectrumFrame`]s.
///
/// The FFT is planned once; every frame windows the most recent `fft_size`
/// samples (Hann), transforms them and keeps the positive-frequency half,
/// so frames always have `fft_size / 2` bins.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        Self { fft, fft_size }
    }

    /// Compute one frame from the tail of `samples`; shorter input is
    /// zero-padded.
    pub fn frame(&self, samples: &[f32]) -> SpectrumFrame {
        let n = self.fft_size;
        let window_len = samples.len().min(n);
        let tail = &samples[samples.len() - window_len..];

        let mut buf: Vec<Complex<f32>> = Vec::with_capacity(n);
        let denom = window_len.max(2) as f32 - 1.0;
        for (i, &sample) in tail.iter().enumerate() {
            let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos());
            buf.push(Complex::new(sample * w, 0.0));
        }
        buf.resize(n, Complex::new(0.0, 0.0));

        self.fft.process(&mut buf);

        let bins = buf[..n / 2]
            .iter()
            .map(|c| byte_magnitude(c.norm() / n as f32))
            .collect();
        SpectrumFrame::new(bins)
    }
}

/// Map a normalized magnitude onto `0..=255` over the dB window.
fn byte_magnitude(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB);
    (scaled.clamp(0.0, 1.0) * 255.0) as u8
}
