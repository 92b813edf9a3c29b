//! Magnitude spectrum of a track
//!
//! Used by the plotting tool to show which harmonics a timbre produces.

use realfft::RealFftPlanner;

/// Magnitudes of the real FFT of `samples`, one per bin from DC to Nyquist
///
/// Bin `k` corresponds to `k * sample_rate / samples.len()` Hz. Returns an
/// empty vector for empty input.
pub fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(samples.len());
    let mut input = samples.to_vec();
    let mut output = fft.make_output_vec();

    // Lengths come from the plan, so processing cannot fail
    if fft.process(&mut input, &mut output).is_err() {
        return Vec::new();
    }

    output.iter().map(|c| c.norm()).collect()
}

/// Frequency in Hz of each bin returned by [`magnitude_spectrum`]
pub fn bin_frequencies(len: usize, sample_rate: u32) -> Vec<f64> {
    if len == 0 {
        return Vec::new();
    }
    let step = sample_rate as f64 / len as f64;
    (0..len / 2 + 1).map(|k| k as f64 * step).collect()
}

/// Frequency of the strongest non-DC bin
pub fn dominant_frequency(samples: &[f64], sample_rate: u32) -> Option<f64> {
    let spectrum = magnitude_spectrum(samples);
    let freqs = bin_frequencies(samples.len(), sample_rate);
    spectrum
        .iter()
        .zip(freqs.iter())
        .skip(1)
        .max_by(|a, b| a.0.total_cmp(b.0))
        .map(|(_, &f)| f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Adsr, Instrument, NoteRenderer};
    use std::f64::consts::TAU;

    #[test]
    fn test_pure_tone_peak() {
        let rate = 1000;
        let samples: Vec<f64> = (0..1000)
            .map(|k| (TAU * 50.0 * k as f64 / rate as f64).sin())
            .collect();
        assert_eq!(dominant_frequency(&samples, rate), Some(50.0));
    }

    #[test]
    fn test_bin_layout() {
        assert_eq!(magnitude_spectrum(&[0.0; 8]).len(), 5);
        assert_eq!(bin_frequencies(8, 800), vec![0.0, 100.0, 200.0, 300.0, 400.0]);
        assert!(magnitude_spectrum(&[]).is_empty());
    }

    #[test]
    fn test_rendered_note_fundamental() {
        let renderer = NoteRenderer::new(8000, false);
        let params = Adsr::new(0.0, 0.0, 1.0, 0.0).with_duration(1.0);
        let buffer = renderer
            .render_note(200.0, &params, &Instrument::Digital.profile())
            .unwrap();
        assert_eq!(dominant_frequency(&buffer, 8000), Some(200.0));
    }
}
