use std::f64::consts::TAU;

use rayon::prelude::*;
use tracing::debug;

use super::envelope::{Envelope, EnvelopeParams};
use super::fourier::FourierSeries;
use super::timbre::HarmonicProfile;
use crate::buffer::SampleBuffer;
use crate::error::{Result, SynthError};

/// Renders single notes as envelope × additive waveform
///
/// Sample `k` of a note is `envelope(k / R) * series(2π * f * k / R)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRenderer {
    sample_rate: u32,
    parallel: bool,
}

impl NoteRenderer {
    /// Create a renderer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `parallel` - Compute samples on the rayon pool; output is identical
    ///   to the sequential path
    pub fn new(sample_rate: u32, parallel: bool) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            parallel,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Number of samples covering `seconds`, rounded to the nearest sample
    pub fn samples_for(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64).round().max(0.0) as usize
    }

    /// Validate the envelope and frequency, then render
    ///
    /// # Errors
    /// [`SynthError::InvalidEnvelope`] or [`SynthError::InvalidFrequency`].
    pub fn render_note(
        &self,
        frequency: f64,
        params: &EnvelopeParams,
        profile: &HarmonicProfile,
    ) -> Result<SampleBuffer> {
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(SynthError::InvalidFrequency(frequency));
        }
        let envelope = Envelope::new(*params)?;
        Ok(self.render(frequency, &envelope, profile))
    }

    /// Render a note with an already validated envelope
    ///
    /// The buffer spans the note duration plus release. A frequency of 0
    /// renders silence of the same length.
    pub fn render(
        &self,
        frequency: f64,
        envelope: &Envelope,
        profile: &HarmonicProfile,
    ) -> SampleBuffer {
        let len = self.samples_for(envelope.total_span());

        if frequency == 0.0 {
            return SampleBuffer::silence(len);
        }

        let rate = self.sample_rate as f64;
        let series = FourierSeries::new(profile);
        let sample = |k: usize| {
            let t = k as f64 / rate;
            envelope.gain(t) * series.value(TAU * frequency * t)
        };

        let samples: Vec<f64> = if self.parallel {
            (0..len).into_par_iter().map(sample).collect()
        } else {
            (0..len).map(sample).collect()
        };

        debug!(frequency, samples = len, "rendered note");
        SampleBuffer::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::envelope::Adsr;
    use crate::generator::timbre::Instrument;

    #[test]
    fn test_rest_is_silent_with_full_length() {
        let renderer = NoteRenderer::new(44100, false);
        let params = Adsr::new(0.05, 0.05, 0.7, 0.05).with_duration(0.26);
        for instrument in [Instrument::Digital, Instrument::Flute] {
            let buffer = renderer
                .render_note(0.0, &params, &instrument.profile())
                .unwrap();
            assert_eq!(buffer.len(), (44100.0f64 * (0.26 + 0.05)).round() as usize);
            assert!(buffer.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_length_includes_release() {
        let renderer = NoteRenderer::new(1000, false);
        let params = Adsr::new(0.1, 0.1, 0.5, 0.25).with_duration(1.0);
        let buffer = renderer
            .render_note(5.0, &params, &Instrument::Sine.profile())
            .unwrap();
        assert_eq!(buffer.len(), 1250);
    }

    #[test]
    fn test_length_rounds_duration_plus_release() {
        let renderer = NoteRenderer::new(44100, false);
        let profile = Instrument::Digital.profile();
        let release = 0.05;
        let mut duration = 0.1;
        while duration < 3.0 {
            let envelope = Envelope::new(Adsr::new(0.05, 0.05, 0.7, release).with_duration(duration))
                .unwrap();
            let buffer = renderer.render(0.0, &envelope, &profile);
            let expected = (44100.0 * (duration + release)).round() as usize;
            assert_eq!(buffer.len(), expected, "duration {}", duration);
            duration += 0.0007;
        }
    }

    #[test]
    fn test_samples_follow_envelope_and_series() {
        let renderer = NoteRenderer::new(1000, false);
        let params = Adsr::new(0.1, 0.1, 0.5, 0.2).with_duration(1.0);
        let envelope = Envelope::new(params).unwrap();
        let profile = Instrument::Sine.profile();
        let buffer = renderer.render(3.0, &envelope, &profile);

        assert_eq!(buffer[0], 0.0);
        for k in [17usize, 150, 500, 1100] {
            let t = k as f64 / 1000.0;
            let expected = envelope.gain(t) * (TAU * 3.0 * t).sin();
            assert!((buffer[k] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let params = Adsr::default().with_duration(0.3);
        let profile = Instrument::Saw.profile();
        let seq = NoteRenderer::new(8000, false)
            .render_note(330.0, &params, &profile)
            .unwrap();
        let par = NoteRenderer::new(8000, true)
            .render_note(330.0, &params, &profile)
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let renderer = NoteRenderer::new(44100, false);
        let profile = Instrument::Sine.profile();
        let params = Adsr::default().with_duration(0.5);
        assert!(matches!(
            renderer.render_note(-1.0, &params, &profile),
            Err(SynthError::InvalidFrequency(_))
        ));
        let bad = Adsr::new(0.4, 0.4, 0.7, 0.1).with_duration(0.5);
        assert!(matches!(
            renderer.render_note(440.0, &bad, &profile),
            Err(SynthError::InvalidEnvelope { .. })
        ));
    }
}
