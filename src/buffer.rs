//! Sample buffers
//!
//! A [`SampleBuffer`] is produced once and then only read; stages that
//! combine buffers allocate a fresh accumulator instead of writing into
//! their inputs.

use std::ops::Deref;

/// Mono samples at the renderer's sample rate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
}

/// A buffer produced by the mixer or combiner
pub type Track = SampleBuffer;

impl SampleBuffer {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// All-zero buffer
    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Largest absolute sample, 0.0 for an empty buffer
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |m, s| m.max(s.abs()))
    }

    /// Length in seconds at `sample_rate`
    pub fn duration(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / sample_rate as f64
    }

    /// Copy with every sample multiplied by `gain`
    pub fn scaled(&self, gain: f64) -> Self {
        Self {
            samples: self.samples.iter().map(|s| s * gain).collect(),
        }
    }
}

impl Deref for SampleBuffer {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.samples
    }
}

impl From<Vec<f64>> for SampleBuffer {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

impl FromIterator<f64> for SampleBuffer {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak() {
        let buffer = SampleBuffer::new(vec![0.1, -0.8, 0.5]);
        assert_eq!(buffer.peak(), 0.8);
        assert_eq!(SampleBuffer::default().peak(), 0.0);
    }

    #[test]
    fn test_scaled_leaves_source_untouched() {
        let buffer = SampleBuffer::new(vec![1.0, -2.0]);
        let half = buffer.scaled(0.5);
        assert_eq!(half.samples(), &[0.5, -1.0]);
        assert_eq!(buffer.samples(), &[1.0, -2.0]);
    }

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::silence(22050);
        assert_eq!(buffer.duration(44100), 0.5);
        assert_eq!(buffer.len(), 22050);
    }
}
