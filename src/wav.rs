//! WAV file writer
//!
//! Writes mono integer PCM through `hound`. Samples are expected in
//! [-1.0, 1.0] (a track normalized to peak 1.0); anything outside is clamped.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, warn};

/// PCM sample width of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Pcm16,
    Pcm32,
}

impl BitDepth {
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Pcm16 => 16,
            BitDepth::Pcm32 => 32,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(BitDepth::Pcm16),
            32 => Some(BitDepth::Pcm32),
            _ => None,
        }
    }

    fn full_scale(&self) -> f64 {
        match self {
            BitDepth::Pcm16 => i16::MAX as f64,
            BitDepth::Pcm32 => i32::MAX as f64,
        }
    }
}

/// Map samples in [-1.0, 1.0] to integers at `depth`
///
/// Out-of-range samples are clamped; both signs use the positive full
/// scale so a symmetric signal stays symmetric.
pub fn quantize(samples: &[f64], depth: BitDepth) -> Vec<i32> {
    let scale = depth.full_scale();
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * scale).round() as i32)
        .collect()
}

/// Write a mono PCM WAV file
///
/// # Arguments
/// * `path` - Output file path
/// * `samples` - Audio samples (range [-1.0, 1.0])
/// * `sample_rate` - Sample rate in Hz
/// * `depth` - Integer sample width
pub fn write_wav(
    path: impl AsRef<Path>,
    samples: &[f64],
    sample_rate: u32,
    depth: BitDepth,
) -> Result<(), hound::Error> {
    let clipped = samples.iter().filter(|s| s.abs() > 1.0).count();
    if clipped > 0 {
        warn!(clipped, "samples outside [-1, 1] were clamped");
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: depth.bits(),
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;

    for value in quantize(samples, depth) {
        match depth {
            BitDepth::Pcm16 => writer.write_sample(value as i16)?,
            BitDepth::Pcm32 => writer.write_sample(value)?,
        }
    }
    writer.finalize()?;

    info!(
        path = %path.as_ref().display(),
        samples = samples.len(),
        bits = depth.bits(),
        "wrote wav"
    );
    Ok(())
}

/// Read a WAV file back as mono samples in [-1.0, 1.0]
///
/// Multi-channel files are reduced to their first channel.
pub fn read_wav(path: impl AsRef<Path>) -> Result<(Vec<f64>, u32), hound::Error> {
    let mut reader = hound::WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok((samples, spec.sample_rate))
}
