//! Render configuration
//!
//! Defaults cover a complete render; a TOML file can override any field:
//!
//! ```toml
//! sample_rate = 48000
//! target_peak = 0.9
//! instrument = "piano"
//! bit_depth = 32
//!
//! [envelope]
//! attack = 0.02
//! decay = 0.1
//! sustain_level = 0.6
//! release = 0.3
//!
//! [instruments]
//! bell = [1.0, 0.0, 0.6, 0.0, 0.3]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SynthError};
use crate::generator::{Adsr, NoteRenderer, TimbreTable};

/// Envelope override as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeConfig {
    pub attack: f64,
    pub decay: f64,
    pub sustain_level: f64,
    pub release: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        let adsr = Adsr::default();
        Self {
            attack: adsr.attack,
            decay: adsr.decay,
            sustain_level: adsr.sustain_level,
            release: adsr.release,
        }
    }
}

impl From<EnvelopeConfig> for Adsr {
    fn from(c: EnvelopeConfig) -> Self {
        Adsr::new(c.attack, c.decay, c.sustain_level, c.release)
    }
}

/// Configuration for rendering a composition
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Peak absolute sample after normalization
    pub target_peak: f64,
    /// Instrument for cues that do not name one
    pub instrument: String,
    /// Envelope for cues that do not set one; `None` keeps each part's
    /// own defaults (longer release for chords)
    pub envelope: Option<EnvelopeConfig>,
    /// PCM bit depth of written files (16 or 32)
    pub bit_depth: u16,
    /// Render samples and chord voices on the rayon pool
    pub parallel: bool,
    /// Extra instruments: name → harmonic weights
    pub instruments: BTreeMap<String, Vec<f64>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            target_peak: 1.0,
            instrument: "digital".to_string(),
            envelope: None,
            bit_depth: 16,
            parallel: true,
            instruments: BTreeMap::new(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RenderConfig =
            toml::from_str(text).map_err(|e| SynthError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SynthError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidConfig(
                "sample_rate must be positive".to_string(),
            ));
        }
        if !(self.target_peak.is_finite() && self.target_peak > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "target_peak must be positive, got {}",
                self.target_peak
            )));
        }
        if self.bit_depth != 16 && self.bit_depth != 32 {
            return Err(SynthError::InvalidConfig(format!(
                "bit_depth must be 16 or 32, got {}",
                self.bit_depth
            )));
        }
        let table = self.timbre_table()?;
        table.get(&self.instrument)?;
        Ok(())
    }

    /// Built-in instruments plus the configured ones
    pub fn timbre_table(&self) -> Result<TimbreTable> {
        self.instruments
            .iter()
            .try_fold(TimbreTable::new(), |table, (name, weights)| {
                table.with_profile(name, weights.clone())
            })
    }

    pub fn renderer(&self) -> NoteRenderer {
        NoteRenderer::new(self.sample_rate, self.parallel)
    }

    pub fn envelope_override(&self) -> Option<Adsr> {
        self.envelope.map(Adsr::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44100);
        assert!(config.envelope_override().is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let config = RenderConfig::from_toml_str(
            r#"
sample_rate = 22050
target_peak = 0.5
instrument = "bell"
bit_depth = 32
parallel = false

[envelope]
attack = 0.01
release = 0.4

[instruments]
bell = [1.0, 0.0, 0.6]
"#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.bit_depth, 32);
        assert!(!config.renderer().is_parallel());
        let adsr = config.envelope_override().unwrap();
        assert_eq!(adsr.attack, 0.01);
        assert_eq!(adsr.release, 0.4);
        // Unset fields keep their defaults
        assert_eq!(adsr.sustain_level, 0.7);
        assert_eq!(
            config.timbre_table().unwrap().get("bell").unwrap().weights(),
            &[1.0, 0.0, 0.6]
        );
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = RenderConfig::from_toml_str("instrument = \"piano\"").unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.instrument, "piano");
    }

    #[test]
    fn test_rejects_bad_values() {
        for doc in [
            "sample_rate = 0",
            "target_peak = -1.0",
            "bit_depth = 24",
            "instrument = \"kazoo\"",
            "[instruments]\npiano = [1.0]",
            "[instruments]\nempty = []",
            "unknown_key = 1",
        ] {
            assert!(
                RenderConfig::from_toml_str(doc).is_err(),
                "accepted: {}",
                doc
            );
        }
    }
}
