//! Timbre table: harmonic weights per instrument
//!
//! Each profile lists the amplitude of the fundamental followed by the
//! amplitudes of successive overtones. Built-in profiles are static data;
//! extra profiles can be registered through [`TimbreTable::with_profile`].

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{Result, SynthError};

const AVERAGE: &[f64] = &[
    0.7, 0.33, 0.23, 0.14, 0.15, 0.105, 0.1, 0.07, 0.08, 0.07, 0.07, 0.06, 0.05, 0.04, 0.03, 0.03,
    0.03, 0.02, 0.01, 0.01,
];
const PIANO: &[f64] = &[1.0, 0.1, 0.31, 0.07, 0.06, 0.05, 0.0, 0.01, 0.02, 0.0, 0.01];
const GUITAR: &[f64] = &[1.0, 0.675, 1.26, 0.125, 0.125, 0.12, 0.0, 0.0, 0.18, 0.05, 0.01];
const HORN: &[f64] = &[1.0, 0.675, 1.26, 0.125, 0.125, 0.12, 0.0, 0.0, 0.18, 0.05, 0.01];
const CLARINET: &[f64] = &[1.0, 0.39, 0.205, 0.0, 0.075, 0.2, 0.075];
const OBOE: &[f64] = &[1.0, 0.95, 2.05, 0.2, 0.22, 0.23, 0.58, 0.3, 0.22, 0.01];
const FLUTE: &[f64] = &[1.0, 9.0, 3.75, 2.85, 0.3, 0.15, 0.1, 0.12, 0.1];
const MARIMBA: &[f64] = &[1.0, 0.0, 0.6, 0.0, 0.5, 0.0, 0.1];
const DIGITAL: &[f64] = &[1.0, 1.0 / 9.0, 1.0 / 81.0];
const SINE: &[f64] = &[1.0];
const TRIANGLE: &[f64] = &[
    1.0,
    0.0,
    1.0 / 9.0,
    0.0,
    1.0 / 25.0,
    0.0,
    1.0 / 49.0,
    0.0,
    1.0 / 81.0,
];
const SQUARE: &[f64] = &[
    1.0,
    0.0,
    1.0 / 3.0,
    0.0,
    1.0 / 5.0,
    0.0,
    1.0 / 7.0,
    0.0,
    1.0 / 9.0,
    0.0,
    1.0 / 11.0,
    0.0,
    1.0 / 13.0,
    0.0,
    1.0 / 15.0,
    0.0,
    1.0 / 17.0,
    0.0,
    1.0 / 19.0,
    0.0,
    1.0 / 21.0,
    0.0,
    1.0 / 23.0,
    0.0,
    1.0 / 25.0,
];
const SAW: &[f64] = &[
    1.0,
    1.0 / 2.0,
    1.0 / 3.0,
    1.0 / 4.0,
    1.0 / 5.0,
    1.0 / 6.0,
    1.0 / 7.0,
    1.0 / 8.0,
    1.0 / 9.0,
    1.0 / 10.0,
    1.0 / 11.0,
    1.0 / 12.0,
    1.0 / 13.0,
    1.0 / 14.0,
    1.0 / 15.0,
    1.0 / 16.0,
    1.0 / 17.0,
    1.0 / 18.0,
];

/// Built-in instruments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Average,
    Piano,
    Guitar,
    Horn,
    Clarinet,
    Oboe,
    Flute,
    Marimba,
    Digital,
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Instrument {
    pub const ALL: [Instrument; 13] = [
        Instrument::Average,
        Instrument::Piano,
        Instrument::Guitar,
        Instrument::Horn,
        Instrument::Clarinet,
        Instrument::Oboe,
        Instrument::Flute,
        Instrument::Marimba,
        Instrument::Digital,
        Instrument::Sine,
        Instrument::Triangle,
        Instrument::Square,
        Instrument::Saw,
    ];

    /// Lowercase name used in composition files and configuration
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Average => "average",
            Instrument::Piano => "piano",
            Instrument::Guitar => "guitar",
            Instrument::Horn => "horn",
            Instrument::Clarinet => "clarinet",
            Instrument::Oboe => "oboe",
            Instrument::Flute => "flute",
            Instrument::Marimba => "marimba",
            Instrument::Digital => "digital",
            Instrument::Sine => "sine",
            Instrument::Triangle => "triangle",
            Instrument::Square => "square",
            Instrument::Saw => "saw",
        }
    }

    /// Harmonic weights, fundamental first
    pub fn weights(&self) -> &'static [f64] {
        match self {
            Instrument::Average => AVERAGE,
            Instrument::Piano => PIANO,
            Instrument::Guitar => GUITAR,
            Instrument::Horn => HORN,
            Instrument::Clarinet => CLARINET,
            Instrument::Oboe => OBOE,
            Instrument::Flute => FLUTE,
            Instrument::Marimba => MARIMBA,
            Instrument::Digital => DIGITAL,
            Instrument::Sine => SINE,
            Instrument::Triangle => TRIANGLE,
            Instrument::Square => SQUARE,
            Instrument::Saw => SAW,
        }
    }

    pub fn profile(&self) -> HarmonicProfile {
        HarmonicProfile {
            weights: self.weights().to_vec(),
        }
    }
}

impl FromStr for Instrument {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Instrument::ALL
            .iter()
            .copied()
            .find(|i| i.name() == lower)
            .ok_or_else(|| SynthError::UnknownInstrument(s.to_string()))
    }
}

/// Ordered harmonic weights `c_0..c_{n-1}`; `c_i` scales harmonic `i + 1`
///
/// Never empty; index 0 is the fundamental.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicProfile {
    weights: Vec<f64>,
}

impl HarmonicProfile {
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(SynthError::InvalidProfile(
                "at least one weight is required".to_string(),
            ));
        }
        if let Some((i, w)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
            return Err(SynthError::InvalidProfile(format!(
                "weight {} is not finite ({})",
                i, w
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of harmonics in the profile
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl From<Instrument> for HarmonicProfile {
    fn from(instrument: Instrument) -> Self {
        instrument.profile()
    }
}

/// Name → profile lookup over built-in and registered instruments
#[derive(Debug, Clone, Default)]
pub struct TimbreTable {
    custom: BTreeMap<String, HarmonicProfile>,
}

impl TimbreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named profile
    ///
    /// Names are case-insensitive and may not shadow a built-in instrument.
    pub fn with_profile(mut self, name: &str, weights: Vec<f64>) -> Result<Self> {
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(SynthError::InvalidConfig(
                "instrument name must not be empty".to_string(),
            ));
        }
        if Instrument::from_str(&key).is_ok() {
            return Err(SynthError::InvalidConfig(format!(
                "instrument '{}' is built in and cannot be redefined",
                name
            )));
        }
        let profile = HarmonicProfile::new(weights)?;
        self.custom.insert(key, profile);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<HarmonicProfile> {
        if let Ok(instrument) = Instrument::from_str(name) {
            return Ok(instrument.profile());
        }
        self.custom
            .get(&name.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| SynthError::UnknownInstrument(name.to_string()))
    }

    /// All instrument names, built-ins first
    pub fn names(&self) -> Vec<String> {
        Instrument::ALL
            .iter()
            .map(|i| i.name().to_string())
            .chain(self.custom.keys().cloned())
            .collect()
    }
}
