//! Pitch lookup
//!
//! One reference octave (octave 4) of rounded equal-tempered frequencies.
//! Lowercase letters are naturals, uppercase letters the sharp above, and
//! `-` is a rest (frequency 0, which renders as silence).
//!
//! Tokens are `<symbol>[octave]`: `g`, `F3`, `a5`, `-`.

use std::str::FromStr;

use crate::pipeline::parser::ParseError;

/// Octave the table is written in
pub const REFERENCE_OCTAVE: i32 = 4;

const TABLE: [(char, f64); 13] = [
    ('c', 262.0),
    ('C', 277.0),
    ('d', 294.0),
    ('D', 311.0),
    ('e', 330.0),
    ('f', 349.0),
    ('F', 370.0),
    ('g', 392.0),
    ('G', 415.0),
    ('a', 440.0),
    ('A', 466.0),
    ('b', 494.0),
    ('-', 0.0),
];

/// Frequency of `symbol` in the reference octave
pub fn base_frequency(symbol: char) -> Option<f64> {
    TABLE.iter().find(|(c, _)| *c == symbol).map(|(_, f)| *f)
}

/// Frequency of `symbol` transposed to `octave`: `base * 2^(octave - 4)`
pub fn frequency(symbol: char, octave: i32) -> Option<f64> {
    base_frequency(symbol).map(|f| f * 2f64.powi(octave - REFERENCE_OCTAVE))
}

/// A pitch symbol with its octave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    pub symbol: char,
    pub octave: i32,
}

impl Pitch {
    pub fn is_rest(&self) -> bool {
        self.symbol == '-'
    }

    pub fn frequency(&self) -> f64 {
        frequency(self.symbol, self.octave).unwrap_or(0.0)
    }

    /// Parse a token, using `default_octave` when none is written
    pub fn parse_with_octave(s: &str, default_octave: i32) -> Result<Self, ParseError> {
        let s = s.trim();
        let mut chars = s.chars();
        let symbol = chars
            .next()
            .ok_or_else(|| ParseError::InvalidPitch("empty pitch".to_string()))?;
        if base_frequency(symbol).is_none() {
            return Err(ParseError::InvalidPitch(s.to_string()));
        }

        let rest: &str = chars.as_str();
        let octave = if rest.is_empty() {
            default_octave
        } else {
            rest.parse::<i32>()
                .ok()
                .filter(|o| (0..=9).contains(o))
                .ok_or_else(|| ParseError::InvalidOctave(s.to_string()))?
        };

        Ok(Self { symbol, octave })
    }
}

impl FromStr for Pitch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::parse_with_octave(s, REFERENCE_OCTAVE)
    }
}

/// Parse a whitespace- or comma-separated pitch sequence
pub fn parse_sequence(s: &str, default_octave: i32) -> Result<Vec<Pitch>, ParseError> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| Pitch::parse_with_octave(t, default_octave))
        .collect()
}
