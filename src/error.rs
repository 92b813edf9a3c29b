//! Error types for rendering
//!
//! Validation happens where parameters enter the pipeline (envelopes,
//! chord/arpeggio generators, configuration). Every variant carries the
//! offending values so a failed render can be diagnosed from the message.

/// Errors raised while building or rendering audio
#[derive(Debug, Clone, PartialEq)]
pub enum SynthError {
    /// Envelope spans are negative, non-finite, or overrun the note duration
    InvalidEnvelope {
        attack: f64,
        decay: f64,
        release: f64,
        duration: f64,
        reason: &'static str,
    },
    /// Delay or derived voice duration is not usable
    InvalidTiming(String),
    /// Frequency is negative or not finite
    InvalidFrequency(f64),
    /// Harmonic weights are empty or not finite
    InvalidProfile(String),
    /// No instrument with this name in the timbre table
    UnknownInstrument(String),
    /// Configuration value out of range
    InvalidConfig(String),
}

impl std::fmt::Display for SynthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthError::InvalidEnvelope {
                attack,
                decay,
                release,
                duration,
                reason,
            } => write!(
                f,
                "Invalid envelope ({}): attack={}s decay={}s release={}s duration={}s",
                reason, attack, decay, release, duration
            ),
            SynthError::InvalidTiming(s) => write!(f, "Invalid timing: {}", s),
            SynthError::InvalidFrequency(hz) => write!(f, "Invalid frequency: {} Hz", hz),
            SynthError::InvalidProfile(s) => write!(f, "Invalid harmonic profile: {}", s),
            SynthError::UnknownInstrument(s) => write!(f, "Unknown instrument: {}", s),
            SynthError::InvalidConfig(s) => write!(f, "Invalid configuration: {}", s),
        }
    }
}

impl std::error::Error for SynthError {}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SynthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_message_names_values() {
        let err = SynthError::InvalidEnvelope {
            attack: 0.5,
            decay: 0.6,
            release: 0.1,
            duration: 1.0,
            reason: "attack + decay exceeds duration",
        };
        let msg = err.to_string();
        assert!(msg.contains("attack=0.5s"));
        assert!(msg.contains("duration=1s"));
        assert!(msg.contains("exceeds duration"));
    }

    #[test]
    fn test_unknown_instrument_message() {
        let err = SynthError::UnknownInstrument("kazoo".to_string());
        assert_eq!(err.to_string(), "Unknown instrument: kazoo");
    }
}
