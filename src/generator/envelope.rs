use crate::error::{Result, SynthError};
use tracing::warn;

/// Slack allowed when checking `attack + decay <= duration`, so that
/// decimal inputs like 0.05 + 0.05 against 0.1 are not rejected.
const SPAN_TOLERANCE: f64 = 1e-9;

/// Envelope shape, independent of note length
///
/// All spans are in seconds. `sustain_level` is a gain, typically in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f64,
    pub decay: f64,
    pub sustain_level: f64,
    pub release: f64,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.05,
            sustain_level: 0.7,
            release: 0.05,
        }
    }
}

impl Adsr {
    pub fn new(attack: f64, decay: f64, sustain_level: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain_level,
            release,
        }
    }

    /// Pair this shape with a note duration
    pub fn with_duration(self, duration: f64) -> EnvelopeParams {
        EnvelopeParams {
            adsr: self,
            duration,
        }
    }

    pub fn with_release(self, release: f64) -> Self {
        Self { release, ..self }
    }
}

/// Full envelope description for one note
///
/// The release always extends past `duration`, so the rendered span is
/// `duration + release`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub adsr: Adsr,
    pub duration: f64,
}

/// Window of the envelope a time falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    Attack,
    Decay,
    Sustain,
    Release,
    Complete,
}

/// Validated ADSR envelope evaluated as a pure function of time
///
/// Windows, measured from note start:
/// 1. Attack `[0, a)`: ramps 0 → 1
/// 2. Decay `[a, a+d)`: ramps 1 → sustain level
/// 3. Sustain `[a+d, duration)`: holds the sustain level
/// 4. Release `[duration, duration+r)`: ramps sustain level → 0
///
/// Zero-length windows are skipped, so an envelope with no attack starts
/// at full gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    attack: f64,
    decay: f64,
    sustain_level: f64,
    duration: f64,
    release: f64,
}

impl Envelope {
    /// Validate parameters and build the envelope
    ///
    /// # Errors
    /// [`SynthError::InvalidEnvelope`] if any span is negative or not finite,
    /// the duration is not positive, or attack + decay overruns the duration.
    pub fn new(params: EnvelopeParams) -> Result<Self> {
        let Adsr {
            attack,
            decay,
            sustain_level,
            release,
        } = params.adsr;
        let duration = params.duration;

        let invalid = |reason: &'static str| SynthError::InvalidEnvelope {
            attack,
            decay,
            release,
            duration,
            reason,
        };

        if ![attack, decay, release, duration, sustain_level]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(invalid("values must be finite"));
        }
        if attack < 0.0 || decay < 0.0 || release < 0.0 {
            return Err(invalid("spans must be non-negative"));
        }
        if duration <= 0.0 {
            return Err(invalid("duration must be positive"));
        }
        if attack + decay > duration + SPAN_TOLERANCE {
            return Err(invalid("attack + decay exceeds duration"));
        }
        if !(0.0..=1.0).contains(&sustain_level) {
            warn!(sustain_level, "sustain level outside [0, 1]");
        }

        Ok(Self {
            attack,
            decay,
            sustain_level,
            duration,
            release,
        })
    }

    /// Time at which the release window starts (the note duration)
    pub fn release_start(&self) -> f64 {
        self.duration
    }

    /// Total span with a non-zero gain: duration + release
    pub fn total_span(&self) -> f64 {
        self.duration + self.release
    }

    /// Window that contains `t`
    pub fn phase(&self, t: f64) -> EnvelopePhase {
        if t >= self.total_span() {
            EnvelopePhase::Complete
        } else if t >= self.duration {
            EnvelopePhase::Release
        } else if t < self.attack {
            EnvelopePhase::Attack
        } else if t < self.attack + self.decay {
            EnvelopePhase::Decay
        } else {
            EnvelopePhase::Sustain
        }
    }

    /// Gain at time `t` seconds after note start
    ///
    /// Each window's division only happens when `t` lies inside it, so a
    /// zero-length window is never evaluated.
    pub fn gain(&self, t: f64) -> f64 {
        match self.phase(t) {
            EnvelopePhase::Attack => t / self.attack,
            EnvelopePhase::Decay => {
                1.0 + (t - self.attack) * (self.sustain_level - 1.0) / self.decay
            }
            EnvelopePhase::Sustain => self.sustain_level,
            EnvelopePhase::Release => {
                self.sustain_level
                    - (self.sustain_level / self.release) * (t - self.release_start())
            }
            EnvelopePhase::Complete => 0.0,
        }
    }
}
