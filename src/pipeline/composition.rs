//! Composition model and the render entry point
//!
//! A composition is a list of sections. Each section is a list of cues
//! (a note, rest, chord, arpeggio or melody placed at an offset) that are
//! mixed into one track, optionally repeated. Section tracks are combined
//! and the result normalized.

use tracing::{debug, info};

use super::chord::{
    arpeggio, chord, default_arpeggio_adsr, default_chord_adsr, ArpeggioTiming, ChordTiming,
    ChordType,
};
use super::mixer::{combine, mix, normalize, TimedEvent};
use crate::buffer::{SampleBuffer, Track};
use crate::config::RenderConfig;
use crate::error::{Result, SynthError};
use crate::generator::{Adsr, HarmonicProfile, NoteRenderer, TimbreTable};

/// Musical content of a cue, timed relative to the cue's offset
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Note {
        frequency: f64,
        duration: f64,
    },
    Rest {
        duration: f64,
    },
    Chord {
        base: f64,
        chord: ChordType,
        timing: ChordTiming,
    },
    Arpeggio {
        base: f64,
        chord: ChordType,
        timing: ArpeggioTiming,
    },
    /// Back-to-back notes `step` seconds apart; frequency 0 is a rest
    Melody {
        frequencies: Vec<f64>,
        step: f64,
        duration: f64,
    },
}

impl Part {
    /// Envelope shape used when neither the cue nor the config sets one
    pub fn default_adsr(&self) -> Adsr {
        match self {
            Part::Chord { .. } => default_chord_adsr(),
            Part::Arpeggio { .. } => default_arpeggio_adsr(),
            _ => Adsr::default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Part::Note { .. } => "note",
            Part::Rest { .. } => "rest",
            Part::Chord { .. } => "chord",
            Part::Arpeggio { .. } => "arpeggio",
            Part::Melody { .. } => "melody",
        }
    }
}

/// Per-cue envelope fields; unset fields fall back to the defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeOverrides {
    pub attack: Option<f64>,
    pub decay: Option<f64>,
    pub sustain_level: Option<f64>,
    pub release: Option<f64>,
}

impl EnvelopeOverrides {
    pub fn apply(&self, base: Adsr) -> Adsr {
        Adsr {
            attack: self.attack.unwrap_or(base.attack),
            decay: self.decay.unwrap_or(base.decay),
            sustain_level: self.sustain_level.unwrap_or(base.sustain_level),
            release: self.release.unwrap_or(base.release),
        }
    }
}

/// A part placed on a section's timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds from the section start
    pub offset: f64,
    /// Linear gain applied to the rendered part
    pub gain: f64,
    /// Instrument name; `None` uses the configured default
    pub instrument: Option<String>,
    pub envelope: EnvelopeOverrides,
    pub part: Part,
}

impl Cue {
    pub fn new(offset: f64, part: Part) -> Self {
        Self {
            offset,
            gain: 1.0,
            instrument: None,
            envelope: EnvelopeOverrides::default(),
            part,
        }
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_instrument(mut self, name: &str) -> Self {
        self.instrument = Some(name.to_string());
        self
    }
}

/// A named group of cues mixed into one track
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub cues: Vec<Cue>,
    /// Number of times the cues play (at least 1)
    pub repeat: usize,
    /// Seconds between repeats
    pub period: f64,
}

impl Section {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cues: Vec::new(),
            repeat: 1,
            period: 0.0,
        }
    }
}

/// A full piece: sections combined into one signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub sections: Vec<Section>,
}

/// Everything needed to turn cues into buffers
struct RenderContext<'a> {
    renderer: NoteRenderer,
    table: TimbreTable,
    config: &'a RenderConfig,
}

impl RenderContext<'_> {
    fn profile(&self, cue: &Cue) -> Result<HarmonicProfile> {
        let name = cue.instrument.as_deref().unwrap_or(&self.config.instrument);
        self.table.get(name)
    }

    fn adsr(&self, cue: &Cue) -> Adsr {
        let base = self
            .config
            .envelope_override()
            .unwrap_or_else(|| cue.part.default_adsr());
        cue.envelope.apply(base)
    }

    /// Render a cue's part starting at sample 0
    fn render_cue(&self, cue: &Cue) -> Result<Track> {
        let profile = self.profile(cue)?;
        let adsr = self.adsr(cue);
        let renderer = &self.renderer;

        let track = match &cue.part {
            Part::Note {
                frequency,
                duration,
            } => renderer.render_note(*frequency, &adsr.with_duration(*duration), &profile)?,
            Part::Rest { duration } => {
                if !(duration.is_finite() && *duration >= 0.0) {
                    return Err(SynthError::InvalidTiming(format!(
                        "rest duration must be non-negative, got {}",
                        duration
                    )));
                }
                SampleBuffer::silence(renderer.samples_for(*duration))
            }
            Part::Chord {
                base,
                chord: chord_type,
                timing,
            } => chord(renderer, *base, *chord_type, *timing, adsr, &profile)?,
            Part::Arpeggio {
                base,
                chord: chord_type,
                timing,
            } => arpeggio(renderer, *base, *chord_type, *timing, adsr, &profile)?,
            Part::Melody {
                frequencies,
                step,
                duration,
            } => {
                if !(step.is_finite() && *step > 0.0) {
                    return Err(SynthError::InvalidTiming(format!(
                        "melody step must be positive, got {}",
                        step
                    )));
                }
                let params = adsr.with_duration(*duration);
                let events = frequencies
                    .iter()
                    .enumerate()
                    .map(|(i, &f)| {
                        renderer
                            .render_note(f, &params, &profile)
                            .map(|buffer| TimedEvent::new(*step * i as f64, buffer))
                    })
                    .collect::<Result<Vec<_>>>()?;
                mix(&events, renderer.sample_rate())
            }
        };

        if cue.gain == 1.0 {
            Ok(track)
        } else {
            Ok(track.scaled(cue.gain))
        }
    }

    fn render_section(&self, section: &Section) -> Result<Track> {
        if section.repeat == 0 {
            return Err(SynthError::InvalidTiming(format!(
                "section '{}' repeats zero times",
                section.name
            )));
        }
        if !(section.period.is_finite() && section.period >= 0.0) {
            return Err(SynthError::InvalidTiming(format!(
                "section '{}' has repeat period {}",
                section.name, section.period
            )));
        }

        let mut events = Vec::with_capacity(section.cues.len() * section.repeat);
        for cue in &section.cues {
            if !(cue.offset.is_finite() && cue.offset >= 0.0) {
                return Err(SynthError::InvalidTiming(format!(
                    "{} cue in section '{}' has offset {}",
                    cue.part.kind(),
                    section.name,
                    cue.offset
                )));
            }
            let track = self.render_cue(cue)?;
            for r in 0..section.repeat {
                events.push(TimedEvent::new(
                    cue.offset + section.period * r as f64,
                    track.clone(),
                ));
            }
        }

        let track = mix(&events, self.renderer.sample_rate());
        debug!(
            section = %section.name,
            cues = section.cues.len(),
            seconds = track.duration(self.renderer.sample_rate()),
            "rendered section"
        );
        Ok(track)
    }
}

impl Composition {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Render every section, combine them and normalize
    pub fn render(&self, config: &RenderConfig) -> Result<Track> {
        render_composition(self, config)
    }
}

/// Render an audio buffer for a composition
///
/// Each section's cues are mixed into a track, the tracks are combined,
/// and the result is scaled so its peak equals `config.target_peak`
/// (silence stays silent).
pub fn render_composition(composition: &Composition, config: &RenderConfig) -> Result<Track> {
    config.validate()?;
    let ctx = RenderContext {
        renderer: config.renderer(),
        table: config.timbre_table()?,
        config,
    };

    let tracks = composition
        .sections
        .iter()
        .map(|section| ctx.render_section(section))
        .collect::<Result<Vec<_>>>()?;

    let track = normalize(&combine(&tracks), config.target_peak);
    info!(
        sections = tracks.len(),
        samples = track.len(),
        seconds = track.duration(config.sample_rate),
        "rendered composition"
    );
    Ok(track)
}
