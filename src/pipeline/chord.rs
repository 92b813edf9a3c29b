//! Chord and arpeggio generators
//!
//! Both derive a list of [`TimedEvent`]s from a base frequency and a chord
//! type, then hand the list to the mixer.

use std::str::FromStr;

use rayon::prelude::*;
use tracing::debug;

use super::mixer::{mix, TimedEvent};
use crate::buffer::Track;
use crate::error::{Result, SynthError};
use crate::generator::{Adsr, HarmonicProfile, NoteRenderer};

/// Frequency ratio of one equal-tempered semitone
pub const SEMITONE: f64 = 1.059_463_094_359_295_3;

/// Slack applied before flooring the arpeggio note count
const COUNT_TOLERANCE: f64 = 1e-9;

/// Chord types as semitone offsets from the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordType {
    Major,
    Minor,
    /// Major triad with a minor seventh
    Dominant7,
    Minor7,
    Major7,
    Diminished,
    Sus4,
    Sus2,
}

impl ChordType {
    pub const ALL: [ChordType; 8] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Dominant7,
        ChordType::Minor7,
        ChordType::Major7,
        ChordType::Diminished,
        ChordType::Sus4,
        ChordType::Sus2,
    ];

    pub fn semitones(&self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Sus4 => &[0, 5, 7],
            ChordType::Sus2 => &[0, 2, 7],
        }
    }

    /// Frequency ratios relative to the root, `SEMITONE^s` per interval
    pub fn ratios(&self) -> Vec<f64> {
        self.semitones()
            .iter()
            .map(|&s| SEMITONE.powi(s as i32))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChordType::Major => "maj",
            ChordType::Minor => "min",
            ChordType::Dominant7 => "7",
            ChordType::Minor7 => "m7",
            ChordType::Major7 => "maj7",
            ChordType::Diminished => "dim",
            ChordType::Sus4 => "sus4",
            ChordType::Sus2 => "sus2",
        }
    }
}

impl FromStr for ChordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maj" | "major" => Ok(ChordType::Major),
            "min" | "minor" | "m" => Ok(ChordType::Minor),
            "7" | "dom7" => Ok(ChordType::Dominant7),
            "m7" | "min7" => Ok(ChordType::Minor7),
            "maj7" => Ok(ChordType::Major7),
            "dim" => Ok(ChordType::Diminished),
            "sus4" => Ok(ChordType::Sus4),
            "sus2" => Ok(ChordType::Sus2),
            _ => Err(format!("unknown chord type '{}'", s)),
        }
    }
}

/// Timing of a chord whose voices enter one after another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordTiming {
    /// Seconds between successive voice entries
    pub delay: f64,
    /// Duration of the first voice; later voices end at the same time
    pub duration: f64,
}

impl Default for ChordTiming {
    fn default() -> Self {
        Self {
            delay: 0.3,
            duration: 1.0,
        }
    }
}

/// Timing of an arpeggio cycling through the chord's intervals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArpeggioTiming {
    /// Seconds between note starts
    pub delay: f64,
    /// Span filled with notes; the note count is `floor(total / delay)`
    pub total: f64,
    /// Duration of every note, release excluded
    pub note_duration: f64,
}

impl Default for ArpeggioTiming {
    fn default() -> Self {
        Self {
            delay: 0.3,
            total: 1.0,
            note_duration: 0.26,
        }
    }
}

/// Envelope shape chord voices use unless told otherwise
pub fn default_chord_adsr() -> Adsr {
    Adsr::default().with_release(0.6)
}

/// Envelope shape arpeggio notes use unless told otherwise
pub fn default_arpeggio_adsr() -> Adsr {
    Adsr::default().with_release(0.1)
}

/// Build the voices of a chord
///
/// Voice `j` sounds `base * ratio_j`, enters at `delay * j` and lasts
/// `duration - delay * j`, so all voices end together.
///
/// # Errors
/// [`SynthError::InvalidTiming`] for a negative delay or a voice whose
/// duration would be zero or negative; envelope errors from the voices.
pub fn chord_events(
    renderer: &NoteRenderer,
    base: f64,
    chord: ChordType,
    timing: ChordTiming,
    adsr: Adsr,
    profile: &HarmonicProfile,
) -> Result<Vec<TimedEvent>> {
    let ChordTiming { delay, duration } = timing;
    if !delay.is_finite() || delay < 0.0 {
        return Err(SynthError::InvalidTiming(format!(
            "chord delay must be non-negative, got {}",
            delay
        )));
    }

    let voices: Vec<(f64, f64, f64)> = chord
        .ratios()
        .into_iter()
        .enumerate()
        .map(|(j, ratio)| {
            let offset = delay * j as f64;
            let voice_duration = duration - offset;
            if !(voice_duration > 0.0) {
                return Err(SynthError::InvalidTiming(format!(
                    "{} chord voice {} would last {}s (duration {}s, delay {}s)",
                    chord.name(),
                    j,
                    voice_duration,
                    duration,
                    delay
                )));
            }
            Ok((offset, base * ratio, voice_duration))
        })
        .collect::<Result<_>>()?;

    let render = |&(offset, frequency, voice_duration): &(f64, f64, f64)| {
        renderer
            .render_note(frequency, &adsr.with_duration(voice_duration), profile)
            .map(|buffer| TimedEvent::new(offset, buffer))
    };

    let events = if renderer.is_parallel() {
        voices.par_iter().map(render).collect::<Result<Vec<_>>>()?
    } else {
        voices.iter().map(render).collect::<Result<Vec<_>>>()?
    };

    debug!(base, chord = chord.name(), voices = events.len(), "built chord");
    Ok(events)
}

/// Render a chord into a track
pub fn chord(
    renderer: &NoteRenderer,
    base: f64,
    chord: ChordType,
    timing: ChordTiming,
    adsr: Adsr,
    profile: &HarmonicProfile,
) -> Result<Track> {
    let events = chord_events(renderer, base, chord, timing, adsr, profile)?;
    Ok(mix(&events, renderer.sample_rate()))
}

/// Number of notes an arpeggio plays
pub fn arpeggio_note_count(timing: &ArpeggioTiming) -> usize {
    (timing.total / timing.delay + COUNT_TOLERANCE).floor().max(0.0) as usize
}

/// Build the notes of an arpeggio
///
/// Note `i` starts at `delay * i` and plays interval `i mod n`, wrapping
/// around the chord. Every note has the same duration.
///
/// # Errors
/// [`SynthError::InvalidTiming`] unless `delay > 0`; envelope errors from
/// the notes.
pub fn arpeggio_events(
    renderer: &NoteRenderer,
    base: f64,
    chord: ChordType,
    timing: ArpeggioTiming,
    adsr: Adsr,
    profile: &HarmonicProfile,
) -> Result<Vec<TimedEvent>> {
    if !timing.delay.is_finite() || timing.delay <= 0.0 {
        return Err(SynthError::InvalidTiming(format!(
            "arpeggio delay must be positive, got {}",
            timing.delay
        )));
    }
    if !timing.total.is_finite() || timing.total < 0.0 {
        return Err(SynthError::InvalidTiming(format!(
            "arpeggio total duration must be non-negative, got {}",
            timing.total
        )));
    }

    let ratios = chord.ratios();
    let params = adsr.with_duration(timing.note_duration);

    // One buffer per distinct interval; repeats reuse it
    let buffers = ratios
        .iter()
        .map(|ratio| renderer.render_note(base * ratio, &params, profile))
        .collect::<Result<Vec<_>>>()?;

    let count = arpeggio_note_count(&timing);
    let events: Vec<TimedEvent> = (0..count)
        .map(|i| TimedEvent::new(timing.delay * i as f64, buffers[i % buffers.len()].clone()))
        .collect();

    debug!(base, chord = chord.name(), notes = count, "built arpeggio");
    Ok(events)
}

/// Render an arpeggio into a track
pub fn arpeggio(
    renderer: &NoteRenderer,
    base: f64,
    chord: ChordType,
    timing: ArpeggioTiming,
    adsr: Adsr,
    profile: &HarmonicProfile,
) -> Result<Track> {
    let events = arpeggio_events(renderer, base, chord, timing, adsr, profile)?;
    Ok(mix(&events, renderer.sample_rate()))
}
