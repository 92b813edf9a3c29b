//! Parser for the composition text format
//!
//! Format:
//! ```text
//! track <name>                          # start a new section
//! repeat <count> every=<seconds>        # repeat the current section
//! <offset>| <part> <args> key=value...  # cue at <offset> seconds
//! ```
//!
//! Parts:
//! - `note <pitch> [duration=]`
//! - `rest [duration=]`
//! - `chord <pitch> <type> [delay=] [duration=]`
//! - `arpeggio <pitch> <type> [delay=] [total=] [note=]`
//! - `melody <pitch>... [step=] [duration=]`
//!
//! Every cue also accepts `gain=`, `instrument=`, `octave=`, `attack=`,
//! `decay=`, `sustain=` and `release=`. Pitches are `<symbol>[octave]`
//! (see [`crate::pitch`]).

use std::collections::BTreeMap;
use std::str::FromStr;

use super::chord::{ArpeggioTiming, ChordTiming, ChordType};
use super::composition::{Composition, Cue, EnvelopeOverrides, Part, Section};
use crate::pitch::{Pitch, REFERENCE_OCTAVE};

/// Default note duration in seconds, release excluded
const NOTE_DURATION: f64 = 0.26;

/// Parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    InvalidLine(String),
    InvalidOffset(String),
    InvalidPart(String),
    InvalidPitch(String),
    InvalidOctave(String),
    InvalidChord(String),
    InvalidValue(String),
    UnknownKey(String),
    MissingArgument(String),
    /// Error with the 1-based line number it occurred on
    AtLine(usize, Box<ParseError>),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidLine(s) => write!(f, "Invalid line: {}", s),
            ParseError::InvalidOffset(s) => write!(f, "Invalid offset: {}", s),
            ParseError::InvalidPart(s) => write!(f, "Invalid part: {}", s),
            ParseError::InvalidPitch(s) => write!(f, "Invalid pitch: {}", s),
            ParseError::InvalidOctave(s) => write!(f, "Invalid octave: {}", s),
            ParseError::InvalidChord(s) => write!(f, "Invalid chord type: {}", s),
            ParseError::InvalidValue(s) => write!(f, "Invalid value: {}", s),
            ParseError::UnknownKey(s) => write!(f, "Unknown key: {}", s),
            ParseError::MissingArgument(s) => write!(f, "Missing argument: {}", s),
            ParseError::AtLine(n, e) => write!(f, "line {}: {}", n, e),
        }
    }
}

impl std::error::Error for ParseError {}

/// Positional arguments and `key=value` pairs of one line
struct Fields<'a> {
    positional: Vec<&'a str>,
    keys: BTreeMap<&'a str, &'a str>,
}

impl<'a> Fields<'a> {
    fn split(s: &'a str) -> Result<Self, ParseError> {
        let mut positional = Vec::new();
        let mut keys = BTreeMap::new();
        for token in s.split_whitespace() {
            match token.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                    if keys.insert(key, value).is_some() {
                        return Err(ParseError::InvalidValue(format!("{} given twice", key)));
                    }
                }
                Some(_) => return Err(ParseError::InvalidValue(token.to_string())),
                None => positional.push(token),
            }
        }
        Ok(Self { positional, keys })
    }

    fn take_str(&mut self, key: &str) -> Option<&'a str> {
        self.keys.remove(key)
    }

    fn take_f64(&mut self, key: &str) -> Result<Option<f64>, ParseError> {
        self.take_str(key)
            .map(|v| parse_number(key, v))
            .transpose()
    }

    fn f64_or(&mut self, key: &str, default: f64) -> Result<f64, ParseError> {
        Ok(self.take_f64(key)?.unwrap_or(default))
    }

    /// Fail on any key nobody consumed
    fn finish(self) -> Result<(), ParseError> {
        match self.keys.keys().next() {
            Some(key) => Err(ParseError::UnknownKey(key.to_string())),
            None => Ok(()),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidValue(format!("{}={}", key, value)))
}

fn pitch_arg(fields: &Fields, index: usize, octave: i32, what: &str) -> Result<f64, ParseError> {
    let token = fields
        .positional
        .get(index)
        .ok_or_else(|| ParseError::MissingArgument(what.to_string()))?;
    Ok(Pitch::parse_with_octave(token, octave)?.frequency())
}

fn chord_arg(fields: &Fields, index: usize) -> Result<ChordType, ParseError> {
    let token = fields
        .positional
        .get(index)
        .ok_or_else(|| ParseError::MissingArgument("chord type".to_string()))?;
    ChordType::from_str(token).map_err(ParseError::InvalidChord)
}

fn expect_positional(fields: &Fields, count: usize, kind: &str) -> Result<(), ParseError> {
    if fields.positional.len() > count {
        return Err(ParseError::InvalidPart(format!(
            "{} takes {} argument(s), got '{}'",
            kind,
            count,
            fields.positional.join(" ")
        )));
    }
    Ok(())
}

/// Parse the part and its options following the `|`
fn parse_cue(offset: f64, body: &str) -> Result<Cue, ParseError> {
    let (kind, args) = body
        .trim()
        .split_once(char::is_whitespace)
        .unwrap_or((body.trim(), ""));
    let mut fields = Fields::split(args)?;

    let octave = match fields.take_str("octave") {
        Some(v) => v
            .parse::<i32>()
            .ok()
            .filter(|o| (0..=9).contains(o))
            .ok_or_else(|| ParseError::InvalidOctave(v.to_string()))?,
        None => REFERENCE_OCTAVE,
    };

    let part = match kind {
        "note" => {
            expect_positional(&fields, 1, kind)?;
            Part::Note {
                frequency: pitch_arg(&fields, 0, octave, "pitch")?,
                duration: fields.f64_or("duration", NOTE_DURATION)?,
            }
        }
        "rest" => {
            expect_positional(&fields, 0, kind)?;
            Part::Rest {
                duration: fields.f64_or("duration", NOTE_DURATION)?,
            }
        }
        "chord" => {
            expect_positional(&fields, 2, kind)?;
            let defaults = ChordTiming::default();
            Part::Chord {
                base: pitch_arg(&fields, 0, octave, "pitch")?,
                chord: chord_arg(&fields, 1)?,
                timing: ChordTiming {
                    delay: fields.f64_or("delay", defaults.delay)?,
                    duration: fields.f64_or("duration", defaults.duration)?,
                },
            }
        }
        "arpeggio" => {
            expect_positional(&fields, 2, kind)?;
            let defaults = ArpeggioTiming::default();
            Part::Arpeggio {
                base: pitch_arg(&fields, 0, octave, "pitch")?,
                chord: chord_arg(&fields, 1)?,
                timing: ArpeggioTiming {
                    delay: fields.f64_or("delay", defaults.delay)?,
                    total: fields.f64_or("total", defaults.total)?,
                    note_duration: fields.f64_or("note", defaults.note_duration)?,
                },
            }
        }
        "melody" => {
            if fields.positional.is_empty() {
                return Err(ParseError::MissingArgument("melody pitches".to_string()));
            }
            let frequencies = fields
                .positional
                .iter()
                .map(|t| Pitch::parse_with_octave(t, octave).map(|p| p.frequency()))
                .collect::<Result<Vec<_>, _>>()?;
            let duration = fields.f64_or("duration", NOTE_DURATION)?;
            Part::Melody {
                frequencies,
                step: fields.f64_or("step", duration)?,
                duration,
            }
        }
        _ => return Err(ParseError::InvalidPart(kind.to_string())),
    };

    let gain = fields.f64_or("gain", 1.0)?;
    let instrument = fields.take_str("instrument").map(str::to_string);
    let envelope = EnvelopeOverrides {
        attack: fields.take_f64("attack")?,
        decay: fields.take_f64("decay")?,
        sustain_level: fields.take_f64("sustain")?,
        release: fields.take_f64("release")?,
    };
    fields.finish()?;

    Ok(Cue {
        offset,
        gain,
        instrument,
        envelope,
        part,
    })
}

/// What a single line contributes to the composition
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Blank,
    Track(String),
    Repeat { count: usize, period: f64 },
    Cue(Cue),
}

/// Parse one line of the composition format
pub fn parse_line(line: &str) -> Result<Line, ParseError> {
    let line = line.split('#').next().unwrap_or(line).trim();

    if line.is_empty() {
        return Ok(Line::Blank);
    }

    if let Some(name) = line.strip_prefix("track ") {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ParseError::InvalidLine(line.to_string()));
        }
        return Ok(Line::Track(name.to_string()));
    }

    if let Some(rest) = line.strip_prefix("repeat ") {
        let mut fields = Fields::split(rest)?;
        let count = match fields.positional.as_slice() {
            [n] => n
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| ParseError::InvalidValue(format!("repeat count {}", n)))?,
            _ => return Err(ParseError::MissingArgument("repeat count".to_string())),
        };
        let period = fields
            .take_f64("every")?
            .ok_or_else(|| ParseError::MissingArgument("every=<seconds>".to_string()))?;
        fields.finish()?;
        return Ok(Line::Repeat { count, period });
    }

    let (offset_part, body) = line.split_once('|').ok_or_else(|| {
        ParseError::InvalidLine("expected format: <offset>| <part> ...".to_string())
    })?;
    let offset_str = offset_part.trim();
    let offset = offset_str
        .parse::<f64>()
        .ok()
        .filter(|o| o.is_finite() && *o >= 0.0)
        .ok_or_else(|| ParseError::InvalidOffset(offset_str.to_string()))?;

    Ok(Line::Cue(parse_cue(offset, body)?))
}

/// Parse a full composition
///
/// Cues before the first `track` line belong to a section named `main`.
/// Sections without cues are dropped.
pub fn parse_composition(text: &str) -> Result<Composition, ParseError> {
    let mut sections = Vec::new();
    let mut current = Section::new("main");

    for (n, line) in text.lines().enumerate() {
        let parsed = parse_line(line).map_err(|e| ParseError::AtLine(n + 1, Box::new(e)))?;
        match parsed {
            Line::Blank => {}
            Line::Track(name) => {
                let finished = std::mem::replace(&mut current, Section::new(&name));
                if !finished.cues.is_empty() {
                    sections.push(finished);
                }
            }
            Line::Repeat { count, period } => {
                current.repeat = count;
                current.period = period;
            }
            Line::Cue(cue) => current.cues.push(cue),
        }
    }

    if !current.cues.is_empty() {
        sections.push(current);
    }

    Ok(Composition::new(sections))
}

impl FromStr for Composition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_composition(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(line: &str) -> Cue {
        match parse_line(line).unwrap() {
            Line::Cue(cue) => cue,
            other => panic!("expected cue, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_note() {
        let c = cue("0.5| note a duration=0.4");
        assert_eq!(c.offset, 0.5);
        assert_eq!(
            c.part,
            Part::Note {
                frequency: 440.0,
                duration: 0.4
            }
        );
        assert_eq!(c.gain, 1.0);
    }

    #[test]
    fn test_parse_chord_with_options() {
        let c = cue("1.2| chord g maj delay=0.2 duration=1.2 gain=0.5 instrument=piano");
        assert_eq!(c.gain, 0.5);
        assert_eq!(c.instrument.as_deref(), Some("piano"));
        assert_eq!(
            c.part,
            Part::Chord {
                base: 392.0,
                chord: ChordType::Major,
                timing: ChordTiming {
                    delay: 0.2,
                    duration: 1.2
                },
            }
        );
    }

    #[test]
    fn test_parse_arpeggio_defaults() {
        let c = cue("0| arpeggio F min");
        assert_eq!(
            c.part,
            Part::Arpeggio {
                base: 370.0,
                chord: ChordType::Minor,
                timing: ArpeggioTiming::default(),
            }
        );
    }

    #[test]
    fn test_parse_melody_with_octave() {
        let c = cue("2| melody c e g - c6 octave=5 step=0.3");
        match c.part {
            Part::Melody {
                frequencies,
                step,
                duration,
            } => {
                assert_eq!(frequencies, vec![524.0, 660.0, 784.0, 0.0, 1048.0]);
                assert_eq!(step, 0.3);
                assert_eq!(duration, NOTE_DURATION);
            }
            other => panic!("expected melody, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_envelope_overrides() {
        let c = cue("0| note c attack=0.01 sustain=0.5");
        assert_eq!(c.envelope.attack, Some(0.01));
        assert_eq!(c.envelope.sustain_level, Some(0.5));
        assert_eq!(c.envelope.release, None);
    }

    #[test]
    fn test_parse_directives() {
        assert_eq!(
            parse_line("track bass").unwrap(),
            Line::Track("bass".to_string())
        );
        assert_eq!(
            parse_line("repeat 4 every=19.2  # four times").unwrap(),
            Line::Repeat {
                count: 4,
                period: 19.2
            }
        );
        assert_eq!(parse_line("   # comment").unwrap(), Line::Blank);
    }

    #[test]
    fn test_parse_composition_sections() {
        let text = r#"
# intro
0| chord g maj
0.3| arpeggio g maj total=1.2

track lead
repeat 2 every=2.4
0| melody a b C5
track empty
"#;
        let composition = parse_composition(text).unwrap();
        assert_eq!(composition.sections.len(), 2);
        assert_eq!(composition.sections[0].name, "main");
        assert_eq!(composition.sections[0].cues.len(), 2);
        assert_eq!(composition.sections[1].name, "lead");
        assert_eq!(composition.sections[1].repeat, 2);
        assert_eq!(composition.sections[1].period, 2.4);
    }

    #[test]
    fn test_invalid_lines() {
        assert!(matches!(
            parse_line("note a"),
            Err(ParseError::InvalidLine(_))
        ));
        assert!(matches!(
            parse_line("-1| note a"),
            Err(ParseError::InvalidOffset(_))
        ));
        assert!(matches!(
            parse_line("0| trill a"),
            Err(ParseError::InvalidPart(_))
        ));
        assert!(matches!(
            parse_line("0| note h"),
            Err(ParseError::InvalidPitch(_))
        ));
        assert!(matches!(
            parse_line("0| chord a aug"),
            Err(ParseError::InvalidChord(_))
        ));
        assert!(matches!(
            parse_line("0| chord a"),
            Err(ParseError::MissingArgument(_))
        ));
        assert!(matches!(
            parse_line("0| note a colour=red"),
            Err(ParseError::UnknownKey(_))
        ));
        assert!(matches!(
            parse_line("0| note a duration=fast"),
            Err(ParseError::InvalidValue(_))
        ));
        assert!(matches!(
            parse_line("repeat 0 every=1"),
            Err(ParseError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_error_reports_line_number() {
        let err = parse_composition("0| note a\n\n0| note q\n").unwrap_err();
        assert!(matches!(err, ParseError::AtLine(3, _)));
        assert!(err.to_string().starts_with("line 3:"));
    }
}
