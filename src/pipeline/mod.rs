//! Rendering pipeline
//!
//! Turns notes into tracks and tracks into a finished signal:
//! - Mixer: place timed buffers on a timeline, combine tracks, normalize
//! - Chord: chord and arpeggio generators
//! - Composition: sections of cues and the render entry point
//! - Parser: composition text format

pub mod chord;
pub mod composition;
pub mod mixer;
pub mod parser;

pub use chord::{arpeggio, chord, ArpeggioTiming, ChordTiming, ChordType};
pub use composition::{render_composition, Composition, Cue, Part, Section};
pub use mixer::{combine, mix, normalize, TimedEvent};
pub use parser::{parse_composition, ParseError};
