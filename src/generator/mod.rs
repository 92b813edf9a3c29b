//! Per-note signal generation
//!
//! - timbre: harmonic weights per instrument
//! - envelope: ADSR gain as a function of time
//! - fourier: additive waveform as a function of phase
//! - note: envelope × waveform sampled onto a buffer

pub mod envelope;
pub mod fourier;
pub mod note;
pub mod timbre;

pub use envelope::{Adsr, Envelope, EnvelopeParams, EnvelopePhase};
pub use fourier::FourierSeries;
pub use note::NoteRenderer;
pub use timbre::{HarmonicProfile, Instrument, TimbreTable};
