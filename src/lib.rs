//! Additive (Fourier-series) synthesis of notes, chords and arpeggios
//!
//! Notes are rendered as an ADSR envelope times a sum of weighted
//! harmonics, placed on timelines by the mixer, and combined into one
//! normalized track. [`render_composition`] is the entry point; the `wav`,
//! `spectrum` and `pitch` modules are thin helpers around it.

pub mod buffer;
pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod pitch;
pub mod spectrum;
pub mod wav;

pub use buffer::{SampleBuffer, Track};
pub use config::RenderConfig;
pub use error::{Result, SynthError};
pub use pipeline::composition::render_composition;
