//! Timeline mixing
//!
//! Places rendered buffers on a shared timeline and sums them. Overlaps add
//! without clipping or gain compensation; the final peak is fixed up once
//! by [`normalize`].

use tracing::debug;

use crate::buffer::{SampleBuffer, Track};

/// A buffer placed `offset` seconds into a timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub offset: f64,
    pub buffer: SampleBuffer,
}

impl TimedEvent {
    pub fn new(offset: f64, buffer: SampleBuffer) -> Self {
        Self { offset, buffer }
    }

    /// First sample index on a timeline at `sample_rate`
    ///
    /// Negative when the event starts before time 0.
    pub fn start_sample(&self, sample_rate: u32) -> i64 {
        (self.offset * sample_rate as f64).round() as i64
    }

    /// Exclusive end position in samples, before rounding
    fn end_position(&self, sample_rate: u32) -> f64 {
        self.offset * sample_rate as f64 + self.buffer.len() as f64
    }
}

/// Sum timed events into one track
///
/// The track is `ceil(max(offset * R + len))` samples long (empty for no
/// events). Each event is added starting at `round(offset * R)`; samples
/// that would land before time 0 are dropped. The result does not depend
/// on the order of `events`.
pub fn mix(events: &[TimedEvent], sample_rate: u32) -> Track {
    let len = events
        .iter()
        .map(|e| e.end_position(sample_rate).ceil().max(0.0) as usize)
        .max()
        .unwrap_or(0);

    let mut acc = vec![0.0f64; len];
    for event in events {
        let start = event.start_sample(sample_rate);
        let skip = start.min(0).unsigned_abs() as usize;
        let start = start.max(0) as usize;
        if let Some(dest) = acc.get_mut(start..) {
            for (d, s) in dest.iter_mut().zip(event.buffer.iter().skip(skip)) {
                *d += s;
            }
        }
    }

    debug!(events = events.len(), samples = len, "mixed events");
    SampleBuffer::new(acc)
}

/// Sum tracks of differing lengths, zero-padding the shorter ones
pub fn combine(tracks: &[Track]) -> Track {
    let len = tracks.iter().map(|t| t.len()).max().unwrap_or(0);

    let mut acc = vec![0.0f64; len];
    for track in tracks {
        for (d, s) in acc.iter_mut().zip(track.iter()) {
            *d += s;
        }
    }

    SampleBuffer::new(acc)
}

/// Scale a track so its largest absolute sample equals `target_peak`
///
/// A silent track is returned unchanged.
pub fn normalize(track: &Track, target_peak: f64) -> Track {
    let peak = track.peak();
    if peak == 0.0 {
        return track.clone();
    }
    track.scaled(target_peak / peak)
}
