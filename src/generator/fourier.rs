use super::timbre::HarmonicProfile;

/// Additive synthesizer over a harmonic profile
///
/// value(x) = Σ c_i * sin((i + 1) * x), with x the fundamental's phase in
/// radians. Stateless: the same phase always yields the same amplitude.
#[derive(Debug, Clone, Copy)]
pub struct FourierSeries<'a> {
    profile: &'a HarmonicProfile,
}

impl<'a> FourierSeries<'a> {
    pub fn new(profile: &'a HarmonicProfile) -> Self {
        Self { profile }
    }

    /// Amplitude at the given phase
    pub fn value(&self, phase: f64) -> f64 {
        self.profile
            .weights()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0.0)
            .map(|(i, &c)| c * (phase * (i + 1) as f64).sin())
            .sum()
    }

    /// Sum of absolute weights, an upper bound on |value|
    pub fn peak_bound(&self) -> f64 {
        self.profile.weights().iter().map(|c| c.abs()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::timbre::Instrument;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_sine_profile_is_plain_sine() {
        let profile = Instrument::Sine.profile();
        let series = FourierSeries::new(&profile);
        for k in 0..32 {
            let x = k as f64 * 0.37;
            assert!((series.value(x) - x.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_periodic_in_tau() {
        for instrument in Instrument::ALL {
            let profile = instrument.profile();
            let series = FourierSeries::new(&profile);
            for k in 0..20 {
                let x = k as f64 * 0.41 - 3.0;
                let diff = (series.value(x) - series.value(x + TAU)).abs();
                assert!(diff < 1e-9, "{} not periodic at {}: {}", instrument.name(), x, diff);
            }
        }
    }

    #[test]
    fn test_harmonic_weights_apply_to_multiples() {
        // Only the second harmonic: sin(2x)
        let profile = HarmonicProfile::new(vec![0.0, 2.0]).unwrap();
        let series = FourierSeries::new(&profile);
        assert!((series.value(PI / 4.0) - 2.0).abs() < 1e-12);
        assert!(series.value(PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_bound_holds() {
        let profile = Instrument::Oboe.profile();
        let series = FourierSeries::new(&profile);
        let bound = series.peak_bound();
        for k in 0..1000 {
            let x = k as f64 * TAU / 1000.0;
            assert!(series.value(x).abs() <= bound + 1e-12);
        }
    }
}
