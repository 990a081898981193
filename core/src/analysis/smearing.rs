use crate::waveform::WaveformSample;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

/// Optional perturbations for robustness studies.
///
/// Voltage noise goes in before analysis; delay jitter goes in after, because
/// the analyzer removes jitter by estimating each acquisition's delay.
pub struct Smearer {
    rng: StdRng,
}

impl Smearer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Adds Gaussian noise of the given sigma (mV) to every trace point.
    pub fn smear_voltage(&mut self, sample: &mut WaveformSample, sigma_mv: f64) {
        if sigma_mv <= 0.0 {
            return;
        }
        for v in &mut sample.trace.volt {
            *v += sigma_mv * self.gauss();
        }
    }

    /// Shifts the analyzed raw delay by a Gaussian jitter of the given sigma
    /// (ns). No-op until the sample carries features.
    pub fn smear_delay(&mut self, sample: &mut WaveformSample, sigma_ns: f64) {
        if sigma_ns <= 0.0 {
            return;
        }
        if let Some(features) = sample.features.as_mut() {
            features.delay += sigma_ns * self.gauss();
        }
    }

    fn gauss(&mut self) -> f64 {
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{Polarity, PulseFeatures, Trace};

    fn sample() -> WaveformSample {
        let trace = Trace::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0; 4]).unwrap();
        WaveformSample::new(0, trace, 100.0, 293.0, Polarity::Positive)
    }

    #[test]
    fn voltage_smearing_is_deterministic_per_seed() {
        let mut a = sample();
        let mut b = sample();
        Smearer::new(42).smear_voltage(&mut a, 3.0);
        Smearer::new(42).smear_voltage(&mut b, 3.0);
        assert_eq!(a.trace.volt, b.trace.volt);
        assert!(a.trace.volt.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn zero_sigma_leaves_trace_unchanged() {
        let mut s = sample();
        Smearer::new(1).smear_voltage(&mut s, 0.0);
        assert_eq!(s.trace.volt, vec![0.0; 4]);
    }

    #[test]
    fn delay_jitter_requires_features() {
        let mut s = sample();
        Smearer::new(7).smear_delay(&mut s, 1.0);
        assert!(s.features.is_none());

        s.features = Some(PulseFeatures {
            offset: 0.0,
            noise: 1.0,
            delay: 20.0,
            delay_filtered: 20.0,
            amplitude: 10.0,
            rise_time: 1.0,
            width: 4.0,
            s2n: 10.0,
        });
        Smearer::new(7).smear_delay(&mut s, 1.0);
        let delay = s.features.unwrap().delay;
        assert!(delay != 20.0);
        // the filtered estimate stays put, only the raw alignment is jittered
        assert_eq!(s.features.unwrap().delay_filtered, 20.0);
    }
}
