pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Mean and RMS deviation of the first `window` samples.
    ///
    /// The pair is the baseline offset and noise estimate of a pre-trigger
    /// window. `window` is clamped to the slice length.
    pub fn baseline(samples: &[f64], window: usize) -> (f64, f64) {
        let n = window.min(samples.len());
        if n == 0 {
            return (0.0, 0.0);
        }
        let head = &samples[..n];
        let mean = Self::mean(head);
        let deviations: Vec<f64> = head.iter().map(|&v| v - mean).collect();
        (mean, Self::rms(&deviations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        assert_eq!(StatsHelper::rms(&[4.0]), 4.0);
    }

    #[test]
    fn baseline_returns_offset_and_noise() {
        let samples = [1.0, 3.0, 1.0, 3.0, 100.0];
        let (offset, noise) = StatsHelper::baseline(&samples, 4);
        assert_eq!(offset, 2.0);
        assert_eq!(noise, 1.0);
    }

    #[test]
    fn baseline_of_flat_trace_has_zero_noise() {
        let samples = [2.5; 16];
        let (offset, noise) = StatsHelper::baseline(&samples, 8);
        assert_eq!(offset, 2.5);
        assert_eq!(noise, 0.0);
    }
}
