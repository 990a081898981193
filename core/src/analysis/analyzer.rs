use crate::aggregate::AverageAggregate;
use crate::math::filter::FilterHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::AnalysisConfig;
use crate::telemetry::log::LogManager;
use crate::waveform::{PulseFeatures, WaveformSample};

/// Per-acquisition signal estimation: baseline offset and noise, pulse delay
/// (raw and smoothed), amplitude, rise time, width.
pub struct SignalAnalyzer {
    baseline_samples: usize,
    threshold_sigma: f64,
    smoothing_window: usize,
    logger: LogManager,
}

impl SignalAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            baseline_samples: config.baseline_samples,
            threshold_sigma: config.threshold_sigma,
            smoothing_window: config.smoothing_window,
            logger: LogManager::new(),
        }
    }

    /// Runs the fixed analysis sequence on one acquisition and returns its
    /// feature set. Side effects are confined to the aggregate's diagnostic
    /// series; the sample itself is untouched.
    pub fn analyze(
        &self,
        sample: &WaveformSample,
        index: u32,
        aggregate: &mut AverageAggregate,
    ) -> PulseFeatures {
        let trace = &sample.trace;

        // 1. baseline offset and noise from the pre-trigger window
        let (offset, noise) = StatsHelper::baseline(&trace.volt, self.baseline_samples);
        aggregate.push_noise(index, noise);

        // 2. diagnostic overlay of the raw trace
        for (t, v) in trace.time.iter().zip(&trace.volt) {
            aggregate.record_raw(*t, *v);
        }

        // 3. signal finder on the corrected trace and on a smoothed copy
        let sign = sample.polarity.sign();
        let corrected: Vec<f64> = trace.volt.iter().map(|v| sign * (v - offset)).collect();
        let amplitude = corrected.iter().cloned().fold(0.0, f64::max);

        let delay = self.crossing_time(&trace.time, &corrected, noise, amplitude);

        let smoothed = FilterHelper::moving_average(&corrected, self.smoothing_window);
        let smoothed_amplitude = smoothed.iter().cloned().fold(0.0, f64::max);
        let delay_filtered = self.crossing_time(&trace.time, &smoothed, noise, smoothed_amplitude);

        let (rise_time, width) = Self::pulse_shape(&trace.time, &corrected, amplitude);
        let s2n = amplitude / noise.max(f64::EPSILON);
        aggregate.push_s2n(index, s2n);

        if amplitude <= 0.0 {
            self.logger
                .record_warning(&format!("acquisition {} has no positive signal", index));
        }

        // 4. feature emission, independent of later selection
        let features = PulseFeatures {
            offset,
            noise,
            delay,
            delay_filtered,
            amplitude,
            rise_time,
            width,
            s2n,
        };
        aggregate.push_features(&features);
        features
    }

    /// First time the corrected trace reaches the detection threshold.
    ///
    /// The threshold is `threshold_sigma * noise`, clamped to half the pulse
    /// amplitude when the baseline is quiet or the pulse is small. Falls back
    /// to the end of the trace when nothing crosses.
    fn crossing_time(&self, time: &[f64], corrected: &[f64], noise: f64, amplitude: f64) -> f64 {
        let mut threshold = self.threshold_sigma * noise;
        if threshold <= 0.0 || threshold >= amplitude {
            threshold = 0.5 * amplitude;
        }
        if threshold > 0.0 {
            for (t, v) in time.iter().zip(corrected) {
                if *v >= threshold {
                    return *t;
                }
            }
        }
        time.last().copied().unwrap_or(0.0)
    }

    /// (10-90% rise time, full width at half maximum).
    fn pulse_shape(time: &[f64], corrected: &[f64], amplitude: f64) -> (f64, f64) {
        if amplitude <= 0.0 || corrected.is_empty() {
            return (0.0, 0.0);
        }
        let peak = corrected
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let mut i90 = peak;
        while i90 > 0 && corrected[i90 - 1] >= 0.9 * amplitude {
            i90 -= 1;
        }
        let mut i10 = i90;
        while i10 > 0 && corrected[i10 - 1] >= 0.1 * amplitude {
            i10 -= 1;
        }
        let rise_time = time[i90] - time[i10];

        let half = 0.5 * amplitude;
        let first = corrected.iter().position(|v| *v >= half);
        let last = corrected.iter().rposition(|v| *v >= half);
        let width = match (first, last) {
            (Some(a), Some(b)) => time[b] - time[a],
            _ => 0.0,
        };
        (rise_time, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateMeta;
    use crate::waveform::{Polarity, Trace};

    fn meta() -> AggregateMeta {
        AggregateMeta {
            sample_id: "test".into(),
            temperature_k: 293.0,
            bias_volt: 100.0,
            out_subpath: String::new(),
        }
    }

    /// Flat baseline, linear rise over 4 ns to 40 mV at t = 20 ns, then a
    /// plateau and a linear fall.
    fn pulse_sample() -> WaveformSample {
        let time: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();
        let volt: Vec<f64> = time
            .iter()
            .map(|&t| {
                if t < 20.0 {
                    0.0
                } else if t < 24.0 {
                    (t - 20.0) / 4.0 * 40.0
                } else if t < 40.0 {
                    40.0
                } else if t < 44.0 {
                    (44.0 - t) / 4.0 * 40.0
                } else {
                    0.0
                }
            })
            .collect();
        WaveformSample::new(
            0,
            Trace::new(time, volt).unwrap(),
            100.0,
            293.0,
            Polarity::Positive,
        )
    }

    #[test]
    fn analyzer_finds_pulse_features() {
        let config = AnalysisConfig {
            baseline_samples: 30,
            ..Default::default()
        };
        let analyzer = SignalAnalyzer::new(&config);
        let sample = pulse_sample();
        let mut agg = AverageAggregate::from_first_sample(meta(), &sample, 5.0);

        let features = analyzer.analyze(&sample, 0, &mut agg);
        assert_eq!(features.offset, 0.0);
        assert_eq!(features.noise, 0.0);
        assert!((features.amplitude - 40.0).abs() < 1e-9);
        // quiet baseline: threshold falls back to half amplitude
        assert!(features.delay >= 20.0 && features.delay <= 24.0);
        assert!(features.width > 16.0 && features.width < 28.0);
        assert!(features.rise_time > 0.0 && features.rise_time < 8.0);
    }

    #[test]
    fn analyzer_records_evolution_series() {
        let config = AnalysisConfig::default();
        let analyzer = SignalAnalyzer::new(&config);
        let sample = pulse_sample();
        let mut agg = AverageAggregate::from_first_sample(meta(), &sample, 5.0);

        analyzer.analyze(&sample, 3, &mut agg);
        assert_eq!(agg.noise_evolution().len(), 1);
        assert_eq!(agg.s2n_evolution().len(), 1);
        assert_eq!(agg.noise_evolution()[0].0, 3.0);
    }

    #[test]
    fn negative_polarity_pulse_is_rectified() {
        let config = AnalysisConfig {
            baseline_samples: 30,
            ..Default::default()
        };
        let analyzer = SignalAnalyzer::new(&config);
        let mut sample = pulse_sample();
        for v in &mut sample.trace.volt {
            *v = -*v;
        }
        sample.polarity = Polarity::Negative;
        let mut agg = AverageAggregate::from_first_sample(meta(), &sample, 5.0);

        let features = analyzer.analyze(&sample, 0, &mut agg);
        assert!((features.amplitude - 40.0).abs() < 1e-9);
    }

    #[test]
    fn baseline_offset_is_subtracted() {
        let config = AnalysisConfig {
            baseline_samples: 30,
            ..Default::default()
        };
        let analyzer = SignalAnalyzer::new(&config);
        let mut sample = pulse_sample();
        for v in &mut sample.trace.volt {
            *v += 12.0;
        }
        let mut agg = AverageAggregate::from_first_sample(meta(), &sample, 5.0);

        let features = analyzer.analyze(&sample, 0, &mut agg);
        assert!((features.offset - 12.0).abs() < 1e-9);
        assert!((features.amplitude - 40.0).abs() < 1e-9);
    }
}
