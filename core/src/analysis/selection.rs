use crate::telemetry::log::LogManager;
use crate::waveform::WaveformSample;

/// Accept/reject decision per acquisition, memoized on the sample.
pub struct SelectionFilter {
    noise_cut: f64,
    logger: LogManager,
}

impl SelectionFilter {
    pub fn new(noise_cut: f64) -> Self {
        Self {
            noise_cut,
            logger: LogManager::new(),
        }
    }

    /// Returns the memoized outcome when the decision was already made;
    /// otherwise rejects iff noise exceeds the cut (the boundary value is
    /// accepted), stores the outcome and returns it.
    ///
    /// The sample must have been analyzed first; selection before analysis is
    /// a caller bug.
    pub fn select(&self, sample: &mut WaveformSample) -> bool {
        if let Some(prior) = sample.selection() {
            return prior;
        }
        let noise = sample
            .noise()
            .expect("acquisition must be analyzed before selection");
        let selected = noise <= self.noise_cut;
        if !selected {
            self.logger.record(&format!(
                "noise too high: {:.3} mV (cut {:.3} mV)",
                noise, self.noise_cut
            ));
        }
        sample.set_selection(selected);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{Polarity, PulseFeatures, Trace, WaveformSample};

    fn analyzed_sample(noise: f64) -> WaveformSample {
        let trace = Trace::new(vec![0.0, 1.0], vec![0.0, 0.0]).unwrap();
        let mut sample = WaveformSample::new(0, trace, 100.0, 293.0, Polarity::Positive);
        sample.features = Some(PulseFeatures {
            offset: 0.0,
            noise,
            delay: 10.0,
            delay_filtered: 10.0,
            amplitude: 50.0,
            rise_time: 1.0,
            width: 5.0,
            s2n: 50.0 / noise.max(f64::EPSILON),
        });
        sample
    }

    #[test]
    fn quiet_sample_is_accepted() {
        let filter = SelectionFilter::new(5.0);
        let mut sample = analyzed_sample(2.0);
        assert!(filter.select(&mut sample));
        assert_eq!(sample.selection(), Some(true));
    }

    #[test]
    fn noisy_sample_is_rejected() {
        let filter = SelectionFilter::new(5.0);
        let mut sample = analyzed_sample(7.5);
        assert!(!filter.select(&mut sample));
        assert_eq!(sample.selection(), Some(false));
    }

    #[test]
    fn boundary_noise_equal_to_cut_is_accepted() {
        let filter = SelectionFilter::new(5.0);
        let mut sample = analyzed_sample(5.0);
        assert!(filter.select(&mut sample));
    }

    #[test]
    fn second_call_returns_memo_without_recomputation() {
        let filter = SelectionFilter::new(5.0);
        let mut sample = analyzed_sample(2.0);
        assert!(filter.select(&mut sample));

        // flip the noise past the cut; a recomputation would now reject
        if let Some(features) = sample.features.as_mut() {
            features.noise = 50.0;
        }
        assert!(filter.select(&mut sample));
    }
}
