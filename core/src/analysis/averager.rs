use crate::aggregate::AverageAggregate;
use crate::waveform::WaveformSample;

/// Accumulates one accepted, analyzed acquisition into the averaged profiles.
pub struct ProfileFiller;

impl ProfileFiller {
    /// Every trace point contributes, weight 1: time shifted by the raw delay
    /// feeds the primary profile and the 2-D density, time shifted by the
    /// filtered delay feeds the second profile, voltage is baseline-corrected
    /// in all three. No-op for unselected samples.
    ///
    /// The filtered-delay alignment is an approximation meant for low
    /// signal-to-noise acquisitions; the raw delay keeps genuine timing
    /// differences between acquisitions.
    pub fn fill(sample: &WaveformSample, aggregate: &mut AverageAggregate) {
        if sample.selection() != Some(true) {
            return;
        }
        let features = match sample.features {
            Some(f) => f,
            None => return,
        };
        for (t, v) in sample.trace.time.iter().zip(&sample.trace.volt) {
            aggregate.fill_point(
                t - features.delay,
                t - features.delay_filtered,
                v - features.offset,
            );
        }
    }
}
