use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Policy applied when a candidate waveform file cannot be opened or parsed.
///
/// `Abort` fails the whole batch, `Skip` records a warning and continues with
/// the remaining files. The default is `Abort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadErrorPolicy {
    Abort,
    Skip,
}

/// Shared configuration for one acquisition-analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Noise cut in mV; acquisitions with baseline noise above this are rejected.
    pub noise_cut_mv: f64,
    /// Maximum number of acquisitions loaded from one folder.
    pub max_acquisitions: usize,
    /// Number of leading samples treated as the pre-trigger baseline window.
    pub baseline_samples: usize,
    /// Detection threshold in units of baseline noise.
    pub threshold_sigma: f64,
    /// Box-filter width (samples) for the filtered-delay estimate.
    pub smoothing_window: usize,
    /// Master switch for both smearing perturbations.
    pub do_smearing: bool,
    /// Sigma of the Gaussian voltage noise added before analysis, in mV.
    pub add_noise_mv: f64,
    /// Sigma of the Gaussian jitter added to the delay after analysis, in ns.
    pub add_jitter_ns: f64,
    /// Seed for the smearing random stream.
    pub smearing_seed: u64,
    pub read_error_policy: ReadErrorPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            noise_cut_mv: 5.0,
            max_acquisitions: 10_000,
            baseline_samples: 50,
            threshold_sigma: 5.0,
            smoothing_window: 7,
            do_smearing: false,
            add_noise_mv: 0.0,
            add_jitter_ns: 0.0,
            smearing_seed: 0,
            read_error_policy: ReadErrorPolicy::Abort,
        }
    }
}

/// Common error type for pipeline and scan execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("empty batch: {0}")]
    EmptyBatch(String),
    #[error("file open failed: {0}")]
    FileOpen(String),
    #[error("malformed waveform: {0}")]
    MalformedWaveform(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, PipelineError>;

/// Cooperative cancellation flag polled by the pipeline between files.
///
/// Clones share one flag, so a signal handler on another thread can cancel a
/// running pipeline.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_canceled());
        flag.cancel();
        assert!(other.is_canceled());
    }

    #[test]
    fn analysis_config_defaults_to_abort_policy() {
        let config = AnalysisConfig::default();
        assert_eq!(config.read_error_policy, ReadErrorPolicy::Abort);
        assert!(!config.do_smearing);
    }
}
