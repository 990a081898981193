use crate::prelude::{CoreResult, PipelineError};
use serde::{Deserialize, Serialize};

/// Declared signal polarity of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// Ordered (time, voltage) pairs of one captured waveform. Times in ns,
/// voltages in mV.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub time: Vec<f64>,
    pub volt: Vec<f64>,
}

impl Trace {
    pub fn new(time: Vec<f64>, volt: Vec<f64>) -> CoreResult<Self> {
        if time.len() != volt.len() {
            return Err(PipelineError::MalformedWaveform(format!(
                "time/voltage length mismatch: {} vs {}",
                time.len(),
                volt.len()
            )));
        }
        Ok(Self { time, volt })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Nominal sample spacing, from the first two points.
    pub fn dt(&self) -> f64 {
        if self.time.len() < 2 {
            return 0.0;
        }
        self.time[1] - self.time[0]
    }

    /// Time-windowed charge integral: sum of v*dt over samples with
    /// low <= t <= high. A window outside the sampled range yields 0.
    pub fn charge_integral(&self, low: f64, high: f64) -> f64 {
        let dt = self.dt();
        self.time
            .iter()
            .zip(&self.volt)
            .filter(|(t, _)| **t >= low && **t <= high)
            .map(|(_, v)| v * dt)
            .sum()
    }
}

/// Immutable per-acquisition analysis result produced by the signal analyzer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PulseFeatures {
    /// Baseline offset over the pre-trigger window, mV.
    pub offset: f64,
    /// RMS noise of the pre-trigger window, mV.
    pub noise: f64,
    /// Signal arrival time from the raw trace, ns.
    pub delay: f64,
    /// Arrival time from the box-smoothed trace, ns.
    pub delay_filtered: f64,
    /// Peak amplitude after polarity and baseline correction, mV.
    pub amplitude: f64,
    /// 10% to 90% rise time, ns.
    pub rise_time: f64,
    /// Full width at half maximum, ns.
    pub width: f64,
    /// Amplitude over baseline noise.
    pub s2n: f64,
}

/// One captured acquisition with its metadata and analysis state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformSample {
    pub trace: Trace,
    pub index: u32,
    pub bias_volt: f64,
    pub temperature_k: f64,
    pub polarity: Polarity,
    /// Set once by the pipeline from the analyzer's return value.
    pub features: Option<PulseFeatures>,
    selected: Option<bool>,
}

impl WaveformSample {
    pub fn new(
        index: u32,
        trace: Trace,
        bias_volt: f64,
        temperature_k: f64,
        polarity: Polarity,
    ) -> Self {
        Self {
            trace,
            index,
            bias_volt,
            temperature_k,
            polarity,
            features: None,
            selected: None,
        }
    }

    pub fn noise(&self) -> Option<f64> {
        self.features.map(|f| f.noise)
    }

    pub fn delay(&self) -> Option<f64> {
        self.features.map(|f| f.delay)
    }

    /// Memoized selection outcome; `None` until the filter has run.
    pub fn selection(&self) -> Option<bool> {
        self.selected
    }

    pub(crate) fn set_selection(&mut self, selected: bool) {
        self.selected = Some(selected);
    }
}

/// Acquisitions from one measurement folder. All samples share the waveform
/// length and polarity of the first one.
#[derive(Debug, Default)]
pub struct AcquisitionBatch {
    samples: Vec<WaveformSample>,
}

impl AcquisitionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: WaveformSample) -> CoreResult<()> {
        if let Some(first) = self.samples.first() {
            if sample.trace.len() != first.trace.len() {
                return Err(PipelineError::MalformedWaveform(format!(
                    "acquisition {} has {} samples, batch expects {}",
                    sample.index,
                    sample.trace.len(),
                    first.trace.len()
                )));
            }
            if sample.polarity != first.polarity {
                return Err(PipelineError::MalformedWaveform(format!(
                    "acquisition {} polarity differs from batch",
                    sample.index
                )));
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&WaveformSample> {
        self.samples.first()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WaveformSample> {
        self.samples.iter_mut()
    }
}
