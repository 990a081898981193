use crate::hist::{Density2D, Hist1D, Profile1D};
use crate::sink::ResultSink;
use crate::waveform::{Polarity, PulseFeatures, WaveformSample};
use serde::{Deserialize, Serialize};

/// Identification of one averaged measurement, used as the persistence key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateMeta {
    pub sample_id: String,
    pub temperature_k: f64,
    pub bias_volt: f64,
    pub out_subpath: String,
}

impl AggregateMeta {
    /// Hierarchical result key `{sample}/{temp}K/{volt}V`.
    pub fn result_key(&self) -> String {
        format!(
            "{}/{}K/{}V",
            self.sample_id, self.temperature_k as i64, self.bias_volt as i64
        )
    }
}

/// Running statistics accumulated over the accepted acquisitions of one
/// measurement folder.
///
/// Binning derives from the first acquisition: the time axis spans one trace
/// length on either side of zero (delay-shifted times always land there), the
/// voltage axis covers the baseline-corrected extent of the first trace with
/// a half-range margin.
#[derive(Debug, Clone)]
pub struct AverageAggregate {
    meta: AggregateMeta,
    waveform_len: usize,
    polarity: Polarity,
    density: Density2D,
    raw_overlay: Profile1D,
    profile: Profile1D,
    profile_filtered: Profile1D,
    delay_width: Vec<(f64, f64)>,
    ampl_width: Vec<(f64, f64)>,
    delay_ampl: Vec<(f64, f64)>,
    rise_ampl: Vec<(f64, f64)>,
    noise_hist: Hist1D,
    noise_evo: Vec<(f64, f64)>,
    s2n_evo: Vec<(f64, f64)>,
    num_analyzed: usize,
    num_selected: usize,
}

impl AverageAggregate {
    pub fn from_first_sample(meta: AggregateMeta, first: &WaveformSample, noise_cut: f64) -> Self {
        let n = first.trace.len().max(1);
        let t0 = first.trace.time.first().copied().unwrap_or(0.0);
        let t1 = first.trace.time.last().copied().unwrap_or(1.0);
        let span = (t1 - t0).abs().max(1.0);

        let vmin = first.trace.volt.iter().cloned().fold(f64::INFINITY, f64::min);
        let vmax = first
            .trace
            .volt
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let vrange = if vmin.is_finite() && vmax.is_finite() {
            vmax - vmin
        } else {
            1.0
        };
        // density voltages are baseline-corrected, so they live in
        // [-(vmax-vmin), vmax-vmin] whatever the raw offset was
        let vspan = (1.5 * vrange).max(1.0);

        Self {
            meta,
            waveform_len: n,
            polarity: first.polarity,
            density: Density2D::new(2 * n, -span, span, 200, -vspan, vspan),
            raw_overlay: Profile1D::new(n, t0, t0 + span),
            profile: Profile1D::new(2 * n, -span, span),
            profile_filtered: Profile1D::new(2 * n, -span, span),
            delay_width: Vec::new(),
            ampl_width: Vec::new(),
            delay_ampl: Vec::new(),
            rise_ampl: Vec::new(),
            noise_hist: Hist1D::new(100, 0.0, (4.0 * noise_cut).max(1.0)),
            noise_evo: Vec::new(),
            s2n_evo: Vec::new(),
            num_analyzed: 0,
            num_selected: 0,
        }
    }

    pub fn meta(&self) -> &AggregateMeta {
        &self.meta
    }

    pub fn waveform_len(&self) -> usize {
        self.waveform_len
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn set_analyzed(&mut self, count: usize) {
        self.num_analyzed = count;
    }

    pub fn record_selected(&mut self) {
        self.num_selected += 1;
    }

    pub fn push_noise(&mut self, index: u32, noise: f64) {
        self.noise_hist.fill(noise);
        self.noise_evo.push((index as f64, noise));
    }

    pub fn push_s2n(&mut self, index: u32, s2n: f64) {
        self.s2n_evo.push((index as f64, s2n));
    }

    /// Diagnostic overlay of the raw, unaligned trace points.
    pub fn record_raw(&mut self, time: f64, volt: f64) {
        self.raw_overlay.fill(time, volt);
    }

    /// Scalar-pair bookkeeping, filled for every analyzed acquisition
    /// regardless of selection.
    pub fn push_features(&mut self, features: &PulseFeatures) {
        self.delay_width.push((features.delay, features.width));
        self.ampl_width.push((features.amplitude, features.width));
        self.delay_ampl.push((features.delay, features.amplitude));
        self.rise_ampl.push((features.rise_time, features.amplitude));
    }

    /// One aligned point from an accepted acquisition: `t_raw`/`t_filtered`
    /// are delay-shifted times, `volt` is baseline-corrected.
    pub fn fill_point(&mut self, t_raw: f64, t_filtered: f64, volt: f64) {
        self.density.fill(t_raw, volt, 1.0);
        self.profile.fill(t_raw, volt);
        self.profile_filtered.fill(t_filtered, volt);
    }

    pub fn num_analyzed(&self) -> usize {
        self.num_analyzed
    }

    pub fn num_selected(&self) -> usize {
        self.num_selected
    }

    /// Selected over analyzed, as a percentage.
    pub fn selection_ratio(&self) -> f64 {
        if self.num_analyzed == 0 {
            return 0.0;
        }
        self.num_selected as f64 / self.num_analyzed as f64 * 100.0
    }

    pub fn profile_entries(&self) -> u64 {
        self.profile.entries()
    }

    pub fn density_total(&self) -> f64 {
        self.density.total()
    }

    pub fn noise_evolution(&self) -> &[(f64, f64)] {
        &self.noise_evo
    }

    pub fn s2n_evolution(&self) -> &[(f64, f64)] {
        &self.s2n_evo
    }

    /// Writes every accumulated artifact under the aggregate's result key.
    pub fn persist(&self, sink: &mut dyn ResultSink) {
        let key = self.meta.result_key();
        sink.write_series(&key, "profile", &self.profile.to_series());
        sink.write_series(&key, "profile_filtered", &self.profile_filtered.to_series());
        sink.write_series(&key, "raw_overlay", &self.raw_overlay.to_series());
        sink.write_map(&key, "acqs_2d", &self.density.to_map());
        sink.write_series(&key, "delay_width", &self.delay_width);
        sink.write_series(&key, "ampl_width", &self.ampl_width);
        sink.write_series(&key, "delay_ampl", &self.delay_ampl);
        sink.write_series(&key, "rise1090_ampl", &self.rise_ampl);
        sink.write_series(&key, "noise_hist", &self.noise_hist.to_series());
        sink.write_series(&key, "noise_evo", &self.noise_evo);
        sink.write_series(&key, "s2n_evo", &self.s2n_evo);
        sink.write_table(
            &key,
            "summary",
            &[
                ("num_analyzed".to_string(), self.num_analyzed as f64),
                ("num_selected".to_string(), self.num_selected as f64),
                ("selection_ratio_pct".to_string(), self.selection_ratio()),
            ],
        );
    }
}
