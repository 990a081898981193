use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tctcore::modules::ScanConfig;
use tctcore::prelude::AnalysisConfig;
use tctcore::scan::{Axis, AxisAssignment, TimeWindow};

/// Which scan modules run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleToggles {
    pub sensor_search: bool,
    pub focus_search: bool,
    pub dual_channel: bool,
}

/// Scan section of the analysis card: axis assignment and per-channel
/// integration windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanCard {
    pub scanning: Axis,
    pub optical: Axis,
    pub window_ch1: TimeWindow,
    pub window_ch2: TimeWindow,
    pub modules: ModuleToggles,
}

impl Default for ScanCard {
    fn default() -> Self {
        Self {
            scanning: Axis::X,
            optical: Axis::Z,
            window_ch1: TimeWindow {
                low: 0.0,
                high: 50.0,
            },
            window_ch2: TimeWindow {
                low: 0.0,
                high: 50.0,
            },
            modules: ModuleToggles {
                sensor_search: true,
                focus_search: true,
                dual_channel: true,
            },
        }
    }
}

/// One analysis card: sample identification, acquisition-analysis settings
/// and the scan section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisCard {
    pub sample_id: String,
    pub temperature_k: f64,
    pub bias_volt: f64,
    pub analysis: AnalysisConfig,
    pub scan: ScanCard,
}

impl Default for AnalysisCard {
    fn default() -> Self {
        Self {
            sample_id: "sample".into(),
            temperature_k: 293.0,
            bias_volt: 0.0,
            analysis: AnalysisConfig::default(),
            scan: ScanCard::default(),
        }
    }
}

impl AnalysisCard {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading analysis card {}", path_ref.display()))?;
        let card: AnalysisCard = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing analysis card {}", path_ref.display()))?;
        Ok(card)
    }

    /// Resolves the axis assignment; an invalid one (scanning == optical)
    /// surfaces here, before any scan begins.
    pub fn scan_config(&self) -> anyhow::Result<ScanConfig> {
        let assignment = AxisAssignment::new(self.scan.scanning, self.scan.optical)
            .context("resolving scan axis assignment")?;
        Ok(ScanConfig {
            assignment,
            window_ch1: self.scan.window_ch1,
            window_ch2: self.scan.window_ch2,
        })
    }
}
