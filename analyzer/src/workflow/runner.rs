use crate::input::OscTextReader;
use crate::output::JsonSink;
use crate::workflow::config::AnalysisCard;
use anyhow::Context;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tctcore::aggregate::AggregateMeta;
use tctcore::modules::{
    run_module, DualChannelComparison, FocusSearch, ScanModule, SensorPositionSearch,
};
use tctcore::pipeline::Outcome;
use tctcore::prelude::{CancelFlag, PipelineError};
use tctcore::scan::ScanSource;
use tctcore::MeasurementPipeline;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub folders_processed: usize,
    pub canceled: bool,
}

/// Walks a data tree, runs one measurement pipeline per folder of waveform
/// files, and persists the completed aggregates. Also drives the enabled
/// scan modules against a scan source.
pub struct Runner {
    card: AnalysisCard,
    out_root: PathBuf,
}

impl Runner {
    pub fn new(card: AnalysisCard, out_root: PathBuf) -> Self {
        Self { card, out_root }
    }

    pub fn run_measurements(
        &self,
        data_folder: &Path,
        cancel: &CancelFlag,
    ) -> anyhow::Result<RunSummary> {
        let folders = collect_measurement_folders(data_folder)
            .with_context(|| format!("searching data in {}", data_folder.display()))?;
        info!(
            "found {} measurement folder(s) under {}",
            folders.len(),
            data_folder.display()
        );

        let reader = OscTextReader {
            bias_volt: self.card.bias_volt,
            temperature_k: self.card.temperature_k,
            ..Default::default()
        };
        let mut summary = RunSummary::default();
        for folder in folders {
            if cancel.is_canceled() {
                summary.canceled = true;
                break;
            }
            let meta = self.folder_meta(&folder, data_folder);
            let mut pipeline = MeasurementPipeline::new(self.card.analysis.clone(), meta);
            match pipeline.run(&folder, &reader, cancel) {
                Ok(Outcome::Completed(aggregate)) => {
                    let mut sink = JsonSink::new(&self.out_root);
                    aggregate.persist(&mut sink);
                    summary.folders_processed += 1;
                }
                Ok(Outcome::Canceled) => {
                    // partially accumulated state is dropped, never persisted
                    summary.canceled = true;
                    break;
                }
                Err(PipelineError::EmptyBatch(reason)) => {
                    warn!("folder empty, skipping: {}", reason);
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("processing {}", folder.display()));
                }
            }
        }
        Ok(summary)
    }

    /// Temperature and voltage come from trailing `<n>K` / `<n>V` path
    /// components when present, the card's values otherwise.
    fn folder_meta(&self, folder: &Path, root: &Path) -> AggregateMeta {
        let subpath = folder
            .strip_prefix(root)
            .unwrap_or(folder)
            .to_string_lossy()
            .into_owned();
        let mut temperature_k = self.card.temperature_k;
        let mut bias_volt = self.card.bias_volt;
        for component in folder.components() {
            let text = component.as_os_str().to_string_lossy();
            if let Some(value) = parse_suffixed(&text, 'K') {
                temperature_k = value;
            }
            if let Some(value) = parse_suffixed(&text, 'V') {
                bias_volt = value;
            }
        }
        AggregateMeta {
            sample_id: self.card.sample_id.clone(),
            temperature_k,
            bias_volt,
            out_subpath: subpath,
        }
    }

    /// Validates and runs the enabled scan modules. Returns how many ran;
    /// rejected modules are logged skips.
    pub fn run_scan<S: ScanSource>(&self, source: &S) -> anyhow::Result<usize> {
        let config = self.card.scan_config()?;
        let toggles = self.card.scan.modules;
        let mut modules: Vec<Box<dyn ScanModule>> = Vec::new();
        if toggles.sensor_search {
            modules.push(Box::new(SensorPositionSearch));
        }
        if toggles.focus_search {
            modules.push(Box::new(FocusSearch));
        }
        if toggles.dual_channel {
            modules.push(Box::new(DualChannelComparison));
        }

        let mut sink = JsonSink::new(&self.out_root);
        let mut ran = 0;
        for module in &modules {
            if run_module(module.as_ref(), source, &config, &mut sink)
                .with_context(|| format!("running module {}", module.name()))?
            {
                ran += 1;
            }
        }
        Ok(ran)
    }
}

/// Directories (the root included) that contain at least one `.txt` file.
fn collect_measurement_folders(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut has_waveforms = false;
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("listing {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map(|e| e == "txt").unwrap_or(false) {
                has_waveforms = true;
            }
        }
        if has_waveforms {
            folders.push(dir);
        }
    }
    folders.sort();
    Ok(folders)
}

fn parse_suffixed(text: &str, suffix: char) -> Option<f64> {
    text.strip_suffix(suffix)?.parse::<f64>().ok()
}
