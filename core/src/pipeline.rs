use crate::aggregate::{AggregateMeta, AverageAggregate};
use crate::analysis::{ProfileFiller, SelectionFilter, SignalAnalyzer, Smearer};
use crate::prelude::{AnalysisConfig, CancelFlag, CoreResult, PipelineError, ReadErrorPolicy};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use crate::waveform::{AcquisitionBatch, WaveformSample};
use std::path::{Path, PathBuf};

/// Parses one raw acquisition file. The on-disk format belongs to the caller;
/// the pipeline only sees samples or errors.
pub trait WaveformReader {
    fn read(&self, path: &Path, index: u32) -> CoreResult<WaveformSample>;
}

/// Result of one pipeline run. A canceled run exposes no aggregate.
#[derive(Debug)]
pub enum Outcome {
    Completed(Box<AverageAggregate>),
    Canceled,
}

/// Drives one measurement folder through loading, analysis, selection and
/// accumulation.
pub struct MeasurementPipeline {
    config: AnalysisConfig,
    meta: AggregateMeta,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl MeasurementPipeline {
    pub fn new(config: AnalysisConfig, meta: AggregateMeta) -> Self {
        Self {
            config,
            meta,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    /// (acquisitions processed, read failures) of the last run.
    pub fn metrics(&self) -> (usize, usize) {
        self.metrics.snapshot()
    }

    pub fn run<R: WaveformReader>(
        &mut self,
        folder: &Path,
        reader: &R,
        cancel: &CancelFlag,
    ) -> CoreResult<Outcome> {
        self.metrics.reset();
        let files = self.enumerate(folder)?;
        self.logger
            .record(&format!("read files from {}", folder.display()));

        let mut batch = AcquisitionBatch::new();
        let mut canceled = false;
        for path in &files {
            if cancel.is_canceled() {
                canceled = true;
                break;
            }
            if batch.len() >= self.config.max_acquisitions {
                break;
            }
            let index = batch.len() as u32;
            if index < 10 {
                self.logger
                    .record(&format!("read file from: {}", path.display()));
            } else if index == 10 {
                self.logger.record("suppressing further 'read from' info");
            }
            match reader.read(path, index).and_then(|s| batch.push(s)) {
                Ok(()) => {}
                Err(err) => {
                    self.metrics.record_read_failure();
                    match self.config.read_error_policy {
                        ReadErrorPolicy::Abort => return Err(err),
                        ReadErrorPolicy::Skip => {
                            self.logger
                                .record_warning(&format!("skipping acquisition: {}", err));
                        }
                    }
                }
            }
        }

        if canceled {
            self.logger.record("run canceled, discarding batch");
            return Ok(Outcome::Canceled);
        }
        let first = match batch.first() {
            Some(first) => first,
            None => {
                return Err(PipelineError::EmptyBatch(format!(
                    "no readable acquisitions in {}",
                    folder.display()
                )))
            }
        };
        let mut aggregate =
            AverageAggregate::from_first_sample(self.meta.clone(), first, self.config.noise_cut_mv);
        aggregate.set_analyzed(batch.len());

        let analyzer = SignalAnalyzer::new(&self.config);
        let filter = SelectionFilter::new(self.config.noise_cut_mv);
        let mut smearer = if self.config.do_smearing {
            Some(Smearer::new(self.config.smearing_seed))
        } else {
            None
        };

        for sample in batch.iter_mut() {
            if let Some(smearer) = smearer.as_mut() {
                smearer.smear_voltage(sample, self.config.add_noise_mv);
            }
            let features = analyzer.analyze(sample, sample.index, &mut aggregate);
            sample.features = Some(features);
            if let Some(smearer) = smearer.as_mut() {
                // the analyzer removed jitter via the per-acquisition delay;
                // re-adding it here exercises downstream alignment
                smearer.smear_delay(sample, self.config.add_jitter_ns);
            }
            if filter.select(sample) {
                aggregate.record_selected();
            }
            ProfileFiller::fill(sample, &mut aggregate);
            self.metrics.record_acquisition();
        }

        self.logger.record(&format!(
            "ratio of selected acqs = {} / {} = {:.0}%",
            aggregate.num_selected(),
            aggregate.num_analyzed(),
            aggregate.selection_ratio()
        ));

        Ok(Outcome::Completed(Box::new(aggregate)))
    }

    /// Candidate files: `.txt` entries, editor artifacts excluded, sorted.
    fn enumerate(&self, folder: &Path) -> CoreResult<Vec<PathBuf>> {
        if self.config.max_acquisitions == 0 {
            return Err(PipelineError::EmptyBatch(
                "MaxAcquisitions is defaulted to zero".into(),
            ));
        }
        let entries = std::fs::read_dir(folder)
            .map_err(|e| PipelineError::FileOpen(format!("{}: {}", folder.display(), e)))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                path.is_file()
                    && path.extension().map(|e| e == "txt").unwrap_or(false)
                    && !name.contains(".swp")
                    && !name.ends_with('~')
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(PipelineError::EmptyBatch(format!(
                "no files found in {}",
                folder.display()
            )));
        }
        Ok(files)
    }
}
