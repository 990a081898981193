//! Analysis core for transient-current measurements of semiconductor
//! sensors.
//!
//! Two engines: the acquisition pipeline (noise/signal estimation,
//! selection, delay-aligned averaging of repeated waveform captures) and the
//! scan projection side (multi-axis waveform grids reduced to derived
//! charge-collection curves and maps).

pub mod aggregate;
pub mod analysis;
pub mod hist;
pub mod math;
pub mod modules;
pub mod pipeline;
pub mod prelude;
pub mod scan;
pub mod sink;
pub mod telemetry;
pub mod waveform;

pub use pipeline::{MeasurementPipeline, Outcome, WaveformReader};
pub use prelude::{AnalysisConfig, CancelFlag, CoreResult, PipelineError, ReadErrorPolicy};
