use crate::prelude::CoreResult;
use crate::scan::{AxisAssignment, ScanSource, TimeWindow};
use crate::sink::ResultSink;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dual_channel;
pub mod focus;
pub mod sensor_position;

pub use dual_channel::DualChannelComparison;
pub use focus::FocusSearch;
pub use sensor_position::SensorPositionSearch;

/// Failed precondition check of a module; a skip with a reason, not a fatal
/// error.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub module: &'static str,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejected: {}", self.module, self.reason)
    }
}

/// Scan-side configuration shared by all modules: the axis assignment and
/// the per-channel charge-integration windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanConfig {
    pub assignment: AxisAssignment,
    pub window_ch1: TimeWindow,
    pub window_ch2: TimeWindow,
}

/// One scan-analysis variant. `run` is only reachable after `validate`
/// passes; a validated module extracts derived series via the projector and
/// writes them to its own subsection of the sink.
pub trait ScanModule {
    fn name(&self) -> &'static str;
    fn validate(&self, source: &dyn ScanSource, config: &ScanConfig) -> Result<(), Rejection>;
    fn run(
        &self,
        source: &dyn ScanSource,
        config: &ScanConfig,
        sink: &mut dyn ResultSink,
    ) -> CoreResult<()>;
}

/// Drives one module through validate -> (run | rejected). Nothing is
/// written when validation fails; the rejection is logged. Returns whether
/// the module ran.
pub fn run_module(
    module: &dyn ScanModule,
    source: &dyn ScanSource,
    config: &ScanConfig,
    sink: &mut dyn ResultSink,
) -> CoreResult<bool> {
    let logger = LogManager::new();
    match module.validate(source, config) {
        Ok(()) => {
            logger.record(&format!("{}: data test passed, processing", module.name()));
            module.run(source, config, sink)?;
            Ok(true)
        }
        Err(rejection) => {
            logger.record_warning(&rejection.to_string());
            Ok(false)
        }
    }
}

#[cfg(test)]
pub(crate) mod testgrid {
    use crate::scan::{Axis, AxisAssignment, AxisGeometry, GridIndex, ScanGrid, TimeWindow};
    use crate::waveform::Trace;

    use super::ScanConfig;

    /// Grid with `nx` scan points and `ny` secondary points, z fixed, two
    /// channels. The stored charge peaks in the middle of the scan axis.
    pub fn grid(nx: usize, ny: usize) -> ScanGrid {
        let mut grid = ScanGrid::new(
            [
                AxisGeometry {
                    points: nx,
                    step: 10.0,
                    origin: 0.0,
                },
                AxisGeometry {
                    points: ny,
                    step: 10.0,
                    origin: 0.0,
                },
                AxisGeometry::fixed(),
            ],
            vec![100.0],
            vec![0.0],
            2,
        );
        for channel in 0..2 {
            for i in 0..nx {
                for j in 0..ny {
                    let center = (nx as f64 - 1.0) / 2.0;
                    let level = 10.0 - (i as f64 - center).abs() + channel as f64;
                    let time: Vec<f64> = (0..20).map(|k| k as f64).collect();
                    let volt = vec![level; 20];
                    grid.set_waveform(
                        channel,
                        GridIndex {
                            spatial: [i, j, 0],
                            u1: 0,
                            u2: 0,
                        },
                        Trace::new(time, volt).unwrap(),
                    );
                }
            }
        }
        grid
    }

    pub fn config() -> ScanConfig {
        ScanConfig {
            assignment: AxisAssignment::new(Axis::X, Axis::Z).unwrap(),
            window_ch1: TimeWindow {
                low: 0.0,
                high: 19.0,
            },
            window_ch2: TimeWindow {
                low: 0.0,
                high: 19.0,
            },
        }
    }
}
