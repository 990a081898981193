use crate::modules::{Rejection, ScanConfig, ScanModule};
use crate::prelude::CoreResult;
use crate::scan::{FixedIndices, ScanProjector, ScanSource};
use crate::sink::ResultSink;

/// Sweeps the optical axis and rates each position by the steepest charge
/// gradient along the scanning axis; the sharpest transition marks the best
/// focus.
pub struct FocusSearch;

impl FocusSearch {
    fn gradient_metric(points: &[(f64, f64)]) -> f64 {
        points
            .windows(2)
            .map(|w| (w[1].1 - w[0].1).abs())
            .fold(0.0, f64::max)
    }
}

impl ScanModule for FocusSearch {
    fn name(&self) -> &'static str {
        "focus_search"
    }

    fn validate(&self, source: &dyn ScanSource, config: &ScanConfig) -> Result<(), Rejection> {
        let optical = source.axis_geometry(config.assignment.optical());
        if optical.points <= 5 {
            return Err(Rejection {
                module: self.name(),
                reason: format!(
                    "optical axis contains only {} points, not enough for focus search",
                    optical.points
                ),
            });
        }
        let scan = source.axis_geometry(config.assignment.scanning());
        if scan.points < 2 {
            return Err(Rejection {
                module: self.name(),
                reason: format!(
                    "scanning axis contains only {} points, charge gradient needs at least 2",
                    scan.points
                ),
            });
        }
        Ok(())
    }

    fn run(
        &self,
        source: &dyn ScanSource,
        config: &ScanConfig,
        sink: &mut dyn ResultSink,
    ) -> CoreResult<()> {
        let projector = ScanProjector::new(source, config.assignment);
        let optical = source.axis_geometry(config.assignment.optical());

        let mut curve = Vec::with_capacity(optical.points);
        for k in 0..optical.points {
            let series = projector.series(
                0,
                FixedIndices {
                    optical: k,
                    ..Default::default()
                },
                config.window_ch1,
            );
            curve.push((optical.coordinate(k), Self::gradient_metric(&series.points)));
        }

        let best = curve
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .copied()
            .unwrap_or((optical.origin, 0.0));

        sink.write_series("modules/focus_search", "focus_metric", &curve);
        sink.write_table(
            "modules/focus_search",
            "best_focus",
            &[
                ("position".to_string(), best.0),
                ("metric".to_string(), best.1),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::run_module;
    use crate::scan::{Axis, AxisAssignment};
    use crate::sink::MemorySink;

    fn config() -> ScanConfig {
        ScanConfig {
            assignment: AxisAssignment::new(Axis::X, Axis::Y).unwrap(),
            ..crate::modules::testgrid::config()
        }
    }

    #[test]
    fn short_optical_scan_is_rejected() {
        let grid = crate::modules::testgrid::grid(6, 5);
        let mut sink = MemorySink::new();
        let ran = run_module(&FocusSearch, &grid, &config(), &mut sink).unwrap();
        assert!(!ran);
        assert!(sink.is_empty());
    }

    #[test]
    fn focus_curve_covers_every_optical_position() {
        let grid = crate::modules::testgrid::grid(6, 8);
        let mut sink = MemorySink::new();
        let ran = run_module(&FocusSearch, &grid, &config(), &mut sink).unwrap();
        assert!(ran);
        let curve = sink.series("modules/focus_search", "focus_metric").unwrap();
        assert_eq!(curve.len(), 8);
        assert!(sink.table("modules/focus_search", "best_focus").is_some());
    }

    #[test]
    fn gradient_metric_picks_steepest_step() {
        let points = vec![(0.0, 1.0), (1.0, 1.5), (2.0, 8.0), (3.0, 8.2)];
        assert_eq!(FocusSearch::gradient_metric(&points), 6.5);
    }
}
