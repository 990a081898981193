use crate::modules::{Rejection, ScanConfig, ScanModule};
use crate::prelude::CoreResult;
use crate::scan::{FixedIndices, ScanProjector, ScanSource};
use crate::sink::ResultSink;

/// Projects both detector channels along the scanning axis for every fixed
/// combination of the remaining axes and overlays the two charge series.
pub struct DualChannelComparison;

impl ScanModule for DualChannelComparison {
    fn name(&self) -> &'static str {
        "dual_channel"
    }

    fn validate(&self, source: &dyn ScanSource, config: &ScanConfig) -> Result<(), Rejection> {
        let scan = source.axis_geometry(config.assignment.scanning());
        if scan.points <= 5 {
            return Err(Rejection {
                module: self.name(),
                reason: format!(
                    "scanning axis contains only {} points, not enough for graph plots",
                    scan.points
                ),
            });
        }
        if source.channel_count() < 2 {
            return Err(Rejection {
                module: self.name(),
                reason: "second detector channel not present".into(),
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
        let secondary = source.axis_geometry(config.assignment.secondary());
        let (nu1, nu2) = source.voltage_steps();

        for n in 0..optical.points {
            for m in 0..secondary.points {
                for i in 0..nu1 {
                    for j in 0..nu2 {
                        let fixed = FixedIndices {
                            secondary: m,
                            optical: n,
                            u1: i,
                            u2: j,
                        };
                        let ch1 = projector.series(0, fixed, config.window_ch1);
                        let ch2 = projector.series(1, fixed, config.window_ch2);
                        let key = format!(
                            "modules/dual_channel/opt{}_sec{}_u1_{}_u2_{}",
                            n, m, i, j
                        );
                        sink.write_series(&key, "ch1", &ch1.points);
                        sink.write_series(&key, "ch2", &ch2.points);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::run_module;
    use crate::modules::testgrid;
    use crate::sink::MemorySink;

    #[test]
    fn six_point_scan_axis_passes_validation() {
        let grid = testgrid::grid(6, 4);
        let config = testgrid::config();
        let mut sink = MemorySink::new();
        let ran = run_module(&DualChannelComparison, &grid, &config, &mut sink).unwrap();
        assert!(ran);
    }

    #[test]
    fn five_point_scan_axis_is_rejected() {
        let grid = testgrid::grid(5, 4);
        let config = testgrid::config();
        let mut sink = MemorySink::new();
        let ran = run_module(&DualChannelComparison, &grid, &config, &mut sink).unwrap();
        assert!(!ran);
        // a rejected module writes nothing
        assert!(sink.is_empty());
    }

    #[test]
    fn overlay_pairs_cover_each_fixed_combination() {
        let grid = testgrid::grid(6, 4);
        let config = testgrid::config();
        let mut sink = MemorySink::new();
        run_module(&DualChannelComparison, &grid, &config, &mut sink).unwrap();
        // optical (z) fixed, 4 secondary points, one voltage pair:
        // two series per combination
        assert_eq!(sink.series_count(), 2 * 4);
        let ch1 = sink
            .series("modules/dual_channel/opt0_sec1_u1_0_u2_0", "ch1")
            .unwrap();
        let ch2 = sink
            .series("modules/dual_channel/opt0_sec1_u1_0_u2_0", "ch2")
            .unwrap();
        assert_eq!(ch1.len(), 6);
        assert_eq!(ch2.len(), 6);
        // channel 2 stores one extra millivolt of charge per point
        assert!(ch2[0].1 > ch1[0].1);
    }
}
