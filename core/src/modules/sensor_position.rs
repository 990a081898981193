use crate::modules::{Rejection, ScanConfig, ScanModule};
use crate::prelude::CoreResult;
use crate::scan::{FixedIndices, ScanProjector, ScanSource};
use crate::sink::ResultSink;

/// Scans both in-plane axes to locate the sensor: a 2-D charge-collection
/// map over (scan axis, secondary axis), optics and voltages fixed.
pub struct SensorPositionSearch;

impl ScanModule for SensorPositionSearch {
    fn name(&self) -> &'static str {
        "sensor_position_search"
    }

    fn validate(&self, source: &dyn ScanSource, config: &ScanConfig) -> Result<(), Rejection> {
        let scan = source.axis_geometry(config.assignment.scanning());
        if scan.points < 1 {
            return Err(Rejection {
                module: self.name(),
                reason: format!(
                    "scanning axis contains only {} points, not enough for sensor search",
                    scan.points
                ),
            });
        }
        let secondary = source.axis_geometry(config.assignment.secondary());
        if secondary.points < 1 {
            return Err(Rejection {
                module: self.name(),
                reason: format!(
                    "second scanning axis contains only {} points, not enough for sensor search",
                    secondary.points
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
        let secondary = source.axis_geometry(config.assignment.secondary());

        let mut map = Vec::new();
        for j in 0..secondary.points {
            let series = projector.series(
                0,
                FixedIndices {
                    secondary: j,
                    ..Default::default()
                },
                config.window_ch1,
            );
            let y = secondary.coordinate(j);
            for (x, charge) in series.points {
                map.push((x, y, charge));
            }
        }
        sink.write_map("modules/sensor_position_search", "collection_map", &map);
        Ok(())
    }
}
