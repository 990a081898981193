use crate::scan::axis::AxisAssignment;
use crate::scan::grid::{GridIndex, ScanSource};
use serde::{Deserialize, Serialize};

/// Integration window in ns for the charge-collection integral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub low: f64,
    pub high: f64,
}

/// (axis coordinate, scalar feature) pairs extracted along one axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedSeries {
    pub points: Vec<(f64, f64)>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Indices of the non-swept axes, held fixed during one projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedIndices {
    pub secondary: usize,
    pub optical: usize,
    pub u1: usize,
    pub u2: usize,
}

/// Extracts per-point charge integrals along the scanning axis of a source,
/// the other axes fixed.
pub struct ScanProjector<'a, S: ScanSource + ?Sized> {
    source: &'a S,
    assignment: AxisAssignment,
}

impl<'a, S: ScanSource + ?Sized> ScanProjector<'a, S> {
    pub fn new(source: &'a S, assignment: AxisAssignment) -> Self {
        Self { source, assignment }
    }

    pub fn assignment(&self) -> AxisAssignment {
        self.assignment
    }

    /// One derived series along the scanning axis. Missing grid cells
    /// contribute no point; a window outside the sampled time range
    /// integrates to zero.
    pub fn series(&self, channel: usize, fixed: FixedIndices, window: TimeWindow) -> DerivedSeries {
        let geometry = self.source.axis_geometry(self.assignment.scanning());
        let mut points = Vec::with_capacity(geometry.points);
        for i in 0..geometry.points {
            let index = GridIndex {
                spatial: self
                    .assignment
                    .spatial_index(i, fixed.secondary, fixed.optical),
                u1: fixed.u1,
                u2: fixed.u2,
            };
            if let Some(trace) = self.source.waveform(channel, index) {
                points.push((
                    geometry.coordinate(i),
                    trace.charge_integral(window.low, window.high),
                ));
            }
        }
        DerivedSeries { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::axis::{Axis, AxisAssignment};
    use crate::scan::grid::{AxisGeometry, ScanGrid};
    use crate::waveform::Trace;

    /// 6 x-points, flat traces whose level equals the x index.
    fn grid() -> ScanGrid {
        let mut grid = ScanGrid::new(
            [
                AxisGeometry {
                    points: 6,
                    step: 2.0,
                    origin: 10.0,
                },
                AxisGeometry::fixed(),
                AxisGeometry::fixed(),
            ],
            vec![100.0],
            vec![0.0],
            1,
        );
        for i in 0..6 {
            let time: Vec<f64> = (0..20).map(|k| k as f64).collect();
            let volt = vec![i as f64; 20];
            grid.set_waveform(
                0,
                GridIndex {
                    spatial: [i, 0, 0],
                    u1: 0,
                    u2: 0,
                },
                Trace::new(time, volt).unwrap(),
            );
        }
        grid
    }

    fn assignment() -> AxisAssignment {
        AxisAssignment::new(Axis::X, Axis::Z).unwrap()
    }

    #[test]
    fn projection_yields_one_point_per_grid_cell() {
        let grid = grid();
        let projector = ScanProjector::new(&grid, assignment());
        let series = projector.series(
            0,
            FixedIndices::default(),
            TimeWindow {
                low: 0.0,
                high: 9.0,
            },
        );
        assert_eq!(series.len(), 6);
        assert_eq!(series.points[0].0, 10.0);
        assert_eq!(series.points[5].0, 20.0);
        // 10 samples inside the window, dt = 1
        assert_eq!(series.points[3].1, 30.0);
    }

    #[test]
    fn window_outside_range_integrates_to_zero() {
        let grid = grid();
        let projector = ScanProjector::new(&grid, assignment());
        let series = projector.series(
            0,
            FixedIndices::default(),
            TimeWindow {
                low: 500.0,
                high: 600.0,
            },
        );
        assert!(series.points.iter().all(|(_, q)| *q == 0.0));
    }

    #[test]
    fn missing_cells_contribute_no_point() {
        let mut grid = ScanGrid::new(
            [
                AxisGeometry {
                    points: 6,
                    step: 2.0,
                    origin: 10.0,
                },
                AxisGeometry::fixed(),
                AxisGeometry::fixed(),
            ],
            vec![100.0],
            vec![0.0],
            1,
        );
        // leave x = 2 unpopulated
        for i in [0usize, 1, 3, 4, 5] {
            let time: Vec<f64> = (0..20).map(|k| k as f64).collect();
            grid.set_waveform(
                0,
                GridIndex {
                    spatial: [i, 0, 0],
                    u1: 0,
                    u2: 0,
                },
                Trace::new(time, vec![1.0; 20]).unwrap(),
            );
        }
        let projector = ScanProjector::new(&grid, assignment());
        let series = projector.series(
            0,
            FixedIndices::default(),
            TimeWindow {
                low: 0.0,
                high: 19.0,
            },
        );
        assert_eq!(series.len(), 5);
    }
}
