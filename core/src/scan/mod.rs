pub mod axis;
pub mod grid;
pub mod projector;

pub use axis::{Axis, AxisAssignment};
pub use grid::{AxisGeometry, GridIndex, ScanGrid, ScanSource};
pub use projector::{DerivedSeries, FixedIndices, ScanProjector, TimeWindow};
