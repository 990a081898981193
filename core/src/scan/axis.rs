use crate::prelude::{CoreResult, PipelineError};
use serde::{Deserialize, Serialize};

/// Spatial axis of the scan stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// The axis not used by either argument; `None` when they coincide.
    pub fn third(a: Axis, b: Axis) -> Option<Axis> {
        match (a, b) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Some(Axis::Z),
            (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => Some(Axis::Y),
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Some(Axis::X),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Which spatial axis scans and which carries the optics. Fixed for the
/// lifetime of one scan; the secondary scanning axis is the remaining one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssignment", into = "RawAssignment")]
pub struct AxisAssignment {
    scanning: Axis,
    optical: Axis,
    secondary: Axis,
}

#[derive(Serialize, Deserialize)]
struct RawAssignment {
    scanning: Axis,
    optical: Axis,
}

impl TryFrom<RawAssignment> for AxisAssignment {
    type Error = PipelineError;

    fn try_from(raw: RawAssignment) -> CoreResult<Self> {
        AxisAssignment::new(raw.scanning, raw.optical)
    }
}

impl From<AxisAssignment> for RawAssignment {
    fn from(assignment: AxisAssignment) -> Self {
        Self {
            scanning: assignment.scanning,
            optical: assignment.optical,
        }
    }
}

impl AxisAssignment {
    pub fn new(scanning: Axis, optical: Axis) -> CoreResult<Self> {
        let secondary = Axis::third(scanning, optical).ok_or_else(|| {
            PipelineError::Config(format!(
                "scanning and optical axis must differ, both are {}",
                scanning.label()
            ))
        })?;
        Ok(Self {
            scanning,
            optical,
            secondary,
        })
    }

    pub fn scanning(&self) -> Axis {
        self.scanning
    }

    pub fn optical(&self) -> Axis {
        self.optical
    }

    pub fn secondary(&self) -> Axis {
        self.secondary
    }

    /// Places logical (scan, secondary, optical) indices into physical
    /// (x, y, z) order.
    pub fn spatial_index(&self, scan: usize, secondary: usize, optical: usize) -> [usize; 3] {
        let mut spatial = [0usize; 3];
        spatial[self.scanning.index()] = scan;
        spatial[self.secondary.index()] = secondary;
        spatial[self.optical.index()] = optical;
        spatial
    }
}
