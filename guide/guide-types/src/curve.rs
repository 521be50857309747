//! Polyline curves used as cut boundaries and sweep paths.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered polyline, optionally closed.
///
/// Connectors and screw-eye sweeps follow a `Curve`; osteotomy outlines use
/// closed ones.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve {
    /// Control points in order.
    pub points: Vec<Point3<f64>>,
    /// Whether the last point connects back to the first.
    pub closed: bool,
}

impl Curve {
    /// Create an open polyline.
    #[must_use]
    pub const fn open(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Create a closed polyline.
    #[must_use]
    pub const fn closed(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// First point, if any.
    #[must_use]
    pub fn start(&self) -> Option<&Point3<f64>> {
        self.points.first()
    }

    /// Last point, if any.
    #[must_use]
    pub fn end(&self) -> Option<&Point3<f64>> {
        self.points.last()
    }

    /// A curve needs at least two points to describe a path.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    /// Sum of segment lengths, including the closing segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        let open: f64 = self
            .points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 2 => {
                open + (first - last).norm()
            }
            _ => open,
        }
    }
}
