//! Repair configuration.

use std::time::Duration;

/// Configuration for [`MeshRepairStage`](crate::MeshRepairStage).
///
/// Distances are in mesh units (millimeters).
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use guide_repair::RepairParams;
///
/// let params = RepairParams::default().with_retry_delay(Duration::ZERO);
/// assert_eq!(params.max_reduction_attempts, 3);
/// assert!(params.retry_delay.is_zero());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RepairParams {
    /// Edges closer than this are stitched together.
    ///
    /// Default: `0.01`
    pub stitch_tolerance: f64,

    /// Maximum stitching passes.
    ///
    /// Default: `5`
    pub stitch_passes: u32,

    /// Triangles thinner than this are removed.
    ///
    /// Default: `0.01`
    pub sharp_width_threshold: f64,

    /// Triangles with an interior angle below this (degrees) are removed.
    ///
    /// Default: `1.0`
    pub sharp_angle_threshold_deg: f64,

    /// Attempts at quality-preserving reduction before the mesh is flagged
    /// for manual work.
    ///
    /// Default: `3`
    pub max_reduction_attempts: u32,

    /// Pause between reduction attempts. Fixed, not backed off.
    ///
    /// Default: 1 s
    pub retry_delay: Duration,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            stitch_tolerance: 0.01,
            stitch_passes: 5,
            sharp_width_threshold: 0.01,
            sharp_angle_threshold_deg: 1.0,
            max_reduction_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RepairParams {
    /// Set the pause between reduction attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the number of reduction attempts. Values below one are raised
    /// to one.
    #[must_use]
    pub fn with_max_reduction_attempts(mut self, attempts: u32) -> Self {
        self.max_reduction_attempts = attempts.max(1);
        self
    }

    /// Set the stitching tolerance and pass count.
    #[must_use]
    pub const fn with_stitching(mut self, tolerance: f64, passes: u32) -> Self {
        self.stitch_tolerance = tolerance;
        self.stitch_passes = passes;
        self
    }
}
