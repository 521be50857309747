//! Post-assembly mesh repair with bounded reduction retries.

use std::thread;

use guide_kernel::{GeometryKernel, KernelOp};
use guide_types::{IndexedMesh, ReductionParams};
use tracing::{debug, info, warn};

use crate::error::{RepairError, RepairResult};
use crate::filter::filter_shells;
use crate::params::RepairParams;
use crate::telemetry::{NoTelemetry, Telemetry};

/// Result of a repair run.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The repaired mesh, or the best unreduced intermediate when
    /// `needs_manual_fix` is set.
    pub mesh: IndexedMesh,
    /// Every reduction attempt failed; an operator has to finish the mesh.
    pub needs_manual_fix: bool,
    /// Reduction attempts made.
    pub reduction_attempts: u32,
}

/// Turns a messy boolean-assembly result into a printable solid.
///
/// Steps: unify, stitch, unify, drop sharp or thin triangles, unify, then
/// quality-preserving reduction with up to
/// [`RepairParams::max_reduction_attempts`] tries. The kernel is known to
/// fail reduction intermittently on the same input, so each failure is
/// logged, reported to [`Telemetry`], and followed by
/// [`RepairParams::retry_delay`] before the next try.
///
/// When every attempt fails the unreduced intermediate is returned with
/// [`RepairOutcome::needs_manual_fix`] set. Otherwise the reduced mesh goes
/// through [`filter_shells`] again and must come out valid.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use guide_kernel::{FailurePlan, KernelOp, StubKernel};
/// use guide_repair::{MeshRepairStage, RepairParams};
/// use guide_types::{IndexedMesh, Point3, ReductionParams};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(4.0, 0.0, 0.0),
///         Point3::new(0.0, 4.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// let kernel = StubKernel::new().failing(KernelOp::QualityPreservingReduce, FailurePlan::Always);
/// let reduction = ReductionParams::default();
/// let params = RepairParams::default().with_retry_delay(Duration::ZERO);
///
/// let outcome = MeshRepairStage::new(&kernel, &reduction, &params).run(&mesh);
/// assert!(outcome.is_ok_and(|o| o.needs_manual_fix));
/// assert_eq!(kernel.calls(KernelOp::QualityPreservingReduce), 3);
/// ```
pub struct MeshRepairStage<'a> {
    kernel: &'a dyn GeometryKernel,
    reduction: &'a ReductionParams,
    params: &'a RepairParams,
    telemetry: &'a dyn Telemetry,
    noise_threshold: f64,
    keep_largest: bool,
}

impl<'a> MeshRepairStage<'a> {
    /// Create a repair stage that reports nowhere and keeps only the
    /// largest shell.
    #[must_use]
    pub const fn new(
        kernel: &'a dyn GeometryKernel,
        reduction: &'a ReductionParams,
        params: &'a RepairParams,
    ) -> Self {
        Self {
            kernel,
            reduction,
            params,
            telemetry: &NoTelemetry,
            noise_threshold: 1.0,
            keep_largest: true,
        }
    }

    /// Report failed reduction attempts to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'a dyn Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Shell filtering applied to the reduced mesh.
    #[must_use]
    pub const fn with_shell_filter(mut self, noise_threshold: f64, keep_largest: bool) -> Self {
        self.noise_threshold = noise_threshold;
        self.keep_largest = keep_largest;
        self
    }

    /// Repair `mesh`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, a cleanup step empties the
    /// mesh, or the reduced and filtered result is empty or invalid. An
    /// exhausted reduction budget is not an error.
    pub fn run(&self, mesh: &IndexedMesh) -> RepairResult<RepairOutcome> {
        if mesh.is_empty() {
            return Err(RepairError::EmptyMesh);
        }

        let cleaned = self.clean(mesh)?;
        let attempts = self.params.max_reduction_attempts.max(1);

        let Some((reduced, attempt)) = self.reduce_with_retry(&cleaned, attempts) else {
            warn!(
                attempts,
                faces = cleaned.face_count(),
                "Quality-preserving reduction failed on every attempt, mesh needs a manual fix"
            );
            return Ok(RepairOutcome {
                mesh: cleaned,
                needs_manual_fix: true,
                reduction_attempts: attempts,
            });
        };

        let filtered = filter_shells(self.kernel, &reduced, self.keep_largest, self.noise_threshold)?;
        if !filtered.is_valid() {
            return Err(RepairError::invalid(
                "non-finite vertex or out-of-range face index",
            ));
        }

        info!(
            faces_before = mesh.face_count(),
            faces_after = filtered.face_count(),
            reduction_attempts = attempt,
            "Repaired guide mesh"
        );
        Ok(RepairOutcome {
            mesh: filtered,
            needs_manual_fix: false,
            reduction_attempts: attempt,
        })
    }

    /// Unify, stitch and sharp-triangle cleanup ahead of reduction.
    fn clean(&self, mesh: &IndexedMesh) -> RepairResult<IndexedMesh> {
        let unified = non_empty(self.kernel.unify(mesh), KernelOp::Unify)?;
        let stitched = non_empty(
            self.kernel.stitch(
                &unified,
                self.params.stitch_tolerance,
                self.params.stitch_passes,
            ),
            KernelOp::Stitch,
        )?;
        let unified = non_empty(self.kernel.unify(&stitched), KernelOp::Unify)?;
        let filtered = non_empty(
            self.kernel.filter_sharp_triangles(
                &unified,
                self.params.sharp_width_threshold,
                self.params.sharp_angle_threshold_deg,
            ),
            KernelOp::FilterSharpTriangles,
        )?;
        let unified = non_empty(self.kernel.unify(&filtered), KernelOp::Unify)?;
        debug!(
            faces_before = mesh.face_count(),
            faces_after = unified.face_count(),
            "Cleaned mesh ahead of reduction"
        );
        Ok(unified)
    }

    /// First successful reduction and the 1-based attempt that produced it.
    fn reduce_with_retry(&self, mesh: &IndexedMesh, attempts: u32) -> Option<(IndexedMesh, u32)> {
        for attempt in 1..=attempts {
            match self.kernel.quality_preserving_reduce(mesh, self.reduction) {
                Some(reduced) if !reduced.is_empty() => return Some((reduced, attempt)),
                result => {
                    let detail = if result.is_some() {
                        "returned an empty mesh"
                    } else {
                        "returned no mesh"
                    };
                    warn!(attempt, attempts, detail, "Quality-preserving reduction failed");
                    self.telemetry
                        .kernel_failure(KernelOp::QualityPreservingReduce, attempt, detail);
                    if attempt < attempts && !self.params.retry_delay.is_zero() {
                        thread::sleep(self.params.retry_delay);
                    }
                }
            }
        }
        None
    }
}

fn non_empty(mesh: IndexedMesh, op: KernelOp) -> RepairResult<IndexedMesh> {
    if mesh.is_empty() {
        Err(RepairError::EmptyAfter { op })
    } else {
        Ok(mesh)
    }
}
