//! Cut-slot subtraction.

use std::borrow::Cow;

use guide_kernel::{GeometryKernel, KernelOp, WrapParams};
use guide_types::{GuideParameters, IndexedMesh};
use tracing::{debug, info, warn};

use crate::error::{SlotError, SlotResult};

/// Carves osteotomy geometry out of the base shell.
///
/// - Without osteotomy geometry the base passes through untouched, as a
///   borrow of the input, and no kernel call is made.
/// - Without link surfaces the osteotomy is subtracted directly.
/// - Otherwise the link surfaces are recovered on the surface wrap,
///   offset by [`GuideParameters::link_protection_offset`], remeshed,
///   smoothed and wrapped into a protection volume. The osteotomy minus
///   that volume is what gets subtracted, so link regions stay intact.
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
///
/// use guide_kernel::StubKernel;
/// use guide_slot::CutSlotSubtractor;
/// use guide_types::{GuideParameters, IndexedMesh};
///
/// let kernel = StubKernel::new();
/// let params = GuideParameters::default();
/// let lattice = IndexedMesh::new();
///
/// let result = CutSlotSubtractor::new(&kernel, &params).apply(&lattice, None, &[], &lattice);
/// assert!(matches!(result, Ok(Cow::Borrowed(_))));
/// assert_eq!(kernel.total_calls(), 0);
/// ```
pub struct CutSlotSubtractor<'a> {
    kernel: &'a dyn GeometryKernel,
    params: &'a GuideParameters,
}

impl<'a> CutSlotSubtractor<'a> {
    /// Create a subtractor.
    #[must_use]
    pub const fn new(kernel: &'a dyn GeometryKernel, params: &'a GuideParameters) -> Self {
        Self { kernel, params }
    }

    /// Cut the osteotomy out of `lattice`, shielding `links`.
    ///
    /// # Errors
    ///
    /// Returns an error if the protection volume cannot be built or the
    /// subtraction leaves nothing.
    pub fn apply<'m>(
        &self,
        lattice: &'m IndexedMesh,
        osteotomy: Option<&IndexedMesh>,
        links: &[IndexedMesh],
        surface_wrap: &IndexedMesh,
    ) -> SlotResult<Cow<'m, IndexedMesh>> {
        let Some(osteotomy) = osteotomy.filter(|o| !o.is_empty()) else {
            debug!("No osteotomy, base passes through");
            return Ok(Cow::Borrowed(lattice));
        };

        let cut = if links.is_empty() {
            Cow::Borrowed(osteotomy)
        } else {
            let protection = self.protection_volume(links, surface_wrap)?;
            let trimmed = self
                .kernel
                .boolean_subtract(osteotomy, std::slice::from_ref(&protection));
            if trimmed.is_empty() {
                info!("Osteotomy lies entirely inside link protection, nothing to cut");
                return Ok(Cow::Borrowed(lattice));
            }
            Cow::Owned(trimmed)
        };

        let result = self
            .kernel
            .boolean_subtract(lattice, std::slice::from_ref(cut.as_ref()));
        if result.is_empty() {
            return Err(SlotError::EmptyResult);
        }
        debug!(
            faces_before = lattice.face_count(),
            faces_after = result.face_count(),
            shielded = !links.is_empty(),
            "Applied cut slot"
        );
        Ok(Cow::Owned(result))
    }

    /// Closed volume around the link surfaces that the cut must not enter.
    fn protection_volume(
        &self,
        links: &[IndexedMesh],
        surface_wrap: &IndexedMesh,
    ) -> SlotResult<IndexedMesh> {
        let recovered: Vec<IndexedMesh> = links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                self.kernel
                    .recover_patch(link, surface_wrap)
                    .unwrap_or_else(|| {
                        warn!(link = i, "Patch recovery failed, using the untrimmed link surface");
                        link.clone()
                    })
            })
            .collect();

        let offset = self
            .kernel
            .offset(
                &IndexedMesh::concat(&recovered),
                self.params.link_protection_offset(),
            )
            .ok_or(SlotError::ProtectionFailed {
                op: KernelOp::Offset,
            })?;

        let remeshed = self
            .kernel
            .remesh(&offset, &self.params.remesh)
            .unwrap_or_else(|| {
                warn!("Remeshing the link protection failed, continuing with the offset");
                offset
            });
        let smoothed = self
            .kernel
            .smooth(&remeshed, &self.params.smooth)
            .unwrap_or_else(|| {
                warn!("Smoothing the link protection failed, continuing unsmoothed");
                remeshed
            });

        let wrap = WrapParams::new(
            self.params.wrap_smallest_detail,
            self.params.wrap_gap_closing_distance,
        )
        .protecting_thin_walls();
        Ok(self.kernel.wrap(&[smoothed], &wrap)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_kernel::{FailurePlan, StubKernel};
    use guide_types::Point3;

    fn square(x0: f64, y0: f64, size: f64) -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(x0, y0, 0.0),
                Point3::new(x0 + size, y0, 0.0),
                Point3::new(x0 + size, y0 + size, 0.0),
                Point3::new(x0, y0 + size, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// Three unit squares at x = 0, 2 and 4.
    fn lattice() -> IndexedMesh {
        IndexedMesh::concat(&[
            square(0.0, 0.0, 1.0),
            square(2.0, 0.0, 1.0),
            square(4.0, 0.0, 1.0),
        ])
    }

    /// Cuts through the squares at x = 2 and x = 4.
    fn osteotomy() -> IndexedMesh {
        IndexedMesh::concat(&[square(2.0, 0.0, 1.0), square(4.0, 0.0, 1.0)])
    }

    #[test]
    fn no_osteotomy_returns_input_without_kernel_calls() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let base = lattice();
        let links = [square(4.0, 0.0, 1.0)];

        let result = CutSlotSubtractor::new(&kernel, &params).apply(&base, None, &links, &base);
        match result {
            Ok(Cow::Borrowed(out)) => assert!(std::ptr::eq(out, &base)),
            other => panic!("expected passthrough, got {other:?}"),
        }
        assert_eq!(kernel.total_calls(), 0);

        let empty = IndexedMesh::new();
        let result =
            CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&empty), &links, &base);
        assert!(matches!(result, Ok(Cow::Borrowed(_))));
        assert_eq!(kernel.total_calls(), 0);
    }

    #[test]
    fn direct_subtraction_without_links() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let base = lattice();
        let cut = osteotomy();

        let result = CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&cut), &[], &base);
        assert_eq!(result.map(|m| m.face_count()).ok(), Some(2));
        assert_eq!(kernel.calls(KernelOp::Subtract), 1);
        assert_eq!(kernel.calls(KernelOp::Wrap), 0);
    }

    #[test]
    fn links_are_shielded_from_the_cut() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let base = lattice();
        let cut = osteotomy();
        let links = [square(3.8, -0.2, 1.4)];

        let result =
            CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&cut), &links, &base);
        let Ok(mesh) = result else {
            panic!("cut slot failed");
        };

        // Square at x = 4 is protected, square at x = 2 is cut.
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh.vertices.iter().all(|v| v.x < 2.0 || v.x >= 4.0));
        for op in [
            KernelOp::RecoverPatch,
            KernelOp::Offset,
            KernelOp::Remesh,
            KernelOp::Smooth,
            KernelOp::Wrap,
        ] {
            assert_eq!(kernel.calls(op), 1, "{op}");
        }
        assert_eq!(kernel.calls(KernelOp::Subtract), 2);
    }

    #[test]
    fn failed_patch_recovery_degrades_to_raw_link() {
        let kernel = StubKernel::new().failing(KernelOp::RecoverPatch, FailurePlan::Always);
        let params = GuideParameters::default();
        let base = lattice();
        let cut = osteotomy();
        let links = [square(3.8, -0.2, 1.4), square(10.0, 0.0, 1.0)];

        let result =
            CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&cut), &links, &base);
        assert!(result.is_ok());
        assert_eq!(kernel.calls(KernelOp::RecoverPatch), 2);
    }

    #[test]
    fn failed_protection_offset_is_fatal() {
        let kernel = StubKernel::new().failing(KernelOp::Offset, FailurePlan::Always);
        let params = GuideParameters::default();
        let base = lattice();
        let cut = osteotomy();
        let links = [square(3.8, -0.2, 1.4)];

        let result =
            CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&cut), &links, &base);
        assert_eq!(
            result.err(),
            Some(SlotError::ProtectionFailed {
                op: KernelOp::Offset
            })
        );
    }

    #[test]
    fn cutting_everything_is_an_error() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let base = square(2.0, 0.0, 1.0);
        let cut = square(2.0, 0.0, 1.0);

        let result = CutSlotSubtractor::new(&kernel, &params).apply(&base, Some(&cut), &[], &base);
        assert_eq!(result.err(), Some(SlotError::EmptyResult));
    }
}
