//! Deterministic stand-in kernel.
//!
//! [`StubKernel`] implements [`GeometryKernel`] with simple, predictable
//! mesh manipulations, counts every call per [`KernelOp`] and can be told
//! to fail any operation always, for its first `n` calls, or never. It is
//! the failure-injection tool for pipeline tests and the engine behind
//! previews that run without the production geometry library.
//!
//! Operation semantics:
//!
//! | Operation | Result |
//! |---|---|
//! | union, wrap | concatenation of the inputs |
//! | subtract | target minus faces whose centroid lies in a tool's bounding box |
//! | intersect | faces of `a` whose centroid lies in `b`'s bounding box |
//! | fillet | concatenation of context and subject |
//! | sweep tube | triangular-section tube along the curve |
//! | everything else | a copy of the input |

use std::cell::RefCell;

use guide_types::{
    Aabb, Curve, IndexedMesh, LatticeParams, Point3, ReductionParams, RemeshParams, SmoothParams,
    Vector3,
};
use hashbrown::HashMap;
use tracing::debug;

use crate::error::{KernelError, KernelResult};
use crate::kernel::GeometryKernel;
use crate::op::KernelOp;
use crate::wrap::WrapParams;

/// When an operation of a [`StubKernel`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePlan {
    /// The operation always succeeds.
    #[default]
    Never,
    /// The operation always fails.
    Always,
    /// The first `n` calls fail, later calls succeed.
    FirstCalls(usize),
}

impl FailurePlan {
    /// Whether the call with zero-based number `call` fails.
    #[must_use]
    pub const fn fails_on(self, call: usize) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::FirstCalls(n) => call < n,
        }
    }
}

/// Deterministic kernel with call counting and failure injection.
///
/// # Example
///
/// ```
/// use guide_kernel::{FailurePlan, GeometryKernel, KernelOp, StubKernel};
/// use guide_types::{IndexedMesh, ReductionParams};
///
/// let kernel = StubKernel::new()
///     .failing(KernelOp::QualityPreservingReduce, FailurePlan::FirstCalls(1));
/// let mesh = IndexedMesh::new();
///
/// assert!(kernel.quality_preserving_reduce(&mesh, &ReductionParams::default()).is_none());
/// assert!(kernel.quality_preserving_reduce(&mesh, &ReductionParams::default()).is_some());
/// assert_eq!(kernel.calls(KernelOp::QualityPreservingReduce), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubKernel {
    plans: RefCell<HashMap<KernelOp, FailurePlan>>,
    calls: RefCell<HashMap<KernelOp, usize>>,
}

impl StubKernel {
    /// A kernel on which every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_failure`](Self::set_failure).
    #[must_use]
    pub fn failing(self, op: KernelOp, plan: FailurePlan) -> Self {
        self.set_failure(op, plan);
        self
    }

    /// Change the failure plan of `op`. Call counts are kept.
    pub fn set_failure(&self, op: KernelOp, plan: FailurePlan) {
        self.plans.borrow_mut().insert(op, plan);
    }

    /// Number of calls to `op` so far, failed ones included.
    #[must_use]
    pub fn calls(&self, op: KernelOp) -> usize {
        self.calls.borrow().get(&op).copied().unwrap_or(0)
    }

    /// Number of calls to any operation so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    /// Forget all call counts.
    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Record a call to `op` and report whether it should fail.
    fn record(&self, op: KernelOp) -> bool {
        let call = {
            let mut calls = self.calls.borrow_mut();
            let count = calls.entry(op).or_insert(0);
            let call = *count;
            *count += 1;
            call
        };
        let plan = self.plans.borrow().get(&op).copied().unwrap_or_default();
        let fails = plan.fails_on(call);
        if fails {
            debug!(%op, call, "Stub kernel injecting failure");
        }
        fails
    }

    fn copy_unless_failing(&self, op: KernelOp, mesh: &IndexedMesh) -> Option<IndexedMesh> {
        (!self.record(op)).then(|| mesh.clone())
    }
}

/// Faces of `mesh` whose centroid satisfies `keep`.
fn retain_faces(mesh: &IndexedMesh, keep: impl Fn(&Point3<f64>) -> bool) -> IndexedMesh {
    let kept: Vec<usize> = mesh
        .triangles()
        .enumerate()
        .filter(|(_, t)| keep(&t.centroid()))
        .map(|(i, _)| i)
        .collect();
    crate::shells::extract_faces(mesh, &kept)
}

/// Unit vector perpendicular to `v`.
fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let axis = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&axis).normalize()
}

/// Closed triangular-section tube along the polyline.
#[allow(clippy::cast_possible_truncation)]
fn triangular_tube(points: &[Point3<f64>], radius: f64) -> Option<IndexedMesh> {
    if points.len() < 2 || radius <= 0.0 {
        return None;
    }

    let mut mesh = IndexedMesh::new();
    let last = points.len() - 1;
    for (i, p) in points.iter().enumerate() {
        let tangent = if i == last {
            p - points[i - 1]
        } else {
            points[i + 1] - p
        };
        if tangent.norm() <= f64::EPSILON {
            return None;
        }
        let tangent = tangent.normalize();
        let u = perpendicular(&tangent);
        let w = tangent.cross(&u);
        for k in 0..3u32 {
            let angle = f64::from(k) * std::f64::consts::TAU / 3.0;
            mesh.vertices
                .push(p + (u * angle.cos() + w * angle.sin()) * radius);
        }
    }

    for ring in 0..last as u32 {
        let (a, b) = (ring * 3, (ring + 1) * 3);
        for k in 0..3 {
            let k1 = (k + 1) % 3;
            mesh.faces.push([a + k, a + k1, b + k1]);
            mesh.faces.push([a + k, b + k1, b + k]);
        }
    }
    let end = last as u32 * 3;
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([end, end + 1, end + 2]);
    Some(mesh)
}

impl GeometryKernel for StubKernel {
    fn boolean_union(&self, meshes: &[IndexedMesh]) -> KernelResult<IndexedMesh> {
        if self.record(KernelOp::Union) {
            return Err(KernelError::failed(KernelOp::Union, "injected failure"));
        }
        if meshes.is_empty() {
            return Err(KernelError::EmptyInput { op: KernelOp::Union });
        }
        Ok(IndexedMesh::concat(meshes))
    }

    fn boolean_subtract(&self, target: &IndexedMesh, tools: &[IndexedMesh]) -> IndexedMesh {
        if self.record(KernelOp::Subtract) {
            return IndexedMesh::new();
        }
        let boxes: Vec<Aabb> = tools
            .iter()
            .filter(|t| !t.is_empty())
            .map(IndexedMesh::bounds)
            .collect();
        retain_faces(target, |c| !boxes.iter().any(|b| b.contains(c)))
    }

    fn boolean_intersect(&self, a: &IndexedMesh, b: &IndexedMesh) -> IndexedMesh {
        if self.record(KernelOp::Intersect) || b.is_empty() {
            return IndexedMesh::new();
        }
        let bounds = b.bounds();
        retain_faces(a, |c| bounds.contains(c))
    }

    fn wrap(&self, meshes: &[IndexedMesh], _params: &WrapParams) -> KernelResult<IndexedMesh> {
        if self.record(KernelOp::Wrap) {
            return Err(KernelError::failed(KernelOp::Wrap, "injected failure"));
        }
        if meshes.iter().all(IndexedMesh::is_empty) {
            return Err(KernelError::EmptyInput { op: KernelOp::Wrap });
        }
        Ok(IndexedMesh::concat(meshes))
    }

    fn offset(&self, mesh: &IndexedMesh, _distance: f64) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::Offset, mesh)
    }

    fn remesh(&self, mesh: &IndexedMesh, _params: &RemeshParams) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::Remesh, mesh)
    }

    fn smooth(&self, mesh: &IndexedMesh, _params: &SmoothParams) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::Smooth, mesh)
    }

    fn stitch(&self, mesh: &IndexedMesh, _tolerance: f64, _passes: u32) -> IndexedMesh {
        self.copy_unless_failing(KernelOp::Stitch, mesh)
            .unwrap_or_default()
    }

    fn unify(&self, mesh: &IndexedMesh) -> IndexedMesh {
        self.copy_unless_failing(KernelOp::Unify, mesh)
            .unwrap_or_default()
    }

    fn filter_sharp_triangles(
        &self,
        mesh: &IndexedMesh,
        _width_threshold: f64,
        _angle_threshold_deg: f64,
    ) -> IndexedMesh {
        self.copy_unless_failing(KernelOp::FilterSharpTriangles, mesh)
            .unwrap_or_default()
    }

    fn fillet(
        &self,
        subject: &IndexedMesh,
        context: &IndexedMesh,
        _radius: f64,
        _tolerance: f64,
    ) -> KernelResult<IndexedMesh> {
        if self.record(KernelOp::Fillet) {
            return Err(KernelError::failed(KernelOp::Fillet, "injected failure"));
        }
        Ok(IndexedMesh::concat([context, subject]))
    }

    fn quality_preserving_reduce(
        &self,
        mesh: &IndexedMesh,
        _params: &ReductionParams,
    ) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::QualityPreservingReduce, mesh)
    }

    fn compensate_surface(
        &self,
        surface: &IndexedMesh,
        _isocurve_spacing: f64,
    ) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::CompensateSurface, surface)
    }

    fn lightweight_lattice(
        &self,
        surface: &IndexedMesh,
        _params: &LatticeParams,
    ) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::LightweightLattice, surface)
    }

    fn recover_patch(&self, surface: &IndexedMesh, _target: &IndexedMesh) -> Option<IndexedMesh> {
        self.copy_unless_failing(KernelOp::RecoverPatch, surface)
    }

    fn sweep_tube(&self, curve: &Curve, radius: f64) -> Option<IndexedMesh> {
        if self.record(KernelOp::SweepTube) {
            return None;
        }
        triangular_tube(&curve.points, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shells::tests::quad;

    #[test]
    fn counts_calls_including_failures() {
        let kernel = StubKernel::new().failing(KernelOp::Fillet, FailurePlan::Always);
        let mesh = quad(0.0, 0.0, 1.0, 0.0);

        assert!(kernel.fillet(&mesh, &mesh, 0.3, 0.01).is_err());
        assert!(kernel.fillet(&mesh, &mesh, 0.3, 0.01).is_err());
        let _ = kernel.unify(&mesh);

        assert_eq!(kernel.calls(KernelOp::Fillet), 2);
        assert_eq!(kernel.calls(KernelOp::Unify), 1);
        assert_eq!(kernel.calls(KernelOp::Union), 0);
        assert_eq!(kernel.total_calls(), 3);

        kernel.reset_calls();
        assert_eq!(kernel.total_calls(), 0);
    }

    #[test]
    fn first_calls_plan_recovers() {
        let kernel = StubKernel::new().failing(KernelOp::Offset, FailurePlan::FirstCalls(2));
        let mesh = quad(0.0, 0.0, 1.0, 0.0);
        assert!(kernel.offset(&mesh, 1.0).is_none());
        assert!(kernel.offset(&mesh, 1.0).is_none());
        assert_eq!(kernel.offset(&mesh, 1.0), Some(mesh));
    }

    #[test]
    fn union_concatenates_and_rejects_empty_input() {
        let kernel = StubKernel::new();
        let a = quad(0.0, 0.0, 1.0, 0.0);
        let b = quad(5.0, 0.0, 1.0, 0.0);
        let merged = kernel.boolean_union(&[a, b]).unwrap_or_default();
        assert_eq!(merged.face_count(), 4);
        assert!(matches!(
            kernel.boolean_union(&[]),
            Err(KernelError::EmptyInput { op: KernelOp::Union })
        ));
    }

    #[test]
    fn subtract_removes_faces_inside_tool_bounds() {
        let kernel = StubKernel::new();
        let mut target = quad(0.0, 0.0, 1.0, 0.0);
        target.merge(&quad(5.0, 0.0, 1.0, 0.0));
        let tool = quad(4.5, -0.5, 2.0, 0.0);

        let result = kernel.boolean_subtract(&target, &[tool]);
        assert_eq!(result.face_count(), 2);
        assert!(result.vertices.iter().all(|v| v.x <= 1.0));

        // Empty tool list leaves the target as it was.
        assert_eq!(kernel.boolean_subtract(&target, &[]).face_count(), 4);
    }

    #[test]
    fn intersect_keeps_overlap() {
        let kernel = StubKernel::new();
        let mut a = quad(0.0, 0.0, 1.0, 0.0);
        a.merge(&quad(5.0, 0.0, 1.0, 0.0));
        let b = quad(-1.0, -1.0, 3.0, 0.0);
        assert_eq!(kernel.boolean_intersect(&a, &b).face_count(), 2);
        assert!(kernel.boolean_intersect(&a, &IndexedMesh::new()).is_empty());
    }

    #[test]
    fn sweep_builds_closed_tube() {
        let kernel = StubKernel::new();
        let curve = Curve::open(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ]);
        let tube = kernel.sweep_tube(&curve, 0.2).unwrap_or_default();
        assert_eq!(tube.vertex_count(), 9);
        assert_eq!(tube.face_count(), 2 * 6 + 2);
        assert!(tube.is_valid());
        assert!(tube.vertices.iter().all(|v| v.z.abs() <= 0.2 + 1e-9));

        assert!(kernel.sweep_tube(&Curve::open(vec![Point3::origin()]), 0.2).is_none());
        assert!(kernel.sweep_tube(&curve, 0.0).is_none());
    }

    #[test]
    fn injected_failures_use_each_operation_signal() {
        let kernel = StubKernel::new();
        for op in [
            KernelOp::Union,
            KernelOp::Subtract,
            KernelOp::Wrap,
            KernelOp::Stitch,
            KernelOp::QualityPreservingReduce,
        ] {
            kernel.set_failure(op, FailurePlan::Always);
        }
        let mesh = quad(0.0, 0.0, 1.0, 0.0);

        assert!(kernel.boolean_union(std::slice::from_ref(&mesh)).is_err());
        assert!(kernel.boolean_subtract(&mesh, &[]).is_empty());
        assert!(kernel.wrap(std::slice::from_ref(&mesh), &WrapParams::new(0.2, 0.2)).is_err());
        assert!(kernel.stitch(&mesh, 0.01, 5).is_empty());
        assert!(
            kernel
                .quality_preserving_reduce(&mesh, &ReductionParams::default())
                .is_none()
        );
        assert_eq!(kernel.remesh(&mesh, &RemeshParams::default()), Some(mesh));
    }
}
