//! The geometry-kernel contract.

use guide_types::{
    Curve, IndexedMesh, LatticeParams, Point3, ReductionParams, RemeshParams, SmoothParams,
};

use crate::error::KernelResult;
use crate::path::shortest_path;
use crate::shells::{meshes_intersect, split_disjoint};
use crate::wrap::WrapParams;

/// Mesh-geometry services consumed by the guide-assembly pipeline.
///
/// Implementations wrap an external geometry library. Every operation is
/// synchronous and borrows its inputs; results are fresh meshes. Failure is
/// signalled per operation the way the pipeline's call sites expect it:
///
/// - `Result` for operations that report success explicitly
///   (union, wrap, fillet),
/// - `Option` for operations that may return nothing
///   (offset, remesh, smooth, reduction, compensation, lattice, patch
///   recovery, sweep),
/// - a plain mesh for operations that never report failure
///   (subtract, intersect, stitch, unify, sharp filter); callers validate
///   those results themselves.
///
/// Disjoint-shell splitting, collision tests and shortest paths have native
/// default implementations.
pub trait GeometryKernel {
    /// Boolean union of all meshes.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel reports failure or `meshes` is empty.
    fn boolean_union(&self, meshes: &[IndexedMesh]) -> KernelResult<IndexedMesh>;

    /// Subtract every tool from `target`. Never reports failure; the result
    /// may be empty or degenerate.
    fn boolean_subtract(&self, target: &IndexedMesh, tools: &[IndexedMesh]) -> IndexedMesh;

    /// Boolean intersection of `a` and `b`. Never reports failure.
    fn boolean_intersect(&self, a: &IndexedMesh, b: &IndexedMesh) -> IndexedMesh;

    /// Wrap the meshes into one closed envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel reports failure or `meshes` is empty.
    fn wrap(&self, meshes: &[IndexedMesh], params: &WrapParams) -> KernelResult<IndexedMesh>;

    /// Offset the surface by `distance` (negative is inward).
    fn offset(&self, mesh: &IndexedMesh, distance: f64) -> Option<IndexedMesh>;

    /// Remesh with the given thresholds.
    fn remesh(&self, mesh: &IndexedMesh, params: &RemeshParams) -> Option<IndexedMesh>;

    /// Smooth the surface.
    fn smooth(&self, mesh: &IndexedMesh, params: &SmoothParams) -> Option<IndexedMesh>;

    /// Stitch near-coincident edges within `tolerance`, up to `passes` times.
    fn stitch(&self, mesh: &IndexedMesh, tolerance: f64, passes: u32) -> IndexedMesh;

    /// Unify face orientation and merge duplicate topology.
    fn unify(&self, mesh: &IndexedMesh) -> IndexedMesh;

    /// Remove triangles thinner than `width_threshold` or sharper than
    /// `angle_threshold_deg`.
    fn filter_sharp_triangles(
        &self,
        mesh: &IndexedMesh,
        width_threshold: f64,
        angle_threshold_deg: f64,
    ) -> IndexedMesh;

    /// Fillet `subject` into `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel cannot build the fillet.
    fn fillet(
        &self,
        subject: &IndexedMesh,
        context: &IndexedMesh,
        radius: f64,
        tolerance: f64,
    ) -> KernelResult<IndexedMesh>;

    /// Quality-preserving triangle reduction. Known to fail intermittently.
    fn quality_preserving_reduce(
        &self,
        mesh: &IndexedMesh,
        params: &ReductionParams,
    ) -> Option<IndexedMesh>;

    /// Surface variant whose interior isocurves are spaced at
    /// `isocurve_spacing`.
    fn compensate_surface(&self, surface: &IndexedMesh, isocurve_spacing: f64)
    -> Option<IndexedMesh>;

    /// Sweep the lattice segments along the surface skeleton.
    fn lightweight_lattice(
        &self,
        surface: &IndexedMesh,
        params: &LatticeParams,
    ) -> Option<IndexedMesh>;

    /// Recover the as-built position of `surface` on `target`.
    fn recover_patch(&self, surface: &IndexedMesh, target: &IndexedMesh) -> Option<IndexedMesh>;

    /// Sweep a closed tube of `radius` along `curve`.
    fn sweep_tube(&self, curve: &Curve, radius: f64) -> Option<IndexedMesh>;

    /// Split into disjoint shells.
    fn split_disjoint(&self, mesh: &IndexedMesh) -> Vec<IndexedMesh> {
        split_disjoint(mesh)
    }

    /// Whether the two meshes touch or overlap.
    fn meshes_collide(&self, a: &IndexedMesh, b: &IndexedMesh) -> bool {
        meshes_intersect(a, b)
    }

    /// Shortest path along mesh edges from `from_vertex` towards `to`,
    /// ending exactly at `to`.
    fn shortest_path_on_mesh(
        &self,
        mesh: &IndexedMesh,
        from_vertex: u32,
        to: &Point3<f64>,
    ) -> Option<Vec<Point3<f64>>> {
        shortest_path(mesh, from_vertex, to)
    }
}
