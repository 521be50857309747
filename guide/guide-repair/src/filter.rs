//! Shell filtering.

use std::cmp::Ordering;

use guide_kernel::{GeometryKernel, remove_noise_shells};
use guide_types::IndexedMesh;
use tracing::debug;

use crate::error::{RepairError, RepairResult};

/// Reduce an assembled mesh to its meaningful shells.
///
/// Shells below `noise_threshold` are dropped, the rest are ordered by
/// surface area, largest first. With `keep_largest` only the largest shell
/// survives, since manufacturing needs one connected solid. Otherwise every
/// remaining shell is kept, which is what previews want.
///
/// # Errors
///
/// Returns [`RepairError::EmptyShell`] if nothing is left.
///
/// # Example
///
/// ```
/// use guide_kernel::StubKernel;
/// use guide_repair::filter_shells;
/// use guide_types::{IndexedMesh, Point3};
///
/// let tri = |x: f64, size: f64| {
///     IndexedMesh::from_parts(
///         vec![
///             Point3::new(x, 0.0, 0.0),
///             Point3::new(x + size, 0.0, 0.0),
///             Point3::new(x, size, 0.0),
///         ],
///         vec![[0, 1, 2]],
///     )
/// };
/// let mesh = IndexedMesh::concat(&[tri(0.0, 2.0), tri(10.0, 4.0)]);
///
/// let kernel = StubKernel::new();
/// let largest = filter_shells(&kernel, &mesh, true, 1.0).unwrap_or_default();
/// assert_eq!(largest.face_count(), 1);
/// assert!((largest.surface_area() - 8.0).abs() < 1e-9);
/// ```
pub fn filter_shells(
    kernel: &dyn GeometryKernel,
    mesh: &IndexedMesh,
    keep_largest: bool,
    noise_threshold: f64,
) -> RepairResult<IndexedMesh> {
    let cleaned = remove_noise_shells(mesh, noise_threshold);
    let mut shells: Vec<(f64, IndexedMesh)> = kernel
        .split_disjoint(&cleaned)
        .into_iter()
        .map(|s| (s.surface_area(), s))
        .collect();
    shells.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let total = shells.len();
    let result = if keep_largest {
        shells.into_iter().next().map(|(_, s)| s).unwrap_or_default()
    } else {
        IndexedMesh::concat(shells.iter().map(|(_, s)| s))
    };
    if result.is_empty() {
        return Err(RepairError::EmptyShell);
    }

    debug!(
        shells = total,
        kept = if keep_largest { 1 } else { total },
        faces = result.face_count(),
        "Filtered shells"
    );
    Ok(result)
}
