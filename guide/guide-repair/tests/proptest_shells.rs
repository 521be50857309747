//! Property-based tests for shell filtering.
//!
//! Run with: cargo test -p guide-repair -- proptest

use guide_kernel::{StubKernel, split_disjoint};
use guide_repair::filter_shells;
use guide_types::{IndexedMesh, Point3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// An axis-aligned square of two triangles.
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

/// Between one and eight disjoint squares laid out on a row, each with its
/// own size and vertical offset.
fn arb_shells() -> impl Strategy<Value = IndexedMesh> {
    prop::collection::vec((0.1..5.0f64, -10.0..10.0f64), 1..=8).prop_map(|pieces| {
        let squares: Vec<IndexedMesh> = pieces
            .iter()
            .enumerate()
            .map(|(i, &(size, y0))| {
                #[allow(clippy::cast_precision_loss)]
                let x0 = i as f64 * 10.0;
                square(x0, y0, size)
            })
            .collect();
        IndexedMesh::concat(&squares)
    })
}

// =============================================================================
// Property Tests: Shell Filtering
// =============================================================================

proptest! {
    /// Keeping the largest shell yields one connected shell at least as
    /// large as every shell of the input.
    #[test]
    fn largest_shell_dominates_every_input_shell(mesh in arb_shells()) {
        let kernel = StubKernel::new();
        let result = filter_shells(&kernel, &mesh, true, 0.0);
        prop_assert!(result.is_ok());
        let result = result.unwrap_or_default();

        prop_assert_eq!(split_disjoint(&result).len(), 1);
        let kept = result.surface_area();
        for shell in split_disjoint(&mesh) {
            prop_assert!(kept >= shell.surface_area() - 1e-9);
        }
    }

    /// Filtering never adds faces.
    #[test]
    fn filtering_never_grows_the_mesh(mesh in arb_shells(), keep_largest in any::<bool>(), threshold in 0.0..4.0f64) {
        let kernel = StubKernel::new();
        if let Ok(result) = filter_shells(&kernel, &mesh, keep_largest, threshold) {
            prop_assert!(result.face_count() <= mesh.face_count());
            prop_assert!(result.is_valid());
        }
    }

    /// Without keep-largest, every shell above the threshold survives.
    #[test]
    fn preview_keeps_all_shells_above_threshold(mesh in arb_shells(), threshold in 0.0..4.0f64) {
        let kernel = StubKernel::new();
        let expected = split_disjoint(&mesh)
            .iter()
            .filter(|s| s.surface_area() >= threshold)
            .count();

        match filter_shells(&kernel, &mesh, false, threshold) {
            Ok(result) => prop_assert_eq!(split_disjoint(&result).len(), expected),
            Err(_) => prop_assert_eq!(expected, 0),
        }
    }
}
