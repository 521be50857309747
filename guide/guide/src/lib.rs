//! Surgical-guide assembly toolkit.
//!
//! This umbrella crate re-exports the guide-* crates, providing one API for
//! turning a case's building blocks into a printable guide mesh. Geometry
//! itself is delegated to a [`kernel::GeometryKernel`] implementation; the
//! bundled [`kernel::StubKernel`] is deterministic and suited to previews
//! and tests.
//!
//! # Quick Start
//!
//! ```
//! use guide::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = MemoryStore::new();
//! store.add_block(
//!     BlockKind::GuideSurface,
//!     Some(0),
//!     IndexedMesh::from_parts(
//!         vec![
//!             Point3::new(0.0, 0.0, 0.0),
//!             Point3::new(20.0, 0.0, 0.0),
//!             Point3::new(20.0, 20.0, 0.0),
//!             Point3::new(0.0, 20.0, 0.0),
//!         ],
//!         vec![[0, 1, 2], [0, 2, 3]],
//!     ),
//! );
//!
//! let kernel = StubKernel::new();
//! let params = GuideParameters::default();
//! let creator = GuideCreator::new(&kernel, &params, CreationOptions::preview())?;
//!
//! let creation = creator.create(&store, 0, &NoQc);
//! assert!(creation.is_success(), "{}", creation.summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - `IndexedMesh`, `Triangle`, `Curve`, identifiers and `GuideParameters`
//! - [`kernel`] - The `GeometryKernel` seam, shell diagnostics and `StubKernel`
//! - [`cache`] - Building-block store and the per-guide `ResourceCache`
//!
//! ## Pipeline Stages
//! - [`base`] - Lattice base shell from the guide surfaces
//! - [`slot`] - Osteotomy cut slots with link protection
//! - [`connector`] - Connectors for components floating off the base shell
//! - [`repair`] - Shell filtering and final mesh repair
//!
//! ## Orchestration
//! - [`assembly`] - `GuideCreator` state machine and the case-level runner
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for every parameter struct

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Meshes, curves, identifiers and parameters.
pub use guide_types as types;

/// Geometry-kernel seam and the deterministic stub kernel.
pub use guide_kernel as kernel;

/// Building-block store and per-guide resource cache.
pub use guide_cache as cache;

/// Lattice base-shell construction.
pub use guide_base as base;

/// Osteotomy cut-slot subtraction.
pub use guide_slot as slot;

/// Floating-entity detection and connector tubes.
pub use guide_connector as connector;

/// Shell filtering and mesh repair.
pub use guide_repair as repair;

/// Guide-creation orchestration.
pub use guide_assembly as assembly;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for guide creation.
///
/// # Usage
///
/// ```
/// use guide::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use guide_types::{
        BarrelType, GuideParameters, IndexedMesh, Isometry3, Point3, ScrewId, Vector3,
    };

    // Kernel
    pub use guide_kernel::{GeometryKernel, KernelOp, StubKernel};

    // Building blocks
    pub use guide_cache::{
        BlockKind, BuildingBlockStore, FixationScrew, MemoryStore, RegisteredBarrel,
    };

    // Repair
    pub use guide_repair::{RepairParams, Telemetry};

    // Orchestration (main use case)
    pub use guide_assembly::{
        CaseGuideRunner, CreationOptions, GuideCreation, GuideCreator, NoQc, QcReporter,
    };
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = IndexedMesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(StubKernel::new().total_calls(), 0);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::GuideParameters::default();
        let _ = repair::RepairParams::default();
        let _ = assembly::CreationOptions::default();
        assert!(cache::MemoryStore::new().block_count() == 0);
    }
}
