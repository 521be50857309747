//! Geometry-kernel contract for surgical guide assembly.
//!
//! The heavy mesh operations (booleans, wraps, remeshing, fillets,
//! reductions) belong to an external geometry library. This crate defines
//! the [`GeometryKernel`] trait through which the pipeline consumes them,
//! plus the pieces that are simple enough to run natively:
//!
//! - [`shells`] - Disjoint-shell splitting, noise-shell removal, collision tests
//! - [`path`] - Shortest paths along mesh edges
//! - [`StubKernel`] - Deterministic kernel with call counting and failure injection
//!
//! # Failure signalling
//!
//! Kernel operations report failure in one of three ways, matching what
//! the pipeline checks at each call site: `KernelResult` for union, wrap
//! and fillet; `Option` for operations that may return nothing; and a
//! plain (possibly empty) mesh for operations that never report failure.
//!
//! # Example
//!
//! ```
//! use guide_kernel::{GeometryKernel, StubKernel};
//! use guide_types::{IndexedMesh, Point3};
//!
//! let kernel = StubKernel::new();
//! let tri = IndexedMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! let merged = kernel.boolean_union(&[tri.clone(), tri]).unwrap_or_default();
//! assert_eq!(merged.face_count(), 2);
//! assert_eq!(kernel.split_disjoint(&merged).len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod kernel;
mod op;
pub mod path;
pub mod shells;
mod stub;
mod wrap;

pub use error::{KernelError, KernelResult};
pub use kernel::GeometryKernel;
pub use op::KernelOp;
pub use path::{EdgeGraph, shortest_path};
pub use shells::{
    extract_faces, meshes_intersect, remove_noise_shells, shells_by_area, split_disjoint,
};
pub use stub::{FailurePlan, StubKernel};
pub use wrap::WrapParams;
