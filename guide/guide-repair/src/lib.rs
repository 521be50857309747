//! Shell filtering and mesh repair for assembled surgical guides.
//!
//! A boolean assembly is rarely printable as it comes out of the kernel.
//! This crate provides the last two pipeline steps:
//!
//! - [`filter_shells`] - Drop noise shells and keep the largest connected
//!   piece (or all pieces, for previews)
//! - [`MeshRepairStage`] - Unify, stitch, clean sharp triangles and reduce,
//!   retrying the kernel's flaky reduction a bounded number of times
//!
//! An exhausted retry budget is not a failure: the unreduced mesh is
//! returned with [`RepairOutcome::needs_manual_fix`] set so an operator can
//! finish it.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use guide_kernel::StubKernel;
//! use guide_repair::{MeshRepairStage, RepairParams};
//! use guide_types::{IndexedMesh, Point3, ReductionParams};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(4.0, 0.0, 0.0),
//!         Point3::new(0.0, 4.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! let kernel = StubKernel::new();
//! let reduction = ReductionParams::default();
//! let params = RepairParams::default().with_retry_delay(Duration::ZERO);
//! let outcome = MeshRepairStage::new(&kernel, &reduction, &params).run(&mesh);
//! assert!(outcome.is_ok_and(|o| !o.needs_manual_fix));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod filter;
mod params;
mod stage;
mod telemetry;

pub use error::{RepairError, RepairResult};
pub use filter::filter_shells;
pub use params::RepairParams;
pub use stage::{MeshRepairStage, RepairOutcome};
pub use telemetry::{NoTelemetry, Telemetry, TelemetryEvent, TelemetryLog};
