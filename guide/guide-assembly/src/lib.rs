//! Guide-assembly orchestration.
//!
//! [`GuideCreator`] turns a case's building blocks into one printable
//! surgical guide:
//!
//! | Stage | What happens | On failure |
//! |-------|--------------|------------|
//! | `BaseReady` | Lattice shell from the smoothed guide surfaces | fatal |
//! | `SolidSurfaceMerged` | Solid patches merged at a relieved seam | fatal |
//! | `CutSlotApplied` | Osteotomies cut, link surfaces shielded | fatal |
//! | `ComponentsUnioned` | Eyes, bridges, flanges, barrels, connectors | fatal |
//! | `BarrelsResolved` | Marking barrels subtracted and filleted | degraded per barrel |
//! | `ClearanceCut` | Anatomy/eye/barrel clearance, teeth blocks | fatal on union |
//! | `ShellFiltered` | Noise and stray pieces removed | fatal if empty |
//! | `Repaired` | Stitch, clean, bounded-retry reduction | manual-fix flag |
//!
//! Fatal failures end the run with an [`AssemblyError`] in the returned
//! [`GuideCreation`]. Degraded steps are logged and surface through
//! [`GuideCreation::failed_barrels`] and
//! [`GuideCreation::needs_manual_fix`]; failed barrels are also handed to
//! a [`QcReporter`].
//!
//! [`CaseGuideRunner`] creates several guides of one case strictly one
//! after another.
//!
//! # Example
//!
//! ```
//! use guide_assembly::{AssemblyError, CreationOptions, GuideCreator, NoQc};
//! use guide_cache::MemoryStore;
//! use guide_kernel::StubKernel;
//! use guide_types::GuideParameters;
//!
//! let kernel = StubKernel::new();
//! let params = GuideParameters::default();
//! let Ok(creator) = GuideCreator::new(&kernel, &params, CreationOptions::default()) else {
//!     return;
//! };
//!
//! // An empty case has nothing to build a base from.
//! let creation = creator.create(&MemoryStore::new(), 0, &NoQc);
//! assert!(matches!(creation.error, Some(AssemblyError::BaseSurface(_))));
//! assert_eq!(creation.summary(), "guide 0 could not be created: base surface: no guide surfaces to build from");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod barrel;
mod components;
mod creation;
mod creator;
mod error;
mod options;
mod qc;
mod runner;
mod stage;

pub use barrel::{BarrelOutcome, FailedBarrelSet};
pub use creation::GuideCreation;
pub use creator::GuideCreator;
pub use error::{AssemblyError, AssemblyResult};
pub use options::CreationOptions;
pub use qc::{NoQc, QcEvent, QcLog, QcReporter};
pub use runner::CaseGuideRunner;
pub use stage::AssemblyStage;
