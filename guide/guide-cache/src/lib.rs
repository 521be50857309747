//! Per-guide resource cache for surgical guide assembly.
//!
//! A guide is assembled from roughly fifteen named geometry inputs: the
//! anatomy support mesh, surface wrap, raw and smoothed guide surfaces,
//! link and solid surfaces, osteotomies, bridges with their frames,
//! flanges, teeth blocks, fixation screws with their eyes, and barrel
//! shape/subtractor pairs. [`ResourceCache`] computes each of them on first
//! request from a [`BuildingBlockStore`] and a
//! [`GeometryKernel`](guide_kernel::GeometryKernel), memoizes the result and
//! releases everything as a unit.
//!
//! - [`ResourceCache`] - Key to lazily evaluated value map with bulk disposal
//! - [`BuildingBlockStore`], [`MemoryStore`] - The case's object store
//! - [`BackgroundDerivative`] - Read-only derivatives on a worker thread
//!
//! # Example
//!
//! ```
//! use guide_cache::{BlockKind, MemoryStore, ResourceCache};
//! use guide_kernel::StubKernel;
//! use guide_types::{GuideParameters, IndexedMesh, Point3};
//!
//! let mut store = MemoryStore::new();
//! store.add_block(
//!     BlockKind::GuideSurface,
//!     Some(0),
//!     IndexedMesh::from_parts(
//!         vec![
//!             Point3::new(0.0, 0.0, 0.0),
//!             Point3::new(1.0, 0.0, 0.0),
//!             Point3::new(0.0, 1.0, 0.0),
//!         ],
//!         vec![[0, 1, 2]],
//!     ),
//! );
//!
//! let kernel = StubKernel::new();
//! let params = GuideParameters::default();
//! let mut cache = ResourceCache::new(&store, &kernel, &params, 0);
//!
//! assert_eq!(cache.guide_surfaces().len(), 1);
//! assert!(cache.osteotomies().is_none());
//! assert!(cache.barrels().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod background;
mod cache;
mod error;
mod resource;
mod store;

pub use background::BackgroundDerivative;
pub use cache::{DisposalReport, ResourceCache};
pub use error::{CacheError, CacheResult};
pub use resource::{BarrelEntry, ComponentKind, FramedMesh, Resource};
pub use store::{
    BlockKind, BuildingBlock, BuildingBlockStore, FixationScrew, MemoryStore, RegisteredBarrel,
};
