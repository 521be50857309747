//! Core types for surgical guide assembly.
//!
//! This crate provides the data model shared by every stage of the
//! guide-assembly pipeline:
//!
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Triangle`] - A triangle with resolved positions (closest point, edge tests)
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Curve`] - Polyline used for cut boundaries and sweep paths
//! - [`ScrewId`], [`ObjectId`], [`BarrelType`] - Identifiers
//! - [`GuideParameters`] - Immutable configuration for one guide-creation run
//!
//! # Units
//!
//! All coordinates are `f64` millimeters.
//!
//! # Example
//!
//! ```
//! use guide_types::{GuideParameters, IndexedMesh, Point3};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
//! assert!(GuideParameters::default().validate().is_ok());
//! ```
//!
//! # Features
//!
//! - `serde` - Serialize/deserialize meshes, curves and parameters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod curve;
mod error;
mod ids;
mod mesh;
mod params;
mod triangle;

pub use bounds::Aabb;
pub use curve::Curve;
pub use error::{ParamsError, ParamsResult};
pub use ids::{BarrelType, ObjectId, ScrewId};
pub use mesh::{ClosestPoint, IndexedMesh};
pub use params::{
    BarrelFilletParams, ConnectorParams, GuideParameters, LatticeParams, ReductionParams,
    RemeshParams, SmoothParams, TransitionParams,
};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, Vector3};
