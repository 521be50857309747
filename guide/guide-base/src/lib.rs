//! Lightweight lattice base shell for surgical guides.
//!
//! The raw guide surfaces drawn for a guide are often several disjoint
//! patches with slivers of noise. [`GuideBaseSurfaceBuilder`] cleans them,
//! compensates each piece to the configured isocurve spacing, reduces the
//! result and sweeps it into the lattice shell that every other component
//! is unioned onto.
//!
//! # Example
//!
//! ```
//! use guide_base::{BaseSurfaceError, GuideBaseSurfaceBuilder};
//! use guide_kernel::StubKernel;
//! use guide_types::GuideParameters;
//!
//! let kernel = StubKernel::new();
//! let params = GuideParameters::default();
//! let result = GuideBaseSurfaceBuilder::new(&kernel, &params).build(&[]);
//! assert_eq!(result.err(), Some(BaseSurfaceError::EmptyInput));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod builder;
mod error;

pub use builder::{BaseSurface, GuideBaseSurfaceBuilder};
pub use error::{BaseSurfaceError, BaseSurfaceResult};
