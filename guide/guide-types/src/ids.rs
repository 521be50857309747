//! Identifiers for screws, barrels and building-block objects.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a fixation screw. A barrel is identified by its screw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScrewId(pub u32);

impl fmt::Display for ScrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screw #{}", self.0)
    }
}

/// Identifier of a building-block object in the case's object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object #{}", self.0)
    }
}

/// Barrel flavour of a fixation screw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BarrelType {
    /// Plain sleeve; the transformed barrel shape is used as-is.
    #[default]
    Standard,
    /// Sleeve that also leaves an index mark on the anatomy. Its shape is
    /// conformed to the surface wrap and filleted into the guide.
    Marking,
}

impl BarrelType {
    /// Whether this barrel needs the conformal shape and fillet path.
    #[must_use]
    pub const fn is_marking(self) -> bool {
        matches!(self, Self::Marking)
    }
}

impl fmt::Display for BarrelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Marking => write!(f, "marking"),
        }
    }
}
