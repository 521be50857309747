//! Names of kernel operations, used for logging, telemetry and call counting.

use std::fmt;

/// A geometry-kernel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelOp {
    /// Boolean union.
    Union,
    /// Boolean subtraction.
    Subtract,
    /// Boolean intersection.
    Intersect,
    /// Wrap (closed offset envelope).
    Wrap,
    /// Surface offset.
    Offset,
    /// Remesh.
    Remesh,
    /// Smoothing.
    Smooth,
    /// Edge stitching.
    Stitch,
    /// Orientation unification.
    Unify,
    /// Sharp/thin triangle filtering.
    FilterSharpTriangles,
    /// Fillet between two meshes.
    Fillet,
    /// Quality-preserving triangle reduction.
    QualityPreservingReduce,
    /// Isocurve compensation of a guide surface.
    CompensateSurface,
    /// Lightweight lattice sweep.
    LightweightLattice,
    /// Recovery of an as-built patch on a target surface.
    RecoverPatch,
    /// Tube sweep along a curve.
    SweepTube,
}

impl fmt::Display for KernelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Union => "boolean union",
            Self::Subtract => "boolean subtraction",
            Self::Intersect => "boolean intersection",
            Self::Wrap => "wrap",
            Self::Offset => "offset",
            Self::Remesh => "remesh",
            Self::Smooth => "smooth",
            Self::Stitch => "stitch",
            Self::Unify => "unify",
            Self::FilterSharpTriangles => "sharp triangle filter",
            Self::Fillet => "fillet",
            Self::QualityPreservingReduce => "quality-preserving reduction",
            Self::CompensateSurface => "surface compensation",
            Self::LightweightLattice => "lightweight lattice",
            Self::RecoverPatch => "patch recovery",
            Self::SweepTube => "tube sweep",
        };
        f.write_str(name)
    }
}
