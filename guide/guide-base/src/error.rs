//! Error types for base-surface construction.

use thiserror::Error;

/// Result type for base-surface construction.
pub type BaseSurfaceResult<T> = Result<T, BaseSurfaceError>;

/// Errors that abort base-surface construction. There is no partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BaseSurfaceError {
    /// No guide surface was supplied.
    #[error("no guide surfaces to build from")]
    EmptyInput,

    /// Every shell was smaller than the noise threshold.
    #[error("all guide surface shells are below the noise threshold of {threshold}")]
    OnlyNoise {
        /// Area threshold in mm².
        threshold: f64,
    },

    /// Isocurve compensation failed for one piece.
    #[error("surface compensation failed for piece {piece} of {pieces}")]
    CompensationFailed {
        /// Zero-based index of the failing piece.
        piece: usize,
        /// Number of pieces.
        pieces: usize,
    },

    /// The lattice sweep produced nothing.
    #[error("lightweight lattice generation failed")]
    LatticeFailed,
}
