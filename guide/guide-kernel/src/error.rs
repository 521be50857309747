//! Error types for kernel operations.

use thiserror::Error;

use crate::op::KernelOp;

/// Result type for kernel operations that report failure explicitly.
pub type KernelResult<T> = Result<T, KernelError>;

/// Failure reported by a geometry-kernel operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The operation ran but reported failure.
    #[error("{op} failed: {reason}")]
    OperationFailed {
        /// The failing operation.
        op: KernelOp,
        /// Kernel-provided reason.
        reason: String,
    },

    /// The operation was given nothing to work on.
    #[error("{op} received no input geometry")]
    EmptyInput {
        /// The operation.
        op: KernelOp,
    },
}

impl KernelError {
    /// Create an operation-failed error.
    #[must_use]
    pub fn failed(op: KernelOp, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            op,
            reason: reason.into(),
        }
    }

    /// The operation that failed.
    #[must_use]
    pub const fn op(&self) -> KernelOp {
        match self {
            Self::OperationFailed { op, .. } | Self::EmptyInput { op } => *op,
        }
    }
}
