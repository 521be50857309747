//! Error types for cut-slot subtraction.

use guide_kernel::{KernelError, KernelOp};
use thiserror::Error;

/// Result type for cut-slot subtraction.
pub type SlotResult<T> = Result<T, SlotError>;

/// Errors raised while cutting slots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// A step building the link protection volume returned nothing.
    #[error("link protection failed at {op}")]
    ProtectionFailed {
        /// The failing kernel operation.
        op: KernelOp,
    },

    /// A kernel operation reported failure.
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Subtracting the osteotomy left nothing of the base.
    #[error("cut slot subtraction left an empty guide base")]
    EmptyResult,
}
