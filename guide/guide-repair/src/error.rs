//! Error types for shell filtering and mesh repair.

use guide_kernel::KernelOp;
use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Terminal failures of shell filtering or repair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    /// Repair was given an empty mesh.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Nothing was left after noise removal and shell filtering.
    #[error("no shell left after filtering")]
    EmptyShell,

    /// A cleanup operation produced an empty mesh.
    #[error("{op} left an empty mesh")]
    EmptyAfter {
        /// The operation that emptied the mesh.
        op: KernelOp,
    },

    /// The repaired mesh failed validation.
    #[error("repaired mesh is invalid: {reason}")]
    InvalidMesh {
        /// What made the mesh invalid.
        reason: String,
    },
}

impl RepairError {
    /// Create an invalid-mesh error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidMesh {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(RepairError::EmptyShell.to_string(), "no shell left after filtering");
        assert_eq!(
            RepairError::EmptyAfter {
                op: KernelOp::FilterSharpTriangles
            }
            .to_string(),
            "sharp triangle filter left an empty mesh"
        );
        assert!(RepairError::invalid("dangling index").to_string().ends_with("dangling index"));
    }
}
