//! Error types for floating-entity connection.

use thiserror::Error;

/// Result type for floating-entity connection.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Errors raised while connecting one entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    /// The entity has no geometry to locate.
    #[error("entity {entity} has no geometry")]
    EmptyEntity {
        /// Index of the entity.
        entity: usize,
    },

    /// No path across the base shell was found.
    #[error("no path across the base shell for entity {entity}")]
    PathNotFound {
        /// Index of the entity.
        entity: usize,
    },

    /// The connector tube could not be swept.
    #[error("connector tube sweep failed for entity {entity}")]
    SweepFailed {
        /// Index of the entity.
        entity: usize,
    },
}
