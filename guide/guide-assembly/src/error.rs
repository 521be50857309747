//! Error types for guide creation.

use guide_base::BaseSurfaceError;
use guide_kernel::KernelError;
use guide_repair::RepairError;
use guide_slot::SlotError;
use guide_types::{ParamsError, ScrewId};
use thiserror::Error;

use crate::stage::AssemblyStage;

/// Result type for guide creation.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Failures that stop a guide from being created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    /// Parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParamsError),

    /// Screw/barrel linkage is inconsistent and must be regenerated.
    #[error("barrels and subtractors are not in sync ({barrels} barrels, {subtractors} subtractors)")]
    BarrelsOutOfSync {
        /// Barrels of the guide.
        barrels: usize,
        /// Subtractors across those barrels.
        subtractors: usize,
    },

    /// The base shell could not be built.
    #[error("base surface: {0}")]
    BaseSurface(#[from] BaseSurfaceError),

    /// The cut slot could not be applied.
    #[error("cut slot: {0}")]
    CutSlot(#[from] SlotError),

    /// A union the stage depends on failed.
    #[error("union failed while {stage}: {source}")]
    Union {
        /// Stage being entered.
        stage: AssemblyStage,
        /// Kernel failure.
        #[source]
        source: KernelError,
    },

    /// A marking barrel could not be joined even without a fillet.
    #[error("{screw}: barrel could not be joined: {reason}")]
    BarrelJoin {
        /// Screw owning the barrel.
        screw: ScrewId,
        /// Why the fallback union failed.
        reason: String,
    },

    /// Nothing was left after shell filtering.
    #[error("no shell left after filtering")]
    EmptyShell,

    /// The unrepaired result is not a valid mesh.
    #[error("resulting mesh is invalid")]
    InvalidMesh,

    /// Repair failed terminally.
    #[error("repair: {0}")]
    Repair(#[from] RepairError),
}

impl AssemblyError {
    /// Create a union error for `stage`.
    #[must_use]
    pub const fn union(stage: AssemblyStage, source: KernelError) -> Self {
        Self::Union { stage, source }
    }
}
