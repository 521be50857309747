//! Guide-creation stages.

use std::fmt;

/// Stage of a guide-creation run.
///
/// Stages run in declaration order. [`Repaired`](Self::Repaired) and
/// [`Failed`](Self::Failed) are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssemblyStage {
    /// Lattice shell built from the guide surfaces.
    BaseReady,
    /// Solid surface patches merged into the shell.
    SolidSurfaceMerged,
    /// Osteotomy cut slots subtracted.
    CutSlotApplied,
    /// Eyes, bridges, flanges, barrels and connectors unioned in.
    ComponentsUnioned,
    /// Marking barrels subtracted and filleted.
    BarrelsResolved,
    /// Anatomy, eye and barrel clearances subtracted; teeth blocks added.
    ClearanceCut,
    /// Noise removed and disjoint pieces filtered.
    ShellFiltered,
    /// Mesh repaired, or validated when repair is disabled.
    Repaired,
    /// The run stopped with an error.
    Failed,
}

impl AssemblyStage {
    /// Stages a successful run passes through, in order.
    pub const PIPELINE: [Self; 8] = [
        Self::BaseReady,
        Self::SolidSurfaceMerged,
        Self::CutSlotApplied,
        Self::ComponentsUnioned,
        Self::BarrelsResolved,
        Self::ClearanceCut,
        Self::ShellFiltered,
        Self::Repaired,
    ];

    /// The stage after this one on success, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::BaseReady => Some(Self::SolidSurfaceMerged),
            Self::SolidSurfaceMerged => Some(Self::CutSlotApplied),
            Self::CutSlotApplied => Some(Self::ComponentsUnioned),
            Self::ComponentsUnioned => Some(Self::BarrelsResolved),
            Self::BarrelsResolved => Some(Self::ClearanceCut),
            Self::ClearanceCut => Some(Self::ShellFiltered),
            Self::ShellFiltered => Some(Self::Repaired),
            Self::Repaired | Self::Failed => None,
        }
    }

    /// Whether the run ends here.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Repaired | Self::Failed)
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaseReady => "base ready",
            Self::SolidSurfaceMerged => "solid surfaces merged",
            Self::CutSlotApplied => "cut slot applied",
            Self::ComponentsUnioned => "components unioned",
            Self::BarrelsResolved => "barrels resolved",
            Self::ClearanceCut => "clearance cut",
            Self::ShellFiltered => "shell filtered",
            Self::Repaired => "repaired",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
