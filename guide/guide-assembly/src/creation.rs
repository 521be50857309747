//! Outcome of one guide-creation run.

use guide_cache::{BarrelEntry, DisposalReport};
use guide_types::{IndexedMesh, ScrewId};

use crate::barrel::FailedBarrelSet;
use crate::error::AssemblyError;
use crate::stage::AssemblyStage;

/// Everything a guide-creation run produced.
#[derive(Debug, Clone)]
pub struct GuideCreation {
    /// Guide the run was for.
    pub guide_index: usize,
    /// The guide mesh; `None` when the run failed.
    pub mesh: Option<IndexedMesh>,
    /// Why the run failed.
    pub error: Option<AssemblyError>,
    /// [`AssemblyStage::Repaired`] or [`AssemblyStage::Failed`].
    pub stage: AssemblyStage,
    /// Last stage that completed; `None` if the run stopped before the
    /// base was built.
    pub last_completed: Option<AssemblyStage>,
    /// Barrels joined without a fillet.
    pub failed_barrels: FailedBarrelSet,
    /// Barrel entries of the run, carrying their creation-error flags.
    pub barrels: Vec<BarrelEntry>,
    /// Reduction never succeeded; the mesh needs a manual fix.
    pub needs_manual_fix: bool,
    /// What disposing the run's cache released.
    pub disposed: DisposalReport,
}

impl GuideCreation {
    /// Whether a mesh was produced.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.mesh.is_some()
    }

    /// Whether the mesh was produced but needs operator attention.
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        self.is_success() && (self.needs_manual_fix || !self.failed_barrels.is_empty())
    }

    /// Screws whose barrel entry carries the creation-error flag.
    pub fn flagged_barrels(&self) -> impl Iterator<Item = ScrewId> + '_ {
        self.barrels
            .iter()
            .filter(|b| b.has_creation_error())
            .map(|b| b.screw)
    }

    /// One-line report for the command layer.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.mesh, &self.error) {
            (_, Some(err)) => format!("guide {} could not be created: {err}", self.guide_index),
            (Some(mesh), None) => {
                let mut line = format!(
                    "guide {} created with {} triangles",
                    self.guide_index,
                    mesh.face_count()
                );
                if !self.failed_barrels.is_empty() {
                    line.push_str(&format!(
                        ", {} barrel(s) joined without fillet",
                        self.failed_barrels.len()
                    ));
                }
                if self.needs_manual_fix {
                    line.push_str(", needs manual quality-preserving reduction");
                }
                line
            }
            (None, None) => format!("guide {} could not be created", self.guide_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_types::{BarrelType, Isometry3};

    fn creation() -> GuideCreation {
        GuideCreation {
            guide_index: 2,
            mesh: None,
            error: None,
            stage: AssemblyStage::Failed,
            last_completed: None,
            failed_barrels: FailedBarrelSet::new(),
            barrels: Vec::new(),
            needs_manual_fix: false,
            disposed: DisposalReport::default(),
        }
    }

    #[test]
    fn failure_summary_names_guide_and_error() {
        let report = GuideCreation {
            error: Some(AssemblyError::EmptyShell),
            ..creation()
        };
        assert!(!report.is_success());
        assert_eq!(
            report.summary(),
            "guide 2 could not be created: no shell left after filtering"
        );
    }

    #[test]
    fn success_summary_mentions_degradations() {
        let report = GuideCreation {
            mesh: Some(IndexedMesh::new()),
            stage: AssemblyStage::Repaired,
            failed_barrels: [ScrewId(1)].into_iter().collect(),
            needs_manual_fix: true,
            ..creation()
        };
        assert!(report.needs_attention());
        let summary = report.summary();
        assert!(summary.starts_with("guide 2 created"));
        assert!(summary.contains("1 barrel(s)"));
        assert!(summary.contains("manual"));
    }

    #[test]
    fn flagged_barrels_follow_entry_flags() {
        let entry = |id| {
            BarrelEntry::new(
                ScrewId(id),
                BarrelType::Marking,
                Isometry3::identity(),
                IndexedMesh::new(),
                Vec::new(),
            )
        };
        let report = GuideCreation {
            barrels: vec![entry(1), entry(2), entry(3)],
            ..creation()
        };
        report.barrels[1].mark_creation_error();

        assert_eq!(report.flagged_barrels().collect::<Vec<_>>(), vec![ScrewId(2)]);
    }
}
