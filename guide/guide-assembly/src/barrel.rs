//! Marking-barrel resolution with graceful degradation.
//!
//! A barrel whose fillet cannot be built is joined with a plain union
//! instead and recorded as failed. One imperfect junction never stops a
//! guide from being created.

use std::collections::BTreeSet;

use guide_cache::BarrelEntry;
use guide_kernel::{GeometryKernel, remove_noise_shells};
use guide_types::{BarrelFilletParams, IndexedMesh, ScrewId};
use tracing::{debug, warn};

/// How one marking barrel was joined to the assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum BarrelOutcome {
    /// Subtracted and filleted.
    Filleted(IndexedMesh),
    /// Joined with a plain union; the barrel must be flagged.
    Degraded {
        /// The assembly with the barrel unioned in.
        mesh: IndexedMesh,
        /// Why the fillet path was abandoned.
        reason: String,
    },
    /// Not even the plain union worked.
    Fatal(String),
}

impl BarrelOutcome {
    /// Whether the fallback path was taken.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Barrels that took the degraded path during a run.
///
/// # Example
///
/// ```
/// use guide_assembly::FailedBarrelSet;
/// use guide_types::ScrewId;
///
/// let mut failed = FailedBarrelSet::new();
/// failed.insert(ScrewId(4));
/// failed.insert(ScrewId(1));
/// failed.insert(ScrewId(4));
///
/// assert_eq!(failed.len(), 2);
/// assert_eq!(failed.iter().collect::<Vec<_>>(), vec![ScrewId(1), ScrewId(4)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedBarrelSet {
    screws: BTreeSet<ScrewId>,
}

impl FailedBarrelSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed barrel. Returns `false` if it was already recorded.
    pub fn insert(&mut self, screw: ScrewId) -> bool {
        self.screws.insert(screw)
    }

    /// Whether the barrel of `screw` failed.
    #[must_use]
    pub fn contains(&self, screw: ScrewId) -> bool {
        self.screws.contains(&screw)
    }

    /// Number of failed barrels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.screws.len()
    }

    /// Whether every barrel succeeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screws.is_empty()
    }

    /// Failed screws in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ScrewId> + '_ {
        self.screws.iter().copied()
    }
}

impl Extend<ScrewId> for FailedBarrelSet {
    fn extend<I: IntoIterator<Item = ScrewId>>(&mut self, iter: I) {
        self.screws.extend(iter);
    }
}

impl FromIterator<ScrewId> for FailedBarrelSet {
    fn from_iter<I: IntoIterator<Item = ScrewId>>(iter: I) -> Self {
        Self {
            screws: iter.into_iter().collect(),
        }
    }
}

/// Joins marking barrels to the running assembly.
pub(crate) struct BarrelResolver<'a> {
    kernel: &'a dyn GeometryKernel,
    fillet: &'a BarrelFilletParams,
    noise_threshold: f64,
}

impl<'a> BarrelResolver<'a> {
    pub(crate) const fn new(
        kernel: &'a dyn GeometryKernel,
        fillet: &'a BarrelFilletParams,
        noise_threshold: f64,
    ) -> Self {
        Self {
            kernel,
            fillet,
            noise_threshold,
        }
    }

    /// Subtract the barrel's clearance from `assembly` and fillet its shape
    /// in, falling back to a plain union.
    pub(crate) fn resolve(&self, assembly: &IndexedMesh, barrel: &BarrelEntry) -> BarrelOutcome {
        let subtractor = self.kernel.unify(&barrel.merged_subtractor());
        let subtracted = if subtractor.is_empty() {
            assembly.clone()
        } else {
            self.kernel
                .boolean_subtract(assembly, std::slice::from_ref(&subtractor))
        };

        if subtracted.is_empty() {
            return self.plain_union(
                assembly,
                barrel,
                "subtracting the barrel clearance left nothing".to_owned(),
            );
        }

        match self.kernel.fillet(
            &barrel.shape,
            &subtracted,
            self.fillet.radius,
            self.fillet.tolerance,
        ) {
            Ok(filleted) if !filleted.is_empty() => {
                debug!(screw = %barrel.screw, "Filleted marking barrel");
                BarrelOutcome::Filleted(filleted)
            }
            Ok(_) => self.plain_union(&subtracted, barrel, "fillet returned an empty mesh".to_owned()),
            Err(err) => self.plain_union(&subtracted, barrel, err.to_string()),
        }
    }

    fn plain_union(&self, assembly: &IndexedMesh, barrel: &BarrelEntry, reason: String) -> BarrelOutcome {
        warn!(
            screw = %barrel.screw,
            reason = %reason,
            "Barrel fillet failed, joining barrel without fillet"
        );
        let cleaned = self
            .kernel
            .unify(&remove_noise_shells(assembly, self.noise_threshold));
        match self
            .kernel
            .boolean_union(&[cleaned, barrel.shape.clone()])
        {
            Ok(mesh) => BarrelOutcome::Degraded { mesh, reason },
            Err(err) => BarrelOutcome::Fatal(format!("{reason}; plain union failed: {err}")),
        }
    }
}
