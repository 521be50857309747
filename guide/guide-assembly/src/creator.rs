//! The guide-creation state machine.

use std::borrow::Cow;
use std::mem;

use guide_base::GuideBaseSurfaceBuilder;
use guide_cache::{BarrelEntry, BuildingBlockStore, ResourceCache};
use guide_kernel::{GeometryKernel, remove_noise_shells};
use guide_repair::{MeshRepairStage, NoTelemetry, Telemetry, filter_shells};
use guide_slot::CutSlotSubtractor;
use guide_types::{GuideParameters, IndexedMesh};
use tracing::{debug, error, info, info_span, warn};

use crate::barrel::{BarrelOutcome, BarrelResolver, FailedBarrelSet};
use crate::components::{ComponentAssembler, ComponentInputs};
use crate::creation::GuideCreation;
use crate::error::{AssemblyError, AssemblyResult};
use crate::options::CreationOptions;
use crate::qc::QcReporter;
use crate::stage::AssemblyStage;

/// State carried from stage to stage within one run.
struct Run<'c> {
    cache: ResourceCache<'c>,
    /// Lattice shell from [`AssemblyStage::BaseReady`].
    base: IndexedMesh,
    /// The running assembly.
    mesh: IndexedMesh,
    barrels: Vec<BarrelEntry>,
    failed: FailedBarrelSet,
    needs_manual_fix: bool,
}

/// Creates one surgical guide from a case's building blocks.
///
/// A run walks [`AssemblyStage::PIPELINE`] in order, one handler per
/// stage. The first handler error ends the run; degraded steps (a barrel
/// that cannot be filleted, a link patch that cannot be recovered, a
/// reduction that never succeeds) only produce warnings and flags on the
/// returned [`GuideCreation`].
///
/// Barrel linkage is checked before any geometry work: a guide whose
/// barrels and subtractors are out of sync fails without a single union or
/// fillet.
///
/// # Example
///
/// ```
/// use guide_assembly::{CreationOptions, GuideCreator, NoQc};
/// use guide_cache::{BlockKind, MemoryStore};
/// use guide_kernel::StubKernel;
/// use guide_types::{GuideParameters, IndexedMesh, Point3};
///
/// let mut store = MemoryStore::new();
/// store.add_block(
///     BlockKind::GuideSurface,
///     Some(0),
///     IndexedMesh::from_parts(
///         vec![
///             Point3::new(0.0, 0.0, 0.0),
///             Point3::new(4.0, 0.0, 0.0),
///             Point3::new(0.0, 4.0, 0.0),
///         ],
///         vec![[0, 1, 2]],
///     ),
/// );
///
/// let kernel = StubKernel::new();
/// let params = GuideParameters::default();
/// let Ok(creator) = GuideCreator::new(&kernel, &params, CreationOptions::preview()) else {
///     return;
/// };
///
/// let creation = creator.create(&store, 0, &NoQc);
/// assert!(creation.is_success());
/// assert!(creation.failed_barrels.is_empty());
/// ```
pub struct GuideCreator<'a> {
    kernel: &'a dyn GeometryKernel,
    params: &'a GuideParameters,
    options: CreationOptions,
    telemetry: &'a dyn Telemetry,
}

impl<'a> GuideCreator<'a> {
    /// Create a guide creator.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidParameters`] if `params` fail
    /// validation.
    pub fn new(
        kernel: &'a dyn GeometryKernel,
        params: &'a GuideParameters,
        options: CreationOptions,
    ) -> AssemblyResult<Self> {
        params.validate()?;
        Ok(Self {
            kernel,
            params,
            options,
            telemetry: &NoTelemetry,
        })
    }

    /// Report repeated kernel failures to `telemetry`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: &'a dyn Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Options this creator runs with.
    #[must_use]
    pub const fn options(&self) -> &CreationOptions {
        &self.options
    }

    /// Create guide `guide_index`.
    ///
    /// Failed barrels are handed to `qc` after the run ends, whether or not
    /// it succeeded. The run's cache is disposed before returning.
    pub fn create(
        &self,
        store: &dyn BuildingBlockStore,
        guide_index: usize,
        qc: &dyn QcReporter,
    ) -> GuideCreation {
        let span = info_span!("guide", index = guide_index);
        let _entered = span.enter();

        let mut run = Run {
            cache: ResourceCache::new(store, self.kernel, self.params, guide_index),
            base: IndexedMesh::new(),
            mesh: IndexedMesh::new(),
            barrels: Vec::new(),
            failed: FailedBarrelSet::new(),
            needs_manual_fix: false,
        };

        let (last_completed, result) = match self.check_barrel_linkage(&mut run) {
            Ok(()) => self.drive(&mut run),
            Err(err) => (None, Err(err)),
        };

        let Run {
            mut cache,
            mesh,
            failed,
            needs_manual_fix,
            ..
        } = run;

        // Entries cloned from the cache carry the creation-error flags set
        // during the run.
        let barrels = cache.barrels();
        for barrel in barrels.iter().filter(|b| b.has_creation_error()) {
            qc.flag_barrel_error(barrel.screw);
            qc.recheck_screw(barrel.screw);
        }
        let disposed = cache.dispose();

        match result {
            Ok(()) => {
                info!(
                    faces = mesh.face_count(),
                    failed_barrels = failed.len(),
                    needs_manual_fix,
                    "Guide created"
                );
                GuideCreation {
                    guide_index,
                    mesh: Some(mesh),
                    error: None,
                    stage: AssemblyStage::Repaired,
                    last_completed,
                    failed_barrels: failed,
                    barrels,
                    needs_manual_fix,
                    disposed,
                }
            }
            Err(err) => {
                error!(error = %err, last_completed = ?last_completed, "Guide could not be created");
                GuideCreation {
                    guide_index,
                    mesh: None,
                    error: Some(err),
                    stage: AssemblyStage::Failed,
                    last_completed,
                    failed_barrels: failed,
                    barrels,
                    needs_manual_fix: false,
                    disposed,
                }
            }
        }
    }

    /// Run every stage in order; returns the last completed stage and the
    /// first error.
    fn drive(&self, run: &mut Run<'_>) -> (Option<AssemblyStage>, AssemblyResult<()>) {
        let mut completed = None;
        let mut stage = Some(AssemblyStage::BaseReady);
        while let Some(current) = stage {
            debug!(stage = %current, "Entering stage");
            if let Err(err) = self.enter(current, run) {
                return (completed, Err(err));
            }
            completed = Some(current);
            stage = current.next();
        }
        (completed, Ok(()))
    }

    fn enter(&self, stage: AssemblyStage, run: &mut Run<'_>) -> AssemblyResult<()> {
        match stage {
            AssemblyStage::BaseReady => self.build_base(run),
            AssemblyStage::SolidSurfaceMerged => self.merge_solid_surfaces(run),
            AssemblyStage::CutSlotApplied => self.apply_cut_slot(run),
            AssemblyStage::ComponentsUnioned => self.union_components(run),
            AssemblyStage::BarrelsResolved => self.resolve_barrels(run),
            AssemblyStage::ClearanceCut => self.cut_clearance(run),
            AssemblyStage::ShellFiltered => self.filter_pieces(run),
            AssemblyStage::Repaired => self.repair(run),
            AssemblyStage::Failed => Ok(()),
        }
    }

    /// Each barrel pairs with exactly one subtractor. Any other count on any
    /// barrel means the screw/barrel linkage is stale.
    fn check_barrel_linkage(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        run.barrels = run.cache.barrels();
        let barrels = run.barrels.len();
        let subtractors: usize = run.barrels.iter().map(|b| b.subtractors.len()).sum();
        if let Some(stale) = run.barrels.iter().find(|b| b.subtractors.len() != 1) {
            error!(
                barrels,
                subtractors,
                screw = %stale.screw,
                screw_subtractors = stale.subtractors.len(),
                "Barrels and subtractors are not in sync, the screw barrels must be regenerated"
            );
            return Err(AssemblyError::BarrelsOutOfSync {
                barrels,
                subtractors,
            });
        }
        Ok(())
    }

    fn build_base(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let surfaces = run.cache.smoothed_guide_surfaces();
        let base = GuideBaseSurfaceBuilder::new(self.kernel, self.params).build(&surfaces)?;
        run.mesh = base.lattice.clone();
        run.base = base.lattice;
        Ok(())
    }

    /// Relieve the seam with an inward offset of the solid patches, then
    /// union the patches in.
    fn merge_solid_surfaces(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let solids = run.cache.solid_surfaces();
        if solids.is_empty() {
            debug!("No solid surfaces");
            return Ok(());
        }

        let solid = self.unite(&solids, AssemblyStage::SolidSurfaceMerged)?;
        match self.kernel.offset(&solid, -self.params.solid_seam_offset) {
            Some(inner) if !inner.is_empty() => {
                run.mesh = self
                    .kernel
                    .boolean_subtract(&run.mesh, std::slice::from_ref(&inner));
            }
            _ => warn!("Inward offset of the solid surfaces failed, merging without seam relief"),
        }

        run.mesh = self
            .kernel
            .boolean_union(&[mem::take(&mut run.mesh), solid])
            .map_err(|err| AssemblyError::union(AssemblyStage::SolidSurfaceMerged, err))?;
        Ok(())
    }

    fn apply_cut_slot(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let osteotomy = run.cache.osteotomies();
        let links = if osteotomy.is_some() {
            run.cache.link_surfaces()
        } else {
            Vec::new()
        };
        let wrap = if links.is_empty() {
            IndexedMesh::new()
        } else {
            run.cache.surface_wrap()
        };

        let cut = match CutSlotSubtractor::new(self.kernel, self.params).apply(
            &run.mesh,
            osteotomy.as_ref(),
            &links,
            &wrap,
        )? {
            Cow::Owned(mesh) => Some(mesh),
            Cow::Borrowed(_) => None,
        };
        if let Some(mesh) = cut {
            run.mesh = mesh;
        }
        Ok(())
    }

    fn union_components(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let eyes = run.cache.screw_eyes();
        let bridges = run.cache.bridges();
        let flanges = run.cache.flanges();
        let teeth = run.cache.teeth_blocks();
        let support = run.cache.support_mesh();
        let barrel_shapes: Vec<IndexedMesh> = run
            .barrels
            .iter()
            .filter(|b| !b.barrel_type.is_marking())
            .map(|b| b.shape.clone())
            .collect();
        let marking_barrels: Vec<IndexedMesh> = run
            .barrels
            .iter()
            .filter(|b| b.barrel_type.is_marking())
            .map(|b| b.shape.clone())
            .collect();

        let components = ComponentAssembler::new(self.kernel, self.params).assemble(&ComponentInputs {
            eyes: &eyes,
            bridges: &bridges,
            flanges: &flanges,
            barrel_shapes: &barrel_shapes,
            marking_barrels: &marking_barrels,
            teeth: &teeth,
            support: &support,
            base: &run.base,
        });
        if components.is_empty() {
            debug!("No additional components");
            return Ok(());
        }

        let cleaned = self.kernel.unify(&remove_noise_shells(
            &components,
            self.params.noise_shell_threshold,
        ));
        if cleaned.is_empty() {
            warn!("Additional components were all noise, nothing to union");
            return Ok(());
        }

        run.mesh = self
            .kernel
            .boolean_union(&[mem::take(&mut run.mesh), cleaned])
            .map_err(|err| AssemblyError::union(AssemblyStage::ComponentsUnioned, err))?;
        Ok(())
    }

    /// Fold the marking barrels into the assembly one at a time.
    fn resolve_barrels(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let resolver = BarrelResolver::new(
            self.kernel,
            &self.params.barrel_fillet,
            self.params.noise_shell_threshold,
        );

        for barrel in run.barrels.iter().filter(|b| b.barrel_type.is_marking()) {
            match resolver.resolve(&run.mesh, barrel) {
                BarrelOutcome::Filleted(mesh) => run.mesh = mesh,
                BarrelOutcome::Degraded { mesh, reason } => {
                    warn!(screw = %barrel.screw, reason = %reason, "Barrel joined without fillet");
                    run.failed.insert(barrel.screw);
                    run.cache.mark_barrel_failed(barrel.screw);
                    run.mesh = mesh;
                }
                BarrelOutcome::Fatal(reason) => {
                    return Err(AssemblyError::BarrelJoin {
                        screw: barrel.screw,
                        reason,
                    });
                }
            }
        }
        Ok(())
    }

    /// Subtract anatomy, eye and standard-barrel clearances, then add the
    /// teeth blocks that touch the guide.
    fn cut_clearance(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        let mut tools = vec![run.cache.support_mesh()];
        tools.extend(run.cache.screw_eye_subtractors());
        tools.extend(
            run.barrels
                .iter()
                .filter(|b| !b.barrel_type.is_marking())
                .map(BarrelEntry::merged_subtractor),
        );
        tools.retain(|t| !t.is_empty());
        if !tools.is_empty() {
            let before = run.mesh.face_count();
            run.mesh = self.kernel.boolean_subtract(&run.mesh, &tools);
            debug!(
                tools = tools.len(),
                faces_before = before,
                faces_after = run.mesh.face_count(),
                "Cut clearances"
            );
        }

        let teeth = run.cache.teeth_blocks();
        let touching: Vec<&IndexedMesh> = teeth
            .iter()
            .filter(|t| self.kernel.meshes_collide(t, &run.mesh))
            .collect();
        if touching.is_empty() {
            return Ok(());
        }
        let teeth = self.kernel.unify(&IndexedMesh::concat(touching));
        run.mesh = self
            .kernel
            .boolean_union(&[mem::take(&mut run.mesh), teeth])
            .map_err(|err| AssemblyError::union(AssemblyStage::ClearanceCut, err))?;
        Ok(())
    }

    fn filter_pieces(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        run.mesh = filter_shells(
            self.kernel,
            &run.mesh,
            self.options.filter_disjoint_pieces,
            self.params.noise_shell_threshold,
        )
        .map_err(|_| AssemblyError::EmptyShell)?;
        Ok(())
    }

    fn repair(&self, run: &mut Run<'_>) -> AssemblyResult<()> {
        if !self.options.fix_stl {
            if !run.mesh.is_valid() {
                return Err(AssemblyError::InvalidMesh);
            }
            debug!("Repair disabled, keeping the filtered shell");
            return Ok(());
        }

        let outcome = MeshRepairStage::new(self.kernel, &self.params.reduction, &self.options.repair)
            .with_telemetry(self.telemetry)
            .with_shell_filter(
                self.params.noise_shell_threshold,
                self.options.filter_disjoint_pieces,
            )
            .run(&run.mesh)?;
        if outcome.needs_manual_fix {
            warn!("Guide needs a manual quality-preserving reduction");
        }
        run.needs_manual_fix = outcome.needs_manual_fix;
        run.mesh = outcome.mesh;
        Ok(())
    }

    /// One mesh passes through; several are united.
    fn unite(&self, meshes: &[IndexedMesh], stage: AssemblyStage) -> AssemblyResult<IndexedMesh> {
        match meshes {
            [single] => Ok(single.clone()),
            _ => self
                .kernel
                .boolean_union(meshes)
                .map_err(|err| AssemblyError::union(stage, err)),
        }
    }
}
