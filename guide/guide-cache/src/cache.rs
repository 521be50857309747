//! The per-guide resource cache.

use std::collections::BTreeMap;
use std::rc::Rc;

use guide_kernel::{GeometryKernel, WrapParams};
use guide_types::{GuideParameters, IndexedMesh, Isometry3, ScrewId};
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::background::BackgroundDerivative;
use crate::error::CacheResult;
use crate::resource::{BarrelEntry, ComponentKind, FramedMesh, Resource};
use crate::store::{BlockKind, BuildingBlockStore, FixationScrew};

/// Surface layers that make up the smoothed guide surfaces.
const SURFACE_LAYERS: [BlockKind; 4] = [
    BlockKind::GuideSurface,
    BlockKind::PatchSurface,
    BlockKind::SkeletonSurface,
    BlockKind::ExtendedSurface,
];

/// What a call to [`ResourceCache::dispose`] released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposalReport {
    /// Cache entries released.
    pub entries: usize,
    /// Meshes held by those entries, nested ones included.
    pub meshes: usize,
}

impl DisposalReport {
    /// Whether nothing was released.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

/// Lazily evaluated, memoized geometry inputs of one guide.
///
/// Each [`ComponentKind`] is computed on first request and cached; later
/// requests return the same shared value without recomputation. Missing
/// building blocks produce empty values, never errors. The owner disposes
/// the cache as a unit with [`dispose`](Self::dispose); dropping the cache
/// disposes it too.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
///
/// use guide_cache::{ComponentKind, MemoryStore, ResourceCache};
/// use guide_kernel::StubKernel;
/// use guide_types::GuideParameters;
///
/// let store = MemoryStore::new();
/// let kernel = StubKernel::new();
/// let params = GuideParameters::default();
/// let mut cache = ResourceCache::new(&store, &kernel, &params, 0);
///
/// let first = cache.get(ComponentKind::SupportMesh);
/// let second = cache.get(ComponentKind::SupportMesh);
/// assert!(Rc::ptr_eq(&first, &second));
/// assert_eq!(cache.evaluations(), 1);
///
/// let report = cache.dispose();
/// assert_eq!(report.entries, 1);
/// ```
pub struct ResourceCache<'a> {
    store: &'a dyn BuildingBlockStore,
    kernel: &'a dyn GeometryKernel,
    params: &'a GuideParameters,
    guide_index: usize,
    entries: HashMap<ComponentKind, Rc<Resource>>,
    evaluations: usize,
}

impl std::fmt::Debug for ResourceCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("guide_index", &self.guide_index)
            .field("cached", &self.entries.len())
            .field("evaluations", &self.evaluations)
            .finish_non_exhaustive()
    }
}

impl<'a> ResourceCache<'a> {
    /// Create an empty cache for guide `guide_index`.
    #[must_use]
    pub fn new(
        store: &'a dyn BuildingBlockStore,
        kernel: &'a dyn GeometryKernel,
        params: &'a GuideParameters,
        guide_index: usize,
    ) -> Self {
        Self {
            store,
            kernel,
            params,
            guide_index,
            entries: HashMap::new(),
            evaluations: 0,
        }
    }

    /// Index of the guide this cache serves.
    #[must_use]
    pub const fn guide_index(&self) -> usize {
        self.guide_index
    }

    /// Number of entries computed so far, over the cache's lifetime.
    #[must_use]
    pub const fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether `kind` is currently cached.
    #[must_use]
    pub fn is_cached(&self, kind: ComponentKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value of `kind`, computing it on first access.
    pub fn get(&mut self, kind: ComponentKind) -> Rc<Resource> {
        if let Some(cached) = self.entries.get(&kind) {
            return Rc::clone(cached);
        }

        debug!(guide = self.guide_index, %kind, "Computing cache entry");
        let value = Rc::new(self.compute(kind));
        self.evaluations += 1;
        self.entries.insert(kind, Rc::clone(&value));
        value
    }

    /// Release every cached entry.
    ///
    /// A second call releases nothing. Values handed out earlier stay alive
    /// only as long as their holders keep them.
    pub fn dispose(&mut self) -> DisposalReport {
        let report = DisposalReport {
            entries: self.entries.len(),
            meshes: self.entries.values().map(|r| r.mesh_count()).sum(),
        };
        self.entries.clear();
        if !report.is_empty() {
            debug!(
                guide = self.guide_index,
                entries = report.entries,
                meshes = report.meshes,
                "Disposed resource cache"
            );
        }
        report
    }

    // ---- typed accessors; values are copies so callers may hand them to the kernel ----

    /// Union of the anatomy support meshes; empty if there are none.
    pub fn support_mesh(&mut self) -> IndexedMesh {
        self.mesh_of(ComponentKind::SupportMesh)
    }

    /// Union of the surface-wrap meshes; empty if there are none.
    pub fn surface_wrap(&mut self) -> IndexedMesh {
        self.mesh_of(ComponentKind::SurfaceWrap)
    }

    /// Raw guide surface patches.
    pub fn guide_surfaces(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::GuideSurfaces)
    }

    /// Smoothed guide surfaces from all four surface layers.
    pub fn smoothed_guide_surfaces(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::SmoothedGuideSurfaces)
    }

    /// Link surfaces.
    pub fn link_surfaces(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::LinkSurfaces)
    }

    /// Solid surface patches.
    pub fn solid_surfaces(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::SolidSurfaces)
    }

    /// Union of the osteotomy geometry, or `None` if the guide has none.
    pub fn osteotomies(&mut self) -> Option<IndexedMesh> {
        Some(self.mesh_of(ComponentKind::Osteotomies)).filter(|m| !m.is_empty())
    }

    /// Bridges with their local frames.
    pub fn bridges(&mut self) -> Vec<FramedMesh> {
        self.get(ComponentKind::Bridges)
            .as_framed()
            .map(<[FramedMesh]>::to_vec)
            .unwrap_or_default()
    }

    /// Flanges.
    pub fn flanges(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::Flanges)
    }

    /// Teeth-integration blocks.
    pub fn teeth_blocks(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::TeethBlocks)
    }

    /// Fixation screws linked to the guide.
    pub fn fixation_screws(&mut self) -> Vec<FixationScrew> {
        self.get(ComponentKind::FixationScrews)
            .as_screws()
            .map(<[FixationScrew]>::to_vec)
            .unwrap_or_default()
    }

    /// Screw-eye sweeps of the linked screws.
    pub fn screw_eyes(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::ScrewEyes)
    }

    /// Screw-eye clearance volumes of the linked screws.
    pub fn screw_eye_subtractors(&mut self) -> Vec<IndexedMesh> {
        self.meshes_of(ComponentKind::ScrewEyeSubtractors)
    }

    /// Barrels of the linked, leveled screws, ordered by screw.
    pub fn barrels(&mut self) -> Vec<BarrelEntry> {
        self.get(ComponentKind::Barrels)
            .as_barrels()
            .map(|b| b.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Set the creation-error flag on the cached barrel of `screw`.
    ///
    /// Returns `false` if the barrel is not cached.
    pub fn mark_barrel_failed(&self, screw: ScrewId) -> bool {
        let Some(entry) = self
            .entries
            .get(&ComponentKind::Barrels)
            .and_then(|r| r.as_barrels())
            .and_then(|b| b.get(&screw))
        else {
            return false;
        };
        entry.mark_creation_error();
        true
    }

    /// Compute a derivative of the support mesh on a worker thread.
    ///
    /// The worker receives its own copy of the mesh; join the returned
    /// handle before using the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be started.
    pub fn spawn_support_preview<T, F>(&mut self, work: F) -> CacheResult<BackgroundDerivative<T>>
    where
        T: Send + 'static,
        F: FnOnce(IndexedMesh) -> T + Send + 'static,
    {
        let support = self.support_mesh();
        BackgroundDerivative::spawn("support-preview", move || work(support))
    }

    fn mesh_of(&mut self, kind: ComponentKind) -> IndexedMesh {
        self.get(kind).as_mesh().cloned().unwrap_or_default()
    }

    fn meshes_of(&mut self, kind: ComponentKind) -> Vec<IndexedMesh> {
        self.get(kind)
            .as_meshes()
            .map(<[IndexedMesh]>::to_vec)
            .unwrap_or_default()
    }

    fn compute(&mut self, kind: ComponentKind) -> Resource {
        match kind {
            ComponentKind::SupportMesh => Resource::Mesh(self.union_of(BlockKind::GuideSupport)),
            ComponentKind::SurfaceWrap => Resource::Mesh(self.union_of(BlockKind::SurfaceWrap)),
            ComponentKind::Osteotomies => Resource::Mesh(self.union_of(BlockKind::Osteotomy)),
            ComponentKind::GuideSurfaces => Resource::Meshes(self.geometry_of(BlockKind::GuideSurface)),
            ComponentKind::SmoothedGuideSurfaces => Resource::Meshes(self.smoothed_surfaces()),
            ComponentKind::LinkSurfaces => Resource::Meshes(self.geometry_of(BlockKind::LinkSurface)),
            ComponentKind::SolidSurfaces => Resource::Meshes(self.geometry_of(BlockKind::SolidSurface)),
            ComponentKind::Flanges => Resource::Meshes(self.geometry_of(BlockKind::Flange)),
            ComponentKind::TeethBlocks => Resource::Meshes(self.geometry_of(BlockKind::TeethBlock)),
            ComponentKind::Bridges => Resource::Framed(
                self.store
                    .building_blocks(BlockKind::Bridge, self.guide_index)
                    .into_iter()
                    .map(|b| FramedMesh {
                        mesh: b.geometry,
                        frame: b.transform.unwrap_or_else(Isometry3::identity),
                    })
                    .collect(),
            ),
            ComponentKind::FixationScrews => {
                let guide = self.guide_index;
                Resource::Screws(
                    self.store
                        .fixation_screws()
                        .into_iter()
                        .filter(|s| s.is_linked_to(guide))
                        .collect(),
                )
            }
            ComponentKind::ScrewEyes => Resource::Meshes(
                self.fixation_screws()
                    .into_iter()
                    .filter_map(|s| s.eye)
                    .collect(),
            ),
            ComponentKind::ScrewEyeSubtractors => Resource::Meshes(
                self.fixation_screws()
                    .into_iter()
                    .filter_map(|s| s.eye_subtractor)
                    .collect(),
            ),
            ComponentKind::Barrels => Resource::Barrels(self.derive_barrels()),
        }
    }

    fn geometry_of(&self, kind: BlockKind) -> Vec<IndexedMesh> {
        self.store
            .building_blocks(kind, self.guide_index)
            .into_iter()
            .map(|b| b.geometry)
            .collect()
    }

    /// Boolean union of every block of `kind`; empty when there are none or
    /// the union fails.
    fn union_of(&self, kind: BlockKind) -> IndexedMesh {
        let mut meshes = self.geometry_of(kind);
        match meshes.len() {
            0 => IndexedMesh::new(),
            1 => meshes.pop().unwrap_or_default(),
            n => self.kernel.boolean_union(&meshes).unwrap_or_else(|err| {
                warn!(%kind, blocks = n, error = %err, "Could not unite building blocks");
                IndexedMesh::new()
            }),
        }
    }

    fn smoothed_surfaces(&self) -> Vec<IndexedMesh> {
        SURFACE_LAYERS
            .iter()
            .flat_map(|&layer| self.geometry_of(layer))
            .map(|surface| {
                self.kernel
                    .smooth(&surface, &self.params.smooth)
                    .unwrap_or_else(|| {
                        warn!(
                            guide = self.guide_index,
                            "Smoothing a guide surface failed, using it unsmoothed"
                        );
                        surface
                    })
            })
            .collect()
    }

    fn derive_barrels(&mut self) -> BTreeMap<ScrewId, BarrelEntry> {
        let mut barrels = BTreeMap::new();
        for screw in self.fixation_screws() {
            let Some(registered) = self.store.registered_barrel(screw.id) else {
                debug!(screw = %screw.id, "Skipping barrel of screw that is not leveled yet");
                continue;
            };

            let alignment = registered.alignment;
            let mut shape = registered.shape.transformed(&alignment);
            let subtractors = registered
                .subtractors
                .iter()
                .map(|s| s.transformed(&alignment))
                .collect();
            if screw.barrel_type.is_marking() {
                shape = self.conform_marking_shape(screw.id, shape);
            }

            barrels.insert(
                screw.id,
                BarrelEntry::new(screw.id, screw.barrel_type, alignment, shape, subtractors),
            );
        }
        barrels
    }

    /// Intersect a marking barrel with the surface wrap and wrap the result,
    /// so the mark follows the anatomy. Falls back to the aligned shape.
    fn conform_marking_shape(&mut self, screw: ScrewId, shape: IndexedMesh) -> IndexedMesh {
        let wrap = self.surface_wrap();
        if wrap.is_empty() {
            warn!(%screw, "No surface wrap, marking barrel keeps its raw shape");
            return shape;
        }

        let clipped = self.kernel.boolean_intersect(&shape, &wrap);
        if clipped.is_empty() {
            warn!(%screw, "Marking barrel does not meet the surface wrap, keeping raw shape");
            return shape;
        }

        let params = WrapParams::new(
            self.params.wrap_smallest_detail,
            self.params.wrap_gap_closing_distance,
        )
        .preserving_sharp_features();
        match self.kernel.wrap(&[clipped], &params) {
            Ok(conformed) => conformed,
            Err(err) => {
                warn!(%screw, error = %err, "Could not wrap marking barrel, keeping raw shape");
                shape
            }
        }
    }
}

impl Drop for ResourceCache<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_kernel::{FailurePlan, KernelOp, StubKernel};
    use guide_types::{BarrelType, Point3};

    use crate::store::{MemoryStore, RegisteredBarrel};

    fn tri(offset: f64) -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(offset, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 0.0),
                Point3::new(offset, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn union_of_single_block_skips_kernel() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSupport, None, tri(0.0));
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        assert_eq!(cache.support_mesh().face_count(), 1);
        assert_eq!(kernel.calls(KernelOp::Union), 0);
    }

    #[test]
    fn failed_union_yields_empty_mesh() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::Osteotomy, Some(0), tri(0.0));
        store.add_block(BlockKind::Osteotomy, Some(0), tri(3.0));
        let kernel = StubKernel::new().failing(KernelOp::Union, FailurePlan::Always);
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        assert!(cache.osteotomies().is_none());
        assert_eq!(kernel.calls(KernelOp::Union), 1);
    }

    #[test]
    fn smoothed_surfaces_cover_all_layers() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSurface, Some(0), tri(0.0));
        store.add_block(BlockKind::PatchSurface, Some(0), tri(2.0));
        store.add_block(BlockKind::SkeletonSurface, Some(0), tri(4.0));
        store.add_block(BlockKind::ExtendedSurface, Some(0), tri(6.0));
        store.add_block(BlockKind::LinkSurface, Some(0), tri(8.0));
        let kernel = StubKernel::new().failing(KernelOp::Smooth, FailurePlan::FirstCalls(1));
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        assert_eq!(cache.guide_surfaces().len(), 1);
        assert_eq!(cache.smoothed_guide_surfaces().len(), 4);
        assert_eq!(kernel.calls(KernelOp::Smooth), 4);
    }

    #[test]
    fn marking_barrel_is_conformed_to_wrap() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::SurfaceWrap, None, tri(0.0));
        store.add_screw(FixationScrew::new(ScrewId(7), [0], BarrelType::Marking));
        store.register_barrel(
            ScrewId(7),
            RegisteredBarrel {
                shape: tri(0.0),
                subtractors: vec![tri(0.0)],
                alignment: Isometry3::identity(),
            },
        );
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        let barrels = cache.barrels();
        assert_eq!(barrels.len(), 1);
        assert_eq!(barrels[0].barrel_type, BarrelType::Marking);
        assert_eq!(kernel.calls(KernelOp::Intersect), 1);
        assert_eq!(kernel.calls(KernelOp::Wrap), 1);
    }

    #[test]
    fn mark_barrel_failed_needs_cached_entry() {
        let mut store = MemoryStore::new();
        store.add_screw(FixationScrew::new(ScrewId(2), [0], BarrelType::Standard));
        store.register_barrel(
            ScrewId(2),
            RegisteredBarrel {
                shape: tri(0.0),
                subtractors: vec![tri(0.0)],
                alignment: Isometry3::identity(),
            },
        );
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        assert!(!cache.mark_barrel_failed(ScrewId(2)));
        let _ = cache.barrels();
        assert!(cache.mark_barrel_failed(ScrewId(2)));
        assert!(!cache.mark_barrel_failed(ScrewId(3)));
        assert!(cache.barrels()[0].has_creation_error());
    }

    #[test]
    fn support_preview_runs_in_background() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSupport, None, tri(0.0));
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let mut cache = ResourceCache::new(&store, &kernel, &params, 0);

        let job = cache.spawn_support_preview(|mesh| mesh.surface_area());
        let area = job.and_then(BackgroundDerivative::join).unwrap_or_default();
        assert!((area - 0.5).abs() < 1e-12);
    }
}
