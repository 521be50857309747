//! The building-block object store.
//!
//! A case keeps its input geometry as typed building blocks: anatomy
//! support meshes, per-guide surface patches, bridges, screws and their
//! registered barrels. The pipeline reads them through
//! [`BuildingBlockStore`], passed in explicitly.

use std::fmt;

use guide_types::{BarrelType, IndexedMesh, Isometry3, ObjectId, ScrewId};
use hashbrown::HashMap;

/// Kind of building block.
///
/// Case-level kinds are shared by every guide of the case; the others are
/// stored per guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKind {
    /// Anatomy the guide seats on. Case-level.
    GuideSupport,
    /// Closed wrap around the anatomical surface. Case-level.
    SurfaceWrap,
    /// Teeth-integration blocks. Case-level.
    TeethBlock,
    /// Raw guide surface patches drawn by the user.
    GuideSurface,
    /// Patch-drawn surface layer.
    PatchSurface,
    /// Skeleton-drawn surface layer.
    SkeletonSurface,
    /// Surface layer extended beyond the drawn outline.
    ExtendedSurface,
    /// Link surfaces bridging across cut slots.
    LinkSurface,
    /// Solid (non-lattice) surface patches.
    SolidSurface,
    /// Osteotomy cut geometry.
    Osteotomy,
    /// Bridges, with their local coordinate frame.
    Bridge,
    /// Flanges.
    Flange,
}

impl BlockKind {
    /// Whether blocks of this kind are shared by all guides of a case.
    #[must_use]
    pub const fn is_case_level(self) -> bool {
        matches!(self, Self::GuideSupport | Self::SurfaceWrap | Self::TeethBlock)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GuideSupport => "guide support",
            Self::SurfaceWrap => "surface wrap",
            Self::TeethBlock => "teeth block",
            Self::GuideSurface => "guide surface",
            Self::PatchSurface => "patch surface",
            Self::SkeletonSurface => "skeleton surface",
            Self::ExtendedSurface => "extended surface",
            Self::LinkSurface => "link surface",
            Self::SolidSurface => "solid surface",
            Self::Osteotomy => "osteotomy",
            Self::Bridge => "bridge",
            Self::Flange => "flange",
        };
        f.write_str(name)
    }
}

/// One stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingBlock {
    /// Object identifier.
    pub id: ObjectId,
    /// Geometry in world coordinates.
    pub geometry: IndexedMesh,
    /// Stored local frame, where the kind has one.
    pub transform: Option<Isometry3<f64>>,
}

impl BuildingBlock {
    /// A block without a stored frame.
    #[must_use]
    pub const fn new(id: ObjectId, geometry: IndexedMesh) -> Self {
        Self {
            id,
            geometry,
            transform: None,
        }
    }

    /// Attach a local frame.
    #[must_use]
    pub const fn with_transform(mut self, transform: Isometry3<f64>) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A fixation screw and the guides it is linked to.
#[derive(Debug, Clone, PartialEq)]
pub struct FixationScrew {
    /// Screw identifier.
    pub id: ScrewId,
    /// Indices of the guides the screw passes through.
    pub guides: Vec<usize>,
    /// Barrel flavour chosen for this screw.
    pub barrel_type: BarrelType,
    /// Screw-eye sweep added to the guide, if any.
    pub eye: Option<IndexedMesh>,
    /// Volume cleared around the screw eye, if any.
    pub eye_subtractor: Option<IndexedMesh>,
}

impl FixationScrew {
    /// A screw linked to the given guides, without eye geometry.
    #[must_use]
    pub fn new(id: ScrewId, guides: impl IntoIterator<Item = usize>, barrel_type: BarrelType) -> Self {
        Self {
            id,
            guides: guides.into_iter().collect(),
            barrel_type,
            eye: None,
            eye_subtractor: None,
        }
    }

    /// Attach the screw eye and its clearance volume.
    #[must_use]
    pub fn with_eye(mut self, eye: IndexedMesh, subtractor: IndexedMesh) -> Self {
        self.eye = Some(eye);
        self.eye_subtractor = Some(subtractor);
        self
    }

    /// Whether the screw passes through guide `guide_index`.
    #[must_use]
    pub fn is_linked_to(&self, guide_index: usize) -> bool {
        self.guides.contains(&guide_index)
    }
}

/// Barrel registered for a screw once it has been leveled.
///
/// Shape and subtractors are in the barrel's local frame; `alignment`
/// places them at the screw.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredBarrel {
    /// Barrel sleeve added to the guide.
    pub shape: IndexedMesh,
    /// Volumes removed from the guide. Exactly one in a consistent case.
    pub subtractors: Vec<IndexedMesh>,
    /// Registered alignment transform.
    pub alignment: Isometry3<f64>,
}

/// Read access to a case's building blocks.
///
/// Implementations are read without locking; one guide-creation run at a
/// time may use a store.
pub trait BuildingBlockStore {
    /// Whether at least one block of `kind` exists for the guide.
    /// `guide_index` is ignored for case-level kinds.
    fn has_building_block(&self, kind: BlockKind, guide_index: usize) -> bool {
        !self.building_blocks(kind, guide_index).is_empty()
    }

    /// All blocks of `kind` for the guide. `guide_index` is ignored for
    /// case-level kinds.
    fn building_blocks(&self, kind: BlockKind, guide_index: usize) -> Vec<BuildingBlock>;

    /// Every fixation screw of the case.
    fn fixation_screws(&self) -> Vec<FixationScrew>;

    /// The barrel registered for `screw`, or `None` if the screw has not
    /// been leveled yet.
    fn registered_barrel(&self, screw: ScrewId) -> Option<RegisteredBarrel>;
}

/// In-memory [`BuildingBlockStore`] for previews and tests.
///
/// # Example
///
/// ```
/// use guide_cache::{BlockKind, BuildingBlockStore, MemoryStore};
/// use guide_types::{IndexedMesh, ObjectId};
///
/// let mut store = MemoryStore::new();
/// store.add_block(BlockKind::GuideSupport, None, IndexedMesh::new());
/// store.add_block(BlockKind::GuideSurface, Some(0), IndexedMesh::new());
///
/// assert!(store.has_building_block(BlockKind::GuideSupport, 3));
/// assert!(store.has_building_block(BlockKind::GuideSurface, 0));
/// assert!(!store.has_building_block(BlockKind::GuideSurface, 1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: HashMap<(BlockKind, Option<usize>), Vec<BuildingBlock>>,
    screws: Vec<FixationScrew>,
    barrels: HashMap<ScrewId, RegisteredBarrel>,
    next_id: u64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: BlockKind, guide_index: Option<usize>) -> (BlockKind, Option<usize>) {
        if kind.is_case_level() {
            (kind, None)
        } else {
            (kind, Some(guide_index.unwrap_or(0)))
        }
    }

    /// Add a block and return its new identifier. `guide_index` is ignored
    /// for case-level kinds and defaults to guide 0 otherwise.
    pub fn add_block(
        &mut self,
        kind: BlockKind,
        guide_index: Option<usize>,
        geometry: IndexedMesh,
    ) -> ObjectId {
        self.insert(kind, guide_index, |id| BuildingBlock::new(id, geometry))
    }

    /// Add a block with a local frame.
    pub fn add_framed_block(
        &mut self,
        kind: BlockKind,
        guide_index: Option<usize>,
        geometry: IndexedMesh,
        transform: Isometry3<f64>,
    ) -> ObjectId {
        self.insert(kind, guide_index, |id| {
            BuildingBlock::new(id, geometry).with_transform(transform)
        })
    }

    fn insert(
        &mut self,
        kind: BlockKind,
        guide_index: Option<usize>,
        make: impl FnOnce(ObjectId) -> BuildingBlock,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.blocks
            .entry(Self::key(kind, guide_index))
            .or_default()
            .push(make(id));
        id
    }

    /// Add a fixation screw.
    pub fn add_screw(&mut self, screw: FixationScrew) {
        self.screws.push(screw);
    }

    /// Register (or replace) the barrel of a screw.
    pub fn register_barrel(&mut self, screw: ScrewId, barrel: RegisteredBarrel) {
        self.barrels.insert(screw, barrel);
    }

    /// Total number of stored blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }
}

impl BuildingBlockStore for MemoryStore {
    fn building_blocks(&self, kind: BlockKind, guide_index: usize) -> Vec<BuildingBlock> {
        self.blocks
            .get(&Self::key(kind, Some(guide_index)))
            .cloned()
            .unwrap_or_default()
    }

    fn fixation_screws(&self) -> Vec<FixationScrew> {
        self.screws.clone()
    }

    fn registered_barrel(&self, screw: ScrewId) -> Option<RegisteredBarrel> {
        self.barrels.get(&screw).cloned()
    }
}
