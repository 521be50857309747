//! Cache keys and cached values.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

use guide_types::{BarrelType, IndexedMesh, Isometry3, ScrewId};

use crate::store::FixationScrew;

/// Named geometry input of a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Union of the anatomy support meshes.
    SupportMesh,
    /// Union of the surface-wrap meshes.
    SurfaceWrap,
    /// Raw guide surface patches.
    GuideSurfaces,
    /// Smoothed guide surfaces from the four surface layers.
    SmoothedGuideSurfaces,
    /// Link surfaces.
    LinkSurfaces,
    /// Solid surface patches.
    SolidSurfaces,
    /// Union of the osteotomy geometry.
    Osteotomies,
    /// Bridges with their local frames.
    Bridges,
    /// Flanges.
    Flanges,
    /// Teeth-integration blocks.
    TeethBlocks,
    /// Fixation screws linked to the guide.
    FixationScrews,
    /// Screw-eye sweeps of the linked screws.
    ScrewEyes,
    /// Screw-eye clearance volumes of the linked screws.
    ScrewEyeSubtractors,
    /// Barrel shape/subtractor pairs, keyed by screw.
    Barrels,
}

impl ComponentKind {
    /// Every kind, in evaluation order.
    pub const ALL: [Self; 14] = [
        Self::SupportMesh,
        Self::SurfaceWrap,
        Self::GuideSurfaces,
        Self::SmoothedGuideSurfaces,
        Self::LinkSurfaces,
        Self::SolidSurfaces,
        Self::Osteotomies,
        Self::Bridges,
        Self::Flanges,
        Self::TeethBlocks,
        Self::FixationScrews,
        Self::ScrewEyes,
        Self::ScrewEyeSubtractors,
        Self::Barrels,
    ];
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SupportMesh => "support mesh",
            Self::SurfaceWrap => "surface wrap",
            Self::GuideSurfaces => "guide surfaces",
            Self::SmoothedGuideSurfaces => "smoothed guide surfaces",
            Self::LinkSurfaces => "link surfaces",
            Self::SolidSurfaces => "solid surfaces",
            Self::Osteotomies => "osteotomies",
            Self::Bridges => "bridges",
            Self::Flanges => "flanges",
            Self::TeethBlocks => "teeth blocks",
            Self::FixationScrews => "fixation screws",
            Self::ScrewEyes => "screw eyes",
            Self::ScrewEyeSubtractors => "screw-eye subtractors",
            Self::Barrels => "barrels",
        };
        f.write_str(name)
    }
}

/// A mesh with the local coordinate frame of its building block.
#[derive(Debug, Clone, PartialEq)]
pub struct FramedMesh {
    /// Geometry in world coordinates.
    pub mesh: IndexedMesh,
    /// Local frame; identity when the block stored none.
    pub frame: Isometry3<f64>,
}

/// Barrel of one screw linked to the guide.
#[derive(Debug, Clone)]
pub struct BarrelEntry {
    /// Owning screw; also identifies the barrel.
    pub screw: ScrewId,
    /// Barrel flavour.
    pub barrel_type: BarrelType,
    /// Registered alignment transform.
    pub alignment: Isometry3<f64>,
    /// Shape added to the guide, aligned. Conformed to the surface wrap for
    /// marking barrels.
    pub shape: IndexedMesh,
    /// Volumes removed from the guide, aligned.
    pub subtractors: Vec<IndexedMesh>,
    creation_error: Cell<bool>,
}

impl BarrelEntry {
    /// Create an entry with a clear error flag.
    #[must_use]
    pub const fn new(
        screw: ScrewId,
        barrel_type: BarrelType,
        alignment: Isometry3<f64>,
        shape: IndexedMesh,
        subtractors: Vec<IndexedMesh>,
    ) -> Self {
        Self {
            screw,
            barrel_type,
            alignment,
            shape,
            subtractors,
            creation_error: Cell::new(false),
        }
    }

    /// Record that this barrel's junction had to use the fallback path.
    pub fn mark_creation_error(&self) {
        self.creation_error.set(true);
    }

    /// Whether the fallback path was used for this barrel.
    #[must_use]
    pub fn has_creation_error(&self) -> bool {
        self.creation_error.get()
    }

    /// Subtractors merged into one mesh.
    #[must_use]
    pub fn merged_subtractor(&self) -> IndexedMesh {
        IndexedMesh::concat(&self.subtractors)
    }
}

/// A cached value.
#[derive(Debug, Clone)]
pub enum Resource {
    /// A single mesh; empty when nothing was found.
    Mesh(IndexedMesh),
    /// A list of meshes.
    Meshes(Vec<IndexedMesh>),
    /// Meshes with local frames.
    Framed(Vec<FramedMesh>),
    /// Fixation screws.
    Screws(Vec<FixationScrew>),
    /// Barrels keyed by screw.
    Barrels(BTreeMap<ScrewId, BarrelEntry>),
}

impl Resource {
    /// The single mesh, if this is a mesh value.
    #[must_use]
    pub const fn as_mesh(&self) -> Option<&IndexedMesh> {
        match self {
            Self::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// The mesh list, if this is a list value.
    #[must_use]
    pub fn as_meshes(&self) -> Option<&[IndexedMesh]> {
        match self {
            Self::Meshes(m) => Some(m),
            _ => None,
        }
    }

    /// The framed meshes, if this is a framed value.
    #[must_use]
    pub fn as_framed(&self) -> Option<&[FramedMesh]> {
        match self {
            Self::Framed(m) => Some(m),
            _ => None,
        }
    }

    /// The screws, if this is a screw list.
    #[must_use]
    pub fn as_screws(&self) -> Option<&[FixationScrew]> {
        match self {
            Self::Screws(s) => Some(s),
            _ => None,
        }
    }

    /// The barrels, if this is a barrel map.
    #[must_use]
    pub const fn as_barrels(&self) -> Option<&BTreeMap<ScrewId, BarrelEntry>> {
        match self {
            Self::Barrels(b) => Some(b),
            _ => None,
        }
    }

    /// Number of meshes held, counting nested ones.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        match self {
            Self::Mesh(m) => usize::from(!m.is_empty()),
            Self::Meshes(m) => m.len(),
            Self::Framed(m) => m.len(),
            Self::Screws(s) => s
                .iter()
                .map(|s| usize::from(s.eye.is_some()) + usize::from(s.eye_subtractor.is_some()))
                .sum(),
            Self::Barrels(b) => b.values().map(|e| 1 + e.subtractors.len()).sum(),
        }
    }

    /// Whether the value holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mesh(m) => m.is_empty(),
            Self::Meshes(m) => m.is_empty(),
            Self::Framed(m) => m.is_empty(),
            Self::Screws(s) => s.is_empty(),
            Self::Barrels(b) => b.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_count_includes_nested_meshes() {
        let mut barrels = BTreeMap::new();
        barrels.insert(
            ScrewId(1),
            BarrelEntry::new(
                ScrewId(1),
                BarrelType::Standard,
                Isometry3::identity(),
                IndexedMesh::new(),
                vec![IndexedMesh::new(), IndexedMesh::new()],
            ),
        );
        assert_eq!(Resource::Barrels(barrels).mesh_count(), 3);
        assert_eq!(Resource::Mesh(IndexedMesh::new()).mesh_count(), 0);
        assert_eq!(Resource::Meshes(vec![IndexedMesh::new()]).mesh_count(), 1);
    }

    #[test]
    fn creation_error_flag_is_shared_through_references() {
        let entry = BarrelEntry::new(
            ScrewId(3),
            BarrelType::Marking,
            Isometry3::identity(),
            IndexedMesh::new(),
            Vec::new(),
        );
        let shared = &entry;
        assert!(!entry.has_creation_error());
        shared.mark_creation_error();
        assert!(entry.has_creation_error());
    }

    #[test]
    fn every_kind_listed_once() {
        let mut kinds = ComponentKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), ComponentKind::ALL.len());
    }
}
