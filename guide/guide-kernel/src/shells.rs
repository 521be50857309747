//! Disjoint-shell diagnostics.
//!
//! Shells are groups of faces connected through shared vertex indices.
//! These helpers back the kernel's default diagnostics and the pipeline's
//! noise-shell cleanup.

use std::cmp::Ordering;

use guide_types::IndexedMesh;
use hashbrown::HashMap;
use tracing::debug;

/// Union-find over vertex indices.
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            Ordering::Less => self.parent[ra] = rb,
            Ordering::Greater => self.parent[rb] = ra,
            Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Build a compact mesh from a subset of faces, dropping unreferenced
/// vertices. Face normals follow their faces.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn extract_faces(mesh: &IndexedMesh, face_indices: &[usize]) -> IndexedMesh {
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut out = IndexedMesh::new();
    let mut normals = mesh.face_normals.as_ref().map(|_| Vec::new());

    for &fi in face_indices {
        let Some(face) = mesh.faces.get(fi) else {
            continue;
        };
        if face.iter().any(|&v| v as usize >= mesh.vertices.len()) {
            continue;
        }
        let mut new_face = [0u32; 3];
        for (slot, &v) in new_face.iter_mut().zip(face) {
            *slot = *remap.entry(v).or_insert_with(|| {
                out.vertices.push(mesh.vertices[v as usize]);
                (out.vertices.len() - 1) as u32
            });
        }
        out.faces.push(new_face);
        if let (Some(dst), Some(src)) = (normals.as_mut(), mesh.face_normals.as_ref()) {
            if let Some(n) = src.get(fi) {
                dst.push(*n);
            }
        }
    }

    out.face_normals = normals.filter(|n| n.len() == out.faces.len());
    out
}

/// Split a mesh into its disjoint shells, in order of first face.
#[must_use]
pub fn split_disjoint(mesh: &IndexedMesh) -> Vec<IndexedMesh> {
    if mesh.is_empty() {
        return Vec::new();
    }

    let n = mesh.vertices.len();
    let mut sets = DisjointSet::new(n);
    for face in &mesh.faces {
        if face.iter().any(|&v| v as usize >= n) {
            continue;
        }
        sets.union(face[0] as usize, face[1] as usize);
        sets.union(face[1] as usize, face[2] as usize);
    }

    let mut order: Vec<usize> = Vec::new();
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (fi, face) in mesh.faces.iter().enumerate() {
        if face.iter().any(|&v| v as usize >= n) {
            continue;
        }
        let root = sets.find(face[0] as usize);
        groups
            .entry(root)
            .or_insert_with(|| {
                order.push(root);
                Vec::new()
            })
            .push(fi);
    }

    order
        .iter()
        .filter_map(|root| groups.get(root))
        .map(|faces| extract_faces(mesh, faces))
        .collect()
}

/// Disjoint shells sorted by surface area, largest first.
#[must_use]
pub fn shells_by_area(mesh: &IndexedMesh) -> Vec<IndexedMesh> {
    let mut shells: Vec<(f64, IndexedMesh)> = split_disjoint(mesh)
        .into_iter()
        .map(|s| (s.surface_area(), s))
        .collect();
    shells.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    shells.into_iter().map(|(_, s)| s).collect()
}

/// Drop shells whose surface area is below `threshold`.
#[must_use]
pub fn remove_noise_shells(mesh: &IndexedMesh, threshold: f64) -> IndexedMesh {
    let shells = split_disjoint(mesh);
    let before = shells.len();
    let kept: Vec<IndexedMesh> = shells
        .into_iter()
        .filter(|s| s.surface_area() >= threshold)
        .collect();
    if kept.len() < before {
        debug!(
            removed = before - kept.len(),
            kept = kept.len(),
            threshold,
            "Removed noise shells"
        );
    }
    IndexedMesh::concat(&kept)
}

/// Whether two meshes touch or overlap: any edge of one crosses a face of
/// the other.
///
/// Full containment without crossing edges is not detected.
#[must_use]
pub fn meshes_intersect(a: &IndexedMesh, b: &IndexedMesh) -> bool {
    let (ba, bb) = (a.bounds(), b.bounds());
    if !ba.intersects(&bb) {
        return false;
    }
    edges_cross_faces(a, b) || edges_cross_faces(b, a)
}

fn edges_cross_faces(edges_of: &IndexedMesh, faces_of: &IndexedMesh) -> bool {
    let target_bounds = faces_of.bounds();
    let targets: Vec<_> = faces_of.triangles().collect();
    edges_of
        .triangles()
        .filter(|t| {
            let mut tb = guide_types::Aabb::empty();
            for p in [&t.v0, &t.v1, &t.v2] {
                tb.expand_to_include(p);
            }
            tb.intersects(&target_bounds)
        })
        .any(|t| {
            t.edges().iter().any(|(s, e)| {
                targets
                    .iter()
                    .any(|target| target.segment_intersection(s, e).is_some())
            })
        })
}
