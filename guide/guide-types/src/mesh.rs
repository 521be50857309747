//! Indexed triangle mesh.

use nalgebra::{Isometry3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, Triangle};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index. Faces use counter-clockwise winding when viewed from
/// outside. Per-face normals are optional and only kept when a producer
/// supplies them.
///
/// Meshes are plain values: a kernel call receives a borrowed mesh and
/// hands back a new one, so callers that need to retain an input simply
/// keep their copy.
///
/// # Example
///
/// ```
/// use guide_types::{IndexedMesh, Point3};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.face_count(), 1);
/// assert!(mesh.is_valid());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,

    /// Optional per-face normals, parallel to `faces`.
    pub face_normals: Option<Vec<Vector3<f64>>>,
}

/// Result of a closest-point query against a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Index of the face containing the closest point.
    pub face: usize,
    /// The closest point itself.
    pub point: Point3<f64>,
    /// Distance from the query point.
    pub distance: f64,
}

impl IndexedMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_normals: None,
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            face_normals: None,
        }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// Returns an empty mesh if either array length is not a multiple of 3.
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }
        let vertices = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::from_parts(vertices, faces)
    }

    /// Concatenate several meshes into one without any boolean resolution.
    #[must_use]
    pub fn concat<'a>(meshes: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut out = Self::new();
        for mesh in meshes {
            out.merge(mesh);
        }
        out
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// A mesh with no faces (or no vertices) is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Whether the mesh is usable as geometry: non-empty, every index in
    /// range, every coordinate finite, and normals (if any) parallel to
    /// the faces.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let n = self.vertices.len();
        let indices_ok = self
            .faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < n));
        let coords_ok = self
            .vertices
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        let normals_ok = self
            .face_normals
            .as_ref()
            .is_none_or(|normals| normals.len() == self.faces.len());
        indices_ok && coords_ok && normals_ok
    }

    /// Resolve a face into a triangle. Returns `None` for an out-of-range
    /// face or vertex index.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let [a, b, c] = *self.faces.get(face_index)?;
        Some(Triangle::new(
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ))
    }

    /// Iterate over all resolvable triangles.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }

    /// Axis-aligned bounds of the referenced geometry.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Mean of the vertex positions, or `None` for a mesh without vertices.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / self.vertices.len() as f64))
    }

    /// Append another mesh, offsetting its face indices.
    ///
    /// Face normals are kept only if both meshes carry them.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: indices are u32, meshes beyond 4B vertices are unsupported
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        let had_faces = !self.faces.is_empty();

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );

        self.face_normals = match (self.face_normals.take(), &other.face_normals) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if !had_faces => Some(theirs.clone()),
            _ => None,
        };
    }

    /// Copy of the mesh with `transform` applied to every vertex and normal.
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| transform * p).collect(),
            faces: self.faces.clone(),
            face_normals: self
                .face_normals
                .as_ref()
                .map(|ns| ns.iter().map(|n| transform * n).collect()),
        }
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for p in &mut self.vertices {
            *p += offset;
        }
    }

    /// Recompute per-face normals from the winding. Degenerate faces get a
    /// zero normal.
    pub fn compute_face_normals(&mut self) {
        let normals = (0..self.faces.len())
            .map(|i| {
                self.triangle(i)
                    .and_then(|t| t.normal())
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect();
        self.face_normals = Some(normals);
    }

    /// Closest point on the surface to `query`, restricted to faces within
    /// `max_distance`.
    ///
    /// Returns `None` if no face lies within the search radius.
    #[must_use]
    pub fn closest_point(&self, query: &Point3<f64>, max_distance: f64) -> Option<ClosestPoint> {
        let mut best: Option<ClosestPoint> = None;
        for (face, tri) in (0..self.faces.len()).filter_map(|i| self.triangle(i).map(|t| (i, t))) {
            let point = tri.closest_point(query);
            let distance = (point - query).norm();
            if distance > max_distance {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(ClosestPoint {
                    face,
                    point,
                    distance,
                });
            }
        }
        best
    }
}
