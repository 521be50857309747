//! Shortest paths along mesh edges.
//!
//! Dijkstra's algorithm over the vertex graph of a triangle mesh, with
//! Euclidean edge lengths as weights. The path runs along edges, so it
//! approximates the true surface geodesic; on dense meshes the difference
//! is small.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use guide_types::{IndexedMesh, Point3};

/// Vertex adjacency with edge lengths.
#[derive(Debug, Clone)]
pub struct EdgeGraph {
    /// For each vertex, `(neighbor, edge length)` pairs.
    neighbors: Vec<Vec<(u32, f64)>>,
}

impl EdgeGraph {
    /// Build the graph from the mesh faces. Faces with out-of-range indices
    /// are skipped.
    #[must_use]
    pub fn from_mesh(mesh: &IndexedMesh) -> Self {
        let n = mesh.vertices.len();
        let mut neighbors: Vec<Vec<(u32, f64)>> = vec![Vec::new(); n];

        for &[i0, i1, i2] in &mesh.faces {
            if [i0, i1, i2].iter().any(|&i| i as usize >= n) {
                continue;
            }
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                let len = (mesh.vertices[b as usize] - mesh.vertices[a as usize]).norm();
                Self::add_edge(&mut neighbors, a, b, len);
            }
        }

        Self { neighbors }
    }

    fn add_edge(neighbors: &mut [Vec<(u32, f64)>], a: u32, b: u32, length: f64) {
        if !neighbors[a as usize].iter().any(|&(n, _)| n == b) {
            neighbors[a as usize].push((b, length));
        }
        if !neighbors[b as usize].iter().any(|&(n, _)| n == a) {
            neighbors[b as usize].push((a, length));
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbors of `vertex` with edge lengths.
    #[must_use]
    pub fn neighbors(&self, vertex: usize) -> &[(u32, f64)] {
        self.neighbors.get(vertex).map_or(&[], Vec::as_slice)
    }

    /// Vertex sequence of the shortest edge path from `source` to `target`,
    /// both inclusive. `None` if either is out of range or unreachable.
    #[must_use]
    pub fn vertex_path(&self, source: u32, target: u32) -> Option<Vec<u32>> {
        let n = self.vertex_count();
        let (s, t) = (source as usize, target as usize);
        if s >= n || t >= n {
            return None;
        }

        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<u32>> = vec![None; n];
        let mut heap = BinaryHeap::new();
        dist[s] = 0.0;
        heap.push(State {
            vertex: source,
            distance: 0.0,
        });

        while let Some(State { vertex, distance }) = heap.pop() {
            let v = vertex as usize;
            if v == t {
                break;
            }
            if distance > dist[v] {
                continue;
            }
            for &(next, len) in self.neighbors(v) {
                let candidate = distance + len;
                if candidate < dist[next as usize] {
                    dist[next as usize] = candidate;
                    prev[next as usize] = Some(vertex);
                    heap.push(State {
                        vertex: next,
                        distance: candidate,
                    });
                }
            }
        }

        if dist[t].is_infinite() {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while let Some(p) = prev[current as usize] {
            path.push(p);
            current = p;
        }
        path.reverse();
        Some(path)
    }
}

/// Priority-queue entry; ordered so the smallest distance pops first.
#[derive(Debug, Clone, Copy)]
struct State {
    vertex: u32,
    distance: f64,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex && (self.distance - other.distance).abs() < f64::EPSILON
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Shortest edge path from `from_vertex` to the mesh vertex nearest `to`,
/// extended with `to` itself when it is not already that vertex.
///
/// Returns `None` if `from_vertex` is out of range or no path exists.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn shortest_path(
    mesh: &IndexedMesh,
    from_vertex: u32,
    to: &Point3<f64>,
) -> Option<Vec<Point3<f64>>> {
    if from_vertex as usize >= mesh.vertices.len() {
        return None;
    }

    // Only vertices that belong to a face can be reached.
    let graph = EdgeGraph::from_mesh(mesh);
    let nearest = mesh
        .vertices
        .iter()
        .enumerate()
        .filter(|(i, _)| !graph.neighbors(*i).is_empty() || *i == from_vertex as usize)
        .min_by(|(_, a), (_, b)| {
            (*a - to)
                .norm_squared()
                .partial_cmp(&(*b - to).norm_squared())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i as u32)?;

    let vertices = graph.vertex_path(from_vertex, nearest)?;
    let mut points: Vec<Point3<f64>> = vertices
        .iter()
        .map(|&v| mesh.vertices[v as usize])
        .collect();
    if points.last().is_none_or(|last| (last - to).norm() > f64::EPSILON) {
        points.push(*to);
    }
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Strip of triangles along +X: 0-1-2 on y=0, 3-4-5 on y=1.
    fn strip() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
            vec![[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4]],
        )
    }

    #[test]
    fn graph_counts_shared_edges_once() {
        let graph = EdgeGraph::from_mesh(&strip());
        assert_eq!(graph.vertex_count(), 6);
        assert_eq!(graph.neighbors(1).len(), 4);
    }

    #[test]
    fn vertex_path_follows_edges() {
        let graph = EdgeGraph::from_mesh(&strip());
        let path = graph.vertex_path(0, 2).unwrap_or_default();
        assert_eq!(path, vec![0, 1, 2]);
    }

    #[test]
    fn path_ends_at_target_point() {
        let mesh = strip();
        let target = Point3::new(2.0, 0.5, 0.0);
        let path = shortest_path(&mesh, 0, &target).unwrap_or_default();
        assert_eq!(path.first(), Some(&Point3::new(0.0, 0.0, 0.0)));
        assert_eq!(path.last(), Some(&target));
        assert!(path.len() >= 3);
    }

    #[test]
    fn path_to_own_vertex_is_single_point() {
        let mesh = strip();
        let path = shortest_path(&mesh, 4, &Point3::new(1.0, 1.0, 0.0)).unwrap_or_default();
        assert_eq!(path.len(), 1);
        assert_relative_eq!(path[0], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn unreachable_or_invalid_source_is_none() {
        let mut mesh = strip();
        assert!(shortest_path(&mesh, 99, &Point3::origin()).is_none());

        // Second component far away: nearest vertex is unreachable.
        mesh.vertices.extend([
            Point3::new(50.0, 0.0, 0.0),
            Point3::new(51.0, 0.0, 0.0),
            Point3::new(50.0, 1.0, 0.0),
        ]);
        mesh.faces.push([6, 7, 8]);
        assert!(shortest_path(&mesh, 0, &Point3::new(50.0, 0.0, 0.0)).is_none());
    }
}
