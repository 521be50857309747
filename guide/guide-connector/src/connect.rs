//! Floating-entity detection and connector synthesis.

use guide_kernel::GeometryKernel;
use guide_types::{ConnectorParams, Curve, IndexedMesh, Point3};
use tracing::{debug, info, warn};

use crate::error::{ConnectorError, ConnectorResult};

/// A synthesized connection between the base shell and an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Index of the entity in the input list.
    pub entity: usize,
    /// Base-shell vertex the connecting path starts from.
    pub anchor_vertex: u32,
    /// The connecting path.
    pub curve: Curve,
    /// Tube swept along `curve`, to be unioned into the guide.
    pub tube: IndexedMesh,
}

/// How one entity relates to the base shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityConnection {
    /// No base-shell point within the search radius; the entity is meant
    /// to be detached.
    Detached,
    /// The entity already crosses the closest base-shell triangle.
    Touching,
    /// The entity was floating and got a connector.
    Connected(Connector),
}

/// Makes sure every component meant to sit on the base shell is connected
/// to it.
///
/// For each entity the closest base-shell point to its centroid is looked
/// up within [`ConnectorParams::search_radius`]. If an edge of that
/// triangle crosses the entity, nothing is needed. Otherwise the shortest
/// edge path from the triangle's first vertex to the midpoint of the
/// opposite edge becomes a connecting curve, swept into a tube of
/// [`ConnectorParams::tube_radius`].
///
/// # Example
///
/// ```
/// use guide_connector::FloatingEntityConnector;
/// use guide_kernel::StubKernel;
/// use guide_types::{ConnectorParams, IndexedMesh, Point3};
///
/// let base = IndexedMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(10.0, 0.0, 0.0),
///         Point3::new(0.0, 10.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// let far_away = IndexedMesh::from_parts(
///     vec![
///         Point3::new(4.0, 4.0, 10.0),
///         Point3::new(6.0, 4.0, 10.0),
///         Point3::new(5.0, 6.0, 10.0),
///     ],
///     vec![[0, 1, 2]],
/// );
///
/// let kernel = StubKernel::new();
/// let params = ConnectorParams::default();
/// let connectors = FloatingEntityConnector::new(&kernel, &params).connect_all(&base, &[far_away]);
/// assert!(connectors.is_empty());
/// ```
pub struct FloatingEntityConnector<'a> {
    kernel: &'a dyn GeometryKernel,
    params: &'a ConnectorParams,
}

impl<'a> FloatingEntityConnector<'a> {
    /// Create a connector.
    #[must_use]
    pub const fn new(kernel: &'a dyn GeometryKernel, params: &'a ConnectorParams) -> Self {
        Self { kernel, params }
    }

    /// Classify one entity and build its connector if it floats.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is empty, or if a floating entity's
    /// path or tube cannot be built.
    pub fn connect_entity(
        &self,
        base: &IndexedMesh,
        entity: &IndexedMesh,
        index: usize,
    ) -> ConnectorResult<EntityConnection> {
        let centroid = entity
            .centroid()
            .ok_or(ConnectorError::EmptyEntity { entity: index })?;

        let Some(closest) = base.closest_point(&centroid, self.params.search_radius) else {
            debug!(entity = index, "No base shell within search radius, entity is detached");
            return Ok(EntityConnection::Detached);
        };
        let (Some(triangle), Some(&face)) = (base.triangle(closest.face), base.faces.get(closest.face))
        else {
            return Ok(EntityConnection::Detached);
        };

        let touching = triangle
            .edges()
            .iter()
            .any(|(start, end)| edge_crosses(entity, start, end));
        if touching {
            debug!(entity = index, "Entity touches the base shell");
            return Ok(EntityConnection::Touching);
        }

        let anchor_vertex = face[0];
        let target = Point3::from((triangle.v1.coords + triangle.v2.coords) * 0.5);
        let path = self
            .kernel
            .shortest_path_on_mesh(base, anchor_vertex, &target)
            .filter(|p| p.len() >= 2)
            .ok_or(ConnectorError::PathNotFound { entity: index })?;

        let curve = Curve::open(path);
        let tube = self
            .kernel
            .sweep_tube(&curve, self.params.tube_radius)
            .ok_or(ConnectorError::SweepFailed { entity: index })?;

        info!(
            entity = index,
            distance = closest.distance,
            length = curve.length(),
            "Connected floating entity"
        );
        Ok(EntityConnection::Connected(Connector {
            entity: index,
            anchor_vertex,
            curve,
            tube,
        }))
    }

    /// Connectors for every floating entity.
    ///
    /// Entities that cannot be connected are logged and skipped.
    #[must_use]
    pub fn connect_all(&self, base: &IndexedMesh, entities: &[IndexedMesh]) -> Vec<Connector> {
        entities
            .iter()
            .enumerate()
            .filter_map(|(i, entity)| match self.connect_entity(base, entity, i) {
                Ok(EntityConnection::Connected(connector)) => Some(connector),
                Ok(EntityConnection::Detached | EntityConnection::Touching) => None,
                Err(err) => {
                    warn!(error = %err, "Could not connect floating entity");
                    None
                }
            })
            .collect()
    }
}

/// Whether the segment crosses any triangle of `mesh`.
fn edge_crosses(mesh: &IndexedMesh, start: &Point3<f64>, end: &Point3<f64>) -> bool {
    mesh.triangles()
        .any(|t| t.segment_intersection(start, end).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use guide_kernel::{FailurePlan, KernelOp, StubKernel};

    fn base() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn hovering(z: f64) -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(4.0, 4.0, z),
                Point3::new(6.0, 4.0, z),
                Point3::new(5.0, 6.0, z),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn empty_entity_is_an_error() {
        let kernel = StubKernel::new();
        let params = ConnectorParams::default();
        let result =
            FloatingEntityConnector::new(&kernel, &params).connect_entity(&base(), &IndexedMesh::new(), 3);
        assert_eq!(result, Err(ConnectorError::EmptyEntity { entity: 3 }));
    }

    #[test]
    fn floating_entity_gets_one_connector() {
        let kernel = StubKernel::new();
        let params = ConnectorParams::default();
        let result =
            FloatingEntityConnector::new(&kernel, &params).connect_entity(&base(), &hovering(1.0), 0);

        let Ok(EntityConnection::Connected(connector)) = result else {
            panic!("expected a connector");
        };
        assert_eq!(connector.anchor_vertex, 0);
        assert_eq!(connector.curve.start(), Some(&Point3::new(0.0, 0.0, 0.0)));
        let Some(end) = connector.curve.end() else {
            panic!("connector curve is empty");
        };
        assert_relative_eq!(end.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(end.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(end.z, 0.0, epsilon = 1e-9);
        assert!(!connector.tube.is_empty());
        assert_eq!(kernel.calls(KernelOp::SweepTube), 1);
    }

    #[test]
    fn failed_sweep_is_reported_and_skipped_in_batch() {
        let kernel = StubKernel::new().failing(KernelOp::SweepTube, FailurePlan::Always);
        let params = ConnectorParams::default();
        let connector = FloatingEntityConnector::new(&kernel, &params);

        assert_eq!(
            connector.connect_entity(&base(), &hovering(1.0), 1),
            Err(ConnectorError::SweepFailed { entity: 1 })
        );
        assert!(connector.connect_all(&base(), &[hovering(1.0)]).is_empty());
    }

    #[test]
    fn search_radius_bounds_detection() {
        let kernel = StubKernel::new();
        let params = ConnectorParams::default();
        let connector = FloatingEntityConnector::new(&kernel, &params);

        assert!(matches!(
            connector.connect_entity(&base(), &hovering(1.9), 0),
            Ok(EntityConnection::Connected(_))
        ));
        assert_eq!(
            connector.connect_entity(&base(), &hovering(2.1), 0),
            Ok(EntityConnection::Detached)
        );
    }
}
