//! Additional components: eyes, bridges, flanges, barrels, connectors and
//! transitions.

use guide_cache::FramedMesh;
use guide_connector::FloatingEntityConnector;
use guide_kernel::{GeometryKernel, WrapParams};
use guide_types::{GuideParameters, IndexedMesh};
use tracing::{debug, warn};

/// Geometry that goes into the additional-components mesh.
pub(crate) struct ComponentInputs<'m> {
    pub eyes: &'m [IndexedMesh],
    pub bridges: &'m [FramedMesh],
    pub flanges: &'m [IndexedMesh],
    /// Shapes of the barrels joined by union (not the marking barrels).
    pub barrel_shapes: &'m [IndexedMesh],
    /// Marking barrel shapes. They are joined in the barrel stage; here
    /// they only get connectors when they float.
    pub marking_barrels: &'m [IndexedMesh],
    pub teeth: &'m [IndexedMesh],
    pub support: &'m IndexedMesh,
    /// The lattice shell the components sit on.
    pub base: &'m IndexedMesh,
}

/// Builds the additional-components mesh that is unioned onto the base.
pub(crate) struct ComponentAssembler<'a> {
    kernel: &'a dyn GeometryKernel,
    params: &'a GuideParameters,
}

impl<'a> ComponentAssembler<'a> {
    pub(crate) const fn new(kernel: &'a dyn GeometryKernel, params: &'a GuideParameters) -> Self {
        Self { kernel, params }
    }

    /// Concatenation of every component, connector tube and transition.
    pub(crate) fn assemble(&self, inputs: &ComponentInputs<'_>) -> IndexedMesh {
        let bridges = self.bridge_pieces(inputs);

        let entities: Vec<IndexedMesh> = inputs
            .eyes
            .iter()
            .chain(inputs.barrel_shapes)
            .cloned()
            .collect();
        let candidates: Vec<IndexedMesh> = entities
            .iter()
            .chain(inputs.marking_barrels)
            .cloned()
            .collect();
        let tubes: Vec<IndexedMesh> = FloatingEntityConnector::new(self.kernel, &self.params.connector)
            .connect_all(inputs.base, &candidates)
            .into_iter()
            .map(|c| c.tube)
            .collect();
        let transition = self.transition(&entities, inputs.base);

        debug!(
            eyes = inputs.eyes.len(),
            bridges = bridges.len(),
            flanges = inputs.flanges.len(),
            barrels = inputs.barrel_shapes.len(),
            connectors = tubes.len(),
            transition = transition.is_some(),
            "Collected additional components"
        );

        IndexedMesh::concat(
            inputs
                .eyes
                .iter()
                .chain(&bridges)
                .chain(inputs.flanges)
                .chain(inputs.barrel_shapes)
                .chain(&tubes)
                .chain(&transition),
        )
    }

    /// Bridge geometry, split where it runs into a teeth block.
    fn bridge_pieces(&self, inputs: &ComponentInputs<'_>) -> Vec<IndexedMesh> {
        let mut teeth_wrap: Option<IndexedMesh> = None;
        inputs
            .bridges
            .iter()
            .enumerate()
            .map(|(i, bridge)| {
                let bridge = &bridge.mesh;
                if !inputs
                    .teeth
                    .iter()
                    .any(|t| self.kernel.meshes_collide(bridge, t))
                {
                    return bridge.clone();
                }
                let wrap = teeth_wrap.get_or_insert_with(|| self.wrap_teeth(inputs.teeth));
                self.split_bridge(i, bridge, wrap, inputs.support, inputs.base)
            })
            .collect()
    }

    /// Teeth blocks wrapped slightly inward so bridges overlap them as
    /// little as possible.
    fn wrap_teeth(&self, teeth: &[IndexedMesh]) -> IndexedMesh {
        let params = WrapParams::new(
            self.params.wrap_smallest_detail,
            self.params.wrap_gap_closing_distance,
        )
        .with_offset(self.params.teeth_wrap_offset);
        self.kernel.wrap(teeth, &params).unwrap_or_else(|err| {
            warn!(error = %err, "Could not wrap teeth blocks, splitting bridges against raw blocks");
            IndexedMesh::concat(teeth)
        })
    }

    /// Cut teeth and support out of a bridge and keep only the pieces that
    /// still reach the base.
    fn split_bridge(
        &self,
        index: usize,
        bridge: &IndexedMesh,
        teeth: &IndexedMesh,
        support: &IndexedMesh,
        base: &IndexedMesh,
    ) -> IndexedMesh {
        let tools: Vec<IndexedMesh> = [teeth, support]
            .into_iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect();
        let remainder = self.kernel.boolean_subtract(bridge, &tools);
        let shells = self.kernel.split_disjoint(&remainder);
        let total = shells.len();
        let kept: Vec<IndexedMesh> = shells
            .into_iter()
            .filter(|s| self.kernel.meshes_collide(s, base))
            .collect();
        debug!(
            bridge = index,
            pieces = total,
            kept = kept.len(),
            "Split bridge at teeth block"
        );
        IndexedMesh::concat(&kept)
    }

    /// Smooth junction between barrels/eyes and the lattice: wrap a region
    /// around the entities, clip the lattice to it, then grow and shrink
    /// the clipped region together with the entities by the transition
    /// radius.
    fn transition(&self, entities: &[IndexedMesh], lattice: &IndexedMesh) -> Option<IndexedMesh> {
        let transition = &self.params.transition;
        if !transition.is_enabled() || entities.is_empty() {
            return None;
        }

        let detail = self.params.wrap_smallest_detail;
        let gap = transition.gap_closing_distance;
        let roi = self
            .kernel
            .wrap(entities, &WrapParams::new(detail, gap).with_offset(transition.radius))
            .map_err(|err| warn!(error = %err, "Could not wrap transition region"))
            .ok()?;

        let local = self.kernel.boolean_intersect(lattice, &roi);
        if local.is_empty() {
            debug!("Lattice does not reach the transition region");
            return None;
        }

        let mut inputs = entities.to_vec();
        inputs.push(local);
        let grown = self
            .kernel
            .wrap(&inputs, &WrapParams::new(detail, gap).with_offset(transition.radius))
            .map_err(|err| warn!(error = %err, "Could not grow transition"))
            .ok()?;
        self.kernel
            .wrap(
                std::slice::from_ref(&grown),
                &WrapParams::new(detail, gap).with_offset(-transition.radius),
            )
            .map_err(|err| warn!(error = %err, "Could not shrink transition"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guide_kernel::{FailurePlan, KernelOp, StubKernel};
    use guide_types::{Isometry3, Point3};

    fn square_xy(x0: f64, y0: f64, size: f64, z: f64) -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(x0, y0, z),
                Point3::new(x0 + size, y0, z),
                Point3::new(x0 + size, y0 + size, z),
                Point3::new(x0, y0 + size, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// Vertical strip in the x = 5 plane from z = -1 to z = 8, made of three
    /// stacked quads sharing edges.
    fn bridge() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Point3::new(5.0, 4.0, -1.0),
                Point3::new(5.0, 6.0, -1.0),
                Point3::new(5.0, 6.0, 2.0),
                Point3::new(5.0, 4.0, 2.0),
                Point3::new(5.0, 6.0, 5.0),
                Point3::new(5.0, 4.0, 5.0),
                Point3::new(5.0, 6.0, 8.0),
                Point3::new(5.0, 4.0, 8.0),
            ],
            vec![[0, 1, 2], [0, 2, 3], [3, 2, 4], [3, 4, 5], [5, 4, 6], [5, 6, 7]],
        )
    }

    /// Two slabs bounding the middle quad of the bridge.
    fn tooth() -> IndexedMesh {
        IndexedMesh::concat(&[square_xy(3.0, 3.0, 4.0, 2.5), square_xy(3.0, 3.0, 4.0, 4.5)])
    }

    fn base() -> IndexedMesh {
        square_xy(0.0, 0.0, 10.0, 0.0)
    }

    fn framed(mesh: IndexedMesh) -> FramedMesh {
        FramedMesh {
            mesh,
            frame: Isometry3::identity(),
        }
    }

    #[test]
    fn bridge_through_a_tooth_keeps_only_the_grounded_piece() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let bridges = [framed(bridge())];
        let teeth = [tooth()];
        let support = IndexedMesh::new();
        let base = base();
        let inputs = ComponentInputs {
            eyes: &[],
            bridges: &bridges,
            flanges: &[],
            barrel_shapes: &[],
            marking_barrels: &[],
            teeth: &teeth,
            support: &support,
            base: &base,
        };

        let pieces = ComponentAssembler::new(&kernel, &params).bridge_pieces(&inputs);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].face_count(), 2);
        assert!(pieces[0].vertices.iter().all(|v| v.z <= 2.0));
        assert_eq!(kernel.calls(KernelOp::Wrap), 1);
    }

    #[test]
    fn bridge_clear_of_teeth_is_untouched() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let bridges = [framed(bridge())];
        let teeth = [square_xy(30.0, 30.0, 4.0, 3.0)];
        let support = IndexedMesh::new();
        let base = base();
        let inputs = ComponentInputs {
            eyes: &[],
            bridges: &bridges,
            flanges: &[],
            barrel_shapes: &[],
            marking_barrels: &[],
            teeth: &teeth,
            support: &support,
            base: &base,
        };

        let pieces = ComponentAssembler::new(&kernel, &params).bridge_pieces(&inputs);
        assert_eq!(pieces, vec![bridge()]);
        assert_eq!(kernel.calls(KernelOp::Wrap), 0);
        assert_eq!(kernel.calls(KernelOp::Subtract), 0);
    }

    #[test]
    fn floating_barrel_gets_a_connector_tube() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let barrel = square_xy(4.0, 4.0, 1.0, 1.0);
        let support = IndexedMesh::new();
        let base = base();
        let inputs = ComponentInputs {
            eyes: &[],
            bridges: &[],
            flanges: &[],
            barrel_shapes: std::slice::from_ref(&barrel),
            marking_barrels: &[],
            teeth: &[],
            support: &support,
            base: &base,
        };

        let components = ComponentAssembler::new(&kernel, &params).assemble(&inputs);
        assert!(components.face_count() > barrel.face_count());
        assert_eq!(kernel.calls(KernelOp::SweepTube), 1);
    }

    #[test]
    fn floating_marking_barrel_gets_only_a_connector() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default();
        let barrel = square_xy(4.0, 4.0, 1.0, 1.0);
        let support = IndexedMesh::new();
        let base = base();
        let inputs = ComponentInputs {
            eyes: &[],
            bridges: &[],
            flanges: &[],
            barrel_shapes: &[],
            marking_barrels: std::slice::from_ref(&barrel),
            teeth: &[],
            support: &support,
            base: &base,
        };

        let components = ComponentAssembler::new(&kernel, &params).assemble(&inputs);
        assert_eq!(kernel.calls(KernelOp::SweepTube), 1);
        assert!(!components.is_empty());
        assert!(
            barrel
                .vertices
                .iter()
                .all(|v| !components.vertices.contains(v))
        );
    }

    #[test]
    fn transition_runs_three_wraps_when_enabled() {
        let kernel = StubKernel::new();
        let params = GuideParameters::default().with_transition(0.5, 1.0);
        let eye = square_xy(1.0, 1.0, 8.0, 0.0);

        let transition =
            ComponentAssembler::new(&kernel, &params).transition(std::slice::from_ref(&eye), &base());
        assert!(transition.is_some());
        assert_eq!(kernel.calls(KernelOp::Wrap), 3);
        assert_eq!(kernel.calls(KernelOp::Intersect), 1);
    }

    #[test]
    fn transition_is_skipped_when_disabled_or_failing() {
        let params = GuideParameters::default();
        let kernel = StubKernel::new();
        let eye = square_xy(2.0, 2.0, 2.0, 0.0);
        assert!(
            ComponentAssembler::new(&kernel, &params)
                .transition(std::slice::from_ref(&eye), &base())
                .is_none()
        );
        assert_eq!(kernel.total_calls(), 0);

        let params = params.with_transition(0.5, 1.0);
        let kernel = StubKernel::new().failing(KernelOp::Wrap, FailurePlan::Always);
        assert!(
            ComponentAssembler::new(&kernel, &params)
                .transition(std::slice::from_ref(&eye), &base())
                .is_none()
        );
    }
}
