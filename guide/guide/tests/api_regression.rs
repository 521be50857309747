//! API regression tests for the guide crate ecosystem.
//!
//! Organized in tiers that follow the data flow through the workspace:
//!
//! - Tier 1: Foundation (guide-types, guide-kernel)
//! - Tier 2: Resource cache (guide-cache)
//! - Tier 3: Pipeline stages (guide-base, guide-slot, guide-connector)
//! - Tier 4: Shell filtering and repair (guide-repair)
//! - Tier 5: Orchestration (guide-assembly)
//!
//! If any of these fail after an API change, the change is breaking and
//! needs a version bump.

use std::borrow::Cow;
use std::rc::Rc;
use std::time::Duration;

use guide::prelude::*;
use guide::{assembly, base, cache, connector, kernel, repair, slot};

fn square(x0: f64, y0: f64, size: f64, z: f64) -> IndexedMesh {
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

fn base_triangle() -> IndexedMesh {
    IndexedMesh::from_parts(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ],
        vec![[0, 1, 2]],
    )
}

fn hovering_triangle(z: f64) -> IndexedMesh {
    IndexedMesh::from_parts(
        vec![
            Point3::new(4.0, 4.0, z),
            Point3::new(6.0, 4.0, z),
            Point3::new(5.0, 6.0, z),
        ],
        vec![[0, 1, 2]],
    )
}

fn quick_repair() -> RepairParams {
    RepairParams::default().with_retry_delay(Duration::ZERO)
}

// =============================================================================
// TIER 1: Foundation
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn default_parameters_validate() {
        assert!(GuideParameters::default().validate().is_ok());
        assert!(GuideParameters::preview().validate().is_ok());
        assert!(GuideParameters::default()
            .with_lattice(0.0, 0.5)
            .validate()
            .is_err());
    }

    #[test]
    fn mesh_concat_and_area() {
        let mesh = IndexedMesh::concat(&[square(0.0, 0.0, 2.0, 0.0), square(5.0, 0.0, 1.0, 0.0)]);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        approx::assert_relative_eq!(mesh.surface_area(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn stub_kernel_counts_each_operation() {
        let stub = StubKernel::new();
        let mesh = square(0.0, 0.0, 1.0, 0.0);
        let _ = stub.unify(&mesh);
        let _ = stub.boolean_union(&[mesh.clone(), mesh]);
        assert_eq!(stub.calls(KernelOp::Unify), 1);
        assert_eq!(stub.calls(KernelOp::Union), 1);
        assert_eq!(stub.total_calls(), 2);
    }

    #[test]
    fn injected_failures_follow_their_plan() {
        let stub = StubKernel::new().failing(KernelOp::Offset, kernel::FailurePlan::FirstCalls(1));
        let mesh = square(0.0, 0.0, 1.0, 0.0);
        assert!(stub.offset(&mesh, 1.0).is_none());
        assert!(stub.offset(&mesh, 1.0).is_some());
    }
}

// =============================================================================
// TIER 2: Resource cache
// =============================================================================

mod tier2_cache {
    use super::*;

    #[test]
    fn repeated_get_returns_the_same_value() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSurface, Some(0), square(0.0, 0.0, 4.0, 0.0));
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let mut resources = cache::ResourceCache::new(&store, &stub, &params, 0);

        let first = resources.get(cache::ComponentKind::GuideSurfaces);
        let second = resources.get(cache::ComponentKind::GuideSurfaces);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(resources.evaluations(), 1);
    }

    #[test]
    fn dispose_releases_each_entry_once() {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSurface, Some(0), square(0.0, 0.0, 4.0, 0.0));
        store.add_block(BlockKind::Flange, Some(0), square(8.0, 0.0, 1.0, 0.0));
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let mut resources = cache::ResourceCache::new(&store, &stub, &params, 0);

        let _ = resources.get(cache::ComponentKind::GuideSurfaces);
        let _ = resources.get(cache::ComponentKind::Flanges);
        let _ = resources.get(cache::ComponentKind::Flanges);

        let report = resources.dispose();
        assert_eq!(report.entries, 2);
        assert!(resources.is_empty());
        assert!(resources.dispose().is_empty());
    }

    #[test]
    fn missing_blocks_are_empty_not_errors() {
        let store = MemoryStore::new();
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let mut resources = cache::ResourceCache::new(&store, &stub, &params, 4);

        assert!(resources.osteotomies().is_none());
        assert!(resources.flanges().is_empty());
        assert!(resources.barrels().is_empty());
        assert!(resources.support_mesh().is_empty());
    }
}

// =============================================================================
// TIER 3: Pipeline stages
// =============================================================================

mod tier3_stages {
    use super::*;

    #[test]
    fn base_surface_from_patches() {
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let built = base::GuideBaseSurfaceBuilder::new(&stub, &params)
            .build(&[square(0.0, 0.0, 4.0, 0.0), square(10.0, 0.0, 0.5, 0.0)]);

        let Ok(built) = built else {
            panic!("base surface failed");
        };
        assert_eq!(built.pieces, 1);
        assert_eq!(built.noise_shells_removed, 1);
        assert!(!built.lattice.is_empty());
    }

    #[test]
    fn no_osteotomy_passes_the_lattice_through() {
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let lattice = square(0.0, 0.0, 4.0, 0.0);

        let result = slot::CutSlotSubtractor::new(&stub, &params).apply(&lattice, None, &[], &lattice);

        let Ok(Cow::Borrowed(out)) = result else {
            panic!("expected the lattice back by reference");
        };
        assert!(std::ptr::eq(out, &lattice));
        assert_eq!(stub.total_calls(), 0);
    }

    #[test]
    fn entity_beyond_search_radius_gets_no_connector() {
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let found = connector::FloatingEntityConnector::new(&stub, &params.connector)
            .connect_all(&base_triangle(), &[hovering_triangle(10.0)]);
        assert!(found.is_empty());
        assert_eq!(stub.total_calls(), 0);
    }

    #[test]
    fn entity_crossing_a_base_edge_gets_no_connector() {
        let touching = IndexedMesh::from_parts(
            vec![
                Point3::new(5.0, -1.0, -1.0),
                Point3::new(5.0, 1.0, -1.0),
                Point3::new(5.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let result = connector::FloatingEntityConnector::new(&stub, &params.connector)
            .connect_entity(&base_triangle(), &touching, 0);

        assert_eq!(result, Ok(connector::EntityConnection::Touching));
        assert_eq!(stub.calls(KernelOp::SweepTube), 0);
    }

    #[test]
    fn entity_just_off_the_shell_gets_one_anchored_connector() {
        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let found = connector::FloatingEntityConnector::new(&stub, &params.connector)
            .connect_all(&base_triangle(), &[hovering_triangle(0.5)]);

        assert_eq!(found.len(), 1);
        let anchor = base_triangle().vertices[found[0].anchor_vertex as usize];
        assert_eq!(found[0].curve.start(), Some(&anchor));
    }
}

// =============================================================================
// TIER 4: Shell filtering and repair
// =============================================================================

mod tier4_repair {
    use super::*;

    #[test]
    fn filtering_keeps_the_single_largest_shell() {
        let stub = StubKernel::new();
        let pieces = IndexedMesh::concat(&[
            square(0.0, 0.0, 2.0, 0.0),
            square(10.0, 0.0, 5.0, 0.0),
            square(20.0, 0.0, 3.0, 0.0),
        ]);

        let kept = repair::filter_shells(&stub, &pieces, true, 1.0).unwrap_or_default();

        assert_eq!(kept.face_count(), 2);
        approx::assert_relative_eq!(kept.surface_area(), 25.0, epsilon = 1e-9);
        assert!(kept.vertices.iter().all(|v| (10.0..=15.0).contains(&v.x)));
    }

    #[test]
    fn three_failed_reductions_return_the_cleaned_mesh() {
        let stub = StubKernel::new().failing(
            KernelOp::QualityPreservingReduce,
            kernel::FailurePlan::FirstCalls(3),
        );
        let params = GuideParameters::default();
        let repair_params = quick_repair();
        let telemetry = repair::TelemetryLog::new();
        let mesh = square(0.0, 0.0, 4.0, 0.0);

        let outcome = repair::MeshRepairStage::new(&stub, &params.reduction, &repair_params)
            .with_telemetry(&telemetry)
            .run(&mesh);

        let Ok(outcome) = outcome else {
            panic!("repair should degrade, not fail");
        };
        assert!(outcome.needs_manual_fix);
        assert_eq!(outcome.mesh, mesh);
        assert_eq!(stub.calls(KernelOp::QualityPreservingReduce), 3);
        assert_eq!(telemetry.len(), 3);
    }
}

// =============================================================================
// TIER 5: Orchestration
// =============================================================================

mod tier5_assembly {
    use super::*;

    fn guide_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_block(BlockKind::GuideSurface, Some(0), square(0.0, 0.0, 20.0, 0.0));
        store
    }

    fn register(store: &mut MemoryStore, id: u32, barrel_type: BarrelType, subtractors: Vec<IndexedMesh>) {
        store.add_screw(FixationScrew::new(ScrewId(id), [0], barrel_type));
        store.register_barrel(
            ScrewId(id),
            RegisteredBarrel {
                shape: square(5.0, 5.0, 4.0, 1.0),
                subtractors,
                alignment: Isometry3::identity(),
            },
        );
    }

    #[test]
    fn failing_fillet_flags_the_barrel_and_keeps_the_guide() {
        let mut store = guide_store();
        register(&mut store, 7, BarrelType::Marking, vec![square(5.0, 5.0, 4.0, 0.0)]);

        let stub = StubKernel::new().failing(KernelOp::Fillet, kernel::FailurePlan::Always);
        let params = GuideParameters::default();
        let options = CreationOptions::default()
            .with_filter_disjoint_pieces(false)
            .with_repair(quick_repair());
        let qc = assembly::QcLog::new();
        let Ok(creator) = GuideCreator::new(&stub, &params, options) else {
            panic!("parameters rejected");
        };

        let creation = creator.create(&store, 0, &qc);

        assert!(creation.is_success(), "{}", creation.summary());
        assert!(creation.failed_barrels.contains(ScrewId(7)));
        assert_eq!(qc.flagged(), vec![ScrewId(7)]);
        let mesh = creation.mesh.unwrap_or_default();
        assert!(mesh.vertices.iter().any(|v| v.z > 0.5 && (5.0..=9.0).contains(&v.x)));
    }

    #[test]
    fn mismatched_barrel_linkage_fails_without_geometry_work() {
        let mut store = guide_store();
        register(
            &mut store,
            1,
            BarrelType::Standard,
            vec![square(5.0, 5.0, 1.0, 0.0), square(7.0, 7.0, 1.0, 0.0)],
        );
        register(&mut store, 2, BarrelType::Standard, vec![square(9.0, 9.0, 1.0, 0.0)]);

        let stub = StubKernel::new();
        let params = GuideParameters::default();
        let Ok(creator) = GuideCreator::new(&stub, &params, CreationOptions::default()) else {
            panic!("parameters rejected");
        };

        let creation = creator.create(&store, 0, &NoQc);

        assert!(!creation.is_success());
        assert!(creation.summary().contains("not in sync"));
        assert_eq!(stub.calls(KernelOp::Fillet), 0);
        assert_eq!(stub.calls(KernelOp::Union), 0);
    }

    #[test]
    fn runner_reports_each_guide() {
        let store = guide_store();
        let stub = StubKernel::new();
        let params = GuideParameters::preview();
        let Ok(creator) = GuideCreator::new(&stub, &params, CreationOptions::preview()) else {
            panic!("parameters rejected");
        };

        let creations = CaseGuideRunner::new(creator, &NoQc).run(&store, [0, 1]);

        assert_eq!(creations.len(), 2);
        assert!(creations[0].is_success());
        assert_eq!(
            creations[1].summary(),
            "guide 1 could not be created: base surface: no guide surfaces to build from"
        );
    }
}
