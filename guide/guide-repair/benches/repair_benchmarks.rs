//! Benchmarks for shell filtering and disjoint-shell splitting.
//!
//! Run with: cargo bench -p guide-repair
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p guide-repair -- --save-baseline main
//! 2. After changes: cargo bench -p guide-repair -- --baseline main

#![allow(missing_docs, clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use guide_kernel::{StubKernel, split_disjoint};
use guide_repair::filter_shells;
use guide_types::{IndexedMesh, Point3};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// A `cells` x `cells` grid of unit quads, as one connected shell.
fn create_grid(cells: u32, x0: f64) -> IndexedMesh {
    let mut mesh = IndexedMesh::new();
    let stride = cells + 1;

    for j in 0..=cells {
        for i in 0..=cells {
            mesh.vertices
                .push(Point3::new(x0 + f64::from(i), f64::from(j), 0.0));
        }
    }
    for j in 0..cells {
        for i in 0..cells {
            let v = j * stride + i;
            mesh.faces.push([v, v + 1, v + stride + 1]);
            mesh.faces.push([v, v + stride + 1, v + stride]);
        }
    }

    mesh
}

/// `count` disjoint grids of decreasing size, plus tiny noise triangles.
fn create_fragmented(count: u32, cells: u32) -> IndexedMesh {
    let grids: Vec<IndexedMesh> = (0..count)
        .map(|k| create_grid((cells - k % cells).max(1), f64::from(k) * (f64::from(cells) + 2.0)))
        .collect();
    let noise: Vec<IndexedMesh> = (0..count * 4)
        .map(|k| {
            let x = f64::from(k) * 0.5;
            IndexedMesh::from_parts(
                vec![
                    Point3::new(x, -5.0, 0.0),
                    Point3::new(x + 0.1, -5.0, 0.0),
                    Point3::new(x, -4.9, 0.0),
                ],
                vec![[0, 1, 2]],
            )
        })
        .collect();
    IndexedMesh::concat(grids.iter().chain(noise.iter()))
}

// =============================================================================
// Shell Benchmarks
// =============================================================================

fn bench_split_disjoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("SplitDisjoint");

    let test_cases = [
        ("grid_200tri", create_grid(10, 0.0)),
        ("grid_5000tri", create_grid(50, 0.0)),
        ("fragmented_8x", create_fragmented(8, 20)),
        ("fragmented_32x", create_fragmented(32, 20)),
    ];

    for (name, mesh) in &test_cases {
        group.throughput(Throughput::Elements(mesh.faces.len() as u64));

        group.bench_with_input(BenchmarkId::new("split_disjoint", name), mesh, |b, mesh| {
            b.iter(|| split_disjoint(black_box(mesh)));
        });
    }

    group.finish();
}

fn bench_filter_shells(c: &mut Criterion) {
    let mut group = c.benchmark_group("FilterShells");
    let kernel = StubKernel::new();

    let test_cases = [
        ("fragmented_8x", create_fragmented(8, 20)),
        ("fragmented_32x", create_fragmented(32, 20)),
    ];

    for (name, mesh) in &test_cases {
        group.throughput(Throughput::Elements(mesh.faces.len() as u64));

        group.bench_with_input(BenchmarkId::new("keep_largest", name), mesh, |b, mesh| {
            b.iter(|| filter_shells(&kernel, black_box(mesh), true, 1.0));
        });

        group.bench_with_input(BenchmarkId::new("keep_all", name), mesh, |b, mesh| {
            b.iter(|| filter_shells(&kernel, black_box(mesh), false, 1.0));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_split_disjoint, bench_filter_shells);

criterion_main!(benches);
