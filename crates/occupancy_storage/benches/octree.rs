use occupancy_core::prelude::*;
use occupancy_storage::prelude::*;
use utilities::data_sets::random_points;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn config(max_depth: u8) -> OctreeConfig {
    OctreeConfig {
        resolution: 0.1,
        max_depth,
        ..Default::default()
    }
}

fn cloud(octree: &Octree, n: usize) -> Vec<Point3f> {
    // Keep the points in a 12.8 m cube so that deeper trees don't just spread them out.
    let extent = Extent3f::from_min_and_shape(Point3f::fill(-6.4), Point3f::fill(12.8));
    assert!(octree.index().extent().contains(extent.minimum));

    random_points(1, extent, n)
}

fn filled_octree(max_depth: u8, n: usize) -> (Octree, Vec<Point3f>) {
    let mut octree = Octree::new(config(max_depth)).unwrap();
    let points = cloud(&octree, n);
    for (i, p) in points.iter().enumerate() {
        octree.update_node(*p, i % 3 != 0).unwrap();
    }

    (octree, points)
}

fn octree_update_node(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_update_node");
    for max_depth in [8, 16, 24].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_depth),
            max_depth,
            |b, &max_depth| {
                b.iter_with_setup(
                    || {
                        let octree = Octree::new(config(max_depth)).unwrap();
                        let points = cloud(&octree, 10_000);

                        (octree, points)
                    },
                    |(mut octree, points)| {
                        for p in points.into_iter() {
                            black_box(octree.update_node(p, true).unwrap());
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

fn octree_query_probability(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_query_probability");
    for max_depth in [8, 16, 24].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_depth),
            max_depth,
            |b, &max_depth| {
                b.iter_with_setup(
                    || filled_octree(max_depth, 10_000),
                    |(octree, points)| {
                        for p in points.into_iter() {
                            black_box(octree.query_probability(p).unwrap());
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

fn octree_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_prune");
    for num_points in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(
                    || filled_octree(16, num_points).0,
                    |mut octree| black_box(octree.prune()),
                );
            },
        );
    }
    group.finish();
}

fn octree_iter_leaves(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_iter_leaves");
    for num_points in [1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(
                    || filled_octree(16, num_points).0,
                    |octree| {
                        let bounds = octree.index().extent();
                        for leaf in octree.iter_leaves(bounds) {
                            black_box(leaf);
                        }
                    },
                );
            },
        );
    }
    group.finish();
}

// Nodes store no geometry, so every spatial query pays for recomputing it from the key.
fn octree_recompute_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_recompute_geometry");
    for num_points in [1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            num_points,
            |b, &num_points| {
                b.iter_with_setup(
                    || filled_octree(16, num_points).0,
                    |octree| {
                        let index = *octree.index();
                        octree.visit_nodes_in_preorder(&mut |node: &NodeView| {
                            black_box(index.center_of(node.key));
                            black_box(index.extent_of(node.key));

                            VisitStatus::Continue
                        });
                    },
                );
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    octree_update_node,
    octree_query_probability,
    octree_prune,
    octree_iter_leaves,
    octree_recompute_geometry
);
criterion_main!(benches);
