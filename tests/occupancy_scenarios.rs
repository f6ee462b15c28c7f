use occupancy_octree::prelude::*;
use occupancy_octree::raycast::traverse;

use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use utilities::{
    data_sets::{random_points, room_scan},
    test::test_print,
};

fn mapping_config() -> OctreeConfig {
    OctreeConfig {
        resolution: 0.1,
        max_depth: 16,
        prob_hit: 0.7,
        prob_miss: 0.4,
        clamp_min: -2.0,
        clamp_max: 3.5,
        occupancy_threshold: 0.5,
        ..Default::default()
    }
}

fn hits(endpoints: Vec<Point3f>) -> Vec<(Point3f, BeamReturn)> {
    endpoints
        .into_iter()
        .map(|endpoint| (endpoint, BeamReturn::Hit))
        .collect()
}

fn random_point(rng: &mut impl Rng, radius: f32) -> Point3f {
    PointN([
        rng.gen_range(-radius..radius),
        rng.gen_range(-radius..radius),
        rng.gen_range(-radius..radius),
    ])
}

#[test]
fn single_beam_along_x_axis() {
    let mut octree = Octree::new(mapping_config()).unwrap();
    let mut updater = OccupancyUpdater::from_config(octree.config());

    updater
        .integrate(
            &mut octree,
            &Observation::hit(PointN([0.0, 0.0, 0.0]), PointN([1.0, 0.0, 0.0])),
        )
        .unwrap();

    let tip = octree.index().voxel_key(PointN([1.0, 0.0, 0.0])).unwrap();
    assert_eq!(tip.coords(), PointN([10, 0, 0]));
    assert!(octree.query_probability(PointN([1.0, 0.0, 0.0])).unwrap().unwrap() > 0.5);

    for x in 0..10 {
        let p = octree
            .index()
            .center_of(VoxelKey::new(PointN([x, 0, 0]), 16));
        assert!(octree.query_probability(p).unwrap().unwrap() < 0.5);
    }

    let bounds = Extent3f::from_corners(PointN([0.0, 0.0, 0.0]), PointN([2.0, 0.0, 0.0]));
    let occupied: Vec<_> = octree.iter_occupied(bounds).map(|(key, _)| key).collect();
    assert_eq!(occupied, vec![tip]);
}

#[test]
fn beams_from_different_origins_share_one_occupied_voxel() {
    let mut octree = Octree::new(mapping_config()).unwrap();
    let mut updater = OccupancyUpdater::new(PrunePolicy::Manual);
    let endpoint = PointN([1.05, 1.05, 1.05]);

    updater
        .integrate(&mut octree, &Observation::hit(PointN([-2.0, 0.3, 0.1]), endpoint))
        .unwrap();
    updater
        .integrate(&mut octree, &Observation::hit(PointN([0.4, 3.1, -1.7]), endpoint))
        .unwrap();

    let view = octree.search(endpoint).unwrap().unwrap();
    assert_eq!(view.key, octree.index().voxel_key(endpoint).unwrap());
    assert!((view.log_odds - 2.0 * octree.model().hit()).abs() < 1e-6);

    let occupied: Vec<_> = octree.iter_occupied(octree.index().extent()).collect();
    assert_eq!(occupied.len(), 1);
    assert_eq!(occupied[0].0, view.key);
}

#[test]
fn unobserved_map_is_unknown() {
    let octree = Octree::new(mapping_config()).unwrap();

    for p in random_points(11, octree.index().extent(), 1000) {
        assert_eq!(octree.query_probability(p).unwrap(), None);
    }
}

#[test]
fn hits_saturate_monotonically() {
    let mut octree = Octree::new(mapping_config()).unwrap();
    let p = PointN([-3.21, 0.77, 12.5]);

    let mut previous = 0.0;
    for _ in 0..50 {
        octree.update_node(p, true).unwrap();
        let probability = octree.query_probability(p).unwrap().unwrap();
        assert!(probability >= previous);
        previous = probability;
    }

    assert_eq!(previous, log_odds_to_probability(3.5));
}

#[test]
fn hit_and_miss_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..100 {
        let p = random_point(&mut rng, 100.0);
        let mut a = Octree::new(mapping_config()).unwrap();
        let mut b = Octree::new(mapping_config()).unwrap();

        a.update_node(p, true).unwrap();
        a.update_node(p, false).unwrap();
        b.update_node(p, false).unwrap();
        b.update_node(p, true).unwrap();

        let la = a.search(p).unwrap().unwrap().log_odds;
        let lb = b.search(p).unwrap().unwrap().log_odds;
        assert!((la - lb).abs() < 1e-6);
    }
}

#[test]
fn beam_from_a_point_to_itself_is_one_key() {
    let index = SpatialIndex::new(0.1, 16, Point3f::ZERO).unwrap();
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..100 {
        let o = random_point(&mut rng, 100.0);
        let keys: Vec<_> = traverse(&index, o, o).unwrap().collect();

        assert_eq!(keys, vec![index.key_of(o, 16).unwrap()]);
    }
}

#[test]
fn beam_to_voxel_center_ends_at_that_voxel_without_repeats() {
    let index = SpatialIndex::new(0.1, 16, Point3f::ZERO).unwrap();
    let mut rng = StdRng::seed_from_u64(29);

    for _ in 0..300 {
        let origin = random_point(&mut rng, 50.0);
        let target = index.voxel_key(random_point(&mut rng, 50.0)).unwrap();

        let keys: Vec<_> = traverse(&index, origin, index.center_of(target))
            .unwrap()
            .collect();

        assert_eq!(keys.last(), Some(&target));
        assert!(keys.windows(2).all(|pair| pair[0] != pair[1]));
    }
}

#[test]
fn pruning_is_invisible_to_queries() {
    let mut octree = Octree::new(OctreeConfig {
        resolution: 0.1,
        max_depth: 10,
        ..Default::default()
    })
    .unwrap();
    let mut updater = OccupancyUpdater::new(PrunePolicy::Manual);
    let origin = PointN([0.01, 0.02, 0.03]);

    // Repeated scans of a room saturate its free interior, which is what makes it prunable.
    for _ in 0..10 {
        updater
            .integrate_scan(&mut octree, origin, hits(room_scan(origin, 3.0, 2000)), -1.0)
            .unwrap();
    }

    let samples = random_points(31, octree.index().extent(), 5000);
    let before: Vec<_> = samples
        .iter()
        .map(|p| octree.query_probability(*p).unwrap())
        .collect();
    let nodes_before = octree.num_nodes();
    let memory_before = octree.memory_usage();
    let tolerance = octree.config().prune_epsilon;

    let removed = octree.prune();

    test_print(&format!(
        "pruned {} of {} nodes ({} bytes allocated)\n",
        removed, nodes_before, memory_before
    ));
    assert!(removed > 0);
    for (p, before) in samples.iter().zip(before) {
        let after = octree.query_probability(*p).unwrap();
        let (before, after) = (before.unwrap(), after.unwrap());
        assert!(
            (before - after).abs() <= tolerance,
            "{:?}: {} vs {}",
            p,
            before,
            after
        );
    }
}

#[test]
fn scheduled_pruning_matches_manual_pruning() {
    let origin = PointN([0.01, 0.02, 0.03]);
    let scans: Vec<Vec<(Point3f, BeamReturn)>> = (0..4)
        .map(|i| hits(room_scan(origin, 2.0 + 0.5 * i as f32, 500)))
        .collect();

    let mut scheduled = Octree::new(mapping_config()).unwrap();
    let mut updater = OccupancyUpdater::new(PrunePolicy::EveryObservation);
    let mut stats = IntegrationStats::default();
    for scan in scans.iter() {
        stats += updater
            .integrate_scan(&mut scheduled, origin, scan.iter().cloned(), 10.0)
            .unwrap();
    }

    let mut manual = Octree::new(mapping_config()).unwrap();
    let mut updater = OccupancyUpdater::new(PrunePolicy::Manual);
    for scan in scans.iter() {
        updater
            .integrate_scan(&mut manual, origin, scan.iter().cloned(), 10.0)
            .unwrap();
    }
    let removed = manual.prune();

    assert_eq!(stats.beams, 2000);
    assert!(stats.nodes_pruned > 0);
    assert!(removed > 0);

    for p in random_points(37, Extent3f::from_min_and_shape(Point3f::fill(-5.0), Point3f::fill(10.0)), 2000) {
        let a = scheduled.query_probability(p).unwrap().unwrap();
        let b = manual.query_probability(p).unwrap().unwrap();
        assert!((a - b).abs() < 1e-3);
    }
}
