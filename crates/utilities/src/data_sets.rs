use occupancy_core::prelude::*;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// `n` unit vectors spread evenly over the sphere (a Fibonacci lattice). Deterministic.
pub fn sphere_directions(n: usize) -> Vec<Point3f> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());

    (0..n)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
            let r = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f32;

            PointN([r * theta.cos(), r * theta.sin(), z])
        })
        .collect()
}

/// Endpoints of `n` beams cast from `origin` in all directions, each hitting the walls of an axis-aligned room that extends
/// `half_extent` from `origin` along every axis.
pub fn room_scan(origin: Point3f, half_extent: f32, n: usize) -> Vec<Point3f> {
    sphere_directions(n)
        .into_iter()
        .map(|d| {
            let t = (0..3)
                .map(|axis| d.at(axis).abs())
                .filter(|c| *c > 0.0)
                .map(|c| half_extent / c)
                .fold(f32::INFINITY, f32::min);

            origin + d * t
        })
        .collect()
}

/// Endpoints of `n` beams cast from `origin` onto a sphere of `radius`.
pub fn sphere_scan(origin: Point3f, radius: f32, n: usize) -> Vec<Point3f> {
    sphere_directions(n)
        .into_iter()
        .map(|d| origin + d * radius)
        .collect()
}

/// `n` points uniformly distributed in `extent`, reproducible from `seed`.
pub fn random_points(seed: u64, extent: Extent3f, n: usize) -> Vec<Point3f> {
    let mut rng = StdRng::seed_from_u64(seed);
    let min = extent.minimum;
    let lub = extent.least_upper_bound();

    (0..n)
        .map(|_| {
            PointN([
                rng.gen_range(min.x()..lub.x()),
                rng.gen_range(min.y()..lub.y()),
                rng.gen_range(min.z()..lub.z()),
            ])
        })
        .collect()
}
