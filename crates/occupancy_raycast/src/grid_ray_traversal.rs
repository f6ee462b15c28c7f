use occupancy_core::prelude::*;

/// Grid traversal algorithm by Amanatides and Woo. Visits every unit voxel intersecting the given ray, one face-adjacent step
/// at a time. The traversal is unbounded; callers decide when to stop.
#[derive(Clone, Copy, Debug)]
pub struct GridRayTraversal3 {
    // The current voxel position.
    current_grid_point: Point3i,
    // -1, 0 or +1 in each axis. The direction we step along each axis.
    step: Point3i,
    // The amount of time it takes to move 1 unit along each axis. Infinite for axes we never cross.
    t_delta: Point3f,
    // The next time when each axis will cross a voxel boundary.
    t_max: Point3f,
}

impl GridRayTraversal3 {
    /// Initialize the traversal, beginning at the `start` position and moving along the `velocity` vector.
    ///
    /// A zero component of `velocity` means the ray never crosses a boundary on that axis.
    #[inline]
    pub fn new(start: Point3f, velocity: Point3f) -> Self {
        let current_grid_point = start.in_voxel();
        let mut step = Point3i::ZERO;
        let mut t_delta = Point3f::fill(f32::INFINITY);
        let mut t_max = Point3f::fill(f32::INFINITY);

        for axis in 0..3 {
            let v = velocity.at(axis);
            let s = start.at(axis);
            let voxel = current_grid_point.at(axis) as f32;

            // For a positive velocity the next boundary is the far face of the current voxel, but for negative, it's the near
            // face.
            let (axis_step, next_bound) = if v > 0.0 {
                (1, voxel + 1.0)
            } else if v < 0.0 {
                (-1, voxel)
            } else {
                continue;
            };

            step.0[axis] = axis_step;
            t_delta.0[axis] = 1.0 / v.abs();
            t_max.0[axis] = (next_bound - s) / v;
        }

        Self {
            current_grid_point,
            step,
            t_delta,
            t_max,
        }
    }

    /// Move to the next closest voxel along the ray.
    #[inline]
    pub fn step(&mut self) {
        if self.t_max.x() < self.t_max.y() {
            if self.t_max.x() < self.t_max.z() {
                *self.current_grid_point.x_mut() += self.step.x();
                *self.t_max.x_mut() += self.t_delta.x();
            } else {
                *self.current_grid_point.z_mut() += self.step.z();
                *self.t_max.z_mut() += self.t_delta.z();
            }
        } else if self.t_max.y() < self.t_max.z() {
            *self.current_grid_point.y_mut() += self.step.y();
            *self.t_max.y_mut() += self.t_delta.y();
        } else {
            *self.current_grid_point.z_mut() += self.step.z();
            *self.t_max.z_mut() += self.t_delta.z();
        }
    }

    /// The current voxel position. Changes on every call of `step`.
    #[inline]
    pub fn current_voxel(&self) -> Point3i {
        self.current_grid_point
    }

    /// The direction of travel along each axis: -1, 0 or +1.
    #[inline]
    pub fn step_direction(&self) -> Point3i {
        self.step
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn walk(mut traversal: GridRayTraversal3, n: usize) -> Vec<Point3i> {
        let mut voxels = Vec::new();
        for _ in 0..n {
            voxels.push(traversal.current_voxel());
            traversal.step();
        }

        voxels
    }

    #[test]
    fn move_along_negative_y_axis() {
        let traversal = GridRayTraversal3::new(PointN([0.5, -0.5, 2.5]), PointN([0.0, -1.0, 0.0]));

        assert_eq!(traversal.step_direction(), PointN([0, -1, 0]));
        assert_eq!(
            walk(traversal, 4),
            vec![
                PointN([0, -1, 2]),
                PointN([0, -2, 2]),
                PointN([0, -3, 2]),
                PointN([0, -4, 2]),
            ]
        )
    }

    #[test]
    fn move_along_all_axes_some_negative() {
        let traversal = GridRayTraversal3::new(PointN([0.3, 0.6, 0.1]), PointN([-3.0, 1.0, 2.0]));

        assert_eq!(
            walk(traversal, 8),
            vec![
                PointN([0, 0, 0]),
                PointN([-1, 0, 0]),
                PointN([-1, 1, 0]),
                PointN([-2, 1, 0]),
                PointN([-2, 1, 1]),
                PointN([-3, 1, 1]),
                PointN([-3, 1, 2]),
                PointN([-4, 1, 2]),
            ]
        )
    }

    #[test]
    fn zero_velocity_axes_never_step() {
        let traversal = GridRayTraversal3::new(PointN([0.2, 0.7, -0.3]), PointN([0.0, 0.0, 5.0]));

        for (i, voxel) in walk(traversal, 20).into_iter().enumerate() {
            assert_eq!(voxel, PointN([0, 0, -1 + i as i32]));
        }
    }
}
