//! Nearest-hit raycasting against oriented boxes
//!
//! Only colliders whose owner is in the raycaster's candidate set are tested.
//! An owner groups objects: the intact biscuit owns its attached pieces, so a
//! hit on one of them reports the piece rather than the biscuit body.

use glam::{Vec2, Vec3};

use super::camera::{Camera, Ray};
use super::world::{BoxShape, Transform};

/// Scene object a collider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetId {
    Biscuit,
    Piece(usize),
}

/// Box placed in the world for one raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Candidate-set entry that enables this collider
    pub owner: TargetId,
    /// Object reported on hit
    pub object: TargetId,
    pub transform: Transform,
    pub shape: BoxShape,
}

impl Collider {
    /// Distance along `ray` to the box surface (or 0 when starting inside)
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let origin = self.transform.inverse_transform_point(ray.origin) - self.shape.offset;
        let dir = self.transform.rotation.inverse() * ray.direction;
        let half = self.shape.half_extents;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let h = half[axis];
            if d.abs() < 1e-8 {
                if o.abs() > h {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (-h - o) * inv;
            let mut t1 = (h - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }

    /// World-space edges as line pairs
    pub fn edges(&self) -> Vec<(Vec3, Vec3)> {
        let corners = self.shape.corners().map(|c| self.transform.transform_point(c));
        let mut edges = Vec::with_capacity(12);
        for i in 0..8usize {
            for bit in [1usize, 2, 4] {
                if i & bit == 0 {
                    edges.push((corners[i], corners[i | bit]));
                }
            }
        }
        edges
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object: TargetId,
    pub point: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Raycaster {
    candidates: Vec<TargetId>,
}

impl Raycaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: TargetId) {
        if !self.candidates.contains(&target) {
            self.candidates.push(target);
        }
    }

    pub fn remove(&mut self, target: TargetId) {
        self.candidates.retain(|c| *c != target);
    }

    pub fn contains(&self, target: TargetId) -> bool {
        self.candidates.contains(&target)
    }

    pub fn candidates(&self) -> &[TargetId] {
        &self.candidates
    }

    pub fn cast_ray(&self, ray: &Ray, colliders: &[Collider]) -> Option<Intersection> {
        colliders
            .iter()
            .filter(|c| self.contains(c.owner))
            .filter_map(|c| {
                c.intersect(ray).map(|distance| Intersection {
                    object: c.object,
                    point: ray.at(distance),
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Nearest hit through an NDC point
    pub fn cast(&self, camera: &Camera, ndc: Vec2, colliders: &[Collider]) -> Option<Intersection> {
        self.cast_ray(&camera.ray_from_ndc(ndc), colliders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn cube(object: TargetId, position: Vec3) -> Collider {
        Collider {
            owner: object,
            object,
            transform: Transform::from_position(position),
            shape: BoxShape::new(Vec3::splat(0.5), Vec3::ZERO),
        }
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 10.0, z),
            direction: Vec3::NEG_Y,
        }
    }

    #[test]
    fn test_ray_hits_top_face() {
        let c = cube(TargetId::Biscuit, Vec3::ZERO);
        let t = c.intersect(&down_ray(0.0, 0.0)).unwrap();
        assert!((t - 9.5).abs() < 1e-5);
        assert!(c.intersect(&down_ray(0.6, 0.0)).is_none());
    }

    #[test]
    fn test_rotated_box() {
        let mut c = cube(TargetId::Biscuit, Vec3::ZERO);
        c.transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        // Corner of the rotated box reaches past 0.5 along x
        assert!(c.intersect(&down_ray(0.6, 0.0)).is_some());
    }

    #[test]
    fn test_offset_shape_follows_body_rotation() {
        let mut c = cube(TargetId::Biscuit, Vec3::ZERO);
        c.shape = BoxShape::new(Vec3::splat(0.5), Vec3::new(0.0, 0.0, 1.0));
        // Quarter turn about Y carries the local +Z offset onto world +X
        c.transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        let t = c.intersect(&down_ray(1.0, 0.0)).unwrap();
        assert!((t - 9.5).abs() < 1e-4);
        assert!(c.intersect(&down_ray(0.0, 1.0)).is_none());
    }

    #[test]
    fn test_nearest_hit_wins() {
        let mut raycaster = Raycaster::new();
        raycaster.add(TargetId::Piece(0));
        raycaster.add(TargetId::Piece(1));

        let colliders = [
            cube(TargetId::Piece(0), Vec3::new(0.0, 0.0, 0.0)),
            cube(TargetId::Piece(1), Vec3::new(0.0, 2.0, 0.0)),
        ];
        let hit = raycaster.cast_ray(&down_ray(0.0, 0.0), &colliders).unwrap();
        assert_eq!(hit.object, TargetId::Piece(1));
        assert!((hit.point.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_non_candidates_are_skipped() {
        let mut raycaster = Raycaster::new();
        raycaster.add(TargetId::Biscuit);
        raycaster.add(TargetId::Biscuit);
        assert_eq!(raycaster.candidates().len(), 1);

        let colliders = [cube(TargetId::Piece(0), Vec3::ZERO)];
        assert!(raycaster.cast_ray(&down_ray(0.0, 0.0), &colliders).is_none());

        raycaster.remove(TargetId::Biscuit);
        assert!(raycaster.candidates().is_empty());
    }

    #[test]
    fn test_cast_through_camera() {
        let camera = Camera::new(800.0, 600.0);
        let mut raycaster = Raycaster::new();
        raycaster.add(TargetId::Biscuit);
        let colliders = [cube(TargetId::Biscuit, Vec3::ZERO)];

        assert!(raycaster.cast(&camera, Vec2::ZERO, &colliders).is_some());
        assert!(raycaster.cast(&camera, Vec2::new(0.95, 0.95), &colliders).is_none());
    }

    #[test]
    fn test_box_has_twelve_edges() {
        assert_eq!(cube(TargetId::Biscuit, Vec3::ZERO).edges().len(), 12);
    }
}
