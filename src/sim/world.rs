//! Rigid-body physics seam
//!
//! The impact pipeline only needs to add/remove bodies, push them and read
//! their transforms. `SimpleWorld` is a small box-body world (gravity plus a
//! floor and four walls) used natively and in tests; a full engine can stand
//! in behind the same trait.

use glam::{Quat, Vec3};

use crate::consts::{GRAVITY, MAX_SUBSTEPS, PHYSICS_DT, ROOM_SIZE_X, ROOM_SIZE_Z};

/// Opaque body id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(u32);

/// Box collision shape (half extents) placed at `offset` in body space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    pub half_extents: Vec3,
    pub offset: Vec3,
}

impl BoxShape {
    pub fn new(half_extents: Vec3, offset: Vec3) -> Self {
        Self {
            half_extents,
            offset,
        }
    }

    /// Body-space corners
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        let mut out = [Vec3::ZERO; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.offset + Vec3::new(h.x * sx, h.y * sy, h.z * sz);
        }
        out
    }
}

/// Rigid transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }
}

/// Body creation parameters
#[derive(Debug, Clone)]
pub struct BodyDesc {
    /// Zero mass makes the body static
    pub mass: f32,
    pub position: Vec3,
    pub angular_velocity: Vec3,
    pub shapes: Vec<BoxShape>,
}

/// Physics service consumed by the biscuit and the impact resolver
pub trait PhysicsWorld {
    /// Create a body; it does not simulate until `add_body`
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn add_body(&mut self, body: BodyHandle);
    fn remove_body(&mut self, body: BodyHandle);
    /// Whether the body currently simulates
    fn contains(&self, body: BodyHandle) -> bool;
    /// Accumulate `force` applied at world-space `point` for the next step
    fn apply_force(&mut self, body: BodyHandle, force: Vec3, point: Vec3);
    /// Transform of a created body, in or out of the world
    fn transform(&self, body: BodyHandle) -> Option<Transform>;
    fn set_transform(&mut self, body: BodyHandle, transform: Transform);
    /// Advance by a frame delta (implementations substep as they see fit)
    fn step(&mut self, dt: f32);
}

/// Bounce factor against the room
const RESTITUTION: f32 = 0.3;
/// Velocity kept per contact step while resting on the floor
const FLOOR_FRICTION: f32 = 0.9;
/// Angular velocity kept per contact step
const ANGULAR_FRICTION: f32 = 0.9;

#[derive(Debug, Clone)]
struct RigidBody {
    inv_mass: f32,
    inv_inertia: f32,
    shapes: Vec<BoxShape>,
    transform: Transform,
    velocity: Vec3,
    angular_velocity: Vec3,
    force: Vec3,
    torque: Vec3,
    in_world: bool,
}

impl RigidBody {
    fn from_desc(desc: BodyDesc) -> Self {
        let (inv_mass, inv_inertia) = if desc.mass > 0.0 {
            // Solid-sphere approximation over the shapes' bounding radius
            let radius = desc
                .shapes
                .iter()
                .map(|s| s.offset.length() + s.half_extents.length())
                .fold(0.0f32, f32::max);
            let inertia = 0.4 * desc.mass * radius * radius;
            let inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
            (1.0 / desc.mass, inv_inertia)
        } else {
            (0.0, 0.0)
        };

        Self {
            inv_mass,
            inv_inertia,
            shapes: desc.shapes,
            transform: Transform::from_position(desc.position),
            velocity: Vec3::ZERO,
            angular_velocity: desc.angular_velocity,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            in_world: false,
        }
    }

    fn is_dynamic(&self) -> bool {
        self.inv_mass > 0.0
    }

    fn integrate(&mut self, dt: f32) {
        self.velocity += (Vec3::new(0.0, GRAVITY, 0.0) + self.force * self.inv_mass) * dt;
        self.angular_velocity += self.torque * self.inv_inertia * dt;
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;

        self.transform.position += self.velocity * dt;
        self.transform.rotation =
            (Quat::from_scaled_axis(self.angular_velocity * dt) * self.transform.rotation)
                .normalize();
    }

    /// Push the body back inside the room (floor at y = 0, walls at ±size/2)
    fn collide_room(&mut self, half_x: f32, half_z: f32) {
        if self.shapes.is_empty() {
            return;
        }

        let corners: Vec<Vec3> = self
            .shapes
            .iter()
            .flat_map(|s| s.corners())
            .map(|c| self.transform.transform_point(c))
            .collect();

        let min = corners.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
        let max = corners.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);

        if min.y < 0.0 {
            self.transform.position.y -= min.y;
            if self.velocity.y < 0.0 {
                self.velocity.y = -self.velocity.y * RESTITUTION;
            }
            self.velocity.x *= FLOOR_FRICTION;
            self.velocity.z *= FLOOR_FRICTION;
            self.angular_velocity *= ANGULAR_FRICTION;
        }

        if min.x < -half_x {
            self.transform.position.x += -half_x - min.x;
            self.velocity.x = self.velocity.x.abs() * RESTITUTION;
        } else if max.x > half_x {
            self.transform.position.x -= max.x - half_x;
            self.velocity.x = -self.velocity.x.abs() * RESTITUTION;
        }

        if min.z < -half_z {
            self.transform.position.z += -half_z - min.z;
            self.velocity.z = self.velocity.z.abs() * RESTITUTION;
        } else if max.z > half_z {
            self.transform.position.z -= max.z - half_z;
            self.velocity.z = -self.velocity.z.abs() * RESTITUTION;
        }
    }
}

/// Minimal box-body world inside a walled room
#[derive(Debug, Clone)]
pub struct SimpleWorld {
    bodies: Vec<RigidBody>,
    accumulator: f32,
    room_half_extents: (f32, f32),
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new(ROOM_SIZE_X, ROOM_SIZE_Z)
    }
}

impl SimpleWorld {
    pub fn new(size_x: f32, size_z: f32) -> Self {
        Self {
            bodies: Vec::new(),
            accumulator: 0.0,
            room_half_extents: (size_x / 2.0, size_z / 2.0),
        }
    }

    /// Linear velocity of a body (zero for unknown handles)
    pub fn velocity(&self, body: BodyHandle) -> Vec3 {
        self.body(body).map(|b| b.velocity).unwrap_or(Vec3::ZERO)
    }

    /// Number of bodies currently simulating
    pub fn active_body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.in_world).count()
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0 as usize)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0 as usize)
    }

    /// Advance exactly one fixed step
    pub fn fixed_step(&mut self, dt: f32) {
        let (half_x, half_z) = self.room_half_extents;
        for body in self.bodies.iter_mut().filter(|b| b.in_world && b.is_dynamic()) {
            body.integrate(dt);
            body.collide_room(half_x, half_z);
        }
    }
}

impl PhysicsWorld for SimpleWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(RigidBody::from_desc(desc));
        handle
    }

    fn add_body(&mut self, body: BodyHandle) {
        if let Some(b) = self.body_mut(body) {
            b.in_world = true;
        }
    }

    fn remove_body(&mut self, body: BodyHandle) {
        if let Some(b) = self.body_mut(body) {
            b.in_world = false;
            b.force = Vec3::ZERO;
            b.torque = Vec3::ZERO;
        }
    }

    fn contains(&self, body: BodyHandle) -> bool {
        self.body(body).is_some_and(|b| b.in_world)
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec3, point: Vec3) {
        if let Some(b) = self.body_mut(body) {
            if !b.in_world || !b.is_dynamic() {
                return;
            }
            b.force += force;
            b.torque += (point - b.transform.position).cross(force);
        }
    }

    fn transform(&self, body: BodyHandle) -> Option<Transform> {
        self.body(body).map(|b| b.transform)
    }

    fn set_transform(&mut self, body: BodyHandle, transform: Transform) {
        if let Some(b) = self.body_mut(body) {
            b.transform = transform;
        }
    }

    fn step(&mut self, dt: f32) {
        self.accumulator += dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= PHYSICS_DT && substeps < MAX_SUBSTEPS {
            self.fixed_step(PHYSICS_DT);
            self.accumulator -= PHYSICS_DT;
            substeps += 1;
        }

        // Drop the backlog rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(PHYSICS_DT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(position: Vec3, mass: f32) -> BodyDesc {
        BodyDesc {
            mass,
            position,
            angular_velocity: Vec3::ZERO,
            shapes: vec![BoxShape::new(Vec3::splat(0.1), Vec3::ZERO)],
        }
    }

    #[test]
    fn test_inverse_transform_point_undoes_transform() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_z(0.7),
        };
        let local = Vec3::new(0.3, -0.2, 0.5);
        let back = t.inverse_transform_point(t.transform_point(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn test_body_falls_and_rests_on_floor() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 2.0, 0.0), 1.0));
        world.add_body(body);

        for _ in 0..600 {
            world.step(1.0 / 60.0);
        }

        let t = world.transform(body).unwrap();
        assert!((t.position.y - 0.1).abs() < 0.02, "y = {}", t.position.y);
    }

    #[test]
    fn test_body_outside_world_does_not_move() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 2.0, 0.0), 1.0));
        world.step(0.5);
        assert!(!world.contains(body));
        assert_eq!(world.transform(body).unwrap().position.y, 2.0);
    }

    #[test]
    fn test_force_is_consumed_by_one_step() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 1.0, 0.0), 1.0));
        world.add_body(body);

        world.apply_force(body, Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        world.fixed_step(PHYSICS_DT);
        let v1 = world.velocity(body).y;
        assert!(v1 > 1.0);

        world.fixed_step(PHYSICS_DT);
        let v2 = world.velocity(body).y;
        assert!(v2 < v1);
    }

    #[test]
    fn test_off_center_force_spins_body() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 1.0, 0.0), 1.0));
        world.add_body(body);

        world.apply_force(body, Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.1, 1.0, 0.0));
        world.fixed_step(PHYSICS_DT);
        let rotation = world.transform(body).unwrap().rotation;
        assert!(rotation.angle_between(Quat::IDENTITY) > 0.0);
    }

    #[test]
    fn test_walls_keep_body_inside() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 0.5, 0.0), 1.0));
        world.add_body(body);
        world.apply_force(body, Vec3::new(10_000.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0));

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        let x = world.transform(body).unwrap().position.x;
        assert!(x <= ROOM_SIZE_X / 2.0 - 0.1 + 1e-4);
    }

    #[test]
    fn test_static_body_ignores_gravity() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(unit_box(Vec3::new(0.0, 1.0, 0.0), 0.0));
        world.add_body(body);
        world.step(0.5);
        assert_eq!(world.transform(body).unwrap().position.y, 1.0);
    }
}
