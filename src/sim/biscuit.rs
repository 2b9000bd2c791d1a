//! The biscuit: one rigid body carrying breakable pieces

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::consts::{
    BISCUIT_MASS, BISCUIT_START_HEIGHT, BOUNCE_FORCE, PIECE_BOUNCE_FORCE, SCATTER_DOWN_FORCE,
    SCATTER_FORCE,
};

use super::piece::{Piece, PieceDefinition, parse_pieces};
use super::raycast::{Collider, Raycaster, TargetId};
use super::world::{BodyDesc, BodyHandle, BoxShape, PhysicsWorld, Transform};

/// Initial spin range (rad/s, per axis)
const START_SPIN: f32 = 0.5;

/// Body box used when the model has no pieces
const FALLBACK_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.06, 0.4);

/// Impulse for a slice moving along `direction` (NDC, y up)
#[inline]
fn slice_force(direction: Vec2, magnitude: f32) -> Vec3 {
    Vec3::new(direction.x * magnitude, magnitude, -direction.y * magnitude)
}

pub struct Biscuit {
    body: BodyHandle,
    pieces: Vec<Piece>,
    /// False once exploded
    active: bool,
    fallback_shape: BoxShape,
}

impl Biscuit {
    /// Create the body at its spawn point, add it to the world and make it
    /// raycastable
    pub fn new<W, R>(
        definitions: &[PieceDefinition],
        world: &mut W,
        raycaster: &mut Raycaster,
        rng: &mut R,
    ) -> Self
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let pieces: Vec<Piece> = definitions
            .iter()
            .filter_map(|d| Piece::from_definition(d, world))
            .collect();

        let fallback_shape = BoxShape::new(FALLBACK_HALF_EXTENTS, Vec3::ZERO);
        let shapes = if pieces.is_empty() {
            vec![fallback_shape]
        } else {
            pieces.iter().map(Piece::shape_in_biscuit).collect()
        };

        let angular_velocity = Vec3::new(
            rng.random_range(-START_SPIN..=START_SPIN),
            rng.random_range(-START_SPIN..=START_SPIN),
            rng.random_range(-START_SPIN..=START_SPIN),
        );

        let body = world.create_body(BodyDesc {
            mass: BISCUIT_MASS,
            position: Vec3::new(0.0, BISCUIT_START_HEIGHT, 0.0),
            angular_velocity,
            shapes,
        });
        world.add_body(body);
        raycaster.add(TargetId::Biscuit);

        log::info!("Biscuit created with {} pieces", pieces.len());

        Self {
            body,
            pieces,
            active: true,
            fallback_shape,
        }
    }

    /// Build from piece JSON; a bad file gives a biscuit without pieces
    pub fn from_json<W, R>(json: &str, world: &mut W, raycaster: &mut Raycaster, rng: &mut R) -> Self
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let definitions = parse_pieces(json).unwrap_or_else(|e| {
            log::warn!("Failed to load biscuit pieces: {e}");
            Vec::new()
        });
        Self::new(&definitions, world, raycaster, rng)
    }

    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_piece_detached(&self, index: usize) -> bool {
        self.pieces.get(index).is_some_and(|p| p.detached)
    }

    /// Resolve a raycast object to a piece index
    pub fn piece_from_object(&self, object: TargetId) -> Option<usize> {
        match object {
            TargetId::Piece(i) if i < self.pieces.len() => Some(i),
            _ => None,
        }
    }

    pub fn transform<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Transform {
        world.transform(self.body).unwrap_or_default()
    }

    /// World position of a piece, attached or not
    pub fn piece_position<W: PhysicsWorld + ?Sized>(&self, index: usize, world: &W) -> Option<Vec3> {
        let piece = self.pieces.get(index)?;
        if piece.detached {
            world.transform(piece.body).map(|t| t.position)
        } else {
            Some(self.transform(world).transform_point(piece.local_position))
        }
    }

    /// Raycast geometry for the current frame
    pub fn colliders<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec<Collider> {
        let mut colliders = Vec::with_capacity(self.pieces.len().max(1));

        if self.active {
            let transform = self.transform(world);
            if self.pieces.is_empty() {
                colliders.push(Collider {
                    owner: TargetId::Biscuit,
                    object: TargetId::Biscuit,
                    transform,
                    shape: self.fallback_shape,
                });
            }
            for (i, piece) in self.pieces.iter().enumerate().filter(|(_, p)| !p.detached) {
                colliders.push(Collider {
                    owner: TargetId::Biscuit,
                    object: TargetId::Piece(i),
                    transform,
                    shape: piece.shape_in_biscuit(),
                });
            }
        }

        for (i, piece) in self.pieces.iter().enumerate().filter(|(_, p)| p.detached) {
            if let Some(transform) = world.transform(piece.body) {
                colliders.push(Collider {
                    owner: TargetId::Piece(i),
                    object: TargetId::Piece(i),
                    transform,
                    shape: piece.shape,
                });
            }
        }

        colliders
    }

    /// Push the intact body away from the slice
    pub fn bounce<W: PhysicsWorld + ?Sized>(&self, world: &mut W, point: Vec3, direction: Vec2) {
        world.apply_force(self.body, slice_force(direction, BOUNCE_FORCE), point);
    }

    /// Push a detached piece away from the slice
    pub fn bounce_piece<W: PhysicsWorld + ?Sized>(
        &self,
        index: usize,
        world: &mut W,
        point: Vec3,
        direction: Vec2,
    ) {
        if let Some(piece) = self.pieces.get(index).filter(|p| p.detached) {
            world.apply_force(piece.body, slice_force(direction, PIECE_BOUNCE_FORCE), point);
        }
    }

    /// Detach a piece at its current world pose; false if already detached
    pub fn remove_piece<W: PhysicsWorld + ?Sized>(
        &mut self,
        index: usize,
        world: &mut W,
        raycaster: &mut Raycaster,
    ) -> bool {
        let parent = self.transform(world);
        let Some(piece) = self.pieces.get_mut(index) else {
            return false;
        };
        if piece.detached {
            return false;
        }

        world.set_transform(
            piece.body,
            Transform {
                position: parent.transform_point(piece.local_position),
                rotation: parent.rotation,
            },
        );
        world.add_body(piece.body);
        raycaster.add(TargetId::Piece(index));
        piece.detached = true;
        log::debug!("Piece {} detached", piece.id);
        true
    }

    /// Remove the body and detach every piece; false if already exploded
    pub fn explode<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, raycaster: &mut Raycaster) -> bool {
        if !self.active {
            return false;
        }
        for i in 0..self.pieces.len() {
            self.remove_piece(i, world, raycaster);
        }
        self.active = false;
        world.remove_body(self.body);
        raycaster.remove(TargetId::Biscuit);
        true
    }

    /// Fling every detached piece outward and down
    pub fn scatter<W, R>(&self, world: &mut W, rng: &mut R)
    where
        W: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        for (i, piece) in self.pieces.iter().enumerate().filter(|(_, p)| p.detached) {
            let force = Vec3::new(
                rng.random_range(-SCATTER_FORCE..SCATTER_FORCE),
                SCATTER_DOWN_FORCE,
                rng.random_range(-SCATTER_FORCE..SCATTER_FORCE),
            );
            if let Some(position) = self.piece_position(i, world) {
                world.apply_force(piece.body, force, position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::SimpleWorld;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const MODEL: &str = include_str!("../../assets/biscuit.json");

    fn setup(json: &str) -> (Biscuit, SimpleWorld, Raycaster) {
        let mut world = SimpleWorld::default();
        let mut raycaster = Raycaster::new();
        let mut rng = Pcg32::seed_from_u64(7);
        let biscuit = Biscuit::from_json(json, &mut world, &mut raycaster, &mut rng);
        (biscuit, world, raycaster)
    }

    #[test]
    fn test_spawn_state() {
        let (biscuit, world, raycaster) = setup(MODEL);
        assert!(biscuit.is_active());
        assert_eq!(biscuit.pieces().len(), 4);
        assert!(world.contains(biscuit.body()));
        assert_eq!(biscuit.transform(&world).position.y, BISCUIT_START_HEIGHT);
        assert_eq!(raycaster.candidates(), &[TargetId::Biscuit]);
        // One collider per attached piece, all owned by the body
        let colliders = biscuit.colliders(&world);
        assert_eq!(colliders.len(), 4);
        assert!(colliders.iter().all(|c| c.owner == TargetId::Biscuit));
    }

    #[test]
    fn test_bad_json_gives_pieceless_biscuit() {
        let (biscuit, world, _) = setup("not json");
        assert!(biscuit.pieces().is_empty());
        assert_eq!(biscuit.piece_from_object(TargetId::Piece(0)), None);
        let colliders = biscuit.colliders(&world);
        assert_eq!(colliders.len(), 1);
        assert_eq!(colliders[0].object, TargetId::Biscuit);
    }

    #[test]
    fn test_remove_piece_once() {
        let (mut biscuit, mut world, mut raycaster) = setup(MODEL);
        let expected = biscuit.piece_position(1, &world).unwrap();

        assert!(biscuit.remove_piece(1, &mut world, &mut raycaster));
        assert!(!biscuit.remove_piece(1, &mut world, &mut raycaster));
        assert!(biscuit.is_piece_detached(1));
        assert!(raycaster.contains(TargetId::Piece(1)));

        let body = biscuit.pieces()[1].body;
        assert!(world.contains(body));
        assert!((world.transform(body).unwrap().position - expected).length() < 1e-5);

        let colliders = biscuit.colliders(&world);
        assert_eq!(colliders.len(), 4);
        assert_eq!(
            colliders.iter().filter(|c| c.owner == TargetId::Piece(1)).count(),
            1
        );
    }

    #[test]
    fn test_explode_detaches_everything_once() {
        let (mut biscuit, mut world, mut raycaster) = setup(MODEL);
        assert!(biscuit.explode(&mut world, &mut raycaster));
        assert!(!biscuit.explode(&mut world, &mut raycaster));

        assert!(!biscuit.is_active());
        assert!(!world.contains(biscuit.body()));
        assert!(!raycaster.contains(TargetId::Biscuit));
        assert!((0..4).all(|i| biscuit.is_piece_detached(i)));
        assert_eq!(world.active_body_count(), 4);
    }

    #[test]
    fn test_bounce_uses_slice_direction() {
        let (biscuit, mut world, _) = setup(MODEL);
        let point = biscuit.transform(&world).position;
        biscuit.bounce(&mut world, point, Vec2::new(1.0, 0.0));
        world.fixed_step(crate::consts::PHYSICS_DT);
        let v = world.velocity(biscuit.body());
        assert!(v.x > 0.0);
        assert!(v.y > 0.0);
    }

    #[test]
    fn test_scatter_moves_pieces() {
        let (mut biscuit, mut world, mut raycaster) = setup(MODEL);
        biscuit.explode(&mut world, &mut raycaster);
        let mut rng = Pcg32::seed_from_u64(1);
        biscuit.scatter(&mut world, &mut rng);
        world.fixed_step(crate::consts::PHYSICS_DT);
        for piece in biscuit.pieces() {
            assert!(world.velocity(piece.body).y < 0.0);
        }
    }
}
