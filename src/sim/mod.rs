//! Scene simulation
//!
//! Physics seam, camera, raycasting, the biscuit and the impact state
//! machine. Randomness comes in through injected seeded generators; nothing
//! here touches rendering or the platform.

pub mod biscuit;
pub mod camera;
pub mod impact;
pub mod piece;
pub mod raycast;
pub mod world;

pub use biscuit::Biscuit;
pub use camera::{Camera, Ray};
pub use impact::{ImpactEvent, ImpactResolver, ImpactScene, Phase, ShakeKind, Thresholds};
pub use piece::{AssetError, Piece, PieceDefinition, parse_pieces};
pub use raycast::{Collider, Intersection, Raycaster, TargetId};
pub use world::{BodyDesc, BodyHandle, BoxShape, PhysicsWorld, SimpleWorld, Transform};
