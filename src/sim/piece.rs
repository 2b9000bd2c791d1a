//! Biscuit piece definitions
//!
//! Pieces arrive as JSON exported from the modelling tool:
//! `{ "pieces": [{ "id", "position": {x,y,z}, "shadowSize",
//! "attributes": { "position", "normal", "color" }, "index" }] }`.

use glam::Vec3;
use serde::Deserialize;
use thiserror::Error;

use crate::consts::{BODY_BOUNDING_BOX_REDUCTION, PIECE_MASS};

use super::world::{BodyDesc, BodyHandle, BoxShape, PhysicsWorld};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid piece JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("piece '{id}': {reason}")]
    Geometry { id: String, reason: &'static str },
}

/// Typed array dump
#[derive(Debug, Clone, Deserialize)]
pub struct BufferData<T> {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "itemSize", default = "default_item_size")]
    pub item_size: usize,
    pub array: Vec<T>,
}

fn default_item_size() -> usize {
    1
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PieceAttributes {
    pub position: BufferData<f32>,
    pub normal: Option<BufferData<f32>>,
    pub color: Option<BufferData<f32>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceDefinition {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub shadow_size: f32,
    pub attributes: PieceAttributes,
    pub index: Option<BufferData<u32>>,
}

#[derive(Debug, Deserialize)]
struct PieceFile {
    pieces: Vec<PieceDefinition>,
}

impl PieceDefinition {
    pub fn local_position(&self) -> Vec3 {
        self.position.into()
    }

    /// Vertex positions in piece space
    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.attributes
            .position
            .array
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    /// Axis-aligned bounds of the vertex positions
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut vertices = self.vertices();
        let first = vertices.next()?;
        Some(vertices.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Collision box: bounding box shrunk by the reduction factor, centered
    /// on the bounds
    pub fn collision_shape(&self) -> Option<BoxShape> {
        let (min, max) = self.bounds()?;
        Some(BoxShape::new(
            (max - min) * BODY_BOUNDING_BOX_REDUCTION,
            (min + max) * 0.5,
        ))
    }

    fn validate(&self) -> Result<(), AssetError> {
        let position = &self.attributes.position;
        let geometry = |reason| AssetError::Geometry {
            id: self.id.clone(),
            reason,
        };

        if position.item_size != 3 {
            return Err(geometry("position item size must be 3"));
        }
        if position.array.is_empty() || position.array.len() % 3 != 0 {
            return Err(geometry("position buffer length must be a non-zero multiple of 3"));
        }
        let vertex_count = (position.array.len() / 3) as u32;
        if let Some(index) = &self.index {
            if index.array.iter().any(|&i| i >= vertex_count) {
                return Err(geometry("index out of range"));
            }
        }
        Ok(())
    }
}

/// Parse and validate a piece file
pub fn parse_pieces(json: &str) -> Result<Vec<PieceDefinition>, AssetError> {
    let file: PieceFile = serde_json::from_str(json)?;
    for piece in &file.pieces {
        piece.validate()?;
    }
    Ok(file.pieces)
}

/// One breakable fragment of the biscuit
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: String,
    /// Offset from the biscuit body origin
    pub local_position: Vec3,
    pub shadow_size: f32,
    pub shape: BoxShape,
    /// Own body, simulated only once detached
    pub body: BodyHandle,
    pub detached: bool,
}

impl Piece {
    /// Build the piece and its (not yet simulated) body
    pub fn from_definition<W: PhysicsWorld + ?Sized>(
        definition: &PieceDefinition,
        world: &mut W,
    ) -> Option<Self> {
        let shape = definition.collision_shape()?;
        let local_position = definition.local_position();
        let body = world.create_body(BodyDesc {
            mass: PIECE_MASS,
            position: local_position,
            angular_velocity: Vec3::ZERO,
            shapes: vec![shape],
        });

        Some(Self {
            id: definition.id.clone(),
            local_position,
            shadow_size: definition.shadow_size,
            shape,
            body,
            detached: false,
        })
    }

    /// Shape offset within the parent biscuit body
    pub fn shape_in_biscuit(&self) -> BoxShape {
        BoxShape::new(self.shape.half_extents, self.local_position + self.shape.offset)
    }
}
