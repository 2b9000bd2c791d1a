//! Biscuit Slicer - slice a biscuit until it breaks apart
//!
//! Core modules:
//! - `slicer`: Gesture capture, smoothing, ribbon mesh, slice direction and probe points
//! - `sim`: Physics world seam, raycasting, biscuit pieces and the impact state machine
//! - `effects`: Confetti, smoke and camera shake driven by impact events
//! - `app`: Per-frame orchestration of input, slicer, physics and effects
//! - `renderer`: WebGPU pipeline for the slice ribbon overlay
//! - `settings`: Persisted preferences and slicer tuning

pub mod anim;
pub mod app;
pub mod effects;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod slicer;

pub use app::App;
pub use settings::{QualityPreset, Settings, SlicerSettings};

use glam::Vec2;

/// Tuning constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Maximum physics substeps per frame
    pub const MAX_SUBSTEPS: u32 = 3;
    /// Gravity along -Y (m/s²)
    pub const GRAVITY: f32 = -9.82;

    /// Half thickness of the ribbon at the gesture tip (NDC units)
    pub const RIBBON_THICKNESS: f32 = 0.1;

    /// Range for the number of bounce hits (inclusive)
    pub const HITS_RANGE: (u32, u32) = (2, 5);
    /// Range for the number of break hits (inclusive)
    pub const BREAK_HITS_RANGE: (u32, u32) = (1, 3);

    /// Impulse magnitude when bouncing the intact biscuit
    pub const BOUNCE_FORCE: f32 = 100.0;
    /// Impulse magnitude when bouncing a detached piece
    pub const PIECE_BOUNCE_FORCE: f32 = 500.0;
    /// Horizontal scatter range for pieces on explosion
    pub const SCATTER_FORCE: f32 = 1000.0;
    /// Downward scatter component on explosion
    pub const SCATTER_DOWN_FORCE: f32 = -500.0;

    /// Biscuit spawn height
    pub const BISCUIT_START_HEIGHT: f32 = 2.0;
    /// Biscuit body mass
    pub const BISCUIT_MASS: f32 = 1.0;
    /// Detached piece mass
    pub const PIECE_MASS: f32 = 2.0;
    /// Collision box size relative to the piece bounding box
    pub const BODY_BOUNDING_BOX_REDUCTION: f32 = 0.5;

    /// Room footprint (floor plus four walls)
    pub const ROOM_SIZE_X: f32 = 2.0;
    pub const ROOM_SIZE_Z: f32 = 2.0;
}

/// Linearly remap `value` from `[in_min, in_max]` to `[out_min, out_max]`,
/// clamping to the output endpoints outside the input range. An empty input
/// range maps everything at or below it to `out_min`.
#[inline]
pub fn map(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if value < in_min || (in_max == in_min && value == in_min) {
        return out_min;
    }
    if value > in_max {
        return out_max;
    }
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

/// Convert screen pixels (origin top-left) to normalized device coordinates
#[inline]
pub fn screen_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(map(x, 0.0, width, -1.0, 1.0), map(y, 0.0, height, 1.0, -1.0))
}
