//! Explosion smoke: a few billboards playing a sprite sheet

use glam::Vec3;
use rand::Rng;

use crate::anim::{Ease, Tween};

const OFFSET_RANGE: f32 = 0.2;
const SCALE_RANGE: (f32, f32) = (2.0, 5.0);
const DURATION: f32 = 2.0;
const START_OPACITY: f32 = 0.7;

/// Sprite sheet layout
pub const SHEET_COLUMNS: u32 = 8;
pub const SHEET_ROWS: u32 = 8;
pub const FRAME_COUNT: u32 = SHEET_COLUMNS * SHEET_ROWS;
pub const FRAMES_PER_SECOND: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SmokePlane {
    pub position: Vec3,
    pub rotation: f32,
    scale: Tween,
    opacity: Tween,
}

impl SmokePlane {
    pub fn scale(&self) -> f32 {
        self.scale.value()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Smoke {
    planes: Vec<SmokePlane>,
    elapsed: f32,
}

impl Smoke {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planes(&self) -> &[SmokePlane] {
        &self.planes
    }

    pub fn is_visible(&self) -> bool {
        !self.planes.is_empty()
    }

    pub fn explode<R: Rng + ?Sized>(&mut self, origin: Vec3, count: usize, rng: &mut R) {
        self.elapsed = 0.0;
        self.planes = (0..count)
            .map(|_| SmokePlane {
                position: origin
                    + Vec3::new(
                        rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                        rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                        rng.random_range(-OFFSET_RANGE..OFFSET_RANGE),
                    ),
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                scale: Tween::new(
                    0.0,
                    rng.random_range(SCALE_RANGE.0..SCALE_RANGE.1),
                    DURATION,
                    Ease::ExpoOut,
                ),
                opacity: Tween::new(START_OPACITY, 0.0, DURATION, Ease::Linear),
            })
            .collect();
    }

    pub fn update(&mut self, dt: f32) {
        if self.planes.is_empty() {
            return;
        }
        self.elapsed += dt;
        for plane in &mut self.planes {
            plane.scale.advance(dt);
            plane.opacity.advance(dt);
        }
        if self.planes.iter().all(|p| p.opacity.is_finished()) {
            self.planes.clear();
        }
    }

    /// Current sprite-sheet frame
    pub fn frame(&self) -> u32 {
        (self.elapsed * FRAMES_PER_SECOND) as u32 % FRAME_COUNT
    }

    /// UV offset of the current frame (rows counted from the top)
    pub fn frame_uv(&self) -> (f32, f32) {
        let frame = self.frame();
        (
            (frame % SHEET_COLUMNS) as f32 / SHEET_COLUMNS as f32,
            (frame / SHEET_COLUMNS) as f32 / SHEET_ROWS as f32,
        )
    }
}
