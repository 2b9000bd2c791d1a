//! Triangle-strip blade mesh following the gesture

use glam::Vec2;

use crate::consts::RIBBON_THICKNESS;
use crate::map;

/// Pre-allocated triangle strip in NDC.
///
/// The tip point is a single vertex, every following point adds a left/right
/// pair. Thickness tapers linearly from the tip to zero at the tail.
#[derive(Debug, Clone)]
pub struct RibbonMesh {
    vertices: Vec<Vec2>,
    draw_count: u32,
    visible: bool,
    /// Global thickness multiplier, animated 1 → 0 when the gesture ends
    pub thickness_scale: f32,
}

impl RibbonMesh {
    /// Allocate a strip able to hold `point_capacity` path points
    pub fn new(point_capacity: usize) -> Self {
        let vertex_capacity = (point_capacity * 2).saturating_sub(1);
        Self {
            vertices: vec![Vec2::ZERO; vertex_capacity],
            draw_count: 0,
            visible: false,
            thickness_scale: 1.0,
        }
    }

    /// Full vertex buffer (only the first `draw_count` are meaningful)
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Vertices the renderer should draw
    #[inline]
    pub fn visible_vertices(&self) -> &[Vec2] {
        let n = (self.draw_count as usize).min(self.vertices.len());
        &self.vertices[..n]
    }

    #[inline]
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Expose the strip for `count` path points; hides the mesh at zero
    pub fn set_draw_count(&mut self, count: usize) {
        let vertices = if count < 2 { 0 } else { (count - 2) * 2 + 2 };
        self.draw_count = vertices.min(self.vertices.len()) as u32;
        self.visible = count != 0;
    }

    /// Rebuild the strip from `points` (newest first), using the first `count`
    pub fn update(&mut self, points: &[Vec2], count: usize) {
        let count = count.min(points.len());
        if count == 0 || self.vertices.is_empty() {
            return;
        }

        self.vertices[0] = points[0];

        let mut i = 1;
        for j in 1..count {
            if i >= self.vertices.len() {
                break;
            }
            let point = points[j];
            let direction = point - points[j - 1];
            let length = direction.length();

            // Duplicate points have no direction and contribute no width
            let perpendicular = if length > f32::EPSILON {
                let d = direction / length;
                Vec2::new(-d.y, d.x)
            } else {
                Vec2::ZERO
            };

            let thickness = map(
                j as f32,
                0.0,
                count as f32,
                RIBBON_THICKNESS * self.thickness_scale,
                0.0,
            );

            self.vertices[i] = point - perpendicular * thickness;
            if let Some(v) = self.vertices.get_mut(i + 1) {
                *v = point + perpendicular * thickness;
            }
            i += 2;
        }
    }

    /// Zero the buffer and hide the mesh
    pub fn reset(&mut self) {
        self.vertices.fill(Vec2::ZERO);
        self.draw_count = 0;
        self.visible = false;
        self.thickness_scale = 1.0;
    }
}
