//! Vertex types for the 2D overlay

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// NDC position with color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn from_points(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
        points.iter().map(|p| Vertex::new(p.x, p.y, color)).collect()
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

pub mod colors {
    pub const RIBBON: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const DEBUG_LINE: [f32; 4] = [1.0, 0.2, 0.3, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.96, 0.87, 0.74, 1.0];
}
