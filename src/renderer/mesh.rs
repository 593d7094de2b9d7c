//! Unit cube geometry shared by the lit and picking passes.

use glam::Vec3;
use wgpu::util::DeviceExt;

/// Cube vertex: object-space position and face normal.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in `[-0.5, 0.5]^3`.
    pub position: [f32; 3],
    /// Outward face normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout matching `@location(0)` / `@location(1)`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Number of vertices in the non-indexed cube (6 faces x 2 triangles).
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// Build the 36 cube vertices with counter-clockwise winding seen from
/// outside.
#[must_use]
pub fn cube_vertices() -> Vec<Vertex> {
    // (normal, u, v) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    let corners = [
        (-0.5, -0.5),
        (0.5, -0.5),
        (0.5, 0.5),
        (-0.5, -0.5),
        (0.5, 0.5),
        (-0.5, 0.5),
    ];

    let mut vertices = Vec::with_capacity(CUBE_VERTEX_COUNT as usize);
    for (normal, u, v) in faces {
        let center = normal * 0.5;
        for (a, b) in corners {
            vertices.push(Vertex {
                position: (center + u * a + v * b).to_array(),
                normal: normal.to_array(),
            });
        }
    }
    vertices
}

/// GPU-resident cube vertex buffer.
pub struct CubeMesh {
    vertex_buffer: wgpu::Buffer,
}

impl CubeMesh {
    /// Upload the cube vertices.
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertex Buffer"),
                contents: bytemuck::cast_slice(&cube_vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Self { vertex_buffer }
    }

    /// Bind the vertex buffer and issue one draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..CUBE_VERTEX_COUNT, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_covers_position_and_normal() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn test_cube_has_36_vertices_on_unit_bounds() {
        let vertices = cube_vertices();
        assert_eq!(vertices.len(), CUBE_VERTEX_COUNT as usize);
        for v in &vertices {
            for c in v.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for tri in cube_vertices().chunks(3) {
            let p0 = Vec3::from(tri[0].position);
            let p1 = Vec3::from(tri[1].position);
            let p2 = Vec3::from(tri[2].position);
            let n = Vec3::from(tri[0].normal);
            let face = (p1 - p0).cross(p2 - p0);
            assert!(face.dot(n) > 0.0, "triangle winds inward: {tri:?}");
        }
    }
}
