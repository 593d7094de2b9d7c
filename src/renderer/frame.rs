//! Per-frame camera and light uniform (bind group 0 of every pass).

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use super::pipeline_util::uniform_layout;

/// GPU layout of `mbox::frame::FrameUniform`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    /// Combined projection * view.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position (w unused).
    pub view_position: [f32; 4],
    /// Light world position (w unused).
    pub light_position: [f32; 4],
    /// Light color (w unused).
    pub light_color: [f32; 4],
}

impl FrameUniform {
    /// Pack camera and light state.
    #[must_use]
    pub fn new(
        view_proj: Mat4,
        view_position: Vec3,
        light_position: Vec3,
        light_color: Vec3,
    ) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view_position: view_position.extend(1.0).to_array(),
            light_position: light_position.extend(1.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
        }
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}

/// Uniform buffer, layout, and bind group for [`FrameUniform`].
pub struct FrameBindings {
    buffer: wgpu::Buffer,
    /// Bind group layout, shared by every pipeline at group 0.
    pub layout: wgpu::BindGroupLayout,
    /// Bind group referencing the frame buffer.
    pub bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    /// Allocate the buffer with an identity view-projection.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Uniform Buffer"),
                contents: bytemuck::cast_slice(&[FrameUniform::default()]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let layout =
            uniform_layout(device, "Frame Bind Group Layout", false, None);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    /// Upload `uniform` for the next submission.
    pub fn update(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uniform_matches_wgsl_size() {
        // mat4x4 + 3 * vec4
        assert_eq!(size_of::<FrameUniform>(), 64 + 3 * 16);
    }
}
