//! Per-draw uniform (bind group 1) addressed with dynamic offsets.
//!
//! Each draw call in a pass gets one aligned slot in a shared uniform buffer,
//! so the model matrix, color, and pick payload can change between draws
//! without a submit in between.

use std::num::NonZeroU64;

use glam::{Mat4, Vec3};

use super::pipeline_util::uniform_layout;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::picking::TexelInfo;

/// GPU layout of `mbox::draw::DrawUniform`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    /// Object-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model` for normals.
    pub normal: [[f32; 4]; 4],
    /// RGB color, alpha carries the ambient strength.
    pub color: [f32; 4],
    /// x = pick id, y = pick kind.
    pub pick: [u32; 4],
}

const DRAW_UNIFORM_SIZE: u64 = size_of::<DrawUniform>() as u64;

impl DrawUniform {
    /// Payload for the lit pass.
    #[must_use]
    pub fn lit(model: Mat4, color: Vec3, ambient: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: normal_matrix(&model).to_cols_array_2d(),
            color: color.extend(ambient).to_array(),
            pick: [0; 4],
        }
    }

    /// Payload for the picking pass.
    #[must_use]
    pub fn pick(model: Mat4, texel: TexelInfo) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
            color: [0.0; 4],
            pick: texel.to_gpu(),
        }
    }
}

/// Inverse-transpose of `model`, identity when `model` is singular.
#[must_use]
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    if model.determinant().abs() < f32::EPSILON {
        Mat4::IDENTITY
    } else {
        model.inverse().transpose()
    }
}

/// Growable array of [`DrawUniform`]s bound with a dynamic offset.
pub struct DrawBuffer {
    buffer: DynamicBuffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    stride: u64,
    staging: Vec<u8>,
    label: &'static str,
}

impl DrawBuffer {
    /// Slots reserved up front.
    const INITIAL_DRAWS: u64 = 16;

    /// Empty buffer with room for a few draws.
    pub fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let stride = draw_stride(
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let layout = uniform_layout(
            device,
            label,
            true,
            NonZeroU64::new(DRAW_UNIFORM_SIZE),
        );
        let buffer = DynamicBuffer::new(
            device,
            label,
            usize::try_from(stride * Self::INITIAL_DRAWS).unwrap_or(4096),
            wgpu::BufferUsages::UNIFORM,
        );
        let bind_group = create_bind_group(device, label, &layout, &buffer);
        Self {
            buffer,
            layout,
            bind_group,
            stride,
            staging: Vec::new(),
            label,
        }
    }

    /// Layout for pipelines at group 1.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Bind group to use with [`Self::offset`].
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Dynamic offset of the `index`-th draw of the last upload.
    pub fn offset(&self, index: usize) -> u32 {
        u32::try_from(self.stride * index as u64).unwrap_or(u32::MAX)
    }

    /// Write `draws` into consecutive aligned slots, rebuilding the bind
    /// group if the buffer had to grow.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draws: &[DrawUniform],
    ) {
        let stride = usize::try_from(self.stride).unwrap_or(256);
        self.staging.clear();
        self.staging.resize(draws.len() * stride, 0);
        for (slot, draw) in self.staging.chunks_exact_mut(stride).zip(draws) {
            slot[..size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(draw));
        }
        if self.buffer.write_bytes(device, queue, &self.staging) {
            self.bind_group =
                create_bind_group(device, self.label, &self.layout, &self.buffer);
        }
    }
}

/// Uniform size rounded up to the device's dynamic offset alignment.
#[must_use]
pub fn draw_stride(alignment: u64) -> u64 {
    DRAW_UNIFORM_SIZE.div_ceil(alignment.max(1)) * alignment.max(1)
}

fn create_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &DynamicBuffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: buffer.buffer(),
                offset: 0,
                size: NonZeroU64::new(DRAW_UNIFORM_SIZE),
            }),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_uniform_matches_wgsl_size() {
        assert_eq!(DRAW_UNIFORM_SIZE, 160);
    }

    #[test]
    fn test_stride_respects_alignment() {
        assert_eq!(draw_stride(256), 256);
        assert_eq!(draw_stride(32), 160);
        assert_eq!(draw_stride(64), 192);
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale_keeps_direction() {
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let n = normal_matrix(&model).transform_vector3(Vec3::Y);
        assert!(n.normalize().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_normal_matrix_singular_falls_back_to_identity() {
        assert_eq!(normal_matrix(&Mat4::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn test_lit_packs_ambient_in_alpha() {
        let draw = DrawUniform::lit(Mat4::IDENTITY, Vec3::new(1.0, 0.5, 0.31), 0.1);
        assert_eq!(draw.color, [1.0, 0.5, 0.31, 0.1]);
        assert_eq!(draw.pick, [0; 4]);
    }
}
