//! Offscreen picking pass.
//!
//! Every draw writes its `(id, kind)` payload into an `Rg32Uint` target with
//! depth testing, so each texel holds the nearest surface's identity. A
//! single texel is then copied out and read back on request.

use glam::Mat4;

use super::target::TexelInfo;
use crate::error::MboxError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::renderer::draw::{DrawBuffer, DrawUniform};
use crate::renderer::frame::FrameBindings;
use crate::renderer::mesh::{CubeMesh, Vertex};
use crate::renderer::pipeline_util::{
    create_attachment, cube_primitive_state, depth_stencil_state, DEPTH_FORMAT,
};

/// Pick target color format: R = id, G = kind.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Uint;

const TEXEL_BYTES: u64 = 8;
// copy_texture_to_buffer requires 256-byte row alignment
const STAGING_BYTES: u64 = 256;

/// Sized color + depth attachments; absent until [`PickPass::init`]
/// succeeds.
struct PickAttachments {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl PickAttachments {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = create_attachment(
            device,
            "Picking Texture",
            PICK_FORMAT,
            (width, height),
            wgpu::TextureUsages::COPY_SRC,
        );
        let (_, depth_view) = create_attachment(
            device,
            "Picking Depth Texture",
            DEPTH_FORMAT,
            (width, height),
            wgpu::TextureUsages::empty(),
        );
        Self {
            texture,
            view,
            depth_view,
            width,
            height,
        }
    }
}

/// Owns the picking pipeline, its render target, and the readback buffer.
///
/// The target is either released (picking is a no-op and every lookup
/// reports background) or initialized at the viewport size. Drawing into it
/// goes through [`PickPass::bind`], whose scope must end before
/// [`PickPass::get_info`] can be called.
pub struct PickPass {
    pipeline: wgpu::RenderPipeline,
    draws: DrawBuffer,
    staging: wgpu::Buffer,
    target: Option<PickAttachments>,
}

impl PickPass {
    /// Build the pipeline and readback buffer. The target starts released.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if the picking shader fails to
    /// compose or validate.
    pub fn new(
        context: &RenderContext,
        frame: &FrameBindings,
        composer: &mut ShaderComposer,
    ) -> Result<Self, MboxError> {
        let draws = DrawBuffer::new(&context.device, "Picking Draw Uniforms");
        let pipeline =
            Self::create_pipeline(context, frame, draws.layout(), composer)?;
        let staging = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Picking Staging Buffer"),
            size: STAGING_BYTES,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Ok(Self {
            pipeline,
            draws,
            staging,
            target: None,
        })
    }

    fn create_pipeline(
        context: &RenderContext,
        frame: &FrameBindings,
        draw_layout: &wgpu::BindGroupLayout,
        composer: &mut ShaderComposer,
    ) -> Result<wgpu::RenderPipeline, MboxError> {
        context
            .validated(|device| -> Result<_, MboxError> {
                let shader = composer.compose(device, Shader::Picking)?;
                let layout = device.create_pipeline_layout(
                    &wgpu::PipelineLayoutDescriptor {
                        label: Some("Picking Pipeline Layout"),
                        bind_group_layouts: &[&frame.layout, draw_layout],
                        push_constant_ranges: &[],
                    },
                );
                Ok(device.create_render_pipeline(
                    &wgpu::RenderPipelineDescriptor {
                        label: Some("Picking Pipeline"),
                        layout: Some(&layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[Vertex::layout()],
                            compilation_options: Default::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format: PICK_FORMAT,
                                blend: None,
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: Default::default(),
                        }),
                        primitive: cube_primitive_state(),
                        depth_stencil: Some(depth_stencil_state()),
                        multisample: wgpu::MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    },
                ))
            })
            .map_err(|e| MboxError::ShaderCompose(e.to_string()))?
    }

    /// Recompile the pipeline. The current pipeline stays in place if
    /// compilation fails.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] on failure.
    pub fn rebuild(
        &mut self,
        context: &RenderContext,
        frame: &FrameBindings,
        composer: &mut ShaderComposer,
    ) -> Result<(), MboxError> {
        self.pipeline = Self::create_pipeline(
            context,
            frame,
            self.draws.layout(),
            composer,
        )?;
        Ok(())
    }

    /// Allocate the color and depth attachments at `width` x `height`,
    /// releasing any previous target first.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::FramebufferIncomplete`] for a zero or oversized
    /// extent, or if the device rejects the allocation. The pass is left
    /// released.
    pub fn init(
        &mut self,
        context: &RenderContext,
        width: u32,
        height: u32,
    ) -> Result<(), MboxError> {
        self.release();
        let max = context.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(MboxError::FramebufferIncomplete(format!(
                "{width}x{height} outside 1..={max}"
            )));
        }
        let attachments = context
            .validated(|device| PickAttachments::new(device, width, height))
            .map_err(|e| MboxError::FramebufferIncomplete(e.to_string()))?;
        self.target = Some(attachments);
        log::info!("picking target initialized at {width}x{height}");
        Ok(())
    }

    /// Drop the attachments. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.target.take().is_some() {
            log::debug!("picking target released");
        }
    }

    /// Whether a target is allocated.
    pub fn is_ready(&self) -> bool {
        self.target.is_some()
    }

    /// Target extent, if allocated.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.target.as_ref().map(|t| (t.width, t.height))
    }

    /// Make the pick target the draw destination for the returned scope.
    ///
    /// Draws are recorded on the scope and submitted when it ends, after
    /// which later passes render to their own targets again. Without an
    /// allocated target the scope records nothing.
    pub fn bind<'a>(
        &'a mut self,
        context: &'a RenderContext,
        frame: &'a FrameBindings,
        mesh: &'a CubeMesh,
    ) -> PickScope<'a> {
        PickScope {
            pass: self,
            context,
            frame,
            mesh,
            draws: Vec::new(),
        }
    }

    fn submit_draws(
        &mut self,
        context: &RenderContext,
        frame: &FrameBindings,
        mesh: &CubeMesh,
        draws: &[DrawUniform],
    ) {
        if self.target.is_none() {
            return;
        }
        self.draws.upload(&context.device, &context.queue, draws);
        let Some(target) = &self.target else {
            return;
        };

        let mut encoder = context.create_encoder("Picking Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Picking Render Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &target.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: 0.0,
                                    g: 0.0,
                                    b: 0.0,
                                    a: 0.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &target.depth_view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &frame.bind_group, &[]);
            for index in 0..draws.len() {
                pass.set_bind_group(
                    1,
                    self.draws.bind_group(),
                    &[self.draws.offset(index)],
                );
                mesh.draw(&mut pass);
            }
        }
        context.submit(encoder);
    }

    /// Read the texel at framebuffer coordinates `(x, y)`, origin
    /// bottom-left.
    ///
    /// Blocks until the GPU has finished all submitted work and the texel
    /// has been copied back, so call it once per click rather than per
    /// frame. Returns [`TexelInfo::NONE`] without touching the GPU when no
    /// target is allocated or the point is outside it.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::Readback`] if polling or mapping fails.
    pub fn get_info(
        &self,
        context: &RenderContext,
        x: u32,
        y: u32,
    ) -> Result<TexelInfo, MboxError> {
        let Some(target) = &self.target else {
            return Ok(TexelInfo::NONE);
        };
        if x >= target.width || y >= target.height {
            return Ok(TexelInfo::NONE);
        }
        // texture rows run top-down
        let row = target.height - 1 - y;

        let mut encoder = context.create_encoder("Picking Readback Encoder");
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y: row, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(STAGING_BYTES as u32),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        context.submit(encoder);

        let slice = self.staging.slice(..TEXEL_BYTES);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| MboxError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| MboxError::Readback(e.to_string()))?
            .map_err(|e| MboxError::Readback(e.to_string()))?;

        let mut bytes = [0u8; TEXEL_BYTES as usize];
        {
            let data = slice.get_mapped_range();
            bytes.copy_from_slice(&data[..TEXEL_BYTES as usize]);
        }
        self.staging.unmap();
        Ok(TexelInfo::from_le_bytes(bytes))
    }
}

/// Bound state of a [`PickPass`]: collects draws and submits them into the
/// pick target when dropped or unbound.
pub struct PickScope<'a> {
    pass: &'a mut PickPass,
    context: &'a RenderContext,
    frame: &'a FrameBindings,
    mesh: &'a CubeMesh,
    draws: Vec<DrawUniform>,
}

impl PickScope<'_> {
    /// Draw the stored object in `slot` with id `slot + 1`.
    pub fn draw_object(&mut self, slot: usize, model: Mat4) {
        self.draws.push(DrawUniform::pick(model, TexelInfo::object(slot)));
    }

    /// Draw the edit session's object with the active sentinel.
    pub fn draw_active(&mut self, model: Mat4) {
        self.draws.push(DrawUniform::pick(model, TexelInfo::ACTIVE));
    }

    /// Number of draws recorded so far.
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// End the scope, submitting the recorded draws.
    pub fn unbind(self) {
        drop(self);
    }
}

impl Drop for PickScope<'_> {
    fn drop(&mut self) {
        let draws = std::mem::take(&mut self.draws);
        self.pass
            .submit_draws(self.context, self.frame, self.mesh, &draws);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::picking::PickKind;
    use crate::renderer::frame::FrameUniform;
    use crate::transform::{frustum_hfov, OPENGL_TO_WGPU};

    const SIZE: u32 = 64;

    struct Fixture {
        context: RenderContext,
        frame: FrameBindings,
        mesh: CubeMesh,
        pass: PickPass,
    }

    /// Headless fixture looking down -Z from (0, 0, 5); `None` without a
    /// GPU adapter.
    fn fixture() -> Option<Fixture> {
        let context =
            pollster::block_on(RenderContext::headless(SIZE, SIZE)).ok()?;
        let frame = FrameBindings::new(&context.device);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = OPENGL_TO_WGPU * frustum_hfov(90.0, 1.0, 0.1, 100.0);
        frame.update(
            &context.queue,
            &FrameUniform::new(proj * view, Vec3::new(0.0, 0.0, 5.0), Vec3::ONE, Vec3::ONE),
        );
        let mesh = CubeMesh::new(&context.device);
        let mut composer = ShaderComposer::new().unwrap();
        let mut pass = PickPass::new(&context, &frame, &mut composer).unwrap();
        pass.init(&context, SIZE, SIZE).unwrap();
        Some(Fixture {
            context,
            frame,
            mesh,
            pass,
        })
    }

    fn at(x: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, 0.0, z))
    }

    #[test]
    fn test_distinct_objects_read_back_their_ids() {
        let Some(mut f) = fixture() else { return };
        {
            let mut scope = f.pass.bind(&f.context, &f.frame, &f.mesh);
            scope.draw_object(0, at(-2.0, 0.0));
            scope.draw_object(1, at(0.0, 0.0));
            scope.draw_object(2, at(2.0, 0.0));
            scope.unbind();
        }
        // x = -2, 0, 2 project to pixel columns ~19, 32, 44
        for (slot, px) in [(0usize, 19u32), (1, 32), (2, 44)] {
            let texel = f.pass.get_info(&f.context, px, 32).unwrap();
            assert_eq!(texel, TexelInfo::object(slot), "column {px}");
        }
        assert_eq!(f.pass.get_info(&f.context, 2, 2).unwrap(), TexelInfo::NONE);
    }

    #[test]
    fn test_nearer_object_wins_regardless_of_order() {
        let Some(mut f) = fixture() else { return };
        for order in [[0usize, 1], [1, 0]] {
            {
                let mut scope = f.pass.bind(&f.context, &f.frame, &f.mesh);
                for slot in order {
                    // slot 1 sits closer to the camera
                    scope.draw_object(slot, at(0.0, slot as f32 * 2.0));
                }
            }
            let texel = f.pass.get_info(&f.context, 32, 32).unwrap();
            assert_eq!(texel, TexelInfo::object(1), "order {order:?}");
        }
    }

    #[test]
    fn test_active_object_writes_sentinel() {
        let Some(mut f) = fixture() else { return };
        {
            let mut scope = f.pass.bind(&f.context, &f.frame, &f.mesh);
            scope.draw_object(0, at(0.0, -2.0));
            scope.draw_active(at(0.0, 0.0));
            assert_eq!(scope.draw_count(), 2);
        }
        let texel = f.pass.get_info(&f.context, 32, 32).unwrap();
        assert_eq!(texel.kind, PickKind::Active);
        assert_eq!(texel.id, 0);
    }

    #[test]
    fn test_released_pass_reports_background() {
        let Some(mut f) = fixture() else { return };
        f.pass.release();
        f.pass.release();
        assert!(!f.pass.is_ready());
        {
            let mut scope = f.pass.bind(&f.context, &f.frame, &f.mesh);
            scope.draw_object(0, at(0.0, 0.0));
        }
        assert_eq!(f.pass.get_info(&f.context, 32, 32).unwrap(), TexelInfo::NONE);
    }

    #[test]
    fn test_init_rejects_empty_extent() {
        let Some(mut f) = fixture() else { return };
        assert!(matches!(
            f.pass.init(&f.context, 0, 10),
            Err(MboxError::FramebufferIncomplete(_))
        ));
        assert!(!f.pass.is_ready());
        f.pass.init(&f.context, 32, 16).unwrap();
        assert_eq!(f.pass.size(), Some((32, 16)));
        assert_eq!(f.pass.get_info(&f.context, 40, 0).unwrap(), TexelInfo::NONE);
    }
}
