//! Lit geometry pass: stored objects, the active object, and the light
//! marker drawn to the presentation target.

use glam::Vec3;

use super::draw::{DrawBuffer, DrawUniform};
use super::frame::FrameBindings;
use super::mesh::{CubeMesh, Vertex};
use super::pipeline_util::{
    create_attachment, cube_primitive_state, depth_stencil_state, DEPTH_FORMAT,
};
use crate::error::MboxError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};

/// Phong-shaded cube pass with its own depth buffer.
pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    draws: DrawBuffer,
    depth_view: wgpu::TextureView,
    size: (u32, u32),
}

impl ScenePass {
    /// Build the pipeline and a depth buffer sized to the context.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if the main shader fails to
    /// compose or validate.
    pub fn new(
        context: &RenderContext,
        frame: &FrameBindings,
        composer: &mut ShaderComposer,
    ) -> Result<Self, MboxError> {
        let draws = DrawBuffer::new(&context.device, "Scene Draw Uniforms");
        let pipeline =
            Self::create_pipeline(context, frame, draws.layout(), composer)?;
        let size = (context.width().max(1), context.height().max(1));
        let (_, depth_view) = create_attachment(
            &context.device,
            "Scene Depth Texture",
            DEPTH_FORMAT,
            size,
            wgpu::TextureUsages::empty(),
        );
        Ok(Self {
            pipeline,
            draws,
            depth_view,
            size,
        })
    }

    fn create_pipeline(
        context: &RenderContext,
        frame: &FrameBindings,
        draw_layout: &wgpu::BindGroupLayout,
        composer: &mut ShaderComposer,
    ) -> Result<wgpu::RenderPipeline, MboxError> {
        let format = context.format();
        context
            .validated(|device| -> Result<_, MboxError> {
                let shader = composer.compose(device, Shader::Main)?;
                let layout = device.create_pipeline_layout(
                    &wgpu::PipelineLayoutDescriptor {
                        label: Some("Scene Pipeline Layout"),
                        bind_group_layouts: &[&frame.layout, draw_layout],
                        push_constant_ranges: &[],
                    },
                );
                Ok(device.create_render_pipeline(
                    &wgpu::RenderPipelineDescriptor {
                        label: Some("Scene Pipeline"),
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
                                format,
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

    /// Recompile the pipeline from `composer`. The current pipeline stays
    /// in place if compilation fails.
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

    /// Recreate the depth buffer for a new viewport size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size == self.size {
            return;
        }
        self.size = size;
        let (_, depth_view) = create_attachment(
            device,
            "Scene Depth Texture",
            DEPTH_FORMAT,
            size,
            wgpu::TextureUsages::empty(),
        );
        self.depth_view = depth_view;
    }

    /// Clear `target` to `clear_color` and draw one cube per entry of
    /// `draws`, in order.
    pub fn render(
        &mut self,
        context: &RenderContext,
        frame: &FrameBindings,
        mesh: &CubeMesh,
        target: &wgpu::TextureView,
        clear_color: Vec3,
        draws: &[DrawUniform],
    ) {
        self.draws.upload(&context.device, &context.queue, draws);

        let mut encoder = context.create_encoder("Scene Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Render Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: target,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(clear_color.x),
                                    g: f64::from(clear_color.y),
                                    b: f64::from(clear_color.z),
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth_view,
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
}
