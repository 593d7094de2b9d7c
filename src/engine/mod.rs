//! The editor engine: owns the GPU passes, the object store, the edit
//! session and the camera, and runs one frame at a time.
//!
//! Per frame the engine uploads the camera uniform, redraws the picking
//! target (stored objects plus the active object), draws the lit scene
//! (stored objects, the active object and the light marker) and finally
//! closes the frame on the edit session. Clicks are resolved between
//! frames by reading back one texel of the picking target.

/// Editor command vocabulary.
pub mod command;

use glam::{Mat4, Vec3};

pub use self::command::EditorCommand;
use crate::camera::CameraController;
use crate::edit::{clamp_to_panel, EditSession, PickOutcome};
use crate::error::MboxError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::input::{InputEvent, InputProcessor};
use crate::options::Options;
use crate::picking::{window_to_framebuffer, PickPass, PickTarget};
use crate::renderer::{
    CubeMesh, DrawUniform, FrameBindings, FrameUniform, ScenePass,
};
use crate::scene::{seed_demo_scene, ObjectStore};
use crate::transform::DecomposedTransform;
use crate::util::frame_timing::FrameTiming;

/// Ambient strength of the light marker, which is drawn fully lit.
const MARKER_AMBIENT: f32 = 1.0;

/// The box scene editor.
///
/// Construct with [`EditorEngine::new`] for a window surface or
/// [`EditorEngine::from_context`] for an existing (possibly headless)
/// context, forward input through [`handle_input`](Self::handle_input) and
/// call [`update`](Self::update) and [`render`](Self::render) once per
/// frame.
pub struct EditorEngine {
    context: RenderContext,
    options: Options,
    frame: FrameBindings,
    mesh: CubeMesh,
    scene_pass: ScenePass,
    pick_pass: PickPass,
    store: ObjectStore,
    session: EditSession,
    camera: CameraController,
    input: InputProcessor,
    /// Delta time and smoothed FPS.
    pub frame_timing: FrameTiming,
    exit_requested: bool,
}

impl EditorEngine {
    /// Create an engine rendering to `window`.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::Gpu`] if the GPU context cannot be created, or
    /// any error of [`Self::from_context`].
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, MboxError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Create an engine on an existing render context.
    ///
    /// A configured `shader_dir` that fails to compose falls back to the
    /// embedded shaders with a warning. A picking target that cannot be
    /// allocated is logged and leaves picking disabled until the next
    /// successful resize.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::InitializationFailure`] if the embedded shaders
    /// fail to build, or [`MboxError::CapacityExceeded`] if the demo scene does not
    /// fit into `max_objects`.
    pub fn from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, MboxError> {
        let frame = FrameBindings::new(&context.device);
        let mesh = CubeMesh::new(&context.device);

        let shader_dir = options.editor.shader_dir.as_deref();
        let (scene_pass, mut pick_pass) =
            match build_passes(&context, &frame, shader_dir) {
                Ok(passes) => passes,
                Err(e) if shader_dir.is_some() => {
                    log::warn!("shader directory rejected, using embedded shaders: {e}");
                    build_passes(&context, &frame, None)
                        .map_err(embedded_setup_failure)?
                }
                Err(e) => return Err(embedded_setup_failure(e)),
            };
        if let Err(e) =
            pick_pass.init(&context, context.width(), context.height())
        {
            log::error!("picking disabled: {e}");
        }

        let mut store = ObjectStore::with_capacity(options.editor.max_objects);
        if options.editor.seed_demo_scene {
            let slots = seed_demo_scene(
                &mut store,
                Vec3::from(options.editor.default_color),
            )?;
            log::info!("seeded {} demo objects", slots.len());
        }

        let camera = CameraController::new(
            &options.camera,
            context.width(),
            context.height(),
        );
        let input = InputProcessor::with_key_bindings(options.keybindings.clone());

        Ok(Self {
            context,
            options,
            frame,
            mesh,
            scene_pass,
            pick_pass,
            store,
            session: EditSession::new(),
            camera,
            input,
            frame_timing: FrameTiming::new(),
            exit_requested: false,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The GPU context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the options, applying camera settings and key bindings.
    ///
    /// The store capacity and shader directory take effect on the next
    /// engine construction and shader reload respectively.
    pub fn set_options(&mut self, options: Options) {
        self.camera.apply_options(&options.camera);
        self.input = InputProcessor::with_key_bindings(options.keybindings.clone());
        self.options = options;
    }

    /// Stored objects.
    #[must_use]
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// The edit session.
    #[must_use]
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Mutable edit session, for panels that write decomposed fields
    /// directly.
    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    /// The fly camera controller.
    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Edit the active object's decomposed fields, clamped to the panel
    /// ranges afterwards. Returns `false` if no session is open.
    pub fn edit_active(
        &mut self,
        edit: impl FnOnce(&mut DecomposedTransform),
    ) -> bool {
        let Some(transform) = self.session.transform_mut() else {
            return false;
        };
        edit(transform);
        clamp_to_panel(transform, &self.options.panel);
        true
    }

    /// Whether an [`EditorCommand::Exit`] has been executed.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Feed a platform event to the input processor and execute the
    /// command it produces, if any. Returns that command.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<EditorCommand> {
        let command = self.input.handle_event(event)?;
        self.execute(command);
        Some(command)
    }

    /// Execute one command.
    ///
    /// Refused edits (full store, degenerate transform) are logged as
    /// warnings and leave the session as it was.
    pub fn execute(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::NewObject => {
                let view = self.camera.camera.view_matrix();
                let color = Vec3::from(self.options.editor.default_color);
                match self.session.open_new(
                    &mut self.store,
                    &view,
                    self.options.editor.new_object_distance,
                    color,
                ) {
                    Ok(Some(slot)) => {
                        log::debug!("new object; previous committed to {slot}");
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("new object refused: {e}"),
                }
            }
            EditorCommand::DeleteObject => self.session.delete(),
            EditorCommand::Pick { x, y } => {
                match self.pick_at_window(f64::from(x), f64::from(y)) {
                    Ok(outcome) => log::debug!("pick: {outcome:?}"),
                    Err(e @ MboxError::Readback(_)) => log::error!("{e}"),
                    Err(e) => log::warn!("pick ignored: {e}"),
                }
            }
            EditorCommand::MoveCamera { direction, dt } => {
                self.camera.translate(direction, dt);
            }
            EditorCommand::LookCamera { delta } => self.camera.look(delta),
            EditorCommand::ReloadShaders => self.reload_shaders(),
            EditorCommand::Exit => {
                log::info!("exit requested");
                self.exit_requested = true;
            }
        }
    }

    /// Resolve a click at window position `(x, y)` (origin top-left) and
    /// apply it to the edit session.
    ///
    /// Positions outside the viewport count as background.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::Readback`] if the texel cannot be read back,
    /// and the errors of [`EditSession::on_pick`] otherwise; the session
    /// is unchanged in every error case.
    pub fn pick_at_window(
        &mut self,
        x: f64,
        y: f64,
    ) -> Result<PickOutcome, MboxError> {
        let target = match window_to_framebuffer(
            x,
            y,
            self.context.width(),
            self.context.height(),
        ) {
            Some((fx, fy)) => {
                self.pick_pass.get_info(&self.context, fx, fy)?.target()
            }
            None => PickTarget::Background,
        };
        self.session.on_pick(&mut self.store, target)
    }

    /// Recompile both pipelines. A failure keeps the previous pipeline of
    /// the pass that failed.
    fn reload_shaders(&mut self) {
        let shader_dir = self.options.editor.shader_dir.as_deref();
        let mut composer = match ShaderComposer::with_shader_dir(shader_dir) {
            Ok(composer) => composer,
            Err(e) => {
                log::error!("shader reload failed: {e}");
                return;
            }
        };
        let scene = self.scene_pass.rebuild(
            &self.context,
            &self.frame,
            &mut composer,
        );
        let pick =
            self.pick_pass
                .rebuild(&self.context, &self.frame, &mut composer);
        match scene.and(pick) {
            Ok(()) => log::info!("shaders reloaded"),
            Err(e) => log::error!("shader reload failed: {e}"),
        }
    }

    // ── Frame ───────────────────────────────────────────────────────

    /// Advance frame timing and fly the camera along the held movement
    /// keys.
    pub fn update(&mut self) {
        let dt = self.frame_timing.tick();
        let direction = self.input.movement();
        if direction != Vec3::ZERO {
            self.execute(EditorCommand::MoveCamera { direction, dt });
        }
    }

    /// Render one frame to the window surface and present it.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next swapchain texture cannot
    /// be acquired; the caller should resize on `Lost`/`Outdated`.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&view);
        frame.present();
        self.session.end_frame();
        Ok(())
    }

    /// Render one frame into a caller-owned texture view of the context's
    /// format. Nothing is presented.
    pub fn render_to_texture(&mut self, view: &wgpu::TextureView) {
        self.render_to_view(view);
        self.session.end_frame();
    }

    fn render_to_view(&mut self, view: &wgpu::TextureView) {
        let lighting = &self.options.lighting;
        let light_position = Vec3::from(lighting.position);
        self.frame.update(
            &self.context.queue,
            &FrameUniform::new(
                self.camera.camera.view_proj(),
                self.camera.camera.position,
                light_position,
                Vec3::from(lighting.color),
            ),
        );

        let active = self.session.model();
        {
            let mut scope =
                self.pick_pass
                    .bind(&self.context, &self.frame, &self.mesh);
            for object in &self.store {
                scope.draw_object(object.slot, object.model);
            }
            if let Some(model) = active {
                scope.draw_active(model);
            }
            scope.unbind();
        }

        let ambient = lighting.ambient;
        let mut draws: Vec<DrawUniform> = self
            .store
            .iter()
            .map(|object| DrawUniform::lit(object.model, object.color, ambient))
            .collect();
        if let Some(transform) = self.session.transform() {
            draws.push(DrawUniform::lit(
                transform.to_model(),
                transform.color,
                ambient,
            ));
        }
        let marker = Mat4::from_translation(light_position)
            * Mat4::from_scale(Vec3::splat(lighting.marker_scale));
        draws.push(DrawUniform::lit(marker, Vec3::ONE, MARKER_AMBIENT));

        self.scene_pass.render(
            &self.context,
            &self.frame,
            &self.mesh,
            view,
            Vec3::from(lighting.clear_color),
            &draws,
        );
    }

    /// Resize the surface, the camera projection, the scene depth buffer
    /// and the picking target. Zero-sized windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.context.resize(width, height) {
            return;
        }
        self.camera.resize(width, height);
        self.scene_pass.resize(&self.context.device, width, height);
        self.pick_pass.release();
        if let Err(e) = self.pick_pass.init(&self.context, width, height) {
            log::error!("picking disabled: {e}");
        }
        log::info!("resized to {width}x{height}");
    }
}

/// The embedded pipelines are the last resort, so their failure is fatal.
fn embedded_setup_failure(e: MboxError) -> MboxError {
    MboxError::InitializationFailure(format!("embedded pipelines: {e}"))
}

fn build_passes(
    context: &RenderContext,
    frame: &FrameBindings,
    shader_dir: Option<&std::path::Path>,
) -> Result<(ScenePass, PickPass), MboxError> {
    let mut composer = ShaderComposer::with_shader_dir(shader_dir)?;
    let scene = ScenePass::new(context, frame, &mut composer)?;
    let pick = PickPass::new(context, frame, &mut composer)?;
    Ok((scene, pick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::SessionState;

    const SIZE: u32 = 64;
    const CENTER: f32 = SIZE as f32 / 2.0;

    #[test]
    fn embedded_pipeline_failure_is_an_initialization_failure() {
        let err = embedded_setup_failure(MboxError::ShaderCompose(
            "unknown import".into(),
        ));
        assert!(matches!(
            &err,
            MboxError::InitializationFailure(msg) if msg.contains("unknown import")
        ));
        assert!(err.to_string().starts_with("initialization failed"));
    }

    struct Fixture {
        engine: EditorEngine,
        _texture: wgpu::Texture,
        view: wgpu::TextureView,
    }

    impl Fixture {
        fn frame(&mut self) {
            self.engine.render_to_texture(&self.view);
        }
    }

    fn fixture(seed_demo_scene: bool) -> Option<Fixture> {
        let context =
            pollster::block_on(RenderContext::headless(SIZE, SIZE)).ok()?;
        let mut options = Options::default();
        options.editor.seed_demo_scene = seed_demo_scene;
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Color Target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: context.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let engine = EditorEngine::from_context(context, options).unwrap();
        Some(Fixture {
            engine,
            _texture: texture,
            view,
        })
    }

    fn click(engine: &mut EditorEngine, x: f32, y: f32) {
        engine.execute(EditorCommand::Pick { x, y });
    }

    #[test]
    fn demo_scene_is_seeded() {
        let Some(fixture) = fixture(true) else {
            return;
        };
        assert_eq!(fixture.engine.store().len(), 10);
        assert_eq!(fixture.engine.session().state(), SessionState::Empty);
    }

    #[test]
    fn clicking_the_center_cube_checks_it_out() {
        let Some(mut fixture) = fixture(true) else {
            return;
        };
        fixture.frame();
        click(&mut fixture.engine, CENTER, CENTER);

        let engine = &fixture.engine;
        assert_eq!(engine.session().state(), SessionState::Editing);
        assert_eq!(engine.store().len(), 9);
        assert!(engine.store().get(0).is_none());
        let transform = engine.session().transform().unwrap();
        assert!(transform.position.length() < 1e-4);
    }

    #[test]
    fn clicking_the_active_object_keeps_the_session() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        fixture.engine.execute(EditorCommand::NewObject);
        fixture.frame();
        click(&mut fixture.engine, CENTER, CENTER);

        assert_eq!(fixture.engine.session().state(), SessionState::New);
        assert!(fixture.engine.store().is_empty());
    }

    #[test]
    fn new_object_lands_in_front_of_the_camera() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        fixture.engine.execute(EditorCommand::NewObject);
        let transform = fixture.engine.session().transform().unwrap();
        // Default camera sits at z = 3 looking down -Z.
        assert!((transform.position - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-4);
        assert!((transform.scale - 1.0).abs() < 1e-4);
    }

    #[test]
    fn background_click_commits_the_new_object() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        fixture.engine.execute(EditorCommand::NewObject);
        fixture.frame();
        click(&mut fixture.engine, 1.0, 1.0);

        assert_eq!(fixture.engine.session().state(), SessionState::Empty);
        assert_eq!(fixture.engine.store().len(), 1);

        // The committed object is now pickable as a stored object.
        fixture.frame();
        click(&mut fixture.engine, CENTER, CENTER);
        assert_eq!(fixture.engine.session().state(), SessionState::Editing);
        assert!(fixture.engine.store().is_empty());
    }

    #[test]
    fn background_click_after_delete_stores_nothing() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        fixture.engine.execute(EditorCommand::NewObject);
        fixture.engine.execute(EditorCommand::DeleteObject);
        fixture.frame();
        assert_eq!(fixture.engine.session().state(), SessionState::Empty);

        click(&mut fixture.engine, 1.0, 1.0);
        assert!(fixture.engine.store().is_empty());
    }

    #[test]
    fn click_outside_viewport_counts_as_background() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        fixture.engine.execute(EditorCommand::NewObject);
        fixture.frame();
        click(&mut fixture.engine, -5.0, CENTER);
        assert_eq!(fixture.engine.store().len(), 1);
    }

    #[test]
    fn edit_active_clamps_to_panel_ranges() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        assert!(!fixture.engine.edit_active(|t| t.scale = 2.0));

        fixture.engine.execute(EditorCommand::NewObject);
        assert!(fixture.engine.edit_active(|t| t.scale = 10.0));
        let transform = fixture.engine.session().transform().unwrap();
        assert!((transform.scale - 2.5).abs() < 1e-6);
    }

    #[test]
    fn key_release_triggers_new_object_and_exit() {
        let Some(mut fixture) = fixture(false) else {
            return;
        };
        let key = |code: &str, pressed| InputEvent::Key {
            code: code.into(),
            pressed,
        };
        assert_eq!(fixture.engine.handle_input(key("KeyN", true)), None);
        assert_eq!(
            fixture.engine.handle_input(key("KeyN", false)),
            Some(EditorCommand::NewObject)
        );
        assert!(fixture.engine.session().is_open());

        let _ = fixture.engine.handle_input(key("Escape", true));
        let _ = fixture.engine.handle_input(key("Escape", false));
        assert!(fixture.engine.exit_requested());
    }

    #[test]
    fn shader_reload_keeps_rendering() {
        let Some(mut fixture) = fixture(true) else {
            return;
        };
        fixture.engine.execute(EditorCommand::ReloadShaders);
        fixture.frame();
        click(&mut fixture.engine, CENTER, CENTER);
        assert_eq!(fixture.engine.session().state(), SessionState::Editing);
    }

    #[test]
    fn resize_rebuilds_the_picking_target() {
        let Some(mut fixture) = fixture(true) else {
            return;
        };
        fixture.engine.resize(0, 0);
        assert_eq!(fixture.engine.context().width(), SIZE);

        fixture.engine.resize(SIZE, SIZE);
        fixture.frame();
        click(&mut fixture.engine, CENTER, CENTER);
        assert_eq!(fixture.engine.session().state(), SessionState::Editing);
    }
}
