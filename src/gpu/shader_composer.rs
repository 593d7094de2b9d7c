use std::borrow::Cow;
use std::path::{Path, PathBuf};

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::MboxError;

/// Top-level shaders the renderer builds pipelines from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Phong-lit geometry pass.
    Main,
    /// Integer id/type picking pass.
    Picking,
}

impl Shader {
    /// Every top-level shader, in pipeline creation order.
    pub const ALL: [Self; 2] = [Self::Main, Self::Picking];

    /// Path relative to the shader root.
    #[must_use]
    pub const fn file_path(self) -> &'static str {
        match self {
            Self::Main => "raster/main.wgsl",
            Self::Picking => "utility/picking.wgsl",
        }
    }

    const fn embedded(self) -> &'static str {
        match self {
            Self::Main => {
                include_str!("../../assets/shaders/raster/main.wgsl")
            }
            Self::Picking => {
                include_str!("../../assets/shaders/utility/picking.wgsl")
            }
        }
    }
}

/// Shared module definition: embedded source plus its path under the
/// shader root.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

// Registered in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/frame.wgsl"),
        file_path: "modules/frame.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/draw.wgsl"),
        file_path: "modules/draw.wgsl",
    },
];

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Sources come from the binary unless a shader directory is configured, in
/// which case every module and shader is read from disk on construction so
/// that a reload picks up edits.
pub struct ShaderComposer {
    composer: Composer,
    shader_dir: Option<PathBuf>,
}

impl ShaderComposer {
    /// Composer over the embedded shader sources.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if a shared module fails to
    /// register.
    pub fn new() -> Result<Self, MboxError> {
        Self::with_shader_dir(None)
    }

    /// Composer that reads sources from `shader_dir` when given.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if a module file cannot be read
    /// or fails to register.
    pub fn with_shader_dir(
        shader_dir: Option<&Path>,
    ) -> Result<Self, MboxError> {
        let mut this = Self {
            composer: Composer::default(),
            shader_dir: shader_dir.map(Path::to_path_buf),
        };

        for m in MODULES {
            let source = this.load(m.source, m.file_path)?;
            let _ = this
                .composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: &source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    MboxError::ShaderCompose(format!(
                        "module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(this)
    }

    fn load(
        &self,
        embedded: &'static str,
        file_path: &str,
    ) -> Result<Cow<'static, str>, MboxError> {
        match &self.shader_dir {
            None => Ok(Cow::Borrowed(embedded)),
            Some(dir) => {
                let path = dir.join(file_path);
                std::fs::read_to_string(&path).map(Cow::Owned).map_err(|e| {
                    MboxError::ShaderCompose(format!(
                        "reading {}: {e}",
                        path.display()
                    ))
                })
            }
        }
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if the source cannot be read or
    /// composed.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, MboxError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.file_path()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose `shader` into a `naga::Module` without touching a device.
    ///
    /// # Errors
    ///
    /// Returns [`MboxError::ShaderCompose`] if the source cannot be read or
    /// composed.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, MboxError> {
        let source = self.load(shader.embedded(), shader.file_path())?;
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: &source,
                file_path: shader.file_path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                MboxError::ShaderCompose(format!(
                    "'{}': {e}",
                    shader.file_path()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap_or_else(|e| {
                panic!("Shader '{}' failed: {e}", shader.file_path())
            });
            assert!(
                !module.entry_points.is_empty(),
                "Shader '{}' has no entry points",
                shader.file_path()
            );
        }
    }

    #[test]
    fn test_shader_dir_reads_from_disk() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
        let mut composer =
            ShaderComposer::with_shader_dir(Some(&dir)).unwrap();
        assert!(composer.compose_naga(Shader::Main).is_ok());
    }

    #[test]
    fn test_missing_shader_dir_is_an_error() {
        let dir = Path::new("/nonexistent/mbox-shaders");
        assert!(matches!(
            ShaderComposer::with_shader_dir(Some(dir)),
            Err(MboxError::ShaderCompose(_))
        ));
    }
}
