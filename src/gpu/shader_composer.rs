use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::NozzleError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared modules are registered at construction time. Consuming shaders
/// use `#import nozzle::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/camera.wgsl"),
        file_path: "modules/camera.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
];

/// Lit mesh shader.
pub const STANDARD_SHADER: (&str, &str) = (
    include_str!("../../assets/shaders/raster/standard.wgsl"),
    "raster/standard.wgsl",
);

/// Unlit line shader.
pub const LINE_SHADER: (&str, &str) = (
    include_str!("../../assets/shaders/raster/line.wgsl"),
    "raster/line.wgsl",
);

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`NozzleError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, NozzleError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    NozzleError::Shader(format!(
                        "failed to register shader module '{}': {e:?}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose a `(source, file_path)` pair into a `wgpu::ShaderModule`.
    ///
    /// # Errors
    ///
    /// Returns [`NozzleError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        (source, file_path): (&str, &str),
    ) -> Result<wgpu::ShaderModule, NozzleError> {
        let naga_module = self.compose_naga(source, file_path)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`NozzleError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, NozzleError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                NozzleError::Shader(format!(
                    "failed to compose shader '{file_path}': {e}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (source, file_path) in [STANDARD_SHADER, LINE_SHADER] {
            if let Err(e) = composer.compose_naga(source, file_path) {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn standard_shader_validates() {
        let mut composer = ShaderComposer::new().unwrap();
        let module = composer
            .compose_naga(STANDARD_SHADER.0, STANDARD_SHADER.1)
            .unwrap();
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        assert!(validator.validate(&module).is_ok());
        assert!(module.entry_points.iter().any(|e| e.name == "vs_main"));
        assert!(module.entry_points.iter().any(|e| e.name == "fs_main"));
    }
}
