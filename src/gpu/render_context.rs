use std::fmt;

/// Why the GPU context could not be created.
#[derive(Debug)]
pub enum RenderContextError {
    /// The window handle could not back a surface.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No adapter can present to the surface.
    AdapterRequest(wgpu::RequestAdapterError),
    /// The adapter refused the device descriptor.
    DeviceRequest(wgpu::RequestDeviceError),
    /// The adapter reports no usable surface configuration.
    UnsupportedSurface,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceCreation(e) => write!(f, "cannot create surface: {e}"),
            Self::AdapterRequest(e) => write!(f, "cannot find adapter: {e}"),
            Self::DeviceRequest(e) => write!(f, "cannot open device: {e}"),
            Self::UnsupportedSurface => {
                f.write_str("adapter cannot present to this surface")
            }
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SurfaceCreation(e) => Some(e),
            Self::AdapterRequest(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
            Self::UnsupportedSurface => None,
        }
    }
}

/// Prefer an sRGB format so blending and lighting happen in linear space.
/// Falls back to `fallback` when the surface offers none.
pub(crate) fn pick_surface_format(
    offered: &[wgpu::TextureFormat],
    fallback: wgpu::TextureFormat,
) -> wgpu::TextureFormat {
    offered
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .unwrap_or(fallback)
}

/// Device, queue and window surface shared by every GPU component.
pub struct RenderContext {
    /// Logical device.
    pub device: wgpu::Device,
    /// Command queue.
    pub queue: wgpu::Queue,
    /// Swapchain surface of the viewer window.
    pub surface: wgpu::Surface<'static>,
    /// Active surface configuration.
    pub config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    /// Open a device that can present to `window`, sized `initial_size`.
    ///
    /// # Errors
    ///
    /// Any [`RenderContextError`] stage that fails, in order: surface,
    /// adapter, device, surface configuration.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        initial_size: (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(RenderContextError::SurfaceCreation)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::AdapterRequest)?;
        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let descriptor = wgpu::DeviceDescriptor {
            label: Some("nozzle device"),
            ..Default::default()
        };
        let (device, queue) = adapter
            .request_device(&descriptor)
            .await
            .map_err(RenderContextError::DeviceRequest)?;

        let (width, height) = (initial_size.0.max(1), initial_size.1.max(1));
        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or(RenderContextError::UnsupportedSurface)?;
        config.format = pick_surface_format(
            &surface.get_capabilities(&adapter).formats,
            config.format,
        );
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);
        log::debug!("surface {width}x{height} {:?}", config.format);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    /// Swapchain format; pipelines target this.
    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current `(width, height)` in physical pixels.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure for a new window size. Zero extents (minimized
    /// windows) keep the previous configuration.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain image.
    ///
    /// # Errors
    ///
    /// Whatever the surface reports; `Outdated` and `Lost` are recovered
    /// by resizing.
    pub fn acquire_frame(
        &self,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Record `record` into a fresh encoder and submit it.
    pub fn encode_and_submit(
        &self,
        label: &str,
        record: impl FnOnce(&mut wgpu::CommandEncoder),
    ) {
        let mut encoder =
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some(label),
                });
        record(&mut encoder);
        let _ = self.queue.submit([encoder.finish()]);
    }
}

#[cfg(test)]
mod tests {
    use wgpu::TextureFormat;

    use super::*;

    #[test]
    fn srgb_format_is_preferred() {
        let offered = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            pick_surface_format(&offered, TextureFormat::Bgra8Unorm),
            TextureFormat::Bgra8UnormSrgb
        );
    }

    #[test]
    fn fallback_without_srgb() {
        let offered = [TextureFormat::Rgba16Float];
        assert_eq!(
            pick_surface_format(&offered, TextureFormat::Rgba16Float),
            TextureFormat::Rgba16Float
        );
    }
}
