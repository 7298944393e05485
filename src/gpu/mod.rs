//! wgpu plumbing: device setup, buffers, bind groups, lighting and WGSL
//! composition. Nothing here knows about the nozzle scene.

/// Buffers that grow when regenerated geometry no longer fits.
pub mod dynamic_buffer;
/// Lighting uniform at group 1.
pub mod lighting;
/// Single-uniform bind group helpers.
pub mod pipeline_helpers;
/// Adapter, device and surface.
pub mod render_context;
/// naga_oil composer for the crate's WGSL modules.
pub mod shader_composer;
/// Depth attachment.
pub mod texture;
