use crate::gpu::texture::DEPTH_FORMAT;

/// Depth state for the scene pass. Transparent pipelines test against the
/// depth buffer without writing it.
pub fn depth_stencil_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Single surface color target.
pub fn surface_target(
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

/// Fixed-function state that varies between the scene pipelines.
pub struct PipelineSpec<'a> {
    /// Debug label, also used for the layout.
    pub label: &'a str,
    /// Primitive topology.
    pub topology: wgpu::PrimitiveTopology,
    /// Face culling.
    pub cull_mode: Option<wgpu::Face>,
    /// Color blending, `None` for opaque.
    pub blend: Option<wgpu::BlendState>,
    /// Whether depth is written.
    pub depth_write: bool,
}

/// Create a `vs_main` / `fs_main` pipeline with one vertex buffer, one
/// surface target and depth testing.
pub fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    spec: &PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", spec.label)),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &surface_target(format, spec.blend),
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(depth_stencil_state(spec.depth_write)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
