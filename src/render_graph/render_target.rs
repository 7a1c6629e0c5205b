//! Render targets and execution context for the render graph.

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::DrawItem;
use crate::gpu::GpuContext;
use crate::render_graph::MeshLibrary;

/// An off-screen color buffer written by one pass and sampled by the next.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Creates a target matching the surface's size and format.
    pub fn new(gpu: &GpuContext, label: &str) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: gpu.width(),
            height: gpu.height(),
        }
    }

    /// Recreates the target if the surface size changed.
    pub fn ensure_size(&mut self, gpu: &GpuContext, label: &str) {
        if self.width != gpu.width() || self.height != gpu.height() {
            self.texture.destroy();
            *self = Self::new(gpu, label);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Everything a node needs for one frame.
pub struct RenderContext<'a> {
    pub gpu: &'a GpuContext,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub camera: &'a Camera,
    /// GPU resources the draws refer to.
    pub library: &'a MeshLibrary,
    pub draws: &'a [DrawItem],
    /// CRT parameters, already advanced for this frame.
    pub effect: Option<&'a CrtParams>,
}
