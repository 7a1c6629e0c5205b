//! The core render node trait for the render graph.

use crate::gpu::GpuContext;
use crate::render_graph::RenderContext;

/// One pass of a scene's post-processing chain.
///
/// Each node receives the previous pass's output (if any) and writes to
/// `target`, which is either an intermediate buffer or the surface.
pub trait RenderNode {
    /// Records this node's passes into `ctx.encoder`.
    ///
    /// `input` is `None` for the first node in the graph.
    fn execute(
        &self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        input: Option<&wgpu::TextureView>,
    );

    /// Called once per frame before `execute()`, e.g. to follow a resize.
    fn prepare(&mut self, _gpu: &GpuContext) {}

    /// Frees this node's GPU buffers and textures.
    fn release(&self) {}
}
