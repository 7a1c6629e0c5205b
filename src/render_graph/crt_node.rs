//! CRT emulation as the final node of a scene's chain.

use crate::crt::CrtPass;
use crate::gpu::GpuContext;
use crate::render_graph::{RenderContext, RenderNode};

/// Runs [`CrtPass`] over the composited frame using the context's effect.
pub struct CrtNode {
    pass: CrtPass,
}

impl CrtNode {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            pass: CrtPass::new(gpu),
        }
    }
}

impl RenderNode for CrtNode {
    fn execute(
        &self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        input: Option<&wgpu::TextureView>,
    ) {
        let (Some(input), Some(params)) = (input, ctx.effect) else {
            log::warn!("CRT node needs a composited input and effect parameters; skipped");
            return;
        };

        let mut render_pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("CRT Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.pass.render(ctx.gpu, &mut render_pass, params, input);
    }

    fn release(&self) {
        self.pass.destroy();
    }
}
