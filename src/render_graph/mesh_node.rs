//! The composite node and the per-scene store of uploaded meshes and textures.

use crate::drawable::{MeshId, TextureId};
use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::mesh_pass::{DrawCall, MeshPass};
use crate::render_graph::{RenderContext, RenderNode};
use crate::texture::Texture;

/// Meshes and textures owned by one scene's output, addressed by handle.
#[derive(Default)]
pub struct MeshLibrary {
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    /// Destroys every buffer and texture and empties the library.
    pub fn destroy(&mut self) {
        for mesh in self.meshes.drain(..) {
            mesh.destroy();
        }
        for texture in self.textures.drain(..) {
            texture.destroy();
        }
    }
}

/// Clears to black and draws the frame's resolved drawables with depth.
pub struct MeshNode {
    pass: MeshPass,
}

impl MeshNode {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            pass: MeshPass::new(gpu),
        }
    }
}

impl RenderNode for MeshNode {
    fn execute(
        &self,
        ctx: &mut RenderContext,
        target: &wgpu::TextureView,
        _input: Option<&wgpu::TextureView>,
    ) {
        let library = ctx.library;
        let draw_calls: Vec<DrawCall> = ctx
            .draws
            .iter()
            .filter_map(|item| {
                library.mesh(item.mesh).map(|mesh| DrawCall {
                    mesh,
                    model: item.model,
                    color: item.color,
                    texture: item.texture.and_then(|t| library.texture(t)),
                })
            })
            .collect();
        if draw_calls.len() < ctx.draws.len() {
            log::trace!(
                "{} draws reference unknown meshes",
                ctx.draws.len() - draw_calls.len()
            );
        }

        let time = ctx.effect.map_or(0.0, |e| e.time());
        let mut render_pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mesh Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.pass.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.pass
            .render(ctx.gpu, &mut render_pass, ctx.camera, time, &draw_calls);
    }

    fn prepare(&mut self, gpu: &GpuContext) {
        self.pass.ensure_depth_size(gpu);
    }

    fn release(&self) {
        self.pass.destroy();
    }
}
