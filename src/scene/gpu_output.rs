//! wgpu-backed scene outputs drawing into winit windows.

use std::path::Path;
use std::sync::Arc;

use winit::window::Window;

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::{DrawItem, MeshId, TextureId};
use crate::error::{RenderError, SceneError};
use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;
use crate::render_graph::{CrtNode, MeshLibrary, MeshNode, RenderGraph};
use crate::scene::{Backend, PostConfig, SceneOutput};
use crate::texture::Texture;

/// Creates one device and surface per scene on the given window.
#[derive(Debug, Default)]
pub struct GpuBackend;

impl GpuBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for GpuBackend {
    type Container = Arc<Window>;
    type Output = GpuOutput;

    fn viewport(&self, window: &Arc<Window>) -> Option<(u32, u32)> {
        let size = window.inner_size();
        (size.width > 0 && size.height > 0).then_some((size.width, size.height))
    }

    fn create_output(
        &mut self,
        window: &Arc<Window>,
        (width, height): (u32, u32),
        post: PostConfig,
    ) -> Result<GpuOutput, SceneError> {
        let gpu = GpuContext::new(window.clone(), width, height)?;

        let graph = RenderGraph::builder()
            .node(MeshNode::new(&gpu))
            .node_if(post.enabled, || CrtNode::new(&gpu))
            .build(&gpu);

        let effect = post.enabled.then(|| {
            let params = CrtParams::new();
            match post.intensity {
                Some(i) => params.with_intensity(i),
                None => params,
            }
        });

        Ok(GpuOutput {
            window: window.clone(),
            state: Some(GpuState {
                gpu,
                library: MeshLibrary::new(),
                graph,
            }),
            effect,
        })
    }
}

struct GpuState {
    gpu: GpuContext,
    library: MeshLibrary,
    graph: RenderGraph,
}

/// A surface on a window plus the scene's pass chain and uploaded resources.
///
/// After [`release`](SceneOutput::release) the output holds no GPU objects
/// and every render reports [`RenderError::Released`].
pub struct GpuOutput {
    window: Arc<Window>,
    state: Option<GpuState>,
    effect: Option<CrtParams>,
}

impl GpuOutput {
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }
}

impl SceneOutput for GpuOutput {
    fn size(&self) -> (u32, u32) {
        match &self.state {
            Some(state) => (state.gpu.width(), state.gpu.height()),
            None => (0, 0),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Intermediate targets and depth follow on the next frame.
        if let Some(state) = self.state.as_mut() {
            state.gpu.resize(width, height);
        }
    }

    fn effect(&self) -> Option<&CrtParams> {
        self.effect.as_ref()
    }

    fn effect_mut(&mut self) -> Option<&mut CrtParams> {
        self.effect.as_mut()
    }

    fn upload_mesh(&mut self, geometry: &RawGeometry) -> MeshId {
        match self.state.as_mut() {
            Some(state) => {
                let mesh = geometry.upload(&state.gpu);
                state.library.add_mesh(mesh)
            }
            None => {
                log::warn!("mesh upload after release ignored");
                MeshId(usize::MAX)
            }
        }
    }

    fn load_texture(&mut self, path: &Path) -> TextureId {
        match self.state.as_mut() {
            Some(state) => {
                let (texture, _) = Texture::load_or_placeholder(&state.gpu, path);
                state.library.add_texture(texture)
            }
            None => {
                log::warn!("texture load after release ignored");
                TextureId(usize::MAX)
            }
        }
    }

    fn render(&mut self, dt: f32, camera: &Camera, draws: &[DrawItem]) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::Released)?;
        if let Some(effect) = self.effect.as_mut() {
            effect.advance(dt);
        }
        state.graph.execute(
            &state.gpu,
            camera,
            &state.library,
            draws,
            self.effect.as_ref(),
        )
    }

    fn release(&mut self) {
        if let Some(mut state) = self.state.take() {
            state.graph.release();
            state.library.destroy();
            log::debug!("released GPU resources");
        }
    }
}

impl Drop for GpuOutput {
    fn drop(&mut self) {
        self.release();
    }
}
