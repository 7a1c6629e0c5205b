//! The render graph and its builder.

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::DrawItem;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::render_graph::{MeshLibrary, RenderContext, RenderNode, RenderTarget};

const TARGET_A: &str = "RenderGraph Target A";
const TARGET_B: &str = "RenderGraph Target B";

/// Builder for a scene's pass chain. Nodes execute in insertion order.
///
/// ```ignore
/// let graph = RenderGraph::builder()
///     .node(MeshNode::new(&gpu))   // composite drawables
///     .node(CrtNode::new(&gpu))    // CRT emulation to the screen
///     .build(&gpu);
/// ```
pub struct RenderGraphBuilder {
    nodes: Vec<Box<dyn RenderNode>>,
}

impl RenderGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn node<N: RenderNode + 'static>(mut self, node: N) -> Self {
        self.nodes.push(Box::new(node));
        self
    }

    /// Adds `node` only when `enabled` is set.
    pub fn node_if<N: RenderNode + 'static>(self, enabled: bool, node: impl FnOnce() -> N) -> Self {
        if enabled { self.node(node()) } else { self }
    }

    /// Allocates the ping-pong buffers at the current surface size.
    pub fn build(self, gpu: &GpuContext) -> RenderGraph {
        RenderGraph {
            nodes: self.nodes,
            target_a: RenderTarget::new(gpu, TARGET_A),
            target_b: RenderTarget::new(gpu, TARGET_B),
        }
    }
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A linear chain of passes with ping-pong intermediate buffers.
///
/// ```text
/// Pass 0: None     -> Target A
/// Pass 1: Target A -> Target B
/// Pass 2: Target B -> Screen
/// ```
///
/// A single-node graph renders straight to the screen.
pub struct RenderGraph {
    nodes: Vec<Box<dyn RenderNode>>,
    target_a: RenderTarget,
    target_b: RenderTarget,
}

impl RenderGraph {
    pub fn builder() -> RenderGraphBuilder {
        RenderGraphBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runs every node and presents.
    ///
    /// Fails without presenting when the surface frame cannot be acquired.
    pub fn execute(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        library: &MeshLibrary,
        draws: &[DrawItem],
        effect: Option<&CrtParams>,
    ) -> Result<(), RenderError> {
        if self.nodes.is_empty() {
            return Ok(());
        }
        for node in &mut self.nodes {
            node.prepare(gpu);
        }
        self.target_a.ensure_size(gpu, TARGET_A);
        self.target_b.ensure_size(gpu, TARGET_B);

        let output = gpu.acquire()?;
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("RenderGraph Encoder"),
            });

        {
            let mut ctx = RenderContext {
                gpu,
                encoder: &mut encoder,
                camera,
                library,
                draws,
                effect,
            };

            let node_count = self.nodes.len();
            let mut current_input: Option<&wgpu::TextureView> = None;
            for (i, node) in self.nodes.iter().enumerate() {
                let is_last = i == node_count - 1;
                let target = if is_last {
                    &screen_view
                } else if i % 2 == 0 {
                    &self.target_a.view
                } else {
                    &self.target_b.view
                };

                node.execute(&mut ctx, target, current_input);

                if !is_last {
                    current_input = Some(target);
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Frees every node's resources and the intermediate buffers.
    pub fn release(&self) {
        for node in &self.nodes {
            node.release();
        }
        self.target_a.destroy();
        self.target_b.destroy();
    }
}
