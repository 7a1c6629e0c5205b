//! Per-scene pass chains.
//!
//! Every scene renders through a small linear graph: a composite pass that
//! draws the scene's drawables, optionally followed by the CRT pass that
//! reads the composite and writes the screen.
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐
//! │  MeshNode   │───▶│   CrtNode   │───▶ Screen
//! │ (composite) │    │ (optional)  │
//! └─────────────┘    └─────────────┘
//!       │
//!       ▼
//!   Target A
//! ```

mod crt_node;
mod graph;
mod mesh_node;
mod render_node;
mod render_target;

pub use crt_node::CrtNode;
pub use graph::{RenderGraph, RenderGraphBuilder};
pub use mesh_node::{MeshLibrary, MeshNode};
pub use render_node::RenderNode;
pub use render_target::{RenderContext, RenderTarget};
