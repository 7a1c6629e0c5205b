//! # Scanline
//!
//! **Scripted intro screens with a CRT look, on wgpu.**
//!
//! A [`SceneRegistry`] owns every rendered background by name: camera, a
//! drawable world and an output surface whose pass chain ends in a CRT
//! emulation pass. The [`PhaseSequencer`] plays a fixed, timer-driven intro
//! on one of those scenes and asks the host to navigate when it is done.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), scanline::AppError> {
//!     env_logger::init();
//!     scanline::run(scanline::AppConfig::from_env())
//! }
//! ```
//!
//! Screens that only need a background can drive a registry directly:
//!
//! ```
//! use std::time::Instant;
//! use scanline::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};
//!
//! let mut scenes = SceneRegistry::new(HeadlessBackend::new());
//! scenes.create_scene("home", SceneConfig::new(HeadlessContainer::new(640, 480)).crt(0.5))?;
//! scenes.start_render_loop("home", None)?;
//! scenes.frame("home", Instant::now());
//! scenes.destroy_scene("home");
//! # Ok::<(), scanline::SceneError>(())
//! ```

mod app;
mod camera;
mod color;
mod config;
pub mod crt;
mod drawable;
mod error;
mod geometry;
mod gpu;
pub mod host;
mod mesh;
mod mesh_pass;
pub mod render_graph;
mod schedule;
pub mod scene;
pub mod sequence;
mod texture;

pub use app::{HOME_ROUTE, HOME_SCENE, INTRO_SCENE, run};
pub use camera::Camera;
pub use color::Color;
pub use config::{AppConfig, SequenceConfig, SequenceTimings};
pub use crt::{CrtField, CrtParams};
pub use drawable::{
    DrawItem, DrawableGroup, Drawables, FillBar, GroupId, MeshId, Primitive, Reveal, Spin,
    Stretch, TextureId,
};
pub use error::{AppError, FrameError, HostError, RenderError, SceneError, TextureError};
pub use geometry::RawGeometry;
pub use gpu::GpuContext;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use mesh_pass::MeshPass;
pub use scene::{FrameHandler, SceneFrame, SceneRegistry};
pub use schedule::{Liveness, Scheduler, TimerId};
pub use sequence::{Phase, PhaseSequencer};
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
