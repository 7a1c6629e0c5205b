//! Scene lifecycle: the registry, its render loop and the output backends.
//!
//! A scene is a camera, a drawable world and an output surface with its
//! post-processing chain, registered under a string identifier. Screens that
//! want a rendered background create one on entry and destroy it on exit:
//!
//! ```ignore
//! use scanline::scene::{HeadlessBackend, HeadlessContainer, SceneConfig, SceneRegistry};
//!
//! let mut scenes = SceneRegistry::new(HeadlessBackend::new());
//! scenes.create_scene("intro", SceneConfig::new(HeadlessContainer::new(1280, 720)).crt(0.8))?;
//! scenes.start_render_loop("intro", None)?;
//! // each display refresh:
//! scenes.dispatch_timers(now);
//! scenes.frame("intro", now);
//! // on teardown:
//! scenes.destroy_scene("intro");
//! ```
//!
//! [`GpuBackend`] draws into a winit window; [`HeadlessBackend`] keeps the
//! same contract without a device.

mod backend;
mod frame;
mod gpu_output;
mod headless;
mod registry;

use std::borrow::Borrow;
use std::fmt;

pub use backend::{Backend, PostConfig, SceneConfig, SceneOutput};
pub use frame::{FnHandler, FrameHandler, SceneFrame, frame_fn};
pub use gpu_output::{GpuBackend, GpuOutput};
pub use headless::{HeadlessBackend, HeadlessContainer, HeadlessOutput};
pub use registry::{FrameOutcome, MAX_CONSECUTIVE_FAILURES, Scene, SceneRegistry};

/// Unique identifier for a scene.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(String);

impl SceneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SceneId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for SceneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
