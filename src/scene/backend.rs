//! The seam between the registry and whatever actually draws a scene.

use std::path::Path;

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::{DrawItem, MeshId, TextureId};
use crate::error::{RenderError, SceneError};
use crate::geometry::RawGeometry;

/// Post-processing chain options for a new scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostConfig {
    /// Adds the CRT pass after the composite pass.
    pub enabled: bool,
    /// Initial CRT intensity. `None` keeps the effect defaults.
    pub intensity: Option<f32>,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: None,
        }
    }
}

/// Everything needed to create a scene.
#[derive(Clone, Debug)]
pub struct SceneConfig<C> {
    pub container: C,
    /// Explicit output size. Defaults to the container's viewport.
    pub size: Option<(u32, u32)>,
    pub post: PostConfig,
}

impl<C> SceneConfig<C> {
    pub fn new(container: C) -> Self {
        Self {
            container,
            size: None,
            post: PostConfig::default(),
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn crt(mut self, intensity: f32) -> Self {
        self.post = PostConfig {
            enabled: true,
            intensity: Some(intensity),
        };
        self
    }

    pub fn without_crt(mut self) -> Self {
        self.post.enabled = false;
        self
    }
}

/// A scene's output surface plus its post-processing chain.
pub trait SceneOutput {
    fn size(&self) -> (u32, u32);

    /// Resizes the surface and the chain's intermediate buffers.
    fn resize(&mut self, width: u32, height: u32);

    /// Parameters of the CRT pass, if the chain has one.
    fn effect(&self) -> Option<&CrtParams>;
    fn effect_mut(&mut self) -> Option<&mut CrtParams>;

    fn upload_mesh(&mut self, geometry: &RawGeometry) -> MeshId;

    /// Loads an image, substituting a placeholder on failure.
    fn load_texture(&mut self, path: &Path) -> TextureId;

    /// Composites `draws` and presents, advancing time-driven uniforms by `dt`.
    fn render(&mut self, dt: f32, camera: &Camera, draws: &[DrawItem]) -> Result<(), RenderError>;

    /// Frees GPU resources and detaches from the container. Idempotent.
    fn release(&mut self);
}

/// Creates outputs attached to host containers.
pub trait Backend {
    type Container;
    type Output: SceneOutput;

    /// Current drawable size of a container, `None` if it is detached.
    fn viewport(&self, container: &Self::Container) -> Option<(u32, u32)>;

    fn create_output(
        &mut self,
        container: &Self::Container,
        size: (u32, u32),
        post: PostConfig,
    ) -> Result<Self::Output, SceneError>;
}
