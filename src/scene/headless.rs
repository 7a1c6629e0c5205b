//! Device-free backend.
//!
//! Keeps the whole scene contract (sizes, effect clock, uploads, release)
//! without a GPU. Used by tests and for dry runs of a sequence.

use std::collections::VecDeque;
use std::path::Path;

use crate::camera::Camera;
use crate::crt::CrtParams;
use crate::drawable::{DrawItem, MeshId, TextureId};
use crate::error::{RenderError, SceneError};
use crate::geometry::RawGeometry;
use crate::scene::{Backend, PostConfig, SceneOutput};

/// Stand-in for a window: a size and whether it is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadlessContainer {
    pub width: u32,
    pub height: u32,
    pub attached: bool,
}

impl HeadlessContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attached: true,
        }
    }

    pub fn detached() -> Self {
        Self {
            width: 0,
            height: 0,
            attached: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    created: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs created so far.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl Backend for HeadlessBackend {
    type Container = HeadlessContainer;
    type Output = HeadlessOutput;

    fn viewport(&self, container: &HeadlessContainer) -> Option<(u32, u32)> {
        (container.attached && container.width > 0 && container.height > 0)
            .then_some((container.width, container.height))
    }

    fn create_output(
        &mut self,
        container: &HeadlessContainer,
        size: (u32, u32),
        post: PostConfig,
    ) -> Result<HeadlessOutput, SceneError> {
        if !container.attached {
            return Err(SceneError::DetachedContainer);
        }
        self.created += 1;
        let effect = post.enabled.then(|| {
            let params = CrtParams::new();
            match post.intensity {
                Some(i) => params.with_intensity(i),
                None => params,
            }
        });
        Ok(HeadlessOutput {
            size,
            effect,
            meshes: 0,
            textures: 0,
            frames: 0,
            last_draws: 0,
            released: false,
            failures: VecDeque::new(),
        })
    }
}

#[derive(Debug)]
pub struct HeadlessOutput {
    size: (u32, u32),
    effect: Option<CrtParams>,
    meshes: usize,
    textures: usize,
    frames: u64,
    last_draws: usize,
    released: bool,
    failures: VecDeque<RenderError>,
}

impl HeadlessOutput {
    /// Frames successfully presented.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draw count of the last presented frame.
    pub fn last_draws(&self) -> usize {
        self.last_draws
    }

    pub fn meshes(&self) -> usize {
        self.meshes
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Makes the next `render` calls fail with these errors, in order.
    pub fn fail_next(&mut self, errors: impl IntoIterator<Item = RenderError>) {
        self.failures.extend(errors);
    }
}

impl SceneOutput for HeadlessOutput {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
        }
    }

    fn effect(&self) -> Option<&CrtParams> {
        self.effect.as_ref()
    }

    fn effect_mut(&mut self) -> Option<&mut CrtParams> {
        self.effect.as_mut()
    }

    fn upload_mesh(&mut self, _geometry: &RawGeometry) -> MeshId {
        self.meshes += 1;
        MeshId(self.meshes - 1)
    }

    fn load_texture(&mut self, path: &Path) -> TextureId {
        if !path.exists() {
            log::warn!("{} not found; using placeholder", path.display());
        }
        self.textures += 1;
        TextureId(self.textures - 1)
    }

    fn render(&mut self, dt: f32, _camera: &Camera, draws: &[DrawItem]) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if let Some(effect) = self.effect.as_mut() {
            effect.advance(dt);
        }
        if let Some(err) = self.failures.pop_front() {
            return Err(err);
        }
        self.frames += 1;
        self.last_draws = draws.len();
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
