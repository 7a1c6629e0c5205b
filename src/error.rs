//! Error types shared across the crate.
//!
//! Scene creation failures are returned to the caller and leave the registry
//! untouched. Render failures are classified so the render loop can decide
//! between retrying on the next tick and marking a scene inert.

use std::path::PathBuf;

use crate::scene::SceneId;

/// Failure to create or address a scene.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("output container is detached or has no drawable area")]
    DetachedContainer,

    #[error("the adapter supports no format for this surface")]
    UnsupportedSurface,

    #[error("invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("no scene registered as '{0}'")]
    UnknownScene(SceneId),

    #[error("scene '{0}' already has a running render loop")]
    LoopAlreadyRunning(SceneId),

    #[error("scene '{0}' lost its output and is inert")]
    SceneInert(SceneId),
}

/// Failure while compositing or presenting a frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("timed out acquiring the next surface texture")]
    Timeout,

    #[error("surface is outdated")]
    Outdated,

    #[error("surface was lost")]
    Lost,

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("output has been released")]
    Released,

    #[error("render failed: {0}")]
    Other(String),
}

impl RenderError {
    /// Whether retrying on the next frame cannot help.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RenderError::OutOfMemory | RenderError::Released | RenderError::Other(_)
        )
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        match e {
            wgpu::SurfaceError::Timeout => RenderError::Timeout,
            wgpu::SurfaceError::Outdated => RenderError::Outdated,
            wgpu::SurfaceError::Lost => RenderError::Lost,
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }
}

/// Error reported by a per-frame or timer handler.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("frame handler failed: {0}")]
    Handler(String),
}

/// Failure of an external collaborator call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("navigation to '{route}' failed: {reason}")]
    Navigation { route: String, reason: String },

    #[error("audio cue '{clip}' failed: {reason}")]
    Audio { clip: String, reason: String },

    #[error("device command '{command}' failed: {reason}")]
    Device { command: String, reason: String },
}

/// Failure that ends the application.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to open window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Failure to decode an image into a texture.
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to load '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_render_errors() {
        assert!(!RenderError::Timeout.is_fatal());
        assert!(!RenderError::Outdated.is_fatal());
        assert!(!RenderError::Lost.is_fatal());
        assert!(RenderError::OutOfMemory.is_fatal());
        assert!(RenderError::Other("driver reset".into()).is_fatal());
    }

    #[test]
    fn surface_format_mismatch_is_not_a_detached_container() {
        let unsupported = SceneError::UnsupportedSurface.to_string();
        assert!(unsupported.contains("format"));
        assert_ne!(unsupported, SceneError::DetachedContainer.to_string());
    }

    #[test]
    fn host_error_messages_name_the_call() {
        let err = HostError::Device {
            command: "set_brightness".into(),
            reason: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "device command 'set_brightness' failed: permission denied"
        );
    }
}
