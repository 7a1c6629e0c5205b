//! Texture loading with a placeholder fallback.
//!
//! Image decoding can fail at any point during a timed sequence. Loading goes
//! through [`Texture::load_or_placeholder`], which logs the failure and
//! substitutes a checkerboard so the schedule never waits on I/O.

use std::path::Path;

use crate::error::TextureError;
use crate::gpu::GpuContext;

/// Edge length of the generated placeholder.
pub const PLACEHOLDER_SIZE: u32 = 8;

#[derive(Debug)]
pub struct Texture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    pub fn from_file(gpu: &GpuContext, path: &Path) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(
            gpu,
            &img,
            width,
            height,
            &path.display().to_string(),
        ))
    }

    pub fn placeholder(gpu: &GpuContext) -> Self {
        let data = placeholder_pixels(PLACEHOLDER_SIZE);
        Self::from_rgba(
            gpu,
            &data,
            PLACEHOLDER_SIZE,
            PLACEHOLDER_SIZE,
            "Placeholder Texture",
        )
    }

    /// Loads `path`, falling back to [`Texture::placeholder`]. The flag is
    /// `true` when the fallback was used.
    pub fn load_or_placeholder(gpu: &GpuContext, path: &Path) -> (Self, bool) {
        match Self::from_file(gpu, path) {
            Ok(texture) => (texture, false),
            Err(e) => {
                log::warn!("{e}; using placeholder");
                (Self::placeholder(gpu), true)
            }
        }
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Two-tone checkerboard, 2x2 pixel cells, RGBA8.
pub fn placeholder_pixels(size: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / 2) + (y / 2)) % 2 == 0;
            let rgba = if on {
                [255, 0, 255, 255]
            } else {
                [24, 24, 24, 255]
            };
            data.extend_from_slice(&rgba);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_a_checkerboard() {
        let px = placeholder_pixels(4);
        assert_eq!(px.len(), 4 * 4 * 4);
        let at = |x: usize, y: usize| &px[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(0, 0), at(1, 1));
        assert_ne!(at(0, 0), at(2, 0));
        assert_eq!(at(2, 0), at(0, 2));
        assert!(px.chunks(4).all(|p| p[3] == 255));
    }
}
