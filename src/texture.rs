//! Surface texture decoding, CPU sphere shading, and HTTP fetching with a
//! disk cache.

use crate::error::TextureError;
use egui::Color32;
use nalgebra::{Matrix3, Vector3};
use std::f64::consts::PI;
use std::path::PathBuf;

/// Decoded images wider than this are box-filtered down on load.
const MAX_TEXTURE_WIDTH: u32 = 1024;
const AMBIENT: f64 = 0.35;

#[derive(Clone, Debug)]
pub struct SurfaceTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

/// How a sphere sprite is lit.
#[derive(Clone, Copy, Debug)]
pub enum Shading {
    /// Self-lit, drawn at full brightness (the sun).
    Emissive,
    /// Lambert term towards `light`, given in view space.
    Lit { light: Vector3<f64> },
}

impl SurfaceTexture {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        use std::io::Cursor;
        let mut reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        reader.no_limits();
        let img = reader.decode()?.to_rgb8();
        let width = img.width();
        let height = img.height();
        let pixels: Vec<[u8; 3]> = img.pixels().map(|p| p.0).collect();
        let texture = Self { width, height, pixels };
        let factor = texture.width.div_ceil(MAX_TEXTURE_WIDTH);
        Ok(texture.downscale(factor))
    }

    /// A 1x1 texture: every lookup returns `color`.
    pub fn solid(color: Color32) -> Self {
        Self { width: 1, height: 1, pixels: vec![[color.r(), color.g(), color.b()]] }
    }

    pub fn downscale(&self, factor: u32) -> Self {
        if factor <= 1 || self.width < factor || self.height < factor {
            return self.clone();
        }
        let new_width = self.width / factor;
        let new_height = self.height / factor;
        let mut pixels = Vec::with_capacity((new_width * new_height) as usize);

        for y in 0..new_height {
            for x in 0..new_width {
                let mut sum = [0u32; 3];
                for dy in 0..factor {
                    for dx in 0..factor {
                        let idx = ((y * factor + dy) * self.width + x * factor + dx) as usize;
                        for (acc, c) in sum.iter_mut().zip(self.pixels[idx]) {
                            *acc += c as u32;
                        }
                    }
                }
                let count = factor * factor;
                pixels.push(sum.map(|s| (s / count) as u8));
            }
        }
        Self { width: new_width, height: new_height, pixels }
    }

    pub fn sample(&self, u: f64, v: f64) -> [u8; 3] {
        let x = ((u * self.width as f64) as u32).min(self.width - 1);
        let y = ((v * self.height as f64) as u32).min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Render the texture wrapped on a sphere seen through `rot` (object to
    /// view space), into a `size`x`size` image with a transparent background.
    pub fn render_sphere(&self, size: usize, rot: &Matrix3<f64>, shading: Shading) -> egui::ColorImage {
        let mut pixels = vec![Color32::TRANSPARENT; size * size];
        let center = size as f64 / 2.0;
        let radius = center;
        let inv_rot = rot.transpose();

        for py in 0..size {
            for px in 0..size {
                let dx = px as f64 + 0.5 - center;
                let dy = py as f64 + 0.5 - center;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq >= radius * radius {
                    continue;
                }
                let normal = Vector3::new(dx / radius, -dy / radius, (radius * radius - dist_sq).sqrt() / radius);

                let v = inv_rot * normal;
                let lat = v.y.clamp(-1.0, 1.0).asin();
                let lon = (-v.z).atan2(v.x);
                let u = (lon + PI) / (2.0 * PI);
                let vt = (PI / 2.0 - lat) / PI;

                let shade = match shading {
                    Shading::Emissive => 1.0,
                    Shading::Lit { light } => AMBIENT + (1.0 - AMBIENT) * normal.dot(&light).max(0.0),
                } as f32;
                let [r, g, b] = self.sample(u, vt);
                pixels[py * size + px] = Color32::from_rgb(
                    (r as f32 * shade) as u8,
                    (g as f32 * shade) as u8,
                    (b as f32 * shade) as u8,
                );
            }
        }

        egui::ColorImage {
            size: [size, size],
            pixels,
            source_size: egui::Vec2::ZERO,
        }
    }
}

/// Source of surface textures. Implementations block; callers run them off
/// the UI thread.
pub trait TextureFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<SurfaceTexture, TextureError>;
}

/// Fetches over HTTP and keeps the raw bytes in the user cache directory.
pub struct HttpFetcher {
    cache_dir: Option<PathBuf>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir().map(|d| d.join("solar-viz").join("textures"));
        Self { cache_dir }
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        url.hash(&mut hasher);
        self.cache_dir.as_ref().map(|d| d.join(format!("{:016x}.img", hasher.finish())))
    }

    fn download(url: &str) -> Result<Vec<u8>, TextureError> {
        let fetch_err = |reason: String| TextureError::Fetch { url: url.to_string(), reason };
        let resp = ureq::get(url).call().map_err(|e| fetch_err(e.to_string()))?;
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut resp.into_reader(), &mut bytes)?;
        Ok(bytes)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<SurfaceTexture, TextureError> {
        let cache_path = self.cache_path(url);
        if let Some(path) = cache_path.as_ref().filter(|p| p.exists()) {
            match std::fs::read(path).map_err(TextureError::from).and_then(|b| SurfaceTexture::from_bytes(&b)) {
                Ok(texture) => return Ok(texture),
                Err(e) => log::debug!("ignoring cached texture {}: {e}", path.display()),
            }
        }

        let bytes = Self::download(url)?;
        let texture = SurfaceTexture::from_bytes(&bytes)?;
        if let Some(path) = cache_path {
            let written = path
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|_| std::fs::write(&path, &bytes));
            if let Err(e) = written {
                log::debug!("could not cache {url}: {e}");
            }
        }
        Ok(texture)
    }
}
