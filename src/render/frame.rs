use std::path::Path;

use crate::foundation::core::Canvas;
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::foundation::math::Fnv1a64;

/// Decoded still image the clip is synthesized from.
///
/// RGB8, tightly packed, row-major. Never mutated after construction; every frame starts as a
/// copy of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SourceImage {
    /// Wrap an RGB8 buffer.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> StillmotionResult<Self> {
        if width == 0 || height == 0 {
            return Err(StillmotionError::configuration(
                "source image width/height must be non-zero",
            ));
        }
        let expected = Canvas { width, height }.rgb8_len();
        if data.len() != expected {
            return Err(StillmotionError::configuration(format!(
                "source image buffer size mismatch: got {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid-color image, mostly useful for tests and previews.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> StillmotionResult<Self> {
        let len = Canvas { width, height }.pixel_count();
        Self::from_rgb8(width, height, rgb.repeat(len))
    }

    /// Decode an already loaded `image` buffer.
    pub fn from_dynamic(img: image::DynamicImage) -> StillmotionResult<Self> {
        let rgb = img.into_rgb8();
        let (width, height) = rgb.dimensions();
        Self::from_rgb8(width, height, rgb.into_raw())
    }

    /// Load and decode an image file.
    ///
    /// A missing path is [`StillmotionError::InputNotFound`]; anything that does not decode to
    /// a non-empty pixel buffer is [`StillmotionError::InvalidImage`].
    pub fn load(path: &Path) -> StillmotionResult<Self> {
        if !path.is_file() {
            return Err(StillmotionError::InputNotFound(path.to_path_buf()));
        }
        let img = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| StillmotionError::invalid_image(path, e.to_string()))?
            .decode()
            .map_err(|e| StillmotionError::invalid_image(path, e.to_string()))?;
        Self::from_dynamic(img).map_err(|e| StillmotionError::invalid_image(path, e.to_string()))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the RGB8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Stable content hash of dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        fingerprint_rgb8(self.width, self.height, &self.data)
    }

    pub(crate) fn to_frame(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
        }
    }
}

/// One rendered output frame as RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    /// Stable content hash of dimensions and pixels.
    pub fn fingerprint(&self) -> u64 {
        fingerprint_rgb8(self.width, self.height, &self.data)
    }

    /// Channel value at `(x, y, c)`, or `None` outside the frame.
    pub fn channel(&self, x: u32, y: u32, c: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || c >= 3 {
            return None;
        }
        self.data
            .get((y as usize * self.width as usize + x as usize) * 3 + c)
            .copied()
    }

    /// Mean channel value over the rectangle `[x, x+w) x [y, y+h)` clipped to the frame.
    ///
    /// Returns 0.0 for an empty rectangle.
    pub fn mean_in(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        let (x0, y0) = (x.min(x1), y.min(y1));
        let row_bytes = self.width as usize * 3;
        let mut sum = 0u64;
        let mut n = 0u64;
        for row in self.data.chunks_exact(row_bytes).take(y1 as usize).skip(y0 as usize) {
            let span = &row[x0 as usize * 3..x1 as usize * 3];
            sum += span.iter().map(|&v| u64::from(v)).sum::<u64>();
            n += span.len() as u64;
        }
        if n == 0 { 0.0 } else { sum as f64 / n as f64 }
    }

    /// Mean channel value over the whole frame.
    pub fn mean(&self) -> f64 {
        self.mean_in(0, 0, self.width, self.height)
    }

    /// Convert into an `image` buffer (e.g. to save a preview PNG).
    pub fn into_image(self) -> StillmotionResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| StillmotionError::configuration("frame buffer size mismatch"))
    }
}

fn fingerprint_rgb8(width: u32, height: u32, data: &[u8]) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(u64::from(width));
    h.write_u64(u64::from(height));
    h.write_bytes(data);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
