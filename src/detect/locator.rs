use crate::foundation::error::StillmotionResult;
use crate::render::frame::SourceImage;

/// Face region in source-image pixel coordinates.
///
/// Locators produce boxes inside the image; boxes built by hand may extend past the edges and
/// are clipped by [`FaceBox::clip_to`] wherever they are used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FaceBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl FaceBox {
    /// Create a box from its top-left corner and size.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Intersect with a `width` x `height` image. Returns `None` when nothing remains.
    pub fn clip_to(self, width: u32, height: u32) -> Option<FaceBox> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.w).min(width);
        let y1 = self.y.saturating_add(self.h).min(height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(FaceBox {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        })
    }

    /// Upper band of the box covering `floor(h * ratio)` rows.
    pub fn upper_band(self, ratio: f32) -> FaceBox {
        let band_h = (self.h as f32 * ratio.clamp(0.0, 1.0)).floor() as u32;
        FaceBox {
            h: band_h.min(self.h),
            ..self
        }
    }

    /// Return `true` when the box lies entirely inside a `width` x `height` image.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.w) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.h) <= u64::from(height)
    }
}

/// Detector output in relative coordinates (fractions of image width/height).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedBox {
    /// Left edge as a fraction of width.
    pub xmin: f64,
    /// Top edge as a fraction of height.
    pub ymin: f64,
    /// Width as a fraction of image width.
    pub width: f64,
    /// Height as a fraction of image height.
    pub height: f64,
    /// Detection confidence in `[0, 1]`.
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

fn full_confidence() -> f64 {
    1.0
}

impl NormalizedBox {
    /// Convert to pixels for a `width` x `height` image.
    ///
    /// Coordinates truncate toward zero and the result is clipped to the image, so a detection
    /// hanging off an edge keeps only its visible part. Returns `None` for non-finite input or
    /// a box with no visible area.
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<FaceBox> {
        let vals = [self.xmin, self.ymin, self.width, self.height];
        if vals.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let (wf, hf) = (f64::from(width), f64::from(height));
        let x = (self.xmin * wf).trunc();
        let y = (self.ymin * hf).trunc();
        let w = (self.width * wf).trunc();
        let h = (self.height * hf).trunc();

        let x0 = x.clamp(0.0, wf);
        let y0 = y.clamp(0.0, hf);
        let x1 = (x + w).clamp(0.0, wf);
        let y1 = (y + h).clamp(0.0, hf);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(FaceBox::new(
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }
}

/// Pick the highest-confidence candidate at or above `min_confidence`.
///
/// Ties keep the earliest candidate.
pub fn best_candidate(candidates: &[NormalizedBox], min_confidence: f64) -> Option<NormalizedBox> {
    candidates
        .iter()
        .filter(|c| c.confidence >= min_confidence)
        .fold(None, |best: Option<NormalizedBox>, c| match best {
            Some(b) if b.confidence >= c.confidence => Some(b),
            _ => Some(*c),
        })
}

/// Face region oracle consulted once per pipeline run.
///
/// `Ok(None)` means "no face": the pipeline falls back to global-only effects. `Err` means the
/// locator itself failed and must be reported as a face detection error.
pub trait FaceLocator: Send {
    /// Locate at most one face in `image`.
    fn detect(&mut self, image: &SourceImage) -> StillmotionResult<Option<FaceBox>>;
}

/// Locator that never finds a face.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFaceLocator;

impl FaceLocator for NoFaceLocator {
    fn detect(&mut self, _image: &SourceImage) -> StillmotionResult<Option<FaceBox>> {
        Ok(None)
    }
}

/// Locator returning a preconfigured box, as given (no clipping).
#[derive(Clone, Copy, Debug)]
pub struct FixedFaceLocator(pub FaceBox);

impl FaceLocator for FixedFaceLocator {
    fn detect(&mut self, _image: &SourceImage) -> StillmotionResult<Option<FaceBox>> {
        Ok(Some(self.0))
    }
}

impl<L: FaceLocator + ?Sized> FaceLocator for Box<L> {
    fn detect(&mut self, image: &SourceImage) -> StillmotionResult<Option<FaceBox>> {
        (**self).detect(image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/locator.rs"]
mod tests;
