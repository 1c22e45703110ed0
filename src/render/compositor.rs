use crate::animation::model::AnimationParams;
use crate::animation::noise::{Gaussian, NoiseSeed};
use crate::detect::locator::FaceBox;
use crate::foundation::core::FrameIndex;
use crate::foundation::math::{saturate_u8, scale_lut};
use crate::render::frame::{Frame, SourceImage};

/// How pixels uncovered by the sway translation are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderFill {
    /// Uncovered pixels become black (0, 0, 0).
    #[default]
    Black,
    /// Uncovered pixels repeat the nearest edge pixel of the source.
    Replicate,
}

/// Fixed compositing settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositorOpts {
    /// Fill policy for the sway translation.
    pub border_fill: BorderFill,
    /// Fraction of the face box height (from the top) darkened on blink frames.
    pub blink_band_ratio: f32,
    /// Multiplier applied to the blink band.
    pub blink_factor: f32,
    /// Standard deviation of the additive sensor noise, in 8-bit levels. 0 disables noise.
    pub noise_sigma: f32,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            border_fill: BorderFill::Black,
            blink_band_ratio: 0.4,
            blink_factor: 0.8,
            noise_sigma: 1.0,
        }
    }
}

/// Turns a source image plus one [`AnimationParams`] into an output frame.
///
/// Order of operations is fixed: translate, global brightness, blink band, noise. Every step
/// saturates to `0..=255`.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    opts: CompositorOpts,
    seed: NoiseSeed,
}

impl Compositor {
    /// Create a compositor whose noise streams derive from `seed`.
    pub fn new(opts: CompositorOpts, seed: NoiseSeed) -> Self {
        Self { opts, seed }
    }

    /// Render frame `idx`. The source is only read.
    ///
    /// Without a face box the frame is not translated and no blink band is applied. A face box
    /// reaching outside the image is clipped.
    pub fn render(
        &self,
        source: &SourceImage,
        face: Option<FaceBox>,
        params: &AnimationParams,
        idx: FrameIndex,
    ) -> Frame {
        let mut frame = match face {
            Some(_) => translate(source, params.offset_x, params.offset_y, self.opts.border_fill),
            None => source.to_frame(),
        };

        scale_brightness(&mut frame, params.brightness_factor);

        if params.is_blink_frame
            && let Some(face) = face
        {
            darken_region(
                &mut frame,
                face.upper_band(self.opts.blink_band_ratio),
                self.opts.blink_factor,
            );
        }

        if self.opts.noise_sigma > 0.0 {
            let mut stream = self.seed.frame_stream(idx);
            add_gaussian_noise(&mut frame, self.opts.noise_sigma, &mut stream);
        }
        frame
    }
}

/// Copy `source` shifted by `(dx, dy)` pixels.
pub fn translate(source: &SourceImage, dx: i32, dy: i32, fill: BorderFill) -> Frame {
    let (w, h) = (source.width() as i64, source.height() as i64);
    let row_bytes = w as usize * 3;
    let src = source.as_raw();
    let mut data = vec![0u8; src.len()];

    // Destination columns [x0, x1) read from source columns [x0 - dx, x1 - dx).
    let x0 = i64::from(dx).clamp(0, w);
    let x1 = (w + i64::from(dx)).clamp(0, w);

    for (y, dst_row) in data.chunks_exact_mut(row_bytes).enumerate() {
        let sy = y as i64 - i64::from(dy);
        let sy = match fill {
            BorderFill::Black if !(0..h).contains(&sy) => continue,
            BorderFill::Black => sy,
            BorderFill::Replicate => sy.clamp(0, h - 1),
        };
        let src_row = &src[sy as usize * row_bytes..(sy as usize + 1) * row_bytes];

        if x1 > x0 {
            let sx0 = (x0 - i64::from(dx)) as usize;
            let len = (x1 - x0) as usize;
            dst_row[x0 as usize * 3..x1 as usize * 3]
                .copy_from_slice(&src_row[sx0 * 3..(sx0 + len) * 3]);
        }

        if fill == BorderFill::Replicate {
            let first = [src_row[0], src_row[1], src_row[2]];
            let last_at = row_bytes - 3;
            let last = [src_row[last_at], src_row[last_at + 1], src_row[last_at + 2]];
            for px in dst_row[..x0 as usize * 3].chunks_exact_mut(3) {
                px.copy_from_slice(&first);
            }
            let right_from = x1.max(x0) as usize;
            for px in dst_row[right_from * 3..].chunks_exact_mut(3) {
                px.copy_from_slice(&last);
            }
        }
    }

    Frame {
        width: source.width(),
        height: source.height(),
        data,
    }
}

/// Multiply every channel by `factor`, rounding and saturating.
pub fn scale_brightness(frame: &mut Frame, factor: f32) {
    if factor == 1.0 {
        return;
    }
    let lut = scale_lut(factor);
    for v in &mut frame.data {
        *v = lut[usize::from(*v)];
    }
}

/// Multiply channels inside `region` (clipped to the frame) by `factor`.
pub fn darken_region(frame: &mut Frame, region: FaceBox, factor: f32) {
    let Some(r) = region.clip_to(frame.width, frame.height) else {
        return;
    };
    let lut = scale_lut(factor);
    let row_bytes = frame.width as usize * 3;
    let (x0, x1) = (r.x as usize * 3, (r.x + r.w) as usize * 3);
    for row in frame
        .data
        .chunks_exact_mut(row_bytes)
        .skip(r.y as usize)
        .take(r.h as usize)
    {
        for v in &mut row[x0..x1] {
            *v = lut[usize::from(*v)];
        }
    }
}

/// Add independent N(0, sigma^2) noise to every channel, rounding and saturating.
pub fn add_gaussian_noise(frame: &mut Frame, sigma: f32, stream: &mut Gaussian) {
    let sigma = f64::from(sigma);
    for v in &mut frame.data {
        let n = stream.next_standard() * sigma;
        *v = saturate_u8((f64::from(*v) + n) as f32);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
