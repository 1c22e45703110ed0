use std::collections::VecDeque;

use crate::detect::locator::{FaceBox, FaceLocator};
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::render::frame::SourceImage;

/// Tuning for [`SkinToneLocator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinToneOpts {
    /// Inclusive Cb range classified as skin.
    pub cb_range: (f32, f32),
    /// Inclusive Cr range classified as skin.
    pub cr_range: (f32, f32),
    /// Minimum luma; very dark pixels are never skin.
    pub min_luma: f32,
    /// Fraction of skin pixels needed to mark a grid cell.
    pub cell_fill: f32,
    /// Smallest accepted region as a fraction of the image area.
    pub min_area_fraction: f32,
    /// Smallest accepted region density within its bounding box.
    pub min_confidence: f32,
}

impl Default for SkinToneOpts {
    fn default() -> Self {
        Self {
            cb_range: (77.0, 127.0),
            cr_range: (133.0, 173.0),
            min_luma: 40.0,
            cell_fill: 0.5,
            min_area_fraction: 0.01,
            min_confidence: 0.5,
        }
    }
}

/// Heuristic face locator based on skin chrominance.
///
/// Pixels are classified in YCbCr space, pooled into a coarse grid, and the largest
/// 4-connected group of skin cells becomes the face box. Good enough for a centered ID-style
/// portrait against a plain background; no attempt is made to tell faces from other skin.
#[derive(Clone, Debug, Default)]
pub struct SkinToneLocator {
    opts: SkinToneOpts,
}

struct Region {
    cells: usize,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl SkinToneLocator {
    /// Create a locator with custom thresholds.
    pub fn new(opts: SkinToneOpts) -> Self {
        Self { opts }
    }

    fn is_skin(&self, px: &[u8]) -> bool {
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
        let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
        y >= self.opts.min_luma
            && (self.opts.cb_range.0..=self.opts.cb_range.1).contains(&cb)
            && (self.opts.cr_range.0..=self.opts.cr_range.1).contains(&cr)
    }

    fn skin_grid(&self, image: &SourceImage, cell: usize) -> (Vec<bool>, usize, usize) {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let gw = w.div_ceil(cell);
        let gh = h.div_ceil(cell);
        let mut hits = vec![0u32; gw * gh];
        let mut totals = vec![0u32; gw * gh];

        for (y, row) in image.as_raw().chunks_exact(w * 3).enumerate() {
            let gy = y / cell;
            for (x, px) in row.chunks_exact(3).enumerate() {
                let gi = gy * gw + x / cell;
                totals[gi] += 1;
                if self.is_skin(px) {
                    hits[gi] += 1;
                }
            }
        }

        let grid = hits
            .iter()
            .zip(&totals)
            .map(|(&hit, &total)| total > 0 && hit as f32 >= self.opts.cell_fill * total as f32)
            .collect();
        (grid, gw, gh)
    }
}

fn largest_region(grid: &[bool], gw: usize, gh: usize) -> Option<Region> {
    let mut seen = vec![false; grid.len()];
    let mut best: Option<Region> = None;
    let mut queue = VecDeque::new();

    for start in 0..grid.len() {
        if !grid[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut region = Region {
            cells: 0,
            x0: usize::MAX,
            y0: usize::MAX,
            x1: 0,
            y1: 0,
        };

        while let Some(i) = queue.pop_front() {
            let (cx, cy) = (i % gw, i / gw);
            region.cells += 1;
            region.x0 = region.x0.min(cx);
            region.y0 = region.y0.min(cy);
            region.x1 = region.x1.max(cx);
            region.y1 = region.y1.max(cy);

            let mut visit = |n: usize| {
                if grid[n] && !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            };
            if cx > 0 {
                visit(i - 1);
            }
            if cx + 1 < gw {
                visit(i + 1);
            }
            if cy > 0 {
                visit(i - gw);
            }
            if cy + 1 < gh {
                visit(i + gw);
            }
        }

        if best.as_ref().is_none_or(|b| region.cells > b.cells) {
            best = Some(region);
        }
    }
    best
}

impl FaceLocator for SkinToneLocator {
    fn detect(&mut self, image: &SourceImage) -> StillmotionResult<Option<FaceBox>> {
        let (w, h) = (image.width() as usize, image.height() as usize);
        if w == 0 || h == 0 || image.as_raw().len() != w * h * 3 {
            return Err(StillmotionError::face_detection(
                "skin-tone locator received an empty or inconsistent image",
            ));
        }

        let cell = (w.min(h) / 64).max(4);
        let (grid, gw, gh) = self.skin_grid(image, cell);
        let Some(region) = largest_region(&grid, gw, gh) else {
            return Ok(None);
        };

        let area_fraction = region.cells as f32 / grid.len() as f32;
        let bbox_cells = (region.x1 - region.x0 + 1) * (region.y1 - region.y0 + 1);
        let confidence = region.cells as f32 / bbox_cells as f32;
        tracing::debug!(
            cells = region.cells,
            area_fraction,
            confidence,
            "skin-tone candidate"
        );
        if area_fraction < self.opts.min_area_fraction || confidence < self.opts.min_confidence {
            return Ok(None);
        }

        let x = region.x0 * cell;
        let y = region.y0 * cell;
        let x_end = ((region.x1 + 1) * cell).min(w);
        let y_end = ((region.y1 + 1) * cell).min(h);
        Ok(Some(FaceBox::new(
            x as u32,
            y as u32,
            (x_end - x) as u32,
            (y_end - y) as u32,
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/skin.rs"]
mod tests;
