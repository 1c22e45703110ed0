use crate::foundation::error::{StillmotionError, StillmotionResult};

/// Absolute 0-based frame index in clip timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> StillmotionResult<Self> {
        if start.0 > end.0 {
            return Err(StillmotionError::configuration(
                "FrameRange start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Range covering a whole clip of `total` frames.
    pub fn clip(total: u64) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(total),
        }
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 >= self.end.0
    }

    /// Split the range into consecutive sub-ranges of at most `chunk` frames.
    ///
    /// A zero chunk size is treated as 1.
    pub fn chunks(self, chunk: u64) -> impl Iterator<Item = FrameRange> {
        let step = chunk.max(1);
        let end = self.end.0;
        (self.start.0..end).step_by(step as usize).map(move |s| FrameRange {
            start: FrameIndex(s),
            end: FrameIndex(s.saturating_add(step).min(end)),
        })
    }
}

/// Integer frames-per-second.
///
/// Clips are always a whole number of frames per second, so `total_frames = fps * secs` is exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fps(u32);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(fps: u32) -> StillmotionResult<Self> {
        if fps == 0 {
            return Err(StillmotionError::configuration("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Frames per second as an integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Total frame count for a clip of `secs` whole seconds.
    pub fn frames_for_secs(self, secs: u32) -> u64 {
        u64::from(self.0) * u64::from(secs)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) / self.as_f64()
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(30)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length of a tightly packed RGB8 buffer of this size.
    pub fn rgb8_len(self) -> usize {
        self.pixel_count() * 3
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
