use std::f64::consts::TAU;

use crate::foundation::core::FrameIndex;

/// Amplitudes and cycle counts of the liveness motion.
///
/// Cycle counts are per clip, not per second: the motion always completes a whole number of
/// oscillations over the clip regardless of its length.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MotionProfile {
    /// Horizontal jitter amplitude in pixels.
    pub sway_x_px: f64,
    /// Horizontal oscillations per clip.
    pub sway_x_cycles: f64,
    /// Vertical jitter amplitude in pixels.
    pub sway_y_px: f64,
    /// Vertical oscillations per clip.
    pub sway_y_cycles: f64,
    /// Peak relative lighting drift (0.05 = +/-5%).
    pub light_amplitude: f64,
    /// Lighting cycles per clip.
    pub light_cycles: f64,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            sway_x_px: 3.0,
            sway_x_cycles: 2.0,
            sway_y_px: 2.0,
            sway_y_cycles: 3.0,
            light_amplitude: 0.05,
            light_cycles: 1.0,
        }
    }
}

/// Per-frame liveness parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationParams {
    /// Horizontal displacement in pixels (positive moves content right).
    pub offset_x: i32,
    /// Vertical displacement in pixels (positive moves content down).
    pub offset_y: i32,
    /// Global brightness multiplier, centered at 1.0.
    pub brightness_factor: f32,
    /// Whether the eye band is darkened on this frame.
    pub is_blink_frame: bool,
}

impl AnimationParams {
    /// Parameters that leave a frame untouched (apart from noise).
    pub const IDENTITY: Self = Self {
        offset_x: 0,
        offset_y: 0,
        brightness_factor: 1.0,
        is_blink_frame: false,
    };
}

/// Pure sampler for [`AnimationParams`].
///
/// Holds no per-frame state: two calls with the same arguments return identical values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationModel {
    profile: MotionProfile,
    blink_interval: u64,
}

impl AnimationModel {
    /// Create a model. A `blink_interval` of 0 disables blinking.
    pub fn new(profile: MotionProfile, blink_interval: u64) -> Self {
        Self {
            profile,
            blink_interval,
        }
    }

    /// Sample the parameters for `frame` of a `total`-frame clip.
    ///
    /// `total` must be non-zero; an empty clip never samples the model.
    pub fn compute(&self, frame: FrameIndex, total: u64, face_present: bool) -> AnimationParams {
        debug_assert!(total > 0, "empty clips are never sampled");
        let progress = frame.0 as f64 / total.max(1) as f64;
        let p = &self.profile;

        let offset_x = (p.sway_x_px * (progress * p.sway_x_cycles * TAU).sin()).round() as i32;
        let offset_y = (p.sway_y_px * (progress * p.sway_y_cycles * TAU).sin()).round() as i32;
        let brightness_factor =
            (1.0 + p.light_amplitude * (progress * p.light_cycles * TAU).sin()) as f32;
        let is_blink_frame =
            face_present && self.blink_interval > 0 && frame.0 % self.blink_interval == 0;

        AnimationParams {
            offset_x,
            offset_y,
            brightness_factor,
            is_blink_frame,
        }
    }
}

impl Default for AnimationModel {
    fn default() -> Self {
        Self::new(MotionProfile::default(), 90)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/model.rs"]
mod tests;
