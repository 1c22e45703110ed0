use std::path::Path;

use crate::animation::model::{AnimationModel, MotionProfile};
use crate::animation::noise::NoiseSeed;
use crate::foundation::core::Fps;
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::render::compositor::{Compositor, CompositorOpts};

/// Threading and chunking controls for multi-frame rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    /// Render frames of a chunk concurrently when `true`.
    pub parallel: bool,
    /// Chunk size in frames; frames are handed to the sink after each chunk.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

/// Settings for one clip synthesis run.
///
/// Defaults produce a 5 second, 30 fps clip with a blink every 3 seconds. Any subset of fields
/// may be given in a JSON file; missing ones keep their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Output frame rate.
    pub fps: u32,
    /// Clip length in whole seconds.
    pub duration_secs: u32,
    /// Frames between blinks; 0 disables blinking.
    pub blink_interval_frames: u64,
    /// Frames between progress reports; 0 disables them.
    pub progress_interval: u64,
    /// Noise seed. `None` draws a fresh seed per run.
    pub seed: Option<u64>,
    /// Sway and lighting drift.
    pub motion: MotionProfile,
    /// Border fill, blink band and noise settings.
    #[serde(flatten)]
    pub compositor: CompositorOpts,
    /// Optional frame-level parallelism.
    pub threading: RenderThreading,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            duration_secs: 5,
            blink_interval_frames: 90,
            progress_interval: 30,
            seed: None,
            motion: MotionProfile::default(),
            compositor: CompositorOpts::default(),
            threading: RenderThreading::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file and validate it.
    pub fn from_path(path: &Path) -> StillmotionResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StillmotionError::configuration(format!("read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            StillmotionError::configuration(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> StillmotionResult<()> {
        Fps::new(self.fps)?;
        let c = &self.compositor;
        if !c.noise_sigma.is_finite() || c.noise_sigma < 0.0 {
            return Err(StillmotionError::configuration(
                "noise_sigma must be finite and >= 0",
            ));
        }
        if !c.blink_factor.is_finite() || c.blink_factor < 0.0 {
            return Err(StillmotionError::configuration(
                "blink_factor must be finite and >= 0",
            ));
        }
        if !(c.blink_band_ratio > 0.0 && c.blink_band_ratio <= 1.0) {
            return Err(StillmotionError::configuration(
                "blink_band_ratio must be in (0, 1]",
            ));
        }
        let m = &self.motion;
        let motion = [
            m.sway_x_px,
            m.sway_x_cycles,
            m.sway_y_px,
            m.sway_y_cycles,
            m.light_amplitude,
            m.light_cycles,
        ];
        if motion.iter().any(|v| !v.is_finite()) {
            return Err(StillmotionError::configuration(
                "motion profile values must be finite",
            ));
        }
        if m.light_amplitude.abs() >= 1.0 {
            return Err(StillmotionError::configuration(
                "light_amplitude must be in (-1, 1) to keep brightness positive",
            ));
        }
        if self.threading.threads == Some(0) {
            return Err(StillmotionError::configuration(
                "render threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    /// Validated frame rate.
    pub fn fps(&self) -> StillmotionResult<Fps> {
        Fps::new(self.fps)
    }

    /// Exact clip length in frames (`fps * duration_secs`).
    pub fn total_frames(&self) -> u64 {
        Fps::new(self.fps).map_or(0, |fps| fps.frames_for_secs(self.duration_secs))
    }

    /// Animation sampler for this config.
    pub fn animation_model(&self) -> AnimationModel {
        AnimationModel::new(self.motion, self.blink_interval_frames)
    }

    /// Configured seed, or a fresh one.
    pub fn noise_seed(&self) -> NoiseSeed {
        self.seed.map(NoiseSeed).unwrap_or_else(NoiseSeed::fresh)
    }

    /// Compositor for this config using `seed`.
    pub fn compositor(&self, seed: NoiseSeed) -> Compositor {
        Compositor::new(self.compositor, seed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
