//! Stillmotion turns a single still portrait into a short "liveness" video clip.
//!
//! Every output frame is the source image with small time-varying perturbations: a sub-pixel
//! head sway, a slow lighting drift, periodic eye blinks and per-frame sensor noise. The
//! public API is step-oriented:
//!
//! - Configure a run with [`PipelineConfig`]
//! - Pick a [`FaceLocator`] (sidecar annotation, skin-tone heuristic, fixed box or none)
//! - Drive it with a [`PipelineDriver`] into a [`FrameSink`] such as [`FfmpegSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Per-frame liveness parameters and noise streams.
pub mod animation;
/// Face locators.
pub mod detect;
/// Encoding sinks.
pub mod encode;
/// Run configuration and the driver state machine.
pub mod pipeline;
/// Source images, frames and the compositor.
pub mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{StillmotionError, StillmotionResult};

pub use crate::animation::model::{AnimationModel, AnimationParams, MotionProfile};
pub use crate::animation::noise::NoiseSeed;
pub use crate::detect::locator::{
    FaceBox, FaceLocator, FixedFaceLocator, NoFaceLocator, NormalizedBox,
};
pub use crate::detect::sidecar::SidecarLocator;
pub use crate::detect::skin::{SkinToneLocator, SkinToneOpts};
pub use crate::encode::ffmpeg::{CodecChoice, FfmpegSink, FfmpegSinkOpts, VideoCodec};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::config::{PipelineConfig, RenderThreading};
pub use crate::pipeline::driver::{PipelineDriver, PipelineState, Progress, RenderReport};
pub use crate::render::compositor::{BorderFill, Compositor, CompositorOpts};
pub use crate::render::frame::{Frame, SourceImage};
