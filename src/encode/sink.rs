use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::render::frame::Frame;

/// Configuration provided to a [`FrameSink`] when it is opened.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Destination of the encoded clip.
    pub out_path: PathBuf,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Lifecycle: `begin` once (open), `push_frame` per frame in strictly increasing `FrameIndex`
/// order (write), `end` once (close). Frames are handed over by value and never reused.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StillmotionResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: Frame) -> StillmotionResult<()>;
    /// Called once after the last frame is pushed, or after a failure if the sink is still open.
    fn end(&mut self) -> StillmotionResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    ended: bool,
    fail_at: Option<FrameIndex>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that reports an I/O failure when frame `idx` is pushed.
    pub fn failing_at(idx: FrameIndex) -> Self {
        Self {
            fail_at: Some(idx),
            ..Self::default()
        }
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StillmotionResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: Frame) -> StillmotionResult<()> {
        if self.cfg.is_none() || self.ended {
            return Err(StillmotionError::io("in-memory sink is not open"));
        }
        if self.fail_at == Some(idx) {
            return Err(StillmotionError::io(format!(
                "simulated write failure at frame {}",
                idx.0
            )));
        }
        self.frames.push((idx, frame));
        Ok(())
    }

    fn end(&mut self) -> StillmotionResult<()> {
        self.ended = true;
        Ok(())
    }
}
