use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::animation::model::AnimationModel;
use crate::animation::noise::NoiseSeed;
use crate::detect::locator::{FaceBox, FaceLocator};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::pipeline::config::{PipelineConfig, RenderThreading};
use crate::render::compositor::Compositor;
use crate::render::frame::{Frame, SourceImage};

/// Lifecycle of a [`PipelineDriver`].
///
/// `Idle -> Loading -> Locating -> Rendering -> Finalized`; any failing step moves to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, nothing loaded.
    Idle,
    /// Resolving and decoding the input image.
    Loading,
    /// Image decoded; face location pending.
    Locating,
    /// Face located (or not); frames can be rendered.
    Rendering,
    /// All frames written and the sink closed.
    Finalized,
    /// A step failed; the driver cannot continue.
    Failed,
}

/// Progress notification emitted every `progress_interval` frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Frame just handed to the sink.
    pub frame: FrameIndex,
    /// Clip length in frames.
    pub total: u64,
    /// `frame / total` as a percentage.
    pub percent: f64,
}

/// Summary returned after a successful render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    /// Where the sink wrote the clip.
    pub out_path: PathBuf,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Face box used for face-anchored effects, if any.
    pub face_box: Option<FaceBox>,
    /// Noise seed, for reproducing the run.
    pub seed: u64,
}

type ProgressObserver = Box<dyn FnMut(Progress) + Send>;

/// Drives one still image through face location, per-frame synthesis and encoding.
///
/// Each step is a separate call so it can be exercised on its own; [`PipelineDriver::run`]
/// chains them. Calling a step out of order returns [`StillmotionError::State`] without
/// changing the state.
pub struct PipelineDriver {
    cfg: PipelineConfig,
    locator: Box<dyn FaceLocator>,
    seed: NoiseSeed,
    state: PipelineState,
    source: Option<SourceImage>,
    face: Option<FaceBox>,
    out_path: Option<PathBuf>,
    observer: Option<ProgressObserver>,
}

impl PipelineDriver {
    /// Create a driver. The noise seed is fixed here (configured or fresh).
    pub fn new(cfg: PipelineConfig, locator: Box<dyn FaceLocator>) -> StillmotionResult<Self> {
        cfg.validate()?;
        let seed = cfg.noise_seed();
        Ok(Self {
            cfg,
            locator,
            seed,
            state: PipelineState::Idle,
            source: None,
            face: None,
            out_path: None,
            observer: None,
        })
    }

    /// Receive a callback for every progress report.
    pub fn with_progress_observer(
        mut self,
        observer: impl FnMut(Progress) + Send + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Decoded source image, once loaded.
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// Located face box, once located.
    pub fn face_box(&self) -> Option<FaceBox> {
        self.face
    }

    /// Noise seed used for this run.
    pub fn seed(&self) -> NoiseSeed {
        self.seed
    }

    /// Settings of this run.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Run every step: load `input`, locate the face, render into `sink` targeting `output`.
    pub fn run(
        &mut self,
        input: &Path,
        output: &Path,
        sink: &mut dyn FrameSink,
    ) -> StillmotionResult<RenderReport> {
        self.start(input, output)?;
        self.locate()?;
        self.render(sink)
    }

    /// `Idle -> Loading -> Locating`: resolve and decode the input image.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, input: &Path, output: &Path) -> StillmotionResult<()> {
        self.expect_state(PipelineState::Idle, "start")?;
        self.state = PipelineState::Loading;
        match SourceImage::load(input) {
            Ok(source) => {
                tracing::info!(
                    width = source.width(),
                    height = source.height(),
                    "loaded source image"
                );
                self.source = Some(source);
                self.out_path = Some(output.to_path_buf());
                self.state = PipelineState::Locating;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// `Locating -> Rendering`: consult the face locator once.
    ///
    /// Finding no face is not an error; locator failures are reported as
    /// [`StillmotionError::FaceDetection`].
    #[tracing::instrument(skip(self))]
    pub fn locate(&mut self) -> StillmotionResult<Option<FaceBox>> {
        self.expect_state(PipelineState::Locating, "locate")?;
        match self.locate_inner() {
            Ok(face) => {
                self.face = face;
                self.state = PipelineState::Rendering;
                Ok(face)
            }
            Err(e) => self.fail(e),
        }
    }

    /// `Rendering -> Finalized`: synthesize every frame in order and close the sink.
    ///
    /// On a failure after the sink was opened, the sink is closed and the partial output is
    /// left in place.
    #[tracing::instrument(skip(self, sink))]
    pub fn render(&mut self, sink: &mut dyn FrameSink) -> StillmotionResult<RenderReport> {
        self.expect_state(PipelineState::Rendering, "render")?;
        match self.render_inner(sink) {
            Ok(report) => {
                self.state = PipelineState::Finalized;
                Ok(report)
            }
            Err(e) => self.fail(e),
        }
    }

    fn locate_inner(&mut self) -> StillmotionResult<Option<FaceBox>> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| StillmotionError::state("no source image loaded"))?;
        let face = self.locator.detect(source).map_err(|e| match e {
            e @ StillmotionError::FaceDetection(_) => e,
            other => StillmotionError::face_detection(other.to_string()),
        })?;

        match face {
            Some(b) => {
                if !b.fits_within(source.width(), source.height()) {
                    tracing::warn!(?b, "face box extends outside the image; it will be clipped");
                }
                tracing::info!(x = b.x, y = b.y, w = b.w, h = b.h, "face detected");
            }
            None => tracing::info!("no face detected, using global effects only"),
        }
        Ok(face)
    }

    fn render_inner(&mut self, sink: &mut dyn FrameSink) -> StillmotionResult<RenderReport> {
        let fps = self.cfg.fps()?;
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| StillmotionError::state("no source image loaded"))?;
        let out_path = self
            .out_path
            .clone()
            .ok_or_else(|| StillmotionError::state("no output path set"))?;
        let total = self.cfg.total_frames();

        sink.begin(SinkConfig {
            width: source.width(),
            height: source.height(),
            fps,
            out_path: out_path.clone(),
        })?;
        tracing::info!(frames = total, fps = fps.get(), "rendering frames");

        let job = FrameJob {
            source,
            face: self.face,
            model: self.cfg.animation_model(),
            compositor: self.cfg.compositor(self.seed),
            total,
        };
        let mut progress = ProgressReporter {
            interval: self.cfg.progress_interval,
            total,
            observer: self.observer.as_mut(),
        };

        let written = match stream_frames(&job, &self.cfg.threading, sink, &mut progress) {
            Ok(n) => n,
            Err(e) => {
                if let Err(close_err) = sink.end() {
                    tracing::warn!(error = %close_err, "closing sink after failure also failed");
                }
                return Err(e);
            }
        };
        sink.end()?;

        tracing::info!(
            out = %out_path.display(),
            secs = fps.frames_to_secs(written),
            fps = fps.get(),
            frames = written,
            "clip finished"
        );
        Ok(RenderReport {
            out_path,
            width: source.width(),
            height: source.height(),
            fps: fps.get(),
            frames_written: written,
            face_box: self.face,
            seed: self.seed.0,
        })
    }

    fn expect_state(&self, want: PipelineState, op: &str) -> StillmotionResult<()> {
        if self.state != want {
            return Err(StillmotionError::state(format!(
                "{op} requires state {want:?}, driver is {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn fail<T>(&mut self, e: StillmotionError) -> StillmotionResult<T> {
        tracing::error!(error = %e, state = ?self.state, "pipeline failed");
        self.state = PipelineState::Failed;
        Err(e)
    }
}

/// Everything needed to render any single frame; shared read-only across workers.
struct FrameJob<'a> {
    source: &'a SourceImage,
    face: Option<FaceBox>,
    model: AnimationModel,
    compositor: Compositor,
    total: u64,
}

impl FrameJob<'_> {
    fn render(&self, idx: FrameIndex) -> Frame {
        let params = self.model.compute(idx, self.total, self.face.is_some());
        self.compositor.render(self.source, self.face, &params, idx)
    }
}

struct ProgressReporter<'a> {
    interval: u64,
    total: u64,
    observer: Option<&'a mut ProgressObserver>,
}

impl ProgressReporter<'_> {
    fn frame_done(&mut self, idx: FrameIndex) {
        if self.interval == 0 || idx.0 % self.interval != 0 {
            return;
        }
        let percent = idx.0 as f64 / self.total as f64 * 100.0;
        tracing::info!("progress: {percent:.1}%");
        if let Some(observer) = self.observer.as_deref_mut() {
            observer(Progress {
                frame: idx,
                total: self.total,
                percent,
            });
        }
    }
}

fn stream_frames(
    job: &FrameJob<'_>,
    threading: &RenderThreading,
    sink: &mut dyn FrameSink,
    progress: &mut ProgressReporter<'_>,
) -> StillmotionResult<u64> {
    let range = FrameRange::clip(job.total);
    let mut written = 0u64;

    if !threading.parallel {
        for f in range.start.0..range.end.0 {
            let idx = FrameIndex(f);
            sink.push_frame(idx, job.render(idx))?;
            written += 1;
            progress.frame_done(idx);
        }
        return Ok(written);
    }

    let pool = build_thread_pool(threading.threads)?;
    for chunk in range.chunks(threading.chunk_size as u64) {
        let indices: Vec<u64> = (chunk.start.0..chunk.end.0).collect();
        // Collected in index order, so the sink sees the same sequence as a serial render.
        let frames: Vec<Frame> = pool.install(|| {
            indices
                .par_iter()
                .map(|&f| job.render(FrameIndex(f)))
                .collect()
        });
        for (f, frame) in indices.into_iter().zip(frames) {
            let idx = FrameIndex(f);
            sink.push_frame(idx, frame)?;
            written += 1;
            progress.frame_done(idx);
        }
    }
    Ok(written)
}

fn build_thread_pool(threads: Option<usize>) -> StillmotionResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(StillmotionError::configuration(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        StillmotionError::configuration(format!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/driver.rs"]
mod tests;
