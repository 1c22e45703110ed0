use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StillmotionError, StillmotionResult};
use crate::render::frame::Frame;

/// Video encoder used inside the MP4 container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264 via `libx264`.
    Libx264,
    /// MPEG-4 Part 2 (`mp4v`).
    Mpeg4,
}

impl VideoCodec {
    /// `ffmpeg` encoder name.
    pub fn encoder_name(self) -> &'static str {
        match self {
            VideoCodec::Libx264 => "libx264",
            VideoCodec::Mpeg4 => "mpeg4",
        }
    }

    /// Output pixel format for a `width` x `height` clip.
    ///
    /// 4:2:0 needs even dimensions; `libx264` falls back to 4:4:4 for odd ones, `mpeg4` cannot.
    pub fn pix_fmt_for(self, width: u32, height: u32) -> StillmotionResult<&'static str> {
        let even = width.is_multiple_of(2) && height.is_multiple_of(2);
        match (self, even) {
            (_, true) => Ok("yuv420p"),
            (VideoCodec::Libx264, false) => Ok("yuv444p"),
            (VideoCodec::Mpeg4, false) => Err(StillmotionError::configuration(format!(
                "mpeg4 encoder requires even width/height, got {width}x{height}"
            ))),
        }
    }
}

/// Encoder preference for [`FfmpegSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodecChoice {
    /// `libx264` when the local `ffmpeg` has it, otherwise `mpeg4`.
    #[default]
    Auto,
    /// Require a specific encoder.
    Fixed(VideoCodec),
}

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Encoder preference.
    pub codec: CodecChoice,
    /// `ffmpeg` executable to spawn.
    pub ffmpeg_bin: PathBuf,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            overwrite: true,
            codec: CodecChoice::Auto,
            ffmpeg_bin: PathBuf::from("ffmpeg"),
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw RGB24 frames to its stdin.
///
/// Dropping an open sink closes stdin and reaps the child; whatever `ffmpeg` managed to write
/// stays on disk.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    codec: Option<VideoCodec>,
    last_idx: Option<FrameIndex>,
    frames_written: u64,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            codec: None,
            last_idx: None,
            frames_written: 0,
        }
    }

    /// Encoder chosen in `begin`, if the sink has been opened.
    pub fn codec(&self) -> Option<VideoCodec> {
        self.codec
    }

    /// Frames written since `begin`.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn select_codec(&self) -> StillmotionResult<VideoCodec> {
        let encoders = list_video_encoders(&self.opts.ffmpeg_bin)?;
        let has = |c: VideoCodec| encoders.iter().any(|e| e == c.encoder_name());
        match self.opts.codec {
            CodecChoice::Fixed(c) if has(c) => Ok(c),
            CodecChoice::Fixed(c) => Err(StillmotionError::configuration(format!(
                "ffmpeg has no '{}' encoder",
                c.encoder_name()
            ))),
            CodecChoice::Auto => [VideoCodec::Libx264, VideoCodec::Mpeg4]
                .into_iter()
                .find(|&c| has(c))
                .ok_or_else(|| {
                    StillmotionError::configuration(
                        "ffmpeg provides neither 'libx264' nor 'mpeg4' encoders",
                    )
                }),
        }
    }

    fn close(&mut self) -> StillmotionResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = child.wait().map_err(|e| {
            StillmotionError::io(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| StillmotionError::io("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StillmotionError::io(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(StillmotionError::io(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> StillmotionResult<()> {
        if self.child.is_some() {
            return Err(StillmotionError::configuration("ffmpeg sink is already open"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StillmotionError::configuration(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        if !self.opts.overwrite && cfg.out_path.exists() {
            return Err(StillmotionError::configuration(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_available(&self.opts.ffmpeg_bin) {
            return Err(StillmotionError::configuration(format!(
                "'{}' is required for MP4 encoding, but could not be run",
                self.opts.ffmpeg_bin.display()
            )));
        }
        let codec = self.select_codec()?;
        let pix_fmt = codec.pix_fmt_for(cfg.width, cfg.height)?;
        tracing::debug!(
            encoder = codec.encoder_name(),
            pix_fmt,
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.get(),
            "opening ffmpeg sink"
        );

        let mut cmd = Command::new(&self.opts.ffmpeg_bin);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            // For rawvideo input, `-r` before `-i` sets the input framerate.
            "-r",
            &cfg.fps.get().to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            codec.encoder_name(),
            "-pix_fmt",
            pix_fmt,
            "-movflags",
            "+faststart",
        ]);
        if codec == VideoCodec::Mpeg4 {
            cmd.args(["-q:v", "2"]);
        }
        cmd.arg(&cfg.out_path);

        ensure_parent_dir(&cfg.out_path)?;
        let mut child = cmd.spawn().map_err(|e| {
            StillmotionError::configuration(format!(
                "failed to spawn '{}': {e}",
                self.opts.ffmpeg_bin.display()
            ))
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            StillmotionError::configuration("failed to open ffmpeg stdin (unexpected)")
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            StillmotionError::configuration("failed to open ffmpeg stderr (unexpected)")
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.codec = Some(codec);
        self.last_idx = None;
        self.frames_written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: Frame) -> StillmotionResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StillmotionError::io("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(StillmotionError::io(format!(
                "ffmpeg sink received out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StillmotionError::io(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != cfg.width as usize * cfg.height as usize * 3 {
            return Err(StillmotionError::io(
                "frame.data size mismatch with width*height*3",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StillmotionError::io("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&frame.data).map_err(|e| {
            StillmotionError::io(format!("failed to write frame {} to ffmpeg stdin: {e}", idx.0))
        })?;
        self.last_idx = Some(idx);
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> StillmotionResult<()> {
        self.close()
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some()
            && let Err(e) = self.close()
        {
            tracing::warn!(error = %e, "ffmpeg sink closed with error on drop");
        }
    }
}

/// Video encoder names reported by `ffmpeg -encoders`.
pub fn list_video_encoders(ffmpeg_bin: &Path) -> StillmotionResult<Vec<String>> {
    let out = Command::new(ffmpeg_bin)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            StillmotionError::configuration(format!(
                "failed to query encoders from '{}': {e}",
                ffmpeg_bin.display()
            ))
        })?;
    Ok(parse_video_encoders(&String::from_utf8_lossy(&out.stdout)))
}

fn parse_video_encoders(listing: &str) -> Vec<String> {
    // Entries look like " V....D libx264   libx264 H.264 / AVC ...", after a " ------" rule.
    listing
        .lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            flags.starts_with('V').then(|| name.to_string())
        })
        .collect()
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StillmotionResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            StillmotionError::configuration(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg_bin -version` runs successfully.
pub fn is_ffmpeg_available(ffmpeg_bin: &Path) -> bool {
    Command::new(ffmpeg_bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
