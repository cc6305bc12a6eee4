use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{CaptureConfig, CaptureGuard, CaptureSession, Container, EncodedVideo};
use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::flatten_premul_to_rgb8;
use crate::render::surface::FrameRGBA;

/// Default target bitrate (5 Mbit/s).
pub const DEFAULT_VIDEO_BITRATE: u32 = 5_000_000;

/// Options for [`FfmpegCapture`].
#[derive(Clone, Debug)]
pub struct FfmpegCaptureOpts {
    pub container: Container,
    /// Target video bitrate in bits per second.
    pub bitrate: u32,
    /// Background used to flatten alpha (RGB8).
    pub bg_rgb: [u8; 3],
    /// Directory for the intermediate output file.
    pub scratch_dir: PathBuf,
}

impl FfmpegCaptureOpts {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            bitrate: DEFAULT_VIDEO_BITRATE,
            bg_rgb: [0, 0, 0],
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Capture session that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// `ffmpeg` writes into a scratch file which is read back into memory on `finish`.
pub struct FfmpegCapture {
    opts: FfmpegCaptureOpts,
    guard: CaptureGuard,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out: TempFileGuard,
}

impl FfmpegCapture {
    pub fn new(opts: FfmpegCaptureOpts) -> ReelResult<Self> {
        if !opts.container.needs_ffmpeg() {
            return Err(ReelError::validation(format!(
                "container '{}' is not encoded through ffmpeg",
                opts.container
            )));
        }
        if opts.bitrate == 0 {
            return Err(ReelError::validation("video bitrate must be non-zero"));
        }
        Ok(Self {
            opts,
            guard: CaptureGuard::default(),
            child: None,
            stdin: None,
            stderr_drain: None,
            out: TempFileGuard(None),
        })
    }

    fn output_args(&self, cmd: &mut Command) {
        let bitrate = self.opts.bitrate.to_string();
        match self.opts.container {
            Container::WebM => {
                cmd.args([
                    "-an",
                    "-c:v",
                    "libvpx-vp9",
                    "-b:v",
                    &bitrate,
                    "-pix_fmt",
                    "yuv420p",
                    "-f",
                    "webm",
                ]);
            }
            _ => {
                // h264 + yuv420p for broad compatibility.
                cmd.args([
                    "-an",
                    "-c:v",
                    "libx264",
                    "-b:v",
                    &bitrate,
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                    "-f",
                    "mp4",
                ]);
            }
        }
    }
}

impl FfmpegCapture {
    /// Take over a spawned encoder: keep its stdin, drain its stderr on a helper thread.
    fn attach(&mut self, mut child: Child) -> ReelResult<()> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn join_stderr(&mut self) -> ReelResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Reap the encoder after a pipe failure and fold its exit status and stderr into the error.
    fn abort(&mut self, what: String) -> ReelError {
        drop(self.stdin.take());
        let status = self.child.take().and_then(|mut child| {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
            }
            child.wait().ok()
        });
        let stderr_bytes = self.join_stderr().unwrap_or_default();
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        let stderr = stderr.trim();

        match status {
            Some(status) if !stderr.is_empty() => {
                ReelError::encode(format!("{what}; ffmpeg exited with status {status}: {stderr}"))
            }
            Some(status) => ReelError::encode(format!("{what}; ffmpeg exited with status {status}")),
            None => ReelError::encode(what),
        }
    }
}

impl CaptureSession for FfmpegCapture {
    fn container(&self) -> Container {
        self.opts.container
    }

    fn begin(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg capture width/height must be even (required for yuv420p output)",
            ));
        }
        self.guard.begin(cfg)?;

        if !is_ffmpeg_on_path() {
            return Err(ReelError::encode(
                "ffmpeg is required for webm/mp4 encoding, but was not found on PATH",
            ));
        }

        std::fs::create_dir_all(&self.opts.scratch_dir).map_err(|e| {
            ReelError::encode(format!(
                "failed to create scratch directory '{}': {e}",
                self.opts.scratch_dir.display()
            ))
        })?;
        let out_path = scratch_path(&self.opts.scratch_dir, self.opts.container);

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        self.output_args(&mut cmd);
        cmd.arg(&out_path);

        tracing::debug!(
            container = %self.opts.container,
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.get(),
            "spawning ffmpeg"
        );
        let child = cmd.spawn().map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        self.out.0 = Some(out_path);
        self.attach(child)
    }

    fn capture(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        self.guard.check(idx, frame)?;
        let rgb = flatten_premul_to_rgb8(&frame.data, self.opts.bg_rgb);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg capture is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&rgb) {
            return Err(self.abort(format!(
                "failed to write frame {} to ffmpeg stdin: {e}",
                idx.0
            )));
        }
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        let (cfg, frame_count) = self.guard.end()?;
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg capture not started"))?;

        let status = child.wait().map_err(|e| {
            ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let path = self
            .out
            .0
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg output path missing"))?;
        let bytes = std::fs::read(path).map_err(|e| {
            ReelError::encode(format!(
                "failed to read ffmpeg output '{}': {e}",
                path.display()
            ))
        })?;
        self.out.release();

        Ok(EncodedVideo {
            container: self.opts.container,
            bytes: bytes.into(),
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            frame_count,
        })
    }
}

impl Drop for FfmpegCapture {
    fn drop(&mut self) {
        // An abandoned replay leaves ffmpeg waiting on stdin.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn release(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.release();
    }
}

fn scratch_path(dir: &Path, container: Container) -> PathBuf {
    dir.join(format!(
        "framereel_capture_{}_{}.{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple(),
        container.extension()
    ))
}

fn push_input_fps(cmd: &mut Command, fps: FrameRate) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &fps.get().to_string()]);
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
