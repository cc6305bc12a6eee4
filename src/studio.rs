//! Server-side session state: the drawing surface, the current frames and the current clip.
//!
//! A phase (synthesis or replay) checks the surface out of the studio, runs without holding the
//! lock, then checks it back in together with its result. While a phase runs every other
//! mutating request is rejected.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::ReelConfig;
use crate::encode::sink::{Container, EncodedVideo};
use crate::encode::{SessionOpts, open_session};
use crate::foundation::core::{Canvas, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::Surface;
use crate::replay::StreamEncoder;
use crate::resource::{VideoHandle, VideoStore};
use crate::scene::params::AnimationParams;
use crate::synth::{FrameSequence, FrameSynthesizer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Synthesizing,
    Encoding,
}

/// Snapshot of the studio for `GET /api/studio`.
#[derive(Clone, Debug, Serialize)]
pub struct StudioState {
    pub params: AnimationParams,
    pub canvas: Canvas,
    pub container: Container,
    pub frames: usize,
    pub phase: Phase,
    pub generating: bool,
    pub video: Option<VideoHandle>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FramesSummary {
    pub frames: usize,
    pub fps: FrameRate,
    pub duration: u32,
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VideoSummary {
    pub handle: VideoHandle,
    pub url: String,
    pub container: Container,
    pub bytes: usize,
    pub frames: u64,
    pub fps: FrameRate,
}

struct Studio {
    surface: Option<Surface>,
    canvas: Canvas,
    params: AnimationParams,
    frames: Option<Arc<FrameSequence>>,
    phase: Phase,
    videos: VideoStore,
    synth: FrameSynthesizer,
    encoder: StreamEncoder,
    container: Container,
    session_opts: SessionOpts,
}

impl Studio {
    fn ensure_idle(&self) -> ReelResult<()> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Synthesizing => Err(ReelError::state("frames are being generated")),
            Phase::Encoding => Err(ReelError::state("a video is being created")),
        }
    }
}

/// Cloneable handle to the shared studio.
#[derive(Clone)]
pub struct StudioHandle {
    inner: Arc<Mutex<Studio>>,
}

impl std::fmt::Debug for StudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioHandle").finish_non_exhaustive()
    }
}

impl StudioHandle {
    /// Build a studio with a fresh surface sized from `cfg.canvas`.
    pub fn from_config(cfg: &ReelConfig) -> ReelResult<Self> {
        cfg.validate()?;
        let surface = Surface::new(cfg.canvas, cfg.surface_opts())?;
        Self::with_surface(cfg, Some(surface))
    }

    /// Build a studio around an existing surface, or none at all.
    pub fn with_surface(cfg: &ReelConfig, surface: Option<Surface>) -> ReelResult<Self> {
        let canvas = surface.as_ref().map_or(cfg.canvas, Surface::canvas);
        let studio = Studio {
            surface,
            canvas,
            params: AnimationParams::default(),
            frames: None,
            phase: Phase::Idle,
            videos: VideoStore::new(),
            synth: FrameSynthesizer::new(cfg.jpeg_quality)?,
            encoder: StreamEncoder::new(cfg.pacing),
            container: cfg.container,
            session_opts: cfg.session_opts(),
        };
        Ok(Self {
            inner: Arc::new(Mutex::new(studio)),
        })
    }

    pub async fn state(&self) -> StudioState {
        let s = self.inner.lock().await;
        StudioState {
            params: s.params.clone(),
            canvas: s.canvas,
            container: s.container,
            frames: s.frames.as_ref().map_or(0, |f| f.len()),
            phase: s.phase,
            generating: s.phase != Phase::Idle,
            video: s.videos.current_handle(),
        }
    }

    /// Synthesize a new frame sequence, replacing the current one and revoking the current clip.
    pub async fn generate_frames(&self, params: AnimationParams) -> ReelResult<FramesSummary> {
        let (surface, synth) = {
            let mut s = self.inner.lock().await;
            s.ensure_idle()?;
            s.phase = Phase::Synthesizing;
            s.params = params.clone();
            s.frames = None;
            if let Some(old) = s.videos.revoke_current() {
                tracing::debug!(handle = %old, "revoked video of the previous frame sequence");
            }
            (s.surface.take(), s.synth)
        };

        // Detached so a dropped request cannot leave the studio without its surface.
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let job_params = params.clone();
            let joined = tokio::task::spawn_blocking(move || {
                let mut surface = surface;
                let seq = synth.synthesize(surface.as_mut(), &job_params);
                (surface, seq)
            })
            .await;

            let mut s = inner.lock().await;
            s.phase = Phase::Idle;
            let result = match joined {
                Ok((surface, seq)) => {
                    s.surface = surface;
                    seq
                }
                Err(e) => {
                    tracing::error!(error = %e, "frame synthesis task failed; surface lost");
                    Err(ReelError::Other(anyhow::Error::new(e)))
                }
            };
            let seq = result?;
            let summary = FramesSummary {
                frames: seq.len(),
                fps: params.fps,
                duration: params.duration_secs(),
                text: params.text.clone(),
            };
            s.frames = Some(Arc::new(seq));
            Ok::<_, ReelError>(summary)
        });

        task.await
            .map_err(|e| ReelError::Other(anyhow::Error::new(e)))?
    }

    /// Replay the current frames into a new clip and publish it.
    pub async fn create_video(&self) -> ReelResult<VideoSummary> {
        let (surface, seq, session, encoder) = {
            let mut s = self.inner.lock().await;
            s.ensure_idle()?;
            let seq = match &s.frames {
                Some(seq) if !seq.is_empty() => Arc::clone(seq),
                _ => return Err(ReelError::state("no frames to encode; generate frames first")),
            };
            let session = open_session(s.container, &s.session_opts)?;
            let surface = s
                .surface
                .take()
                .ok_or_else(|| ReelError::state("no drawing surface available"))?;
            s.phase = Phase::Encoding;
            (surface, seq, session, s.encoder)
        };

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let encoded = match encoder.encode(surface, seq, session).await {
                Ok(replayed) => {
                    let mut s = inner.lock().await;
                    s.surface = Some(replayed.surface);
                    s.phase = Phase::Idle;
                    replayed.video.map(|video| publish(&mut s.videos, video))
                }
                Err(e) => {
                    tracing::error!(error = %e, "replay task failed; surface lost");
                    inner.lock().await.phase = Phase::Idle;
                    Err(e)
                }
            };
            encoded.inspect_err(|e| {
                tracing::error!(error = %e, "video creation failed");
            })
        });

        task.await
            .map_err(|e| ReelError::Other(anyhow::Error::new(e)))?
    }

    /// JPEG bytes of frame `index` of the current sequence.
    pub async fn frame(&self, index: u64) -> ReelResult<Arc<[u8]>> {
        let s = self.inner.lock().await;
        s.frames
            .as_ref()
            .and_then(|seq| seq.get(index))
            .map(|f| Arc::clone(&f.jpeg))
            .ok_or_else(|| ReelError::not_found(format!("no frame {index}")))
    }

    pub async fn video(&self, handle: VideoHandle) -> ReelResult<EncodedVideo> {
        let s = self.inner.lock().await;
        s.videos.get(handle).cloned()
    }

    pub async fn revoke_video(&self, handle: VideoHandle) -> ReelResult<()> {
        let mut s = self.inner.lock().await;
        s.videos.revoke(handle)
    }
}

fn publish(videos: &mut VideoStore, video: EncodedVideo) -> VideoSummary {
    let container = video.container;
    let bytes = video.len();
    let frames = video.frame_count;
    let fps = video.fps;
    let handle = videos.publish(video);
    tracing::info!(%handle, %container, bytes, "published video");
    VideoSummary {
        handle,
        url: handle.url(),
        container,
        bytes,
        frames,
        fps,
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
