//! Timed replay of a synthesized sequence into a capture session.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encode::sink::{CaptureConfig, CaptureSession, EncodedVideo};
use crate::encode::still::decode_jpeg;
use crate::foundation::core::{FrameIndex, FrameRate};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::Surface;
use crate::synth::FrameSequence;

/// One step of a replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayStep {
    /// Draw frame `index`, hand the surface to the session, then wait `hold`.
    Draw { index: usize, hold: Duration },
    /// Finalize the session. Always the last step, emitted exactly once.
    EndOfStream,
}

/// Replay order for `len` frames at `fps`.
#[derive(Clone, Debug)]
pub struct ReplaySchedule {
    len: usize,
    hold: Duration,
    next: usize,
    ended: bool,
}

impl ReplaySchedule {
    pub fn new(len: usize, fps: FrameRate) -> Self {
        Self {
            len,
            hold: fps.frame_interval(),
            next: 0,
            ended: false,
        }
    }
}

impl Iterator for ReplaySchedule {
    type Item = ReplayStep;

    fn next(&mut self) -> Option<ReplayStep> {
        if self.next < self.len {
            let index = self.next;
            self.next += 1;
            return Some(ReplayStep::Draw {
                index,
                hold: self.hold,
            });
        }
        if self.ended {
            return None;
        }
        self.ended = true;
        Some(ReplayStep::EndOfStream)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.len - self.next) + usize::from(!self.ended);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ReplaySchedule {}

/// How replay waits between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pacing {
    /// Sleep `1/fps` after each draw (wall clock length matches the clip).
    #[default]
    Realtime,
    /// No waiting.
    Immediate,
}

/// Result of a replay. The surface and the session come back whether or not encoding worked.
pub struct Replayed<S> {
    pub surface: Surface,
    pub session: S,
    pub video: ReelResult<EncodedVideo>,
}

impl<S> Replayed<S> {
    fn failed(surface: Surface, session: S, err: ReelError) -> Self {
        Self {
            surface,
            session,
            video: Err(err),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StreamEncoder {
    pub pacing: Pacing,
}

impl StreamEncoder {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    /// Replay `seq` onto `surface` in index order while `session` records it.
    ///
    /// Decoding, drawing, capturing and finalizing run on the blocking pool one step at a time;
    /// only the pacing sleep happens on the async side. Any decode, draw or capture error aborts
    /// the replay and is returned in [`Replayed::video`]. The outer error means a blocking step
    /// panicked and took the surface with it.
    #[tracing::instrument(skip_all, fields(frames = seq.len(), fps = seq.params.fps.get(), container = %session.container()))]
    pub async fn encode<S>(
        &self,
        surface: Surface,
        seq: Arc<FrameSequence>,
        session: S,
    ) -> ReelResult<Replayed<S>>
    where
        S: CaptureSession + 'static,
    {
        if seq.is_empty() {
            return Ok(Replayed::failed(
                surface,
                session,
                ReelError::state("no frames to encode"),
            ));
        }
        let canvas = surface.canvas();
        if canvas != seq.canvas {
            let err = ReelError::validation(format!(
                "frame sequence is {}x{} but the surface is {}x{}",
                seq.canvas.width, seq.canvas.height, canvas.width, canvas.height
            ));
            return Ok(Replayed::failed(surface, session, err));
        }

        let cfg = CaptureConfig {
            width: canvas.width,
            height: canvas.height,
            fps: seq.params.fps,
        };
        let (mut surface, mut session, begun) =
            off_thread(surface, session, move |_, session| session.begin(cfg)).await?;
        if let Err(err) = begun {
            return Ok(Replayed::failed(surface, session, err));
        }

        for step in ReplaySchedule::new(seq.len(), cfg.fps) {
            match step {
                ReplayStep::Draw { index, hold } => {
                    let seq = Arc::clone(&seq);
                    let (s, sess, drawn) = off_thread(surface, session, move |surface, session| {
                        let still = decode_jpeg(&seq.frames()[index].jpeg)?;
                        surface.draw_rgba8(&still.rgba8, still.width, still.height)?;
                        session.capture(FrameIndex(index as u64), &surface.snapshot())
                    })
                    .await?;
                    surface = s;
                    session = sess;
                    if let Err(err) = drawn {
                        return Ok(Replayed::failed(surface, session, err));
                    }

                    if self.pacing == Pacing::Realtime {
                        tokio::time::sleep(hold).await;
                    } else {
                        tokio::task::yield_now().await;
                    }
                }
                ReplayStep::EndOfStream => {
                    let (surface, session, video) =
                        off_thread(surface, session, |_, session| session.finish()).await?;
                    if let Ok(video) = &video {
                        tracing::info!(bytes = video.len(), "encoded video");
                    }
                    return Ok(Replayed {
                        surface,
                        session,
                        video,
                    });
                }
            }
        }

        Ok(Replayed::failed(
            surface,
            session,
            ReelError::encode("replay ended without an end-of-stream step"),
        ))
    }
}

/// Run one replay step on the blocking pool, handing the surface and session back afterwards.
async fn off_thread<S, T, F>(
    mut surface: Surface,
    mut session: S,
    step: F,
) -> ReelResult<(Surface, S, ReelResult<T>)>
where
    S: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut Surface, &mut S) -> ReelResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let out = step(&mut surface, &mut session);
        (surface, session, out)
    })
    .await
    .map_err(|e| ReelError::Other(anyhow::Error::new(e)))
}

#[cfg(test)]
#[path = "../tests/unit/replay.rs"]
mod tests;
