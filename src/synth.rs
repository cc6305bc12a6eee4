//! Frame synthesis: paint every frame of an animation and snapshot it as a JPEG still.

use std::sync::Arc;

use crate::encode::still::{DEFAULT_JPEG_QUALITY, encode_jpeg};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::Surface;
use crate::scene::motion::SceneFrame;
use crate::scene::params::AnimationParams;

/// One encoded still.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: FrameIndex,
    /// Baseline JPEG bytes.
    pub jpeg: Arc<[u8]>,
}

/// Ordered stills produced from one set of [`AnimationParams`].
#[derive(Clone, Debug)]
pub struct FrameSequence {
    pub params: AnimationParams,
    pub canvas: Canvas,
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn empty(params: AnimationParams, canvas: Canvas) -> Self {
        Self {
            params,
            canvas,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&Frame> {
        usize::try_from(index).ok().and_then(|i| self.frames.get(i))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FrameSynthesizer {
    pub jpeg_quality: u8,
}

impl Default for FrameSynthesizer {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl FrameSynthesizer {
    pub fn new(jpeg_quality: u8) -> ReelResult<Self> {
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ReelError::validation("jpeg quality must be within 1..=100"));
        }
        Ok(Self { jpeg_quality })
    }

    /// Paint and snapshot `params.total_frames()` frames in index order.
    ///
    /// Without a surface nothing is drawn and the sequence is empty. Any failure discards the
    /// frames produced so far. The surface is left showing the last frame.
    #[tracing::instrument(skip(self, surface, params), fields(fps = params.fps.get(), duration = params.duration_secs()))]
    pub fn synthesize(
        &self,
        surface: Option<&mut Surface>,
        params: &AnimationParams,
    ) -> ReelResult<FrameSequence> {
        let Some(surface) = surface else {
            tracing::warn!("no drawing surface; returning an empty frame sequence");
            return Ok(FrameSequence::empty(params.clone(), Canvas::default()));
        };

        let total = params.total_frames();
        let mut frames = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        for i in 0..total {
            let frame = self.synthesize_one(surface, params, i)?;
            frames.push(frame);
        }
        tracing::info!(frames = frames.len(), "synthesized frame sequence");

        Ok(FrameSequence {
            params: params.clone(),
            canvas: surface.canvas(),
            frames,
        })
    }

    /// Paint frame `index` and return its JPEG still.
    pub fn synthesize_one(
        &self,
        surface: &mut Surface,
        params: &AnimationParams,
        index: u64,
    ) -> ReelResult<Frame> {
        let total = params.total_frames();
        if index >= total {
            return Err(ReelError::validation(format!(
                "frame {index} is out of range (sequence has {total} frames)"
            )));
        }
        let scene = SceneFrame::at(params.progress(index), params.overlay_text());
        surface.paint_scene(&scene)?;
        let jpeg = encode_jpeg(&surface.snapshot(), self.jpeg_quality)?;
        Ok(Frame {
            index: FrameIndex(index),
            jpeg: jpeg.into(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/synth.rs"]
mod tests;
