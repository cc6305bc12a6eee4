use super::*;
use crate::encode::sink::{Container, InMemoryCapture};
use crate::foundation::core::Canvas;
use crate::render::surface::SurfaceOpts;
use crate::scene::params::AnimationParams;
use crate::synth::FrameSynthesizer;

fn small() -> Surface {
    Surface::new(
        Canvas {
            width: 32,
            height: 18,
        },
        SurfaceOpts::default(),
    )
    .unwrap()
}

fn sequence(surface: &mut Surface) -> Arc<FrameSequence> {
    let seq = FrameSynthesizer::default()
        .synthesize(
            Some(surface),
            &AnimationParams::new(None, 1, FrameRate::Fps15),
        )
        .unwrap();
    Arc::new(seq)
}

#[test]
fn schedule_draws_in_order_then_ends_once() {
    let steps: Vec<_> = ReplaySchedule::new(3, FrameRate::Fps30).collect();
    let hold = FrameRate::Fps30.frame_interval();
    assert_eq!(
        steps,
        vec![
            ReplayStep::Draw { index: 0, hold },
            ReplayStep::Draw { index: 1, hold },
            ReplayStep::Draw { index: 2, hold },
            ReplayStep::EndOfStream,
        ]
    );
}

#[test]
fn empty_schedule_still_ends() {
    let mut s = ReplaySchedule::new(0, FrameRate::Fps60);
    assert_eq!(s.len(), 1);
    assert_eq!(s.next(), Some(ReplayStep::EndOfStream));
    assert_eq!(s.next(), None);
}

#[tokio::test]
async fn replay_feeds_every_frame_in_order() {
    let mut surface = small();
    let seq = sequence(&mut surface);

    let out = StreamEncoder::new(Pacing::Immediate)
        .encode(surface, Arc::clone(&seq), InMemoryCapture::new())
        .await
        .unwrap();
    let video = out.video.unwrap();
    let capture = out.session;

    assert_eq!(video.container, Container::Raw);
    assert_eq!(video.frame_count, 15);
    assert_eq!(video.fps, FrameRate::Fps15);
    let indices: Vec<u64> = capture.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, (0..15).collect::<Vec<_>>());

    // Captured content is the decoded still that was drawn.
    let still = decode_jpeg(&seq.frames()[4].jpeg).unwrap();
    let captured = &capture.frames()[4].1;
    let max_diff = still
        .rgba8
        .iter()
        .zip(captured.data.iter())
        .map(|(a, b)| (i32::from(*a) - i32::from(*b)).abs())
        .max()
        .unwrap();
    assert!(max_diff <= 2, "max_diff={max_diff}");
}

#[tokio::test(start_paused = true)]
async fn realtime_pacing_holds_each_frame() {
    let mut surface = small();
    let seq = sequence(&mut surface);

    let started = tokio::time::Instant::now();
    StreamEncoder::new(Pacing::Realtime)
        .encode(surface, seq, InMemoryCapture::new())
        .await
        .unwrap()
        .video
        .unwrap();
    let elapsed = started.elapsed();

    let expected = FrameRate::Fps15.frame_interval() * 15;
    assert!(elapsed >= expected, "elapsed={elapsed:?}");
}

#[tokio::test]
async fn empty_sequence_is_rejected() {
    let surface = small();
    let seq = Arc::new(FrameSequence::empty(
        AnimationParams::default(),
        surface.canvas(),
    ));
    let out = StreamEncoder::default()
        .encode(surface, seq, InMemoryCapture::new())
        .await
        .unwrap();
    assert!(matches!(out.video.unwrap_err(), ReelError::State(_)));
    assert!(out.session.frames().is_empty());
}

#[tokio::test]
async fn canvas_mismatch_is_rejected() {
    let other = Surface::new(
        Canvas {
            width: 16,
            height: 16,
        },
        SurfaceOpts::default(),
    )
    .unwrap();
    let seq = sequence(&mut small());
    let out = StreamEncoder::new(Pacing::Immediate)
        .encode(other, seq, InMemoryCapture::new())
        .await
        .unwrap();
    assert!(matches!(out.video.unwrap_err(), ReelError::Validation(_)));
    assert_eq!(out.surface.canvas().width, 16);
}

/// Session that fails on a chosen frame and remembers what it saw.
#[derive(Default)]
struct FailingCapture {
    fail_at: u64,
    seen: Vec<u64>,
    finished: bool,
}

impl CaptureSession for FailingCapture {
    fn container(&self) -> Container {
        Container::Raw
    }

    fn begin(&mut self, _cfg: CaptureConfig) -> ReelResult<()> {
        Ok(())
    }

    fn capture(&mut self, idx: FrameIndex, _frame: &crate::render::surface::FrameRGBA) -> ReelResult<()> {
        if idx.0 == self.fail_at {
            return Err(ReelError::encode("session refused the frame"));
        }
        self.seen.push(idx.0);
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<EncodedVideo> {
        self.finished = true;
        Err(ReelError::encode("unreachable"))
    }
}

#[tokio::test]
async fn capture_error_aborts_and_hands_back_the_surface() {
    let mut surface = small();
    let seq = sequence(&mut surface);
    let session = FailingCapture {
        fail_at: 3,
        ..FailingCapture::default()
    };

    let out = StreamEncoder::new(Pacing::Immediate)
        .encode(surface, seq, session)
        .await
        .unwrap();

    let err = out.video.unwrap_err();
    assert!(err.to_string().contains("session refused the frame"), "{err}");
    assert_eq!(out.session.seen, vec![0, 1, 2]);
    assert!(!out.session.finished);
    assert_eq!(out.surface.canvas().width, 32);
}

#[tokio::test]
async fn boxed_sessions_replay_like_concrete_ones() {
    let mut surface = small();
    let seq = sequence(&mut surface);
    let session: Box<dyn CaptureSession> = Box::new(InMemoryCapture::new());

    let out = StreamEncoder::new(Pacing::Immediate)
        .encode(surface, seq, session)
        .await
        .unwrap();
    assert_eq!(out.session.container(), Container::Raw);
    assert_eq!(out.video.unwrap().frame_count, 15);
}
