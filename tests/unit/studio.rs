use super::*;
use crate::render::surface::SurfaceOpts;
use crate::replay::Pacing;

fn cfg(pacing: Pacing) -> ReelConfig {
    ReelConfig {
        canvas: Canvas {
            width: 32,
            height: 18,
        },
        container: Container::Gif,
        pacing,
        ..ReelConfig::default()
    }
}

fn studio(pacing: Pacing) -> StudioHandle {
    StudioHandle::from_config(&cfg(pacing)).unwrap()
}

fn short() -> AnimationParams {
    AnimationParams::new(None, 1, FrameRate::Fps15)
}

#[tokio::test]
async fn generate_frames_then_preview() {
    let h = studio(Pacing::Immediate);
    let summary = h.generate_frames(short()).await.unwrap();
    assert_eq!(summary.frames, 15);
    assert_eq!(summary.duration, 1);

    let state = h.state().await;
    assert_eq!(state.frames, 15);
    assert_eq!(state.phase, Phase::Idle);
    assert!(!state.generating);
    assert_eq!(state.params, short());

    let jpeg = h.frame(3).await.unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert!(matches!(h.frame(15).await, Err(ReelError::NotFound(_))));
}

#[tokio::test]
async fn create_video_requires_frames() {
    let h = studio(Pacing::Immediate);
    let err = h.create_video().await.unwrap_err();
    assert!(matches!(err, ReelError::State(_)));
    assert!(!h.state().await.generating);
}

#[tokio::test]
async fn create_video_publishes_a_clip() {
    let h = studio(Pacing::Immediate);
    h.generate_frames(short()).await.unwrap();
    let summary = h.create_video().await.unwrap();

    assert_eq!(summary.container, Container::Gif);
    assert_eq!(summary.frames, 15);
    assert_eq!(summary.fps, FrameRate::Fps15);
    assert_eq!(summary.url, summary.handle.url());

    let video = h.video(summary.handle).await.unwrap();
    assert_eq!(&video.bytes[..6], b"GIF89a");
    assert_eq!(video.len(), summary.bytes);
    assert_eq!(h.state().await.video, Some(summary.handle));
}

#[tokio::test]
async fn new_frames_revoke_the_current_video() {
    let h = studio(Pacing::Immediate);
    h.generate_frames(short()).await.unwrap();
    let first = h.create_video().await.unwrap().handle;

    h.generate_frames(AnimationParams::new(None, 2, FrameRate::Fps15))
        .await
        .unwrap();
    assert!(h.video(first).await.is_err());
    assert_eq!(h.state().await.video, None);

    let second = h.create_video().await.unwrap();
    assert_ne!(second.handle, first);
    assert_eq!(second.frames, 30);
}

#[tokio::test]
async fn revoke_video_releases_the_handle() {
    let h = studio(Pacing::Immediate);
    h.generate_frames(short()).await.unwrap();
    let handle = h.create_video().await.unwrap().handle;

    h.revoke_video(handle).await.unwrap();
    assert!(matches!(h.video(handle).await, Err(ReelError::NotFound(_))));
    assert!(h.revoke_video(handle).await.is_err());
}

#[tokio::test]
async fn missing_surface_generates_nothing_and_stays_idle() {
    let h = StudioHandle::with_surface(&cfg(Pacing::Immediate), None).unwrap();
    let summary = h.generate_frames(short()).await.unwrap();
    assert_eq!(summary.frames, 0);

    let state = h.state().await;
    assert_eq!(state.frames, 0);
    assert!(!state.generating);
    assert!(matches!(h.create_video().await, Err(ReelError::State(_))));
}

/// WebM studio whose encode always fails: either ffmpeg is missing or its scratch dir sits
/// under a regular file.
fn failing_webm_studio() -> StudioHandle {
    let cfg = ReelConfig {
        container: Container::WebM,
        scratch_dir: Some(std::path::PathBuf::from("Cargo.toml").join("scratch")),
        ..cfg(Pacing::Immediate)
    };
    StudioHandle::from_config(&cfg).unwrap()
}

#[tokio::test]
async fn failed_encode_clears_the_flag_and_returns_the_surface() {
    let h = failing_webm_studio();
    h.generate_frames(short()).await.unwrap();

    let err = h.create_video().await.unwrap_err();
    assert!(matches!(err, ReelError::Encode(_)), "{err}");

    let state = h.state().await;
    assert_eq!(state.phase, Phase::Idle);
    assert!(!state.generating);
    assert_eq!(state.frames, 15);
    assert_eq!(state.video, None);

    // The surface is back: a retry reaches the encoder again instead of a 409.
    assert!(matches!(h.create_video().await, Err(ReelError::Encode(_))));
    assert_eq!(h.generate_frames(short()).await.unwrap().frames, 15);
}

#[tokio::test(start_paused = true)]
async fn requests_during_replay_are_rejected() {
    let h = studio(Pacing::Realtime);
    h.generate_frames(short()).await.unwrap();

    let running = tokio::spawn({
        let h = h.clone();
        async move { h.create_video().await }
    });
    for _ in 0..1000 {
        if h.state().await.phase == Phase::Encoding {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(h.state().await.generating);
    assert!(matches!(
        h.generate_frames(short()).await,
        Err(ReelError::State(_))
    ));
    assert!(matches!(h.create_video().await, Err(ReelError::State(_))));

    running.await.unwrap().unwrap();
    assert_eq!(h.state().await.phase, Phase::Idle);
}

#[test]
fn surface_canvas_wins_over_config() {
    let surface = Surface::new(
        Canvas {
            width: 16,
            height: 16,
        },
        SurfaceOpts::default(),
    )
    .unwrap();
    let h = StudioHandle::with_surface(&cfg(Pacing::Immediate), Some(surface)).unwrap();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let state = rt.block_on(h.state());
    assert_eq!(state.canvas.width, 16);
}
