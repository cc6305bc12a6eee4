use super::*;

#[test]
fn duration_is_clamped_into_range() {
    assert_eq!(clamp_duration_secs(0), 1);
    assert_eq!(clamp_duration_secs(-4), 1);
    assert_eq!(clamp_duration_secs(1), 1);
    assert_eq!(clamp_duration_secs(7), 7);
    assert_eq!(clamp_duration_secs(10), 10);
    assert_eq!(clamp_duration_secs(11), 10);

    assert_eq!(
        AnimationParams::new(None, 0, FrameRate::Fps30).duration_secs(),
        1
    );
    assert_eq!(
        AnimationParams::new(None, 11, FrameRate::Fps30).duration_secs(),
        10
    );
}

#[test]
fn total_frames_is_duration_times_rate() {
    for d in 1..=10 {
        for fps in FrameRate::ALL {
            let p = AnimationParams::new(None, d, fps);
            assert_eq!(p.total_frames(), (d as u64) * u64::from(fps.get()));
        }
    }
}

#[test]
fn progress_is_normalized() {
    let p = AnimationParams::new(None, 1, FrameRate::Fps15);
    assert_eq!(p.progress(0), 0.0);
    assert!((p.progress(14) - 14.0 / 15.0).abs() < 1e-12);
}

#[test]
fn empty_text_means_no_overlay() {
    let p = AnimationParams::new(Some(String::new()), 3, FrameRate::Fps24);
    assert_eq!(p.overlay_text(), None);
    let p = AnimationParams::new(Some("hi".to_string()), 3, FrameRate::Fps24);
    assert_eq!(p.overlay_text(), Some("hi"));
}

#[test]
fn defaults_match_initial_controls() {
    let p = AnimationParams::default();
    assert_eq!(p.duration_secs(), 3);
    assert_eq!(p.fps, FrameRate::Fps30);
    assert_eq!(p.total_frames(), 90);
}

#[test]
fn deserialization_clamps_duration() {
    let p: AnimationParams =
        serde_json::from_str(r#"{"text":null,"duration_secs":42,"fps":60}"#).unwrap();
    assert_eq!(p.duration_secs(), 10);
    assert_eq!(p.total_frames(), 600);
}
