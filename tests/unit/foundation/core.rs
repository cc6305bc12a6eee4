use super::*;

#[test]
fn frame_rate_accepts_only_enumerated_values() {
    for fps in [15, 24, 30, 60] {
        assert_eq!(FrameRate::new(fps).unwrap().get(), fps);
    }
    for fps in [0, 1, 25, 29, 120] {
        assert!(FrameRate::new(fps).is_err());
    }
}

#[test]
fn frame_rate_serializes_as_integer() {
    let json = serde_json::to_string(&FrameRate::Fps24).unwrap();
    assert_eq!(json, "24");
    let fps: FrameRate = serde_json::from_str("60").unwrap();
    assert_eq!(fps, FrameRate::Fps60);
    assert!(serde_json::from_str::<FrameRate>("25").is_err());
}

#[test]
fn frame_interval_matches_rate() {
    assert_eq!(FrameRate::Fps15.frame_interval().as_micros(), 66_666);
    assert_eq!(FrameRate::Fps60.frame_interval().as_micros(), 16_666);
}

#[test]
fn canvas_validation_catches_bad_values() {
    assert!(Canvas::default().validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 11,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .validate()
        .is_err()
    );
}
