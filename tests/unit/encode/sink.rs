use super::*;

fn cfg() -> CaptureConfig {
    CaptureConfig {
        width: 2,
        height: 2,
        fps: FrameRate::Fps15,
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

#[test]
fn in_memory_capture_concatenates_frames_in_order() {
    let mut s = InMemoryCapture::new();
    s.begin(cfg()).unwrap();
    s.capture(FrameIndex(0), &frame(1)).unwrap();
    s.capture(FrameIndex(1), &frame(2)).unwrap();
    let video = s.finish().unwrap();

    assert_eq!(video.container, Container::Raw);
    assert_eq!(video.frame_count, 2);
    assert_eq!(video.len(), 32);
    assert!(video.bytes[..16].iter().all(|&b| b == 1));
    assert!(video.bytes[16..].iter().all(|&b| b == 2));
    assert_eq!(s.frames().len(), 2);
}

#[test]
fn capture_rejects_out_of_order_frames() {
    let mut s = InMemoryCapture::new();
    s.begin(cfg()).unwrap();
    s.capture(FrameIndex(3), &frame(0)).unwrap();
    assert!(s.capture(FrameIndex(3), &frame(0)).is_err());
    assert!(s.capture(FrameIndex(1), &frame(0)).is_err());
}

#[test]
fn capture_requires_begin_and_matching_size() {
    let mut s = InMemoryCapture::new();
    assert!(s.capture(FrameIndex(0), &frame(0)).is_err());
    assert!(s.finish().is_err());

    s.begin(cfg()).unwrap();
    let wrong = FrameRGBA {
        width: 4,
        height: 1,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(s.capture(FrameIndex(0), &wrong).is_err());
}

#[test]
fn container_metadata() {
    assert_eq!(Container::default(), Container::WebM);
    assert_eq!(Container::WebM.mime(), "video/webm");
    assert_eq!(Container::Mp4.extension(), "mp4");
    assert!(Container::Mp4.needs_ffmpeg());
    assert!(!Container::Gif.needs_ffmpeg());
    let c: Container = serde_json::from_str("\"gif\"").unwrap();
    assert_eq!(c, Container::Gif);
}
