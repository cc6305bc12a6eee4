use super::*;
use crate::encode::still::decode_jpeg;
use crate::foundation::core::FrameRate;
use crate::render::surface::SurfaceOpts;

fn small() -> Surface {
    Surface::new(
        Canvas {
            width: 64,
            height: 36,
        },
        SurfaceOpts::default(),
    )
    .unwrap()
}

fn params() -> AnimationParams {
    AnimationParams::new(None, 1, FrameRate::Fps15)
}

#[test]
fn sequence_length_is_duration_times_fps() {
    let mut s = small();
    let seq = FrameSynthesizer::default()
        .synthesize(Some(&mut s), &params())
        .unwrap();

    assert_eq!(seq.len(), 15);
    assert_eq!(seq.canvas, s.canvas());
    for (i, f) in seq.frames().iter().enumerate() {
        assert_eq!(f.index, FrameIndex(i as u64));
        assert_eq!(&f.jpeg[..2], &[0xFF, 0xD8]);
    }
    let still = decode_jpeg(&seq.frames()[0].jpeg).unwrap();
    assert_eq!((still.width, still.height), (64, 36));
}

#[test]
fn synthesis_is_deterministic() {
    let synth = FrameSynthesizer::default();
    let a = synth.synthesize(Some(&mut small()), &params()).unwrap();
    let b = synth.synthesize(Some(&mut small()), &params()).unwrap();
    assert_eq!(a.frames(), b.frames());
    assert_ne!(a.frames()[0].jpeg, a.frames()[7].jpeg);
}

#[test]
fn missing_surface_yields_empty_sequence() {
    let seq = FrameSynthesizer::default()
        .synthesize(None, &params())
        .unwrap();
    assert!(seq.is_empty());
    assert!(seq.get(0).is_none());
}

#[test]
fn surface_is_left_on_last_frame() {
    let synth = FrameSynthesizer::default();
    let mut s = small();
    let seq = synth.synthesize(Some(&mut s), &params()).unwrap();
    let after_run = encode_jpeg(&s.snapshot(), synth.jpeg_quality).unwrap();
    assert_eq!(&after_run[..], &seq.frames()[14].jpeg[..]);
}

#[test]
fn synthesize_one_rejects_out_of_range_index() {
    let err = FrameSynthesizer::default()
        .synthesize_one(&mut small(), &params(), 15)
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
}

#[test]
fn quality_is_validated() {
    assert!(FrameSynthesizer::new(0).is_err());
    assert!(FrameSynthesizer::new(101).is_err());
    assert_eq!(FrameSynthesizer::new(55).unwrap().jpeg_quality, 55);
}
