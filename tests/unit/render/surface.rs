use super::*;

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

fn px(s: &Surface, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * s.canvas().width + x) * 4) as usize;
    let p = s.pixels();
    [p[i], p[i + 1], p[i + 2], p[i + 3]]
}

fn close(a: [u8; 4], b: [u8; 4], tol: i32) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (i32::from(*x) - i32::from(*y)).abs() <= tol)
}

#[test]
fn rejects_invalid_canvas() {
    assert!(
        Surface::new(
            Canvas {
                width: 63,
                height: 36
            },
            SurfaceOpts::default()
        )
        .is_err()
    );
    assert!(
        Surface::new(
            Canvas {
                width: 0,
                height: 0
            },
            SurfaceOpts::default()
        )
        .is_err()
    );
}

#[test]
fn painted_scene_is_opaque() {
    let mut s = small();
    s.paint_scene(&SceneFrame::at(0.2, None)).unwrap();
    assert!(s.pixels().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn circle_edges_stay_opaque_at_every_size() {
    for (width, height) in [(64, 36), (320, 180)] {
        let mut s = Surface::new(Canvas { width, height }, SurfaceOpts::default()).unwrap();
        for progress in [0.0, 0.25, 0.5, 0.9] {
            s.paint_scene(&SceneFrame::at(progress, None)).unwrap();
            let translucent = s.pixels().chunks_exact(4).filter(|p| p[3] != 255).count();
            assert_eq!(translucent, 0, "{width}x{height} at {progress}");
        }
    }
}

#[test]
fn gradient_runs_from_start_to_end_stop() {
    let mut s = small();
    s.paint_scene(&SceneFrame::at(0.0, None)).unwrap();
    // hsl(0, 70%, 50%) in the top-left corner, hsl(180, 70%, 30%) in the bottom-right.
    assert!(close(px(&s, 0, 0), [217, 38, 38, 255], 4), "{:?}", px(&s, 0, 0));
    assert!(
        close(px(&s, 63, 35), [23, 130, 130, 255], 4),
        "{:?}",
        px(&s, 63, 35)
    );
}

#[test]
fn circles_are_drawn_on_top_of_gradient() {
    let mut with = small();
    with.paint_scene(&SceneFrame::at(0.0, None)).unwrap();

    // Circle 0 sits at design (1360, 540) -> canvas (~45, 18) at frame 0.
    let mut without = small();
    let mut bare = SceneFrame::at(0.0, None);
    for c in bare.circles.iter_mut() {
        c.radius = 0.0;
    }
    without.paint_scene(&bare).unwrap();

    assert_ne!(px(&with, 45, 18), px(&without, 45, 18));
    assert_eq!(px(&with, 2, 2), px(&without, 2, 2));
}

#[test]
fn repainting_is_deterministic() {
    let mut a = small();
    let mut b = small();
    let scene = SceneFrame::at(0.61, None);
    a.paint_scene(&scene).unwrap();
    b.paint_scene(&scene).unwrap();
    assert_eq!(a.pixels(), b.pixels());

    // Painting over a different previous frame must not leave traces.
    b.paint_scene(&SceneFrame::at(0.1, None)).unwrap();
    b.paint_scene(&scene).unwrap();
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn draw_rgba8_replaces_content() {
    let mut s = small();
    s.paint_scene(&SceneFrame::at(0.3, None)).unwrap();

    let solid: Vec<u8> = [12u8, 200, 90, 255].repeat(64 * 36);
    s.draw_rgba8(&solid, 64, 36).unwrap();
    assert!(s.pixels().chunks_exact(4).all(|p| p == [12, 200, 90, 255]));

    let snap = s.snapshot();
    assert_eq!((snap.width, snap.height), (64, 36));
    assert!(snap.premultiplied);
    assert_eq!(snap.data, solid);
}

#[test]
fn draw_rgba8_rejects_size_mismatch() {
    let mut s = small();
    let err = s.draw_rgba8(&[0u8; 16], 2, 2).unwrap_err();
    assert!(matches!(err, ReelError::Render(_)));
}
