use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn first_frame_layout() {
    let s = SceneFrame::at(0.0, None);
    assert!(approx(s.background.hue_start, 0.0));
    assert!(approx(s.background.hue_end, 180.0));
    assert!(s.text.is_none());

    // j = 0 starts on the +x axis of the orbit ellipse.
    let c0 = s.circles[0];
    assert!(approx(c0.center.x, 960.0 + 400.0));
    assert!(approx(c0.center.y, 540.0));
    assert!(approx(c0.radius, 50.0));
    assert!(approx(c0.color.a, 0.5));
}

#[test]
fn hue_rotates_once_per_animation() {
    let half = gradient_at(0.5);
    assert!(approx(half.hue_start, 180.0));
    assert!(approx(half.hue_end, 0.0));

    let quarter = gradient_at(0.25);
    assert!(approx(quarter.hue_start, 90.0));
    assert!(approx(quarter.hue_end, 270.0));
}

#[test]
fn circles_are_evenly_phase_offset() {
    let s = SceneFrame::at(0.0, None);
    for (j, c) in s.circles.iter().enumerate() {
        let angle = j as f64 * std::f64::consts::TAU / 5.0;
        assert!(approx(c.center.x, 960.0 + angle.cos() * 400.0));
        assert!(approx(c.center.y, 540.0 + angle.sin() * 300.0));
    }
}

#[test]
fn circles_complete_three_revolutions() {
    // After a third of the animation each circle is back where it started.
    let a = orbit_circle_at(0.0, 2, 0.0);
    let b = orbit_circle_at(1.0 / 3.0, 2, 0.0);
    assert!((a.center.x - b.center.x).abs() < 1e-6);
    assert!((a.center.y - b.center.y).abs() < 1e-6);
}

#[test]
fn circle_radius_stays_within_swing() {
    for i in 0..90 {
        let s = SceneFrame::at(i as f64 / 90.0, None);
        for c in s.circles {
            assert!(c.radius >= 20.0 - 1e-9 && c.radius <= 80.0 + 1e-9);
        }
    }
}

#[test]
fn text_pulses_around_base_size() {
    let s = SceneFrame::at(0.25, Some("Hello"));
    let t = s.text.unwrap();
    assert_eq!(t.text, "Hello");
    assert!(approx(t.font_size, 140.0));
    assert!(approx(t.center.x, 960.0));
    assert!(approx(t.center.y, 540.0));
    assert!(approx(t.shadow.sigma(), 10.0));

    let s = SceneFrame::at(0.75, Some("Hello"));
    assert!(approx(s.text.unwrap().font_size, 100.0));
}

#[test]
fn empty_text_is_not_drawn() {
    assert!(SceneFrame::at(0.1, Some("")).text.is_none());
}

#[test]
fn evaluation_is_deterministic() {
    assert_eq!(
        SceneFrame::at(0.37, Some("x")),
        SceneFrame::at(0.37, Some("x"))
    );
}
