use super::*;

#[test]
fn scale_for_width_is_ratio_to_template_width() {
    let canvas = Canvas::new(1080, 1920).unwrap();
    assert!((canvas.scale_for_width(540.0) - 0.5).abs() < 1e-12);
    assert!((canvas.scale_for_width(1080.0) - 1.0).abs() < 1e-12);
}

#[test]
fn fill_scale_keeps_whole_canvas_inside_container() {
    let canvas = Canvas::new(1080, 1920).unwrap();

    // Tall container: width-constrained.
    let s = canvas.fill_scale(270.0, 10_000.0);
    assert!((s - 0.25).abs() < 1e-12);

    // Wide container: height-constrained.
    let s = canvas.fill_scale(10_000.0, 960.0);
    assert!((s - 0.5).abs() < 1e-12);

    // The fitted canvas never exceeds the container on either axis.
    let s = canvas.fill_scale(300.0, 400.0);
    assert!(f64::from(canvas.width) * s <= 300.0 + 1e-9);
    assert!(f64::from(canvas.height) * s <= 400.0 + 1e-9);
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 100).is_err());
    assert!(Canvas::new(100, 0).is_err());
}

#[test]
fn center_anchor_round_trip_at_any_scale() {
    let canvas = Canvas::new(1080, 1920).unwrap();
    let frame = LayerFrame {
        x: 50.0,
        y: 50.0,
        width: 30.0,
        height: Some(20.0),
    };

    for scale in [0.5, 1.0, 1.7] {
        let rect = frame.display_rect(canvas, scale).unwrap();
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        assert!((cx - 0.5 * f64::from(canvas.width) * scale).abs() < 1e-9);
        assert!((cy - 0.5 * f64::from(canvas.height) * scale).abs() < 1e-9);
    }
}

#[test]
fn intrinsic_height_rect_centers_measured_height_on_anchor() {
    let canvas = Canvas::new(1080, 1920).unwrap();
    let frame = LayerFrame {
        x: 50.0,
        y: 90.0,
        width: 80.0,
        height: None,
    };

    assert!(frame.display_rect(canvas, 1.0).is_none());

    let rect = frame.rect_with_height(canvas, 1.0, 60.0);
    // left = (50 - 80/2)% of 1080 = 108 px.
    assert!((rect.x0 - 108.0).abs() < 1e-9);
    assert!((rect.width() - 0.8 * 1080.0).abs() < 1e-9);
    // the measured height centers on y = 90% of 1920.
    let cy = (rect.y0 + rect.y1) / 2.0;
    assert!((cy - 0.9 * 1920.0).abs() < 1e-9);
    assert!((rect.height() - 60.0).abs() < 1e-9);
}

#[test]
fn clamps_are_permissive_but_bounded() {
    assert_eq!(clamp_position_pct(-150.0), POSITION_PCT_MIN);
    assert_eq!(clamp_position_pct(250.0), POSITION_PCT_MAX);
    assert_eq!(clamp_position_pct(-40.0), -40.0);

    assert_eq!(clamp_size_pct(1.0), SIZE_PCT_MIN);
    assert_eq!(clamp_size_pct(2000.0), SIZE_PCT_MAX);
    assert_eq!(clamp_size_pct(80.0), 80.0);
}

#[test]
fn scaled_px_converts_template_metrics() {
    assert!((scaled_px(48.0, 0.5) - 24.0).abs() < 1e-12);
    assert!((scaled_px(48.0, 1.0) - 48.0).abs() < 1e-12);
}
