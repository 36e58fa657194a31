use super::*;
use crate::editor::state::LayerEdit;
use crate::scene::{ImageSource, ImageId, SlideId};

fn canvas() -> Canvas {
    Canvas {
        width: 1080,
        height: 1920,
    }
}

fn text_layer() -> Layer {
    Layer::text(SlideId::new(), 0)
}

fn image_layer() -> Layer {
    Layer::image(
        SlideId::new(),
        0,
        ImageSource::Specific {
            image_id: ImageId::new(),
        },
    )
}

#[test]
fn drag_converts_pixel_deltas_through_the_render_scale() {
    let layer = text_layer(); // starts at 50/50
    let gesture = DragGesture::begin(&layer);

    // at 0.5x zoom the canvas is 540 px wide; 54 px is 10% of it
    let edit = gesture.update(54.0, -96.0, canvas(), 0.5);
    let LayerEdit::Move { x, y } = edit else {
        panic!("expected move edit");
    };
    assert!((x - 60.0).abs() < 1e-9);
    assert!((y - 40.0).abs() < 1e-9);
}

#[test]
fn drag_clamps_to_the_permissive_offcanvas_range() {
    let layer = text_layer();
    let gesture = DragGesture::begin(&layer);

    let LayerEdit::Move { x, y } = gesture.update(-1_000_000.0, 1_000_000.0, canvas(), 1.0) else {
        panic!("expected move edit");
    };
    assert_eq!(x, -100.0);
    assert_eq!(y, 200.0);
}

#[test]
fn corner_resize_scales_both_axes_by_twice_the_delta() {
    let layer = image_layer(); // 50 x 50
    let gesture = ResizeGesture::begin(&layer, ResizeHandle::BottomRight);

    // +108 px on a 1080-wide canvas is +10%; center anchor doubles it
    let LayerEdit::Resize { width, height } = gesture.update(108.0, 192.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert!((width - 70.0).abs() < 1e-9);
    assert!((height.unwrap() - 70.0).abs() < 1e-9);
}

#[test]
fn top_left_corner_grows_outward_with_negative_deltas() {
    let layer = image_layer();
    let gesture = ResizeGesture::begin(&layer, ResizeHandle::TopLeft);

    let LayerEdit::Resize { width, height } = gesture.update(-108.0, -192.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert!((width - 70.0).abs() < 1e-9);
    assert!((height.unwrap() - 70.0).abs() < 1e-9);
}

#[test]
fn edge_handles_scale_one_axis_only() {
    let layer = image_layer();

    let right = ResizeGesture::begin(&layer, ResizeHandle::Right);
    let LayerEdit::Resize { width, height } = right.update(108.0, 500.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert!((width - 70.0).abs() < 1e-9);
    assert_eq!(height, Some(50.0));

    let bottom = ResizeGesture::begin(&layer, ResizeHandle::Bottom);
    let LayerEdit::Resize { width, height } = bottom.update(500.0, 192.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert_eq!(width, 50.0);
    assert!((height.unwrap() - 70.0).abs() < 1e-9);
}

#[test]
fn text_layers_resize_in_width_only() {
    let layer = text_layer();
    let gesture = ResizeGesture::begin(&layer, ResizeHandle::BottomRight);

    let LayerEdit::Resize { width, height } = gesture.update(108.0, 999.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert!((width - 100.0).abs() < 1e-9);
    assert_eq!(height, None);
}

#[test]
fn resize_clamps_dimensions() {
    let layer = image_layer();
    let gesture = ResizeGesture::begin(&layer, ResizeHandle::Left);

    let LayerEdit::Resize { width, .. } = gesture.update(10_000.0, 0.0, canvas(), 1.0) else {
        panic!("expected resize edit");
    };
    assert_eq!(width, 5.0);
}

#[test]
fn all_eight_handles_exist_with_four_corners() {
    assert_eq!(ResizeHandle::all().len(), 8);
    assert_eq!(
        ResizeHandle::all().iter().filter(|h| h.is_corner()).count(),
        4
    );
}

#[test]
fn text_draft_buffers_do_not_touch_the_layer_until_commit() {
    let mut layer = text_layer();
    layer.as_text_mut().unwrap().text_content = "committed".to_owned();

    let mut draft = TextDraft::begin(&layer).unwrap();
    draft.set("typing in progress");
    assert_eq!(draft.as_str(), "typing in progress");
    assert_eq!(layer.as_text().unwrap().text_content, "committed");

    let (id, edit) = draft.commit();
    assert_eq!(id, layer.id);
    let LayerEdit::SetText { text } = edit else {
        panic!("expected text edit");
    };
    assert_eq!(text, "typing in progress");
}

#[test]
fn text_draft_cancel_discards_and_image_layers_get_no_draft() {
    let layer = text_layer();
    let draft = TextDraft::begin(&layer).unwrap();
    draft.cancel();

    assert!(TextDraft::begin(&image_layer()).is_none());
}
