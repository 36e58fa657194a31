use super::*;
use crate::scene::{AspectRatio, ImageSource, ImageId, OrgId, Template};

fn open_with_slides(n: u32) -> EditorState {
    let template = Template::new(OrgId::new(), "test", AspectRatio::NineBySixteen);
    let slides: Vec<Slide> = (0..n).map(|i| Slide::new(template.id, i)).collect();
    EditorState::new(template, slides, Vec::new()).unwrap()
}

#[test]
fn add_slide_appends_and_selects() {
    let mut state = open_with_slides(2);
    state.apply(EditorAction::AddSlide).unwrap();

    assert_eq!(state.slides().len(), 3);
    assert_eq!(state.slides()[2].position, 2);
    assert_eq!(state.selected_slide(), Some(state.slides()[2].id));
    assert!(state.is_dirty());
}

#[test]
fn delete_second_of_three_renumbers_densely() {
    let mut state = open_with_slides(3);
    let ids: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();

    state
        .apply(EditorAction::DeleteSlide { slide: ids[1] })
        .unwrap();

    let positions: Vec<u32> = state.slides().iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0, 1]);
    // prior relative order preserved
    let remaining: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![ids[0], ids[2]]);
}

#[test]
fn delete_selected_slide_falls_back_to_first_remaining() {
    let mut state = open_with_slides(3);
    let ids: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();
    state
        .apply(EditorAction::SelectSlide { slide: Some(ids[1]) })
        .unwrap();

    state
        .apply(EditorAction::DeleteSlide { slide: ids[1] })
        .unwrap();
    assert_eq!(state.selected_slide(), Some(ids[0]));

    state
        .apply(EditorAction::DeleteSlide { slide: ids[0] })
        .unwrap();
    state
        .apply(EditorAction::DeleteSlide { slide: ids[2] })
        .unwrap();
    assert_eq!(state.selected_slide(), None);
}

#[test]
fn duplicate_slide_is_isolated_from_the_original() {
    let mut state = open_with_slides(2);
    let original = state.slides()[0].id;
    state
        .apply(EditorAction::AddTextLayer { slide: original })
        .unwrap();
    let original_layer = state.layers_for(original)[0].id;
    state
        .apply(EditorAction::UpdateLayer {
            layer: original_layer,
            edit: LayerEdit::SetText {
                text: "original".to_owned(),
            },
        })
        .unwrap();

    state
        .apply(EditorAction::DuplicateSlide { slide: original })
        .unwrap();
    let copy = state.selected_slide().unwrap();
    assert_ne!(copy, original);
    // appended past the current maximum position
    assert_eq!(
        state.slides().iter().find(|s| s.id == copy).unwrap().position,
        2
    );

    let copy_layer = state.layers_for(copy)[0].id;
    assert_ne!(copy_layer, original_layer);

    state
        .apply(EditorAction::UpdateLayer {
            layer: copy_layer,
            edit: LayerEdit::SetText {
                text: "mutated copy".to_owned(),
            },
        })
        .unwrap();

    let original_text = state
        .layer(original_layer)
        .unwrap()
        .as_text()
        .unwrap()
        .text_content
        .clone();
    assert_eq!(original_text, "original");
}

#[test]
fn reorder_with_current_order_is_a_noop_on_positions() {
    let mut state = open_with_slides(3);
    let order: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();
    let before: Vec<(SlideId, u32)> = state.slides().iter().map(|s| (s.id, s.position)).collect();

    state.apply(EditorAction::ReorderSlides { order }).unwrap();

    let after: Vec<(SlideId, u32)> = state.slides().iter().map(|s| (s.id, s.position)).collect();
    assert_eq!(before, after);
}

#[test]
fn reorder_assigns_positions_from_the_given_ordering() {
    let mut state = open_with_slides(3);
    let ids: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();

    state
        .apply(EditorAction::ReorderSlides {
            order: vec![ids[2], ids[0], ids[1]],
        })
        .unwrap();

    let got: Vec<(SlideId, u32)> = state.slides().iter().map(|s| (s.id, s.position)).collect();
    assert_eq!(got, vec![(ids[2], 0), (ids[0], 1), (ids[1], 2)]);
}

#[test]
fn reorder_rejects_partial_or_duplicated_orderings() {
    let mut state = open_with_slides(3);
    let ids: Vec<SlideId> = state.slides().iter().map(|s| s.id).collect();

    assert!(
        state
            .apply(EditorAction::ReorderSlides {
                order: vec![ids[0], ids[1]],
            })
            .is_err()
    );
    assert!(
        state
            .apply(EditorAction::ReorderSlides {
                order: vec![ids[0], ids[0], ids[1]],
            })
            .is_err()
    );
}

#[test]
fn text_layer_cap_is_a_rejection_not_a_truncation() {
    let mut state = open_with_slides(1);
    let slide = state.slides()[0].id;

    for _ in 0..MAX_TEXT_LAYERS_PER_SLIDE {
        state.apply(EditorAction::AddTextLayer { slide }).unwrap();
    }
    let err = state
        .apply(EditorAction::AddTextLayer { slide })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Validation(_)));
    assert_eq!(state.layers_for(slide).len(), MAX_TEXT_LAYERS_PER_SLIDE);

    // image layers are not capped
    state
        .apply(EditorAction::AddImageLayer {
            slide,
            source: ImageSource::Specific {
                image_id: ImageId::new(),
            },
        })
        .unwrap();
}

#[test]
fn layer_lookup_spans_all_slides() {
    let mut state = open_with_slides(2);
    let first = state.slides()[0].id;
    let second = state.slides()[1].id;
    state
        .apply(EditorAction::AddTextLayer { slide: first })
        .unwrap();
    let layer = state.layers_for(first)[0].id;

    // selection moves away; the batched update must still land
    state
        .apply(EditorAction::SelectSlide {
            slide: Some(second),
        })
        .unwrap();
    state
        .apply(EditorAction::UpdateLayer {
            layer,
            edit: LayerEdit::Move { x: 10.0, y: 20.0 },
        })
        .unwrap();

    let moved = state.layer(layer).unwrap();
    assert_eq!((moved.x, moved.y), (10.0, 20.0));
}

#[test]
fn move_and_resize_are_clamped() {
    let mut state = open_with_slides(1);
    let slide = state.slides()[0].id;
    state.apply(EditorAction::AddTextLayer { slide }).unwrap();
    let layer = state.layers_for(slide)[0].id;

    state
        .apply(EditorAction::UpdateLayer {
            layer,
            edit: LayerEdit::Move { x: -500.0, y: 500.0 },
        })
        .unwrap();
    let l = state.layer(layer).unwrap();
    assert_eq!((l.x, l.y), (-100.0, 200.0));

    state
        .apply(EditorAction::UpdateLayer {
            layer,
            edit: LayerEdit::Resize {
                width: 0.1,
                height: Some(5000.0),
            },
        })
        .unwrap();
    let l = state.layer(layer).unwrap();
    assert_eq!(l.width, 5.0);
    assert_eq!(l.height, Some(1000.0));
}

#[test]
fn delete_layer_renumbers_z_order() {
    let mut state = open_with_slides(1);
    let slide = state.slides()[0].id;
    for _ in 0..3 {
        state.apply(EditorAction::AddTextLayer { slide }).unwrap();
    }
    let middle = state.layers_for(slide)[1].id;
    state
        .apply(EditorAction::DeleteLayer { layer: middle })
        .unwrap();

    let positions: Vec<u32> = state.layers_for(slide).iter().map(|l| l.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn aspect_ratio_change_keeps_layer_percentages() {
    let mut state = open_with_slides(1);
    let slide = state.slides()[0].id;
    state.apply(EditorAction::AddTextLayer { slide }).unwrap();
    let layer = state.layers_for(slide)[0].id;
    let (x, y, w) = {
        let l = state.layer(layer).unwrap();
        (l.x, l.y, l.width)
    };

    state
        .apply(EditorAction::SetAspectRatio {
            ratio: AspectRatio::Square,
        })
        .unwrap();

    assert_eq!(
        (state.template().width, state.template().height),
        (1080, 1080)
    );
    let l = state.layer(layer).unwrap();
    assert_eq!((l.x, l.y, l.width), (x, y, w));
}

#[test]
fn zoom_is_clamped_and_not_dirtying() {
    let mut state = open_with_slides(1);
    state.apply(EditorAction::SetZoom { zoom: 10.0 }).unwrap();
    assert_eq!(state.zoom(), MAX_ZOOM);
    state.apply(EditorAction::SetZoom { zoom: 0.01 }).unwrap();
    assert_eq!(state.zoom(), MIN_ZOOM);
    assert!(!state.is_dirty());
}

#[test]
fn selection_is_not_dirtying_but_structure_is() {
    let mut state = open_with_slides(2);
    let first = state.slides()[0].id;
    state
        .apply(EditorAction::SelectSlide { slide: Some(first) })
        .unwrap();
    assert!(!state.is_dirty());

    state
        .apply(EditorAction::RenameTemplate {
            name: "renamed".to_owned(),
        })
        .unwrap();
    assert!(state.is_dirty());
}

#[test]
fn open_rejects_gapped_slide_positions() {
    let template = Template::new(OrgId::new(), "t", AspectRatio::Square);
    let mut slides = vec![Slide::new(template.id, 0), Slide::new(template.id, 2)];
    slides[1].position = 2;
    assert!(EditorState::new(template, slides, Vec::new()).is_err());
}
