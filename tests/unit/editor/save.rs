use super::*;
use crate::editor::state::{EditorAction, EditorState};
use crate::foundation::error::SlidecastError;
use crate::scene::{
    AspectRatio, CollectionId, ImageId, Layer, Post, PostId, PostStatus, Slide, SlideId, Template,
};
use crate::store::{MemoryStore, StoredImage};

fn open_template(org: OrgId) -> EditorState {
    let template = Template::new(org, "saveable", AspectRatio::NineBySixteen);
    let slides: Vec<Slide> = (0..2).map(|i| Slide::new(template.id, i)).collect();
    let mut state = EditorState::new(template, slides, Vec::new()).unwrap();
    let first = state.slides()[0].id;
    state
        .apply(EditorAction::AddTextLayer { slide: first })
        .unwrap();
    state
}

#[test]
fn own_template_saves_in_place_and_clears_dirty() {
    let org = OrgId::new();
    let mut store = MemoryStore::new();
    let mut state = open_template(org);
    let id = state.template().id;
    store
        .insert_template(state.template().clone(), Vec::new(), Vec::new())
        .unwrap();
    assert!(state.is_dirty());

    let outcome = save_template(&mut store, &mut state, org).unwrap();
    assert_eq!(outcome, SaveOutcome::UpdatedInPlace { template: id });
    assert!(!state.is_dirty());

    let slides = store.slides(id).unwrap();
    assert_eq!(slides.len(), 2);
    assert_eq!(
        slides.iter().map(|s| s.position).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(store.layers(slides[0].id).unwrap().len(), 1);
}

#[test]
fn premade_template_forks_instead_of_overwriting() {
    let author_org = OrgId::new();
    let mut store = MemoryStore::new();
    let mut state = open_template(author_org);
    state.template.premade = true;
    let original_id = state.template().id;
    store
        .insert_template(state.template().clone(), Vec::new(), Vec::new())
        .unwrap();

    let saving_org = OrgId::new();
    let outcome = save_template(&mut store, &mut state, saving_org).unwrap();
    let SaveOutcome::ForkedCopy { template: fork_id } = outcome else {
        panic!("expected a fork");
    };
    assert_ne!(fork_id, original_id);

    // original untouched, fork owned by the saving org and not premade
    let original = store.template(original_id).unwrap();
    assert!(original.premade);
    let fork = store.template(fork_id).unwrap();
    assert!(!fork.premade);
    assert_eq!(fork.org, Some(saving_org));

    // the editor now points at the fork with remapped children
    assert_eq!(state.template().id, fork_id);
    assert_eq!(store.slides(fork_id).unwrap().len(), 2);
}

#[test]
fn foreign_template_forks_for_the_target_org() {
    let mut store = MemoryStore::new();
    let mut state = open_template(OrgId::new());
    let original_id = state.template().id;
    store
        .insert_template(state.template().clone(), Vec::new(), Vec::new())
        .unwrap();

    let other_org = OrgId::new();
    let outcome = save_template(&mut store, &mut state, other_org).unwrap();
    assert!(matches!(outcome, SaveOutcome::ForkedCopy { .. }));
    assert_ne!(outcome.template(), original_id);
}

#[test]
fn failed_save_keeps_the_document_dirty() {
    struct DownStore;

    impl ContentStore for DownStore {
        fn template(&self, _: TemplateId) -> SlidecastResult<Template> {
            Err(SlidecastError::not_found("down"))
        }
        fn slides(&self, _: TemplateId) -> SlidecastResult<Vec<Slide>> {
            Err(SlidecastError::not_found("down"))
        }
        fn layers(&self, _: SlideId) -> SlidecastResult<Vec<Layer>> {
            Err(SlidecastError::not_found("down"))
        }
        fn image(&self, _: ImageId) -> SlidecastResult<StoredImage> {
            Err(SlidecastError::not_found("down"))
        }
        fn images_by_ids(&self, _: &[ImageId]) -> SlidecastResult<Vec<StoredImage>> {
            Err(SlidecastError::not_found("down"))
        }
        fn collection_images(&self, _: CollectionId) -> SlidecastResult<Vec<StoredImage>> {
            Err(SlidecastError::not_found("down"))
        }
        fn insert_template(
            &mut self,
            _: Template,
            _: Vec<Slide>,
            _: Vec<Layer>,
        ) -> SlidecastResult<()> {
            Err(SlidecastError::validation("store down"))
        }
        fn update_template(&mut self, _: Template) -> SlidecastResult<()> {
            Err(SlidecastError::validation("store down"))
        }
        fn replace_children(
            &mut self,
            _: TemplateId,
            _: Vec<Slide>,
            _: Vec<Layer>,
        ) -> SlidecastResult<()> {
            Err(SlidecastError::validation("store down"))
        }
        fn insert_post(&mut self, _: Post) -> SlidecastResult<()> {
            Err(SlidecastError::validation("store down"))
        }
        fn post(&self, _: PostId) -> SlidecastResult<Post> {
            Err(SlidecastError::not_found("down"))
        }
        fn update_post_status(&mut self, _: PostId, _: PostStatus) -> SlidecastResult<()> {
            Err(SlidecastError::validation("store down"))
        }
    }

    let org = OrgId::new();
    let mut state = open_template(org);
    assert!(state.is_dirty());

    let mut store = DownStore;
    assert!(save_template(&mut store, &mut state, org).is_err());
    assert!(state.is_dirty());
}
