//! The authoring-time document model and its mutation surface.

pub mod gesture;
pub mod save;
pub mod state;

pub use gesture::{DragGesture, ResizeGesture, ResizeHandle, TextDraft};
pub use save::{SaveOutcome, save_template};
pub use state::{EditorAction, EditorState, LayerEdit, MAX_TEXT_LAYERS_PER_SLIDE};
