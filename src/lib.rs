//! Slidecast is a headless engine for a social-media content studio.
//!
//! It covers the authoring and delivery core of such a product:
//!
//! - a layer-based slide [`scene`] model on a normalized, center-anchored
//!   percentage coordinate system
//! - a reducer-style [`editor`] state machine with structured mutations
//! - [`binding`]: merging AI-generated text and collection-resolved images
//!   into a frozen per-post content snapshot
//! - a deterministic CPU [`render`] compositor shared by previews and
//!   exports
//! - an [`export`] pipeline that rasterizes resolved slides to PNG at
//!   native resolution and packages them (with a text sidecar) into zip
//!   archives, per post or in bulk
//!
//! Persistence, object storage, and text generation are external
//! collaborators behind the traits in [`store`] and [`binding::textgen`].
#![forbid(unsafe_code)]

pub mod assets;
pub mod binding;
pub mod credits;
pub mod editor;
pub mod export;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod store;

pub use crate::foundation::error::{SlidecastError, SlidecastResult};
pub use crate::foundation::layout::Canvas;

pub use crate::assets::{DirectoryFetcher, ImageFetcher, MemoryFetcher, PreloadedImages};
pub use crate::binding::{generate_post, resolve_post_content, GenerationOptions, TextGenerator};
pub use crate::credits::{CreditBalance, CreditCharge, InsufficientCredits};
pub use crate::editor::{save_template, EditorAction, EditorState, LayerEdit, SaveOutcome};
pub use crate::export::{ExportMode, ExportOptions, Exporter, PostExportInput};
pub use crate::render::{Compositor, FontLibrary, SlideFrame, SlideScale, SlideView};
pub use crate::scene::{
    AspectRatio, Layer, Post, PostContent, PostStatus, Slide, SlideBackground, Template,
};
pub use crate::store::{
    ContentStore, MemoryStore, ObjectStorage, StoredImage, store_uploaded_image,
};
