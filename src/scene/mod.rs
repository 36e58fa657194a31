//! The document model: templates, slides, layers, and frozen post content.

pub mod color;
pub mod ids;
pub mod layer;
pub mod post;
pub mod template;

pub use color::Color;
pub use ids::{CollectionId, ImageId, LayerId, OrgId, PostId, SlideId, TemplateId};
pub use layer::{FontWeight, ImageSource, Layer, LayerKind, TextAlign, TextLayer};
pub use post::{Post, PostContent, PostLayer, PostSlide, PostStatus};
pub use template::{
    AspectRatio, ImageRef, Slide, SlideBackground, Template, TemplateKind, validate_slide_positions,
};
