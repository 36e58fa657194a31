use serde::{Deserialize, Serialize};

use crate::scene::ids::{LayerId, PostId, SlideId, TemplateId};

/// A generated post: an immutable content snapshot plus mutable status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub status: PostStatus,
    pub content: PostContent,
}

impl Post {
    /// Wrap freshly-resolved content as a draft post.
    pub fn new(content: PostContent) -> Self {
        Self {
            id: PostId::new(),
            status: PostStatus::Draft,
            content,
        }
    }
}

/// Post lifecycle status. User-settable in any order, not strictly
/// forward-progressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Ready,
    Exported,
    Posted,
}

/// The frozen, already-resolved snapshot of one generation.
///
/// This is the contract between content binding (producer) and the
/// compositor/export pipeline (consumers): once written it is never
/// re-resolved, so re-opening a post always shows the same images and text
/// it was generated with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostContent {
    pub template_id: TemplateId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    pub slides: Vec<PostSlide>,
}

impl PostContent {
    /// The resolved slide overlay for `slide_id`, if present.
    pub fn slide(&self, slide_id: SlideId) -> Option<&PostSlide> {
        self.slides.iter().find(|s| s.slide_id == slide_id)
    }
}

/// Resolved per-slide content for one post instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostSlide {
    pub slide_id: SlideId,
    pub position: u32,
    /// Concrete background image URL, when the slide background resolved
    /// to one.
    #[serde(default)]
    pub background_image_url: Option<String>,
    pub layers: Vec<PostLayer>,
}

impl PostSlide {
    /// The resolved layer overlay for `layer_id`, if present.
    pub fn layer(&self, layer_id: LayerId) -> Option<&PostLayer> {
        self.layers.iter().find(|l| l.layer_id == layer_id)
    }
}

/// Resolved per-layer content for one post instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostLayer {
    pub layer_id: LayerId,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}
