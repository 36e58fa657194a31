use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::layout::Canvas;
use crate::scene::color::Color;
use crate::scene::ids::{CollectionId, ImageId, OrgId, SlideId, TemplateId};

/// A reusable multi-slide design definition, independent of any post's
/// generated content.
///
/// `width`/`height` are the canonical pixel dimensions of the design and
/// define the coordinate space all layer percentages are normalized
/// against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    /// Owning organization; `None` for library templates.
    #[serde(default)]
    pub org: Option<OrgId>,
    pub name: String,
    pub kind: TemplateKind,
    pub aspect_ratio: AspectRatio,
    pub width: u32,
    pub height: u32,
    /// Free-text creative direction baked into the template.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Premade templates are read-only and shareable; saving one forks a
    /// copy instead of mutating it.
    #[serde(default)]
    pub premade: bool,
    /// Background video for video-kind templates.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Collection a video-kind template draws its background video from.
    #[serde(default)]
    pub video_collection_id: Option<CollectionId>,
}

impl Template {
    /// Create a carousel template for `org` at the ratio's canonical
    /// dimensions.
    pub fn new(org: OrgId, name: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        let (width, height) = aspect_ratio.dimensions();
        Self {
            id: TemplateId::new(),
            org: Some(org),
            name: name.into(),
            kind: TemplateKind::Carousel,
            aspect_ratio,
            width,
            height,
            prompt: None,
            premade: false,
            video_url: None,
            video_collection_id: None,
        }
    }

    /// The canvas all layer percentages are normalized against.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Validate intrinsic template invariants.
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.name.trim().is_empty() {
            return Err(SlidecastError::validation("template name must be non-empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::validation(
                "template width/height must be > 0",
            ));
        }
        Ok(())
    }
}

/// What kind of post a template produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Carousel,
    Video,
}

/// Named aspect ratios with canonical pixel dimensions.
///
/// Changing a template's ratio overwrites its width/height only; layer
/// percentages stay valid because they are canvas-relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "9:16")]
    NineBySixteen,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    SixteenByNine,
    #[serde(rename = "4:3")]
    FourByThree,
    #[serde(rename = "3:4")]
    ThreeByFour,
}

impl AspectRatio {
    /// Canonical pixel dimensions for this ratio.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::NineBySixteen => (1080, 1920),
            AspectRatio::Square => (1080, 1080),
            AspectRatio::SixteenByNine => (1920, 1080),
            AspectRatio::FourByThree => (1440, 1080),
            AspectRatio::ThreeByFour => (1500, 2000),
        }
    }
}

/// One frame within a template: a background plus an ordered layer stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub template_id: TemplateId,
    /// 0-based, dense ordering within the template.
    pub position: u32,
    #[serde(default)]
    pub background: SlideBackground,
}

impl Slide {
    /// Create an empty slide at `position`.
    pub fn new(template_id: TemplateId, position: u32) -> Self {
        Self {
            id: SlideId::new(),
            template_id,
            position,
            background: SlideBackground::None,
        }
    }
}

/// A slide's background source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideBackground {
    /// No background; renders the default white.
    #[default]
    None,
    /// Solid color fill.
    Color { color: Color },
    /// A concrete image, stored or by URL.
    Image { image: ImageRef },
    /// One uniformly-random image from the collection, drawn independently
    /// per render instance.
    CollectionRandom { collection_id: CollectionId },
    /// A specific image out of a collection.
    CollectionSpecific {
        collection_id: CollectionId,
        image_id: ImageId,
    },
}

impl SlideBackground {
    /// Whether this background expects an image URL to resolve.
    pub fn expects_image(&self) -> bool {
        matches!(
            self,
            SlideBackground::Image { .. }
                | SlideBackground::CollectionRandom { .. }
                | SlideBackground::CollectionSpecific { .. }
        )
    }
}

/// Reference to an image, either a stored row or a direct public URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    Stored { image_id: ImageId },
    Url { url: String },
}

/// Validate that slide positions are dense `0..n-1` with no duplicates.
///
/// Persistence re-derives `position` from array index, so gaps must never
/// survive a structural mutation.
pub fn validate_slide_positions(slides: &[Slide]) -> SlidecastResult<()> {
    let mut positions: Vec<u32> = slides.iter().map(|s| s.position).collect();
    positions.sort_unstable();
    for (i, p) in positions.iter().enumerate() {
        if *p != i as u32 {
            return Err(SlidecastError::validation(format!(
                "slide positions must be dense 0..{}, found {p} at rank {i}",
                slides.len().saturating_sub(1)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
