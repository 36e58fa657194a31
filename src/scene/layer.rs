use serde::{Deserialize, Serialize};

use crate::foundation::layout::LayerFrame;
use crate::scene::color::Color;
use crate::scene::ids::{CollectionId, ImageId, LayerId, SlideId};

/// A positioned text or image element within a slide.
///
/// `x`/`y` are percentages of the canvas anchoring the layer's center (not
/// its top-left corner); `width`/`height` are percentages of the canvas.
/// Text layers leave `height` unset, their vertical extent is the
/// intrinsic laid-out text height.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub slide_id: SlideId,
    /// Z-order within the slide; higher draws on top.
    pub position: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    #[serde(default)]
    pub height: Option<f64>,
    pub kind: LayerKind,
}

impl Layer {
    /// Create a text layer with the editor's default styling, centered on
    /// the canvas.
    pub fn text(slide_id: SlideId, position: u32) -> Self {
        Self {
            id: LayerId::new(),
            slide_id,
            position,
            x: 50.0,
            y: 50.0,
            width: 80.0,
            height: None,
            kind: LayerKind::Text(TextLayer::default()),
        }
    }

    /// Create an image layer, centered, with the square default size.
    pub fn image(slide_id: SlideId, position: u32, source: ImageSource) -> Self {
        Self {
            id: LayerId::new(),
            slide_id,
            position,
            x: 50.0,
            y: 50.0,
            width: 50.0,
            height: Some(50.0),
            kind: LayerKind::Image(ImageLayer { source }),
        }
    }

    /// The layer's percent-space placement frame.
    pub fn frame(&self) -> LayerFrame {
        LayerFrame {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Whether this is a text layer.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, LayerKind::Text(_))
    }

    /// The text payload, when this is a text layer.
    pub fn as_text(&self) -> Option<&TextLayer> {
        match &self.kind {
            LayerKind::Text(t) => Some(t),
            LayerKind::Image(_) => None,
        }
    }

    /// Mutable text payload, when this is a text layer.
    pub fn as_text_mut(&mut self) -> Option<&mut TextLayer> {
        match &mut self.kind {
            LayerKind::Text(t) => Some(t),
            LayerKind::Image(_) => None,
        }
    }

    /// The image payload, when this is an image layer.
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Text(_) => None,
            LayerKind::Image(i) => Some(i),
        }
    }
}

/// Layer content variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Text(TextLayer),
    Image(ImageLayer),
}

/// Text layer styling and content.
///
/// `font_size` and `stroke_width` are pixels at the template's native
/// resolution and scale with the render scale factor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextLayer {
    pub text_content: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default = "default_text_color")]
    pub text_color: Color,
    #[serde(default)]
    pub text_align: TextAlign,
    /// Pill-style highlight behind the text block.
    #[serde(default)]
    pub background_color: Option<Color>,
    #[serde(default)]
    pub stroke_color: Option<Color>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    /// Fixed text is never overwritten by content generation.
    #[serde(default)]
    pub is_fixed: bool,
}

impl TextLayer {
    /// The outline to draw, when both color and a positive width are set.
    pub fn effective_stroke(&self) -> Option<(Color, f64)> {
        match (self.stroke_color, self.stroke_width) {
            (Some(color), Some(width)) if width > 0.0 => Some((color, width)),
            _ => None,
        }
    }
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            text_content: String::new(),
            font_family: default_font_family(),
            font_size: 48.0,
            font_weight: FontWeight::default(),
            text_color: default_text_color(),
            text_align: TextAlign::default(),
            background_color: None,
            stroke_color: None,
            stroke_width: None,
            is_fixed: false,
        }
    }
}

fn default_font_family() -> String {
    "Inter".to_owned()
}

fn default_text_color() -> Color {
    Color::BLACK
}

/// Supported font weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Black,
}

impl FontWeight {
    /// CSS-style numeric weight.
    pub fn css_weight(self) -> f32 {
        match self {
            FontWeight::Normal => 400.0,
            FontWeight::Bold => 700.0,
            FontWeight::Black => 900.0,
        }
    }
}

/// Horizontal text alignment within the layer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Image layer payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageLayer {
    pub source: ImageSource,
}

/// Where an image layer's pixels come from.
///
/// The enum representation keeps exactly one source meaningful at a time;
/// switching source type replaces the whole variant, which is what clears
/// the now-irrelevant fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// A concrete stored image.
    Specific { image_id: ImageId },
    /// One uniformly-random image from the collection per render instance.
    CollectionRandom { collection_id: CollectionId },
    /// A freshly uploaded image.
    Upload { image_id: ImageId },
}
