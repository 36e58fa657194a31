use std::collections::HashMap;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::TextAlign;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Font bytes registered per family name.
///
/// The first registered family doubles as the fallback for unknown
/// families, so a template referencing a font the host never loaded still
/// renders.
#[derive(Default)]
pub struct FontLibrary {
    families: HashMap<String, Vec<u8>>,
    default_family: Option<String>,
}

impl FontLibrary {
    /// An empty library. Text layers render as geometry only until a font
    /// is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw font bytes under a family name.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        let family = family.into();
        if self.default_family.is_none() {
            self.default_family = Some(family.clone());
        }
        self.families.insert(family, bytes);
    }

    /// Whether any font has been registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Font bytes of the fallback family, if any.
    pub fn default_font(&self) -> Option<&[u8]> {
        let fallback = self.default_family.as_deref()?;
        self.families.get(fallback).map(|v| v.as_slice())
    }

    /// Font bytes for `family`, falling back to the default family.
    pub fn resolve(&self, family: &str) -> Option<&[u8]> {
        if let Some(bytes) = self.families.get(family) {
            return Some(bytes.as_slice());
        }
        let fallback = self.default_family.as_deref()?;
        if fallback != family {
            tracing::debug!(family, fallback, "font family not registered; using fallback");
        }
        self.families.get(fallback).map(|v| v.as_slice())
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out text with the given styling, returning the layout
    /// and the font handle glyph runs are drawn with.
    pub(crate) fn layout_styled(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        weight: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
        align: TextAlign,
    ) -> SlidecastResult<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(SlidecastError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SlidecastError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| SlidecastError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        layout.align(
            Some(max_width_px),
            match align {
                TextAlign::Left => parley::Alignment::Start,
                TextAlign::Center => parley::Alignment::Middle,
                TextAlign::Right => parley::Alignment::End,
            },
            parley::AlignmentOptions::default(),
        );

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );
        Ok((layout, font))
    }
}
