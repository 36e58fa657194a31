//! The slide compositor: background plus ordered layer stack, rasterized
//! at a display scale or fit to a container.
//!
//! The same rendering path serves the interactive editor canvas,
//! read-only previews/thumbnails, and (at scale 1.0) the export pipeline,
//! which is what keeps preview and export pixel-identical.

use std::collections::HashMap;

use kurbo::Rect;

use crate::assets::PreloadedImages;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::layout::Canvas;
use crate::render::layer::{
    DrawContext, cached_image_paint, draw_cover_image, draw_layer, paint_color,
};
use crate::render::text::{FontLibrary, TextLayoutEngine};
use crate::scene::{
    Color, Layer, LayerId, PostLayer, PostSlide, Slide, SlideBackground, Template, TemplateKind,
};

const DEFAULT_BACKGROUND: Color = Color::WHITE;
const UNRESOLVED_BACKGROUND: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const VIDEO_BACKGROUND: Color = Color::rgb(0x11, 0x18, 0x27);

/// How large to rasterize a slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlideScale {
    /// Fixed scale factor (editor canvas; zoom 0.5..2.0, export 1.0).
    Fixed(f64),
    /// Fit the whole canvas inside a container (grid thumbnails,
    /// phone-frame previews).
    FillContainer { width: f64, height: f64 },
}

impl SlideScale {
    /// The scale factor this mode resolves to for `canvas`.
    pub fn resolve(self, canvas: Canvas) -> f64 {
        match self {
            SlideScale::Fixed(s) => s,
            SlideScale::FillContainer { width, height } => canvas.fill_scale(width, height),
        }
    }
}

/// A rasterized slide in straight-alpha RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct SlideFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

/// Resolved per-slide content feeding one render.
///
/// For a generated post this comes from the frozen
/// [`PostSlide`](crate::scene::PostSlide); for plain template previews the
/// background URL is resolved once via
/// [`binding::resolve_background`](crate::binding::resolve::resolve_background)
/// and layers render their template text.
#[derive(Clone, Debug, Default)]
pub struct SlideView {
    /// Concrete background image URL, when the slide background resolves
    /// to one.
    pub background_url: Option<String>,
    overlays: HashMap<LayerId, PostLayer>,
}

impl SlideView {
    /// A view with no resolved content: template text, no images.
    pub fn template_only() -> Self {
        Self::default()
    }

    /// A view with a resolved background but no layer overlays.
    pub fn with_background(background_url: Option<String>) -> Self {
        Self {
            background_url,
            overlays: HashMap::new(),
        }
    }

    /// The view for a post's frozen slide snapshot.
    pub fn from_post_slide(slide: &PostSlide) -> Self {
        Self {
            background_url: slide.background_image_url.clone(),
            overlays: slide
                .layers
                .iter()
                .map(|l| (l.layer_id, l.clone()))
                .collect(),
        }
    }

    /// The resolved overlay for a layer, if any.
    pub fn overlay(&self, layer: LayerId) -> Option<&PostLayer> {
        self.overlays.get(&layer)
    }

    pub(crate) fn retain_layers(&mut self, keep: impl Fn(LayerId) -> bool) {
        self.overlays.retain(|id, _| keep(*id));
    }
}

/// Renders slides through `vello_cpu`, holding the text engine, the font
/// library, and a per-URL image paint cache.
pub struct Compositor {
    engine: TextLayoutEngine,
    fonts: FontLibrary,
    paint_cache: HashMap<String, vello_cpu::Image>,
}

impl Compositor {
    /// Create a compositor over a font library.
    pub fn new(fonts: FontLibrary) -> Self {
        Self {
            engine: TextLayoutEngine::new(),
            fonts,
            paint_cache: HashMap::new(),
        }
    }

    /// The font library in use.
    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Render one slide: background first, then layers sorted ascending by
    /// `position` (position acts as z-index).
    pub fn render_slide(
        &mut self,
        template: &Template,
        slide: &Slide,
        layers: &[Layer],
        view: &SlideView,
        images: &PreloadedImages,
        scale: SlideScale,
    ) -> SlidecastResult<SlideFrame> {
        let canvas = template.canvas();
        let s = scale.resolve(canvas);
        if !s.is_finite() || s <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "render scale must be finite and > 0, got {s}"
            )));
        }

        let out_w = (f64::from(canvas.width) * s).round().max(1.0) as u32;
        let out_h = (f64::from(canvas.height) * s).round().max(1.0) as u32;
        let w16: u16 = out_w.try_into().map_err(|_| {
            SlidecastError::validation(format!("render width exceeds u16: {out_w}"))
        })?;
        let h16: u16 = out_h.try_into().map_err(|_| {
            SlidecastError::validation(format!("render height exceeds u16: {out_h}"))
        })?;

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        let full = Rect::new(0.0, 0.0, f64::from(out_w), f64::from(out_h));

        self.draw_background(&mut ctx, template, slide, view, images, full);

        let mut sorted: Vec<&Layer> = layers.iter().collect();
        sorted.sort_by_key(|l| l.position);
        let dc = DrawContext {
            canvas,
            scale: s,
            images,
        };
        for layer in sorted {
            draw_layer(
                &mut ctx,
                &mut self.engine,
                &self.fonts,
                &mut self.paint_cache,
                &dc,
                layer,
                view.overlay(layer.id),
            )?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(SlideFrame {
            width: out_w,
            height: out_h,
            data,
        })
    }

    /// Topmost layer under a canvas-space point, or `None` for empty area
    /// (which deselects).
    ///
    /// Text extents use the laid-out height when a font is registered and
    /// a single-line estimate otherwise.
    pub fn hit_test(
        &mut self,
        template: &Template,
        layers: &[Layer],
        view: &SlideView,
        point_px: (f64, f64),
        scale: SlideScale,
    ) -> Option<LayerId> {
        let canvas = template.canvas();
        let s = scale.resolve(canvas);

        let mut sorted: Vec<&Layer> = layers.iter().collect();
        sorted.sort_by_key(|l| std::cmp::Reverse(l.position));

        for layer in sorted {
            let frame = layer.frame();
            let rect = match frame.display_rect(canvas, s) {
                Some(r) => r,
                None => {
                    let height_px = self
                        .measured_text_height(layer, view, canvas, s)
                        .unwrap_or_else(|| {
                            layer.as_text().map(|t| t.font_size * 1.2 * s).unwrap_or(0.0)
                        });
                    frame.rect_with_height(canvas, s, height_px)
                }
            };
            if rect.contains(kurbo::Point::new(point_px.0, point_px.1)) {
                return Some(layer.id);
            }
        }
        None
    }

    fn measured_text_height(
        &mut self,
        layer: &Layer,
        view: &SlideView,
        canvas: Canvas,
        scale: f64,
    ) -> Option<f64> {
        let text = layer.as_text()?;
        let content = view
            .overlay(layer.id)
            .and_then(|o| o.text_content.as_deref())
            .unwrap_or(&text.text_content);
        let content = if content.trim().is_empty() {
            crate::render::layer::TEXT_PLACEHOLDER
        } else {
            content
        };
        let font_bytes = self.fonts.resolve(&text.font_family)?.to_vec();
        let (layout, _) = self
            .engine
            .layout_styled(
                content,
                &font_bytes,
                (text.font_size * scale) as f32,
                text.font_weight.css_weight(),
                Default::default(),
                layer.frame().width_px(canvas, scale) as f32,
                text.text_align,
            )
            .ok()?;
        Some(f64::from(layout.height()))
    }

    /// Background resolution order: video URL (video templates, always
    /// takes precedence), resolved image URL, solid color, default white.
    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        template: &Template,
        slide: &Slide,
        view: &SlideView,
        images: &PreloadedImages,
        full: Rect,
    ) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if template.kind == TemplateKind::Video
            && let Some(url) = template.video_url.as_deref()
        {
            // Headless rendering draws the video's poster frame when the
            // host preloaded one under the video URL.
            if let Some(prepared) = images.get(url)
                && let Ok(paint) = cached_image_paint(&mut self.paint_cache, url, prepared)
            {
                draw_cover_image(ctx, paint, prepared, full);
            } else {
                fill_full(ctx, full, VIDEO_BACKGROUND);
            }
            return;
        }

        if let Some(url) = view.background_url.as_deref() {
            if let Some(prepared) = images.get(url)
                && let Ok(paint) = cached_image_paint(&mut self.paint_cache, url, prepared)
            {
                draw_cover_image(ctx, paint, prepared, full);
            } else {
                // Resolved to a URL that failed to load: blank placeholder,
                // never an aborted render.
                fill_full(ctx, full, UNRESOLVED_BACKGROUND);
            }
            return;
        }

        match &slide.background {
            SlideBackground::Color { color } => fill_full(ctx, full, *color),
            bg if bg.expects_image() => fill_full(ctx, full, UNRESOLVED_BACKGROUND),
            _ => fill_full(ctx, full, DEFAULT_BACKGROUND),
        }
    }
}

fn fill_full(ctx: &mut vello_cpu::RenderContext, full: Rect, color: Color) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint_color(color));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        full.x0, full.y0, full.x1, full.y1,
    ));
}

fn unpremultiply_rgba8_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in 0..3 {
            let v = (px[c] as u16 * 255 + a / 2) / a;
            px[c] = v.min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
