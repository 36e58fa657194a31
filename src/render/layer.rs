//! Rendering of a single layer into a `vello_cpu` context.
//!
//! Replicates the editor's positioning math exactly: center-anchored
//! percentage placement, faux-stroke text outlines (four offset copies of
//! the glyph fill behind the real fill), pill highlights, and cover-fit
//! image boxes.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Rect, RoundedRect, Shape as _};

use crate::assets::{PreloadedImages, PreparedImage};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::layout::{Canvas, scaled_px};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};
use crate::scene::{Color, ImageSource, Layer, LayerKind, PostLayer, TextLayer};

/// Shown in place of empty text content so the layer stays visible.
pub(crate) const TEXT_PLACEHOLDER: &str = "Your text here";

const PLACEHOLDER_FILL: Color = Color::rgb(0xe5, 0xe7, 0xeb);
const PLACEHOLDER_BORDER: Color = Color::rgb(0x9c, 0xa3, 0xaf);
const PLACEHOLDER_LABEL: Color = Color::rgb(0x6b, 0x72, 0x80);
const PLACEHOLDER_BORDER_PX: f64 = 2.0;
const PLACEHOLDER_LABEL_PX: f64 = 28.0;

/// Per-render inputs shared by all layer draws.
pub(crate) struct DrawContext<'a> {
    pub(crate) canvas: Canvas,
    pub(crate) scale: f64,
    pub(crate) images: &'a PreloadedImages,
}

/// Draw one layer. `overlay` carries a post's resolved text/image values.
pub(crate) fn draw_layer(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    fonts: &crate::render::text::FontLibrary,
    paint_cache: &mut HashMap<String, vello_cpu::Image>,
    dc: &DrawContext<'_>,
    layer: &Layer,
    overlay: Option<&PostLayer>,
) -> SlidecastResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match &layer.kind {
        LayerKind::Text(text) => draw_text_layer(ctx, engine, fonts, dc, layer, text, overlay),
        LayerKind::Image(image) => {
            let url = overlay
                .and_then(|o| o.image_url.as_deref())
                .map(str::to_owned);
            draw_image_layer(ctx, engine, fonts, paint_cache, dc, layer, &image.source, url)
        }
    }
}

fn draw_text_layer(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    fonts: &crate::render::text::FontLibrary,
    dc: &DrawContext<'_>,
    layer: &Layer,
    text: &TextLayer,
    overlay: Option<&PostLayer>,
) -> SlidecastResult<()> {
    let content = overlay
        .and_then(|o| o.text_content.as_deref())
        .unwrap_or(&text.text_content);
    let content = if content.trim().is_empty() {
        TEXT_PLACEHOLDER
    } else {
        content
    };

    let Some(font_bytes) = fonts.resolve(&text.font_family) else {
        tracing::warn!(
            family = %text.font_family,
            "no fonts registered; skipping text paint"
        );
        return Ok(());
    };
    let font_bytes = font_bytes.to_vec();

    let frame = layer.frame();
    let max_width = frame.width_px(dc.canvas, dc.scale);
    let (layout, font) = engine.layout_styled(
        content,
        &font_bytes,
        scaled_px(text.font_size, dc.scale) as f32,
        text.font_weight.css_weight(),
        brush_from(text.text_color),
        max_width as f32,
        text.text_align,
    )?;

    let height_px = f64::from(layout.height());
    let rect = frame.rect_with_height(dc.canvas, dc.scale, height_px);

    if let Some(bg) = text.background_color {
        let pad_x = scaled_px(text.font_size * 0.5, dc.scale);
        let pad_y = scaled_px(text.font_size * 0.25, dc.scale);
        let radius = scaled_px(text.font_size * 0.4, dc.scale);
        let pill = RoundedRect::new(
            rect.x0 - pad_x,
            rect.y0 - pad_y,
            rect.x1 + pad_x,
            rect.y1 + pad_y,
            radius,
        );
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_color(bg));
        ctx.fill_path(&rounded_rect_to_cpu(&pill));
    }

    if let Some((stroke_color, stroke_width)) = text.effective_stroke() {
        let w = scaled_px(stroke_width, dc.scale);
        for (ox, oy) in [(-w, 0.0), (w, 0.0), (0.0, -w), (0.0, w)] {
            draw_glyph_pass(
                ctx,
                &layout,
                &font,
                (rect.x0 + ox, rect.y0 + oy),
                Some(stroke_color),
            );
        }
    }

    draw_glyph_pass(ctx, &layout, &font, (rect.x0, rect.y0), None);
    Ok(())
}

fn draw_glyph_pass(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    origin: (f64, f64),
    override_color: Option<Color>,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.0, origin.1)));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let color = override_color.unwrap_or_else(|| {
                let b = run.style().brush;
                Color::rgba(b.r, b.g, b.b, b.a)
            });
            ctx.set_paint(paint_color(color));

            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_image_layer(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    fonts: &crate::render::text::FontLibrary,
    paint_cache: &mut HashMap<String, vello_cpu::Image>,
    dc: &DrawContext<'_>,
    layer: &Layer,
    source: &ImageSource,
    url: Option<String>,
) -> SlidecastResult<()> {
    let frame = layer.frame();
    let rect = match frame.display_rect(dc.canvas, dc.scale) {
        Some(r) => r,
        // Square default when height was never set.
        None => frame.rect_with_height(dc.canvas, dc.scale, frame.width_px(dc.canvas, dc.scale)),
    };

    if let Some(url) = url.as_deref()
        && let Some(prepared) = dc.images.get(url)
    {
        let paint = cached_image_paint(paint_cache, url, prepared)?;
        draw_cover_image(ctx, paint, prepared, rect);
        return Ok(());
    }

    // No resolvable pixels yet: placeholder box. The label distinguishes a
    // pending random pick from a layer with nothing selected; a URL that
    // failed to load renders the box without a label.
    let label = match (url.is_some(), source) {
        (true, _) => None,
        (false, ImageSource::CollectionRandom { .. }) => Some("Random collection image"),
        (false, _) => Some("No image selected"),
    };
    draw_placeholder_box(ctx, engine, fonts, dc, rect, label)
}

/// Draw a prepared image covering `rect` (scaled to fill, center cropped).
pub(crate) fn draw_cover_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: vello_cpu::Image,
    prepared: &PreparedImage,
    rect: Rect,
) {
    let iw = f64::from(prepared.width).max(1.0);
    let ih = f64::from(prepared.height).max(1.0);
    let s = (rect.width() / iw).max(rect.height() / ih);
    let dx = (rect.width() - iw * s) / 2.0;
    let dy = (rect.height() - ih * s) / 2.0;

    ctx.set_transform(vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0)));
    ctx.set_paint_transform(
        vello_cpu::kurbo::Affine::translate((dx, dy)) * vello_cpu::kurbo::Affine::scale(s),
    );
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        rect.width(),
        rect.height(),
    ));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

/// Convert a prepared image into a reusable `vello_cpu` paint.
pub(crate) fn cached_image_paint(
    cache: &mut HashMap<String, vello_cpu::Image>,
    url: &str,
    prepared: &PreparedImage,
) -> SlidecastResult<vello_cpu::Image> {
    if let Some(paint) = cache.get(url) {
        return Ok(paint.clone());
    }
    let paint = image_paint(prepared)?;
    cache.insert(url.to_owned(), paint.clone());
    Ok(paint)
}

fn image_paint(prepared: &PreparedImage) -> SlidecastResult<vello_cpu::Image> {
    let pixmap =
        pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SlidecastResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SlidecastError::validation(format!("image width exceeds u16: {width}")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SlidecastError::validation(format!("image height exceeds u16: {height}")))?;

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let dst = pixmap.data_as_u8_slice_mut();
    if dst.len() != bytes.len() {
        return Err(SlidecastError::validation(
            "image buffer size does not match its dimensions",
        ));
    }
    dst.copy_from_slice(bytes);
    Ok(pixmap)
}

fn draw_placeholder_box(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextLayoutEngine,
    fonts: &crate::render::text::FontLibrary,
    dc: &DrawContext<'_>,
    rect: Rect,
    label: Option<&str>,
) -> SlidecastResult<()> {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0)));
    ctx.set_paint(paint_color(PLACEHOLDER_FILL));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        rect.width(),
        rect.height(),
    ));

    let b = scaled_px(PLACEHOLDER_BORDER_PX, dc.scale).max(1.0);
    ctx.set_paint(paint_color(PLACEHOLDER_BORDER));
    for edge in [
        vello_cpu::kurbo::Rect::new(0.0, 0.0, rect.width(), b),
        vello_cpu::kurbo::Rect::new(0.0, rect.height() - b, rect.width(), rect.height()),
        vello_cpu::kurbo::Rect::new(0.0, 0.0, b, rect.height()),
        vello_cpu::kurbo::Rect::new(rect.width() - b, 0.0, rect.width(), rect.height()),
    ] {
        ctx.fill_rect(&edge);
    }

    if let Some(label) = label
        && let Some(font_bytes) = fonts.default_font()
    {
        let font_bytes = font_bytes.to_vec();
        let (layout, font) = engine.layout_styled(
            label,
            &font_bytes,
            scaled_px(PLACEHOLDER_LABEL_PX, dc.scale) as f32,
            400.0,
            brush_from(PLACEHOLDER_LABEL),
            rect.width() as f32,
            crate::scene::TextAlign::Center,
        )?;
        let text_h = f64::from(layout.height());
        let origin = (rect.x0, rect.y0 + (rect.height() - text_h) / 2.0);
        draw_glyph_pass(ctx, &layout, &font, origin, None);
    }

    Ok(())
}

pub(crate) fn paint_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn brush_from(c: Color) -> TextBrushRgba8 {
    TextBrushRgba8 {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    }
}

fn rounded_rect_to_cpu(rr: &RoundedRect) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in rr.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
