//! Percentage-space layout math shared by the editor canvas and the export
//! pipeline.
//!
//! Layer positions are stored as percentages of the template canvas with
//! `(x, y)` anchoring the layer's center. A single scalar scale factor maps
//! template-space pixel metrics (font size, stroke width, pill radius) to
//! output pixels; exporting renders at scale 1.0, which is what guarantees
//! parity between preview and exported files.

use kurbo::Rect;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Permissive placement range: layers may sit partially off-canvas.
pub const POSITION_PCT_MIN: f64 = -100.0;
/// Upper bound of the permissive placement range.
pub const POSITION_PCT_MAX: f64 = 200.0;
/// Smallest allowed layer dimension, in percent of the canvas.
pub const SIZE_PCT_MIN: f64 = 5.0;
/// Largest allowed layer dimension, in percent of the canvas.
pub const SIZE_PCT_MAX: f64 = 1000.0;

/// Clamp a layer center coordinate into the permissive placement range.
pub fn clamp_position_pct(v: f64) -> f64 {
    v.clamp(POSITION_PCT_MIN, POSITION_PCT_MAX)
}

/// Clamp a layer dimension into the allowed size range.
pub fn clamp_size_pct(v: f64) -> f64 {
    v.clamp(SIZE_PCT_MIN, SIZE_PCT_MAX)
}

/// Convert a template-space pixel metric to output pixels.
pub fn scaled_px(template_px: f64, scale: f64) -> f64 {
    template_px * scale
}

/// Canonical template canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> SlidecastResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidecastError::validation(
                "canvas width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Scale factor for a canvas rendered at `rendered_width_px`.
    pub fn scale_for_width(self, rendered_width_px: f64) -> f64 {
        rendered_width_px / f64::from(self.width)
    }

    /// Scale factor that fits the whole canvas inside a container.
    pub fn fill_scale(self, container_w: f64, container_h: f64) -> f64 {
        let by_width = container_w / f64::from(self.width);
        let by_height = container_h / f64::from(self.height);
        by_width.min(by_height)
    }
}

/// A layer's placement in percent space, center-anchored.
///
/// `height` is `None` for text layers, whose vertical extent is the
/// intrinsic laid-out text height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerFrame {
    /// Center x as a percentage of canvas width.
    pub x: f64,
    /// Center y as a percentage of canvas height.
    pub y: f64,
    /// Width as a percentage of canvas width.
    pub width: f64,
    /// Height as a percentage of canvas height, when explicit.
    pub height: Option<f64>,
}

impl LayerFrame {
    /// Center point in output pixels at the given scale.
    pub fn center_px(&self, canvas: Canvas, scale: f64) -> (f64, f64) {
        let cw = f64::from(canvas.width) * scale;
        let ch = f64::from(canvas.height) * scale;
        (self.x / 100.0 * cw, self.y / 100.0 * ch)
    }

    /// Width in output pixels at the given scale.
    pub fn width_px(&self, canvas: Canvas, scale: f64) -> f64 {
        self.width / 100.0 * f64::from(canvas.width) * scale
    }

    /// Display rectangle for a layer with an explicit height.
    ///
    /// Returns `None` for intrinsic-height frames; those go through
    /// [`LayerFrame::rect_with_height`] once the text has been laid out.
    pub fn display_rect(&self, canvas: Canvas, scale: f64) -> Option<Rect> {
        let height = self.height?;
        let (cx, cy) = self.center_px(canvas, scale);
        let w = self.width_px(canvas, scale);
        let h = height / 100.0 * f64::from(canvas.height) * scale;
        Some(Rect::new(
            cx - w / 2.0,
            cy - h / 2.0,
            cx + w / 2.0,
            cy + h / 2.0,
        ))
    }

    /// Display rectangle for an intrinsic-height frame, centering the
    /// measured pixel height on the `y` anchor.
    pub fn rect_with_height(&self, canvas: Canvas, scale: f64, height_px: f64) -> Rect {
        let (cx, cy) = self.center_px(canvas, scale);
        let w = self.width_px(canvas, scale);
        Rect::new(
            cx - w / 2.0,
            cy - height_px / 2.0,
            cx + w / 2.0,
            cy + height_px / 2.0,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/layout.rs"]
mod tests;
