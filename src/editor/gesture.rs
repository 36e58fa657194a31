//! Headless drag/resize/inline-edit gesture math.
//!
//! A gesture value exists only between its begin and finish; holding the
//! conversion state here (instead of ambient listeners) is what scopes
//! update emission exactly to the gesture's lifetime. Each update returns
//! a [`LayerEdit`] for [`EditorState::apply`](super::EditorState::apply).

use crate::editor::state::LayerEdit;
use crate::foundation::layout::{Canvas, clamp_position_pct, clamp_size_pct};
use crate::scene::{Layer, LayerId};

/// Handle grabbed to resize a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ResizeHandle {
    /// All handles, corner and edge.
    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::TopLeft,
            ResizeHandle::Top,
            ResizeHandle::TopRight,
            ResizeHandle::Left,
            ResizeHandle::Right,
            ResizeHandle::BottomLeft,
            ResizeHandle::Bottom,
            ResizeHandle::BottomRight,
        ]
    }

    /// Whether this handle is a corner (scales both axes).
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomLeft
                | ResizeHandle::BottomRight
        )
    }

    fn scales_x(self) -> bool {
        !matches!(self, ResizeHandle::Top | ResizeHandle::Bottom)
    }

    fn scales_y(self) -> bool {
        !matches!(self, ResizeHandle::Left | ResizeHandle::Right)
    }

    /// Outward direction of horizontal movement for this handle.
    fn sign_x(self) -> f64 {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft => -1.0,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight => 1.0,
            ResizeHandle::Top | ResizeHandle::Bottom => 0.0,
        }
    }

    /// Outward direction of vertical movement for this handle.
    fn sign_y(self) -> f64 {
        match self {
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight => -1.0,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight => 1.0,
            ResizeHandle::Left | ResizeHandle::Right => 0.0,
        }
    }
}

/// An active drag-to-reposition gesture.
#[derive(Debug, Clone)]
pub struct DragGesture {
    layer: LayerId,
    start_x: f64,
    start_y: f64,
}

impl DragGesture {
    /// Capture the layer's position at gesture start.
    pub fn begin(layer: &Layer) -> Self {
        Self {
            layer: layer.id,
            start_x: layer.x,
            start_y: layer.y,
        }
    }

    /// The layer being dragged.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Convert an accumulated pixel delta into a clamped move edit.
    pub fn update(&self, dx_px: f64, dy_px: f64, canvas: Canvas, scale: f64) -> LayerEdit {
        let cw = f64::from(canvas.width) * scale;
        let ch = f64::from(canvas.height) * scale;
        LayerEdit::Move {
            x: clamp_position_pct(self.start_x + dx_px / cw * 100.0),
            y: clamp_position_pct(self.start_y + dy_px / ch * 100.0),
        }
    }
}

/// An active resize gesture.
///
/// The anchor is the layer's center, so moving a handle by `d` moves both
/// opposing edges symmetrically: the new dimension is the original plus
/// twice the outward delta.
#[derive(Debug, Clone)]
pub struct ResizeGesture {
    layer: LayerId,
    handle: ResizeHandle,
    start_width: f64,
    start_height: Option<f64>,
}

impl ResizeGesture {
    /// Capture the layer's size at gesture start.
    pub fn begin(layer: &Layer, handle: ResizeHandle) -> Self {
        Self {
            layer: layer.id,
            handle,
            start_width: layer.width,
            start_height: layer.height,
        }
    }

    /// The layer being resized.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Convert an accumulated pixel delta into a clamped resize edit.
    ///
    /// Corner handles scale both axes; edge handles one. Intrinsic-height
    /// layers (text) only ever resize in width.
    pub fn update(&self, dx_px: f64, dy_px: f64, canvas: Canvas, scale: f64) -> LayerEdit {
        let cw = f64::from(canvas.width) * scale;
        let ch = f64::from(canvas.height) * scale;
        let dx_pct = dx_px / cw * 100.0;
        let dy_pct = dy_px / ch * 100.0;

        let width = if self.handle.scales_x() {
            clamp_size_pct(self.start_width + 2.0 * self.handle.sign_x() * dx_pct)
        } else {
            self.start_width
        };
        let height = self.start_height.map(|h| {
            if self.handle.scales_y() {
                clamp_size_pct(h + 2.0 * self.handle.sign_y() * dy_pct)
            } else {
                h
            }
        });

        LayerEdit::Resize { width, height }
    }
}

/// A local draft buffer for double-click inline text editing.
///
/// The buffer never leaks into the committed model until
/// [`TextDraft::commit`]; concurrent external updates to the layer's text
/// cannot fight the user's keystrokes.
#[derive(Debug, Clone)]
pub struct TextDraft {
    layer: LayerId,
    buffer: String,
}

impl TextDraft {
    /// Start editing a text layer; `None` for image layers.
    pub fn begin(layer: &Layer) -> Option<Self> {
        let text = layer.as_text()?;
        Some(Self {
            layer: layer.id,
            buffer: text.text_content.clone(),
        })
    }

    /// The layer being edited.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Current draft contents.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Replace the draft contents.
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Commit on blur or Enter.
    pub fn commit(self) -> (LayerId, LayerEdit) {
        (self.layer, LayerEdit::SetText { text: self.buffer })
    }

    /// Discard on Escape.
    pub fn cancel(self) {}
}

#[cfg(test)]
#[path = "../../tests/unit/editor/gesture.rs"]
mod tests;
