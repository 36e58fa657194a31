//! CPU rendering: parley text layout and the vello_cpu slide compositor.

pub mod compositor;
pub(crate) mod layer;
pub mod text;

pub use compositor::{Compositor, SlideFrame, SlideScale, SlideView};
pub use text::FontLibrary;
