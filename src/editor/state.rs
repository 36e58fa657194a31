//! Reducer-style editor state.
//!
//! The in-memory document is mutated only through [`EditorAction`] values
//! processed by [`EditorState::apply`], never by direct field assignment.
//! Structural invariants (dense slide positions, cascading deletes, the
//! text-layer cap) live inside the transition function.

use std::collections::BTreeMap;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::layout::{clamp_position_pct, clamp_size_pct};
use crate::scene::{
    AspectRatio, Color, FontWeight, ImageSource, Layer, LayerId, Slide, SlideBackground, SlideId,
    Template, TextAlign, validate_slide_positions,
};

/// Policy cap on text layers per slide; exceeding it is a user-facing
/// rejection, not a silent truncation.
pub const MAX_TEXT_LAYERS_PER_SLIDE: usize = 10;

/// Editor canvas zoom bounds.
pub const MIN_ZOOM: f64 = 0.5;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 2.0;

/// The in-memory template document plus editing session state.
#[derive(Clone, Debug)]
pub struct EditorState {
    pub(crate) template: Template,
    pub(crate) slides: Vec<Slide>,
    pub(crate) layers: BTreeMap<SlideId, Vec<Layer>>,
    pub(crate) selected_slide: Option<SlideId>,
    pub(crate) selected_layer: Option<LayerId>,
    pub(crate) dirty: bool,
    pub(crate) zoom: f64,
}

/// A discrete editor mutation.
#[derive(Clone, Debug)]
pub enum EditorAction {
    /// Append an empty slide and select it.
    AddSlide,
    /// Remove a slide and its layers, renumbering the remainder densely.
    DeleteSlide { slide: SlideId },
    /// Clone a slide and its layers under fresh identities.
    DuplicateSlide { slide: SlideId },
    /// Reassign slide positions from an explicit full ordering.
    ReorderSlides { order: Vec<SlideId> },
    /// Change the selected slide.
    SelectSlide { slide: Option<SlideId> },
    /// Replace a slide's background.
    SetSlideBackground {
        slide: SlideId,
        background: SlideBackground,
    },
    /// Append a default text layer to a slide and select it.
    AddTextLayer { slide: SlideId },
    /// Append an image layer to a slide and select it.
    AddImageLayer { slide: SlideId, source: ImageSource },
    /// Apply a field edit to a layer, looked up across all slides.
    UpdateLayer { layer: LayerId, edit: LayerEdit },
    /// Remove a layer, looked up across all slides.
    DeleteLayer { layer: LayerId },
    /// Reassign one slide's layer z-order from an explicit full ordering.
    ReorderLayers { slide: SlideId, order: Vec<LayerId> },
    /// Change the selected layer.
    SelectLayer { layer: Option<LayerId> },
    /// Switch the template to a named ratio's canonical dimensions.
    ///
    /// Layer percentages are deliberately left unconverted; only absolute
    /// pixel metrics (font size, stroke width) change meaning.
    SetAspectRatio { ratio: AspectRatio },
    /// Set the editor zoom, clamped to [`MIN_ZOOM`]..[`MAX_ZOOM`].
    SetZoom { zoom: f64 },
    /// Rename the template.
    RenameTemplate { name: String },
    /// Replace the template's creative prompt.
    SetPrompt { prompt: Option<String> },
}

/// A field-level layer edit.
#[derive(Clone, Debug)]
pub enum LayerEdit {
    /// Move the layer's center, clamped to the permissive range.
    Move { x: f64, y: f64 },
    /// Resize, clamped to the allowed size range.
    Resize { width: f64, height: Option<f64> },
    SetText { text: String },
    SetFontFamily { family: String },
    SetFontSize { size: f64 },
    SetFontWeight { weight: FontWeight },
    SetTextColor { color: Color },
    SetTextAlign { align: TextAlign },
    SetBackgroundColor { color: Option<Color> },
    SetStroke { color: Option<Color>, width: Option<f64> },
    SetFixed { fixed: bool },
    SetImageSource { source: ImageSource },
}

impl EditorState {
    /// Open a template for editing.
    pub fn new(template: Template, slides: Vec<Slide>, layers: Vec<Layer>) -> SlidecastResult<Self> {
        template.validate()?;
        validate_slide_positions(&slides)?;

        let mut slides = slides;
        slides.sort_by_key(|s| s.position);

        let mut buckets: BTreeMap<SlideId, Vec<Layer>> = BTreeMap::new();
        for slide in &slides {
            buckets.insert(slide.id, Vec::new());
        }
        for layer in layers {
            let Some(bucket) = buckets.get_mut(&layer.slide_id) else {
                return Err(SlidecastError::validation(format!(
                    "layer {} references missing slide {}",
                    layer.id, layer.slide_id
                )));
            };
            bucket.push(layer);
        }
        for bucket in buckets.values_mut() {
            bucket.sort_by_key(|l| l.position);
        }

        let selected_slide = slides.first().map(|s| s.id);
        Ok(Self {
            template,
            slides,
            layers: buckets,
            selected_slide,
            selected_layer: None,
            dirty: false,
            zoom: 1.0,
        })
    }

    /// The template being edited.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Slides in position order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// A slide's layers in z-order.
    pub fn layers_for(&self, slide: SlideId) -> &[Layer] {
        self.layers.get(&slide).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every layer, grouped in slide order.
    pub fn all_layers(&self) -> impl Iterator<Item = &Layer> {
        self.slides
            .iter()
            .flat_map(move |s| self.layers_for(s.id).iter())
    }

    /// Look a layer up across all slides; layer ids are globally unique.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.values().flatten().find(|l| l.id == id)
    }

    /// Currently selected slide.
    pub fn selected_slide(&self) -> Option<SlideId> {
        self.selected_slide
    }

    /// Currently selected layer.
    pub fn selected_layer(&self) -> Option<LayerId> {
        self.selected_layer
    }

    /// Whether the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Editor canvas zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Process one action, upholding every structural invariant.
    pub fn apply(&mut self, action: EditorAction) -> SlidecastResult<()> {
        match action {
            EditorAction::AddSlide => {
                let slide = Slide::new(self.template.id, self.slides.len() as u32);
                let id = slide.id;
                self.layers.insert(id, Vec::new());
                self.slides.push(slide);
                self.selected_slide = Some(id);
                self.selected_layer = None;
                self.dirty = true;
            }
            EditorAction::DeleteSlide { slide } => {
                let idx = self.slide_index(slide)?;
                self.slides.remove(idx);
                let removed = self.layers.remove(&slide).unwrap_or_default();
                self.renumber_slides();
                if self.selected_slide == Some(slide) {
                    self.selected_slide = self.slides.first().map(|s| s.id);
                }
                if let Some(sel) = self.selected_layer
                    && removed.iter().any(|l| l.id == sel)
                {
                    self.selected_layer = None;
                }
                self.dirty = true;
            }
            EditorAction::DuplicateSlide { slide } => {
                let idx = self.slide_index(slide)?;
                let max_position = self.slides.iter().map(|s| s.position).max().unwrap_or(0);
                let mut copy = self.slides[idx].clone();
                copy.id = SlideId::new();
                copy.position = max_position + 1;
                let copy_id = copy.id;

                let cloned: Vec<Layer> = self
                    .layers_for(slide)
                    .iter()
                    .map(|l| {
                        let mut c = l.clone();
                        c.id = crate::scene::LayerId::new();
                        c.slide_id = copy_id;
                        c
                    })
                    .collect();

                self.slides.push(copy);
                self.layers.insert(copy_id, cloned);
                self.selected_slide = Some(copy_id);
                self.selected_layer = None;
                self.dirty = true;
            }
            EditorAction::ReorderSlides { order } => {
                self.reorder_slides(order)?;
                self.dirty = true;
            }
            EditorAction::SelectSlide { slide } => {
                if let Some(id) = slide {
                    self.slide_index(id)?;
                }
                self.selected_slide = slide;
                self.selected_layer = None;
            }
            EditorAction::SetSlideBackground { slide, background } => {
                let idx = self.slide_index(slide)?;
                self.slides[idx].background = background;
                self.dirty = true;
            }
            EditorAction::AddTextLayer { slide } => {
                self.slide_index(slide)?;
                let bucket = self.layers.entry(slide).or_default();
                let text_count = bucket.iter().filter(|l| l.is_text()).count();
                if text_count >= MAX_TEXT_LAYERS_PER_SLIDE {
                    return Err(SlidecastError::validation(format!(
                        "a slide can hold at most {MAX_TEXT_LAYERS_PER_SLIDE} text layers"
                    )));
                }
                let layer = Layer::text(slide, bucket.len() as u32);
                self.selected_layer = Some(layer.id);
                bucket.push(layer);
                self.dirty = true;
            }
            EditorAction::AddImageLayer { slide, source } => {
                self.slide_index(slide)?;
                let bucket = self.layers.entry(slide).or_default();
                let layer = Layer::image(slide, bucket.len() as u32, source);
                self.selected_layer = Some(layer.id);
                bucket.push(layer);
                self.dirty = true;
            }
            EditorAction::UpdateLayer { layer, edit } => {
                let target = self.find_layer_mut(layer)?;
                apply_layer_edit(target, edit)?;
                self.dirty = true;
            }
            EditorAction::DeleteLayer { layer } => {
                let mut found = false;
                for bucket in self.layers.values_mut() {
                    if let Some(pos) = bucket.iter().position(|l| l.id == layer) {
                        bucket.remove(pos);
                        for (i, l) in bucket.iter_mut().enumerate() {
                            l.position = i as u32;
                        }
                        found = true;
                        break;
                    }
                }
                if !found {
                    return Err(SlidecastError::not_found(format!("layer {layer}")));
                }
                if self.selected_layer == Some(layer) {
                    self.selected_layer = None;
                }
                self.dirty = true;
            }
            EditorAction::ReorderLayers { slide, order } => {
                self.reorder_layers(slide, order)?;
                self.dirty = true;
            }
            EditorAction::SelectLayer { layer } => {
                if let Some(id) = layer
                    && self.layer(id).is_none()
                {
                    return Err(SlidecastError::not_found(format!("layer {id}")));
                }
                self.selected_layer = layer;
            }
            EditorAction::SetAspectRatio { ratio } => {
                let (width, height) = ratio.dimensions();
                self.template.aspect_ratio = ratio;
                self.template.width = width;
                self.template.height = height;
                self.dirty = true;
            }
            EditorAction::SetZoom { zoom } => {
                self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            }
            EditorAction::RenameTemplate { name } => {
                if name.trim().is_empty() {
                    return Err(SlidecastError::validation("template name must be non-empty"));
                }
                self.template.name = name;
                self.dirty = true;
            }
            EditorAction::SetPrompt { prompt } => {
                self.template.prompt = prompt;
                self.dirty = true;
            }
        }
        Ok(())
    }

    fn slide_index(&self, id: SlideId) -> SlidecastResult<usize> {
        self.slides
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SlidecastError::not_found(format!("slide {id}")))
    }

    fn renumber_slides(&mut self) {
        for (i, slide) in self.slides.iter_mut().enumerate() {
            slide.position = i as u32;
        }
    }

    fn find_layer_mut(&mut self, id: LayerId) -> SlidecastResult<&mut Layer> {
        self.layers
            .values_mut()
            .flatten()
            .find(|l| l.id == id)
            .ok_or_else(|| SlidecastError::not_found(format!("layer {id}")))
    }

    /// Reassign positions from an explicit full ordering. Drag-reorder UIs
    /// compute the whole ordering and pass it wholesale; this is the only
    /// way positions change.
    fn reorder_slides(&mut self, order: Vec<SlideId>) -> SlidecastResult<()> {
        if order.len() != self.slides.len() {
            return Err(SlidecastError::validation(format!(
                "reorder must name all {} slides, got {}",
                self.slides.len(),
                order.len()
            )));
        }
        let mut reordered = Vec::with_capacity(order.len());
        for (i, id) in order.iter().enumerate() {
            let idx = self
                .slides
                .iter()
                .position(|s| s.id == *id)
                .ok_or_else(|| SlidecastError::not_found(format!("slide {id}")))?;
            if reordered.iter().any(|s: &Slide| s.id == *id) {
                return Err(SlidecastError::validation(format!(
                    "slide {id} appears twice in reorder"
                )));
            }
            let mut slide = self.slides[idx].clone();
            slide.position = i as u32;
            reordered.push(slide);
        }
        self.slides = reordered;
        Ok(())
    }

    fn reorder_layers(&mut self, slide: SlideId, order: Vec<LayerId>) -> SlidecastResult<()> {
        self.slide_index(slide)?;
        let bucket = self.layers.entry(slide).or_default();
        if order.len() != bucket.len() {
            return Err(SlidecastError::validation(format!(
                "reorder must name all {} layers, got {}",
                bucket.len(),
                order.len()
            )));
        }
        let mut reordered = Vec::with_capacity(order.len());
        for (i, id) in order.iter().enumerate() {
            let idx = bucket
                .iter()
                .position(|l| l.id == *id)
                .ok_or_else(|| SlidecastError::not_found(format!("layer {id}")))?;
            if reordered.iter().any(|l: &Layer| l.id == *id) {
                return Err(SlidecastError::validation(format!(
                    "layer {id} appears twice in reorder"
                )));
            }
            let mut layer = bucket[idx].clone();
            layer.position = i as u32;
            reordered.push(layer);
        }
        *bucket = reordered;
        Ok(())
    }

    /// Clone-on-save: give the document fresh identities under a new
    /// owner. Used when saving a premade or foreign template.
    pub(crate) fn fork_for(&mut self, org: crate::scene::OrgId) {
        use std::collections::HashMap;

        self.template.id = crate::scene::TemplateId::new();
        self.template.org = Some(org);
        self.template.premade = false;

        let mut slide_map: HashMap<SlideId, SlideId> = HashMap::new();
        for slide in &mut self.slides {
            let fresh = SlideId::new();
            slide_map.insert(slide.id, fresh);
            slide.id = fresh;
            slide.template_id = self.template.id;
        }

        let old_buckets = std::mem::take(&mut self.layers);
        let mut layer_map: HashMap<LayerId, LayerId> = HashMap::new();
        for (old_slide, mut bucket) in old_buckets {
            let new_slide = slide_map.get(&old_slide).copied().unwrap_or(old_slide);
            for layer in &mut bucket {
                let fresh = LayerId::new();
                layer_map.insert(layer.id, fresh);
                layer.id = fresh;
                layer.slide_id = new_slide;
            }
            self.layers.insert(new_slide, bucket);
        }

        self.selected_slide = self
            .selected_slide
            .and_then(|id| slide_map.get(&id).copied());
        self.selected_layer = self
            .selected_layer
            .and_then(|id| layer_map.get(&id).copied());
    }

    /// Snapshot children for persistence, re-deriving every `position`
    /// from array index.
    pub(crate) fn snapshot_children(&self) -> (Vec<Slide>, Vec<Layer>) {
        let mut slides = Vec::with_capacity(self.slides.len());
        let mut layers = Vec::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let mut s = slide.clone();
            s.position = i as u32;
            for (j, layer) in self.layers_for(slide.id).iter().enumerate() {
                let mut l = layer.clone();
                l.position = j as u32;
                layers.push(l);
            }
            slides.push(s);
        }
        (slides, layers)
    }
}

fn apply_layer_edit(layer: &mut Layer, edit: LayerEdit) -> SlidecastResult<()> {
    match edit {
        LayerEdit::Move { x, y } => {
            layer.x = clamp_position_pct(x);
            layer.y = clamp_position_pct(y);
        }
        LayerEdit::Resize { width, height } => {
            layer.width = clamp_size_pct(width);
            layer.height = height.map(clamp_size_pct);
        }
        LayerEdit::SetText { text } => {
            text_payload(layer)?.text_content = text;
        }
        LayerEdit::SetFontFamily { family } => {
            text_payload(layer)?.font_family = family;
        }
        LayerEdit::SetFontSize { size } => {
            if !size.is_finite() || size <= 0.0 {
                return Err(SlidecastError::validation(
                    "font size must be finite and > 0",
                ));
            }
            text_payload(layer)?.font_size = size;
        }
        LayerEdit::SetFontWeight { weight } => {
            text_payload(layer)?.font_weight = weight;
        }
        LayerEdit::SetTextColor { color } => {
            text_payload(layer)?.text_color = color;
        }
        LayerEdit::SetTextAlign { align } => {
            text_payload(layer)?.text_align = align;
        }
        LayerEdit::SetBackgroundColor { color } => {
            text_payload(layer)?.background_color = color;
        }
        LayerEdit::SetStroke { color, width } => {
            let text = text_payload(layer)?;
            text.stroke_color = color;
            text.stroke_width = width;
        }
        LayerEdit::SetFixed { fixed } => {
            text_payload(layer)?.is_fixed = fixed;
        }
        LayerEdit::SetImageSource { source } => match &mut layer.kind {
            crate::scene::LayerKind::Image(img) => img.source = source,
            crate::scene::LayerKind::Text(_) => {
                return Err(SlidecastError::validation(
                    "image source edits apply to image layers only",
                ));
            }
        },
    }
    Ok(())
}

fn text_payload(layer: &mut Layer) -> SlidecastResult<&mut crate::scene::TextLayer> {
    layer
        .as_text_mut()
        .ok_or_else(|| SlidecastError::validation("text edits apply to text layers only"))
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
