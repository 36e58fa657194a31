//! Single-post and bulk export.
//!
//! Each slide goes through the same serial loop: filter layers for the
//! export mode, preload every referenced image (the preload barrier),
//! render through the compositor at native resolution (scale 1.0), encode
//! to PNG. Serial processing bounds peak memory from decoded images and
//! keeps error attribution to exactly one post.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::{ImageFetcher, PreloadOptions, PreloadedImages};
use crate::export::archive::{SidecarText, ZipBuilder};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::{Compositor, FontLibrary, SlideScale, SlideView};
use crate::scene::{Layer, Post, PostContent, PostId, Slide, Template, TemplateId, TemplateKind};
use crate::store::ContentStore;

/// What ends up in the rendered slides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// All layers as-is.
    WithText,
    /// Drop every text layer; their content goes to the sidecar, grouped
    /// by slide.
    ImagesOnly,
    /// Drop only non-fixed text layers from slide index 0; fixed text and
    /// all other slides' text stay.
    FirstSlideNoText,
}

/// Export configuration.
#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    pub mode: ExportMode,
    pub preload: PreloadOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::WithText,
            preload: PreloadOptions::default(),
        }
    }
}

/// One post to export: its frozen content plus display title/caption.
#[derive(Clone, Debug)]
pub struct PostExportInput {
    pub post_id: PostId,
    pub content: PostContent,
    pub title: Option<String>,
    pub caption: Option<String>,
}

impl PostExportInput {
    /// Build the input from a stored post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            post_id: post.id,
            content: post.content.clone(),
            title: post.content.title.clone(),
            caption: post.content.caption.clone(),
        }
    }
}

/// Template rows shared by every post on the same template.
struct TemplateStructure {
    template: Template,
    slides: Vec<Slide>,
}

/// Drives exports against the persistence and fetch collaborators.
pub struct Exporter<'a> {
    store: &'a dyn ContentStore,
    fetcher: &'a dyn ImageFetcher,
    compositor: Compositor,
}

impl<'a> Exporter<'a> {
    /// Create an exporter rendering with `fonts`.
    pub fn new(
        store: &'a dyn ContentStore,
        fetcher: &'a dyn ImageFetcher,
        fonts: FontLibrary,
    ) -> Self {
        Self {
            store,
            fetcher,
            compositor: Compositor::new(fonts),
        }
    }

    /// Export one post to a zip archive: `images/slide-NN.png` plus
    /// `post-text.txt`.
    pub fn export_single_post(
        &mut self,
        input: &PostExportInput,
        opts: &ExportOptions,
    ) -> SlidecastResult<Vec<u8>> {
        let structure = self.fetch_structure(input.content.template_id)?;
        let (files, sidecar) = self.render_post(&structure, input, opts)?;

        let mut zip = ZipBuilder::new();
        for (name, png) in &files {
            zip.add_file(&format!("images/{name}"), png)?;
        }
        zip.add_file("post-text.txt", sidecar.render().as_bytes())?;
        zip.finish()
    }

    /// Export many posts into one master zip with a `post-NN-<id8>/`
    /// folder per post.
    ///
    /// Template structure is fetched once per template id; layers are
    /// re-fetched per post because content binding overlays differ. Posts
    /// are processed one at a time and `progress(current, total)` fires
    /// after each completes. A post whose template rows cannot be fetched
    /// fails the export loudly, it is never silently skipped.
    pub fn export_posts_bulk(
        &mut self,
        inputs: &[PostExportInput],
        opts: &ExportOptions,
        mut progress: impl FnMut(usize, usize),
    ) -> SlidecastResult<Vec<u8>> {
        let mut structures: HashMap<TemplateId, Arc<TemplateStructure>> = HashMap::new();
        let mut zip = ZipBuilder::new();
        let total = inputs.len();

        for (i, input) in inputs.iter().enumerate() {
            let attribute =
                |e: SlidecastError| SlidecastError::export(format!("post {} ({}): {e}", i + 1, input.post_id));

            let structure = match structures.get(&input.content.template_id) {
                Some(s) => Arc::clone(s),
                None => {
                    let s = Arc::new(
                        self.fetch_structure(input.content.template_id)
                            .map_err(&attribute)?,
                    );
                    structures.insert(input.content.template_id, Arc::clone(&s));
                    s
                }
            };

            let (files, sidecar) = self
                .render_post(&structure, input, opts)
                .map_err(&attribute)?;

            let folder = format!("post-{:02}-{}", i + 1, input.post_id.short());
            for (name, png) in &files {
                zip.add_file(&format!("{folder}/images/{name}"), png)?;
            }
            zip.add_file(
                &format!("{folder}/post-text.txt"),
                sidecar.render().as_bytes(),
            )?;

            tracing::debug!(post = %input.post_id, current = i + 1, total, "bulk export progress");
            progress(i + 1, total);
        }

        zip.finish()
    }

    fn fetch_structure(&self, template_id: TemplateId) -> SlidecastResult<TemplateStructure> {
        let template = self.store.template(template_id)?;
        let slides = self.store.slides(template_id)?;
        Ok(TemplateStructure { template, slides })
    }

    /// Render every slide of one post. Serial per slide: preload, render,
    /// encode, then move on, so at most one slide's images are decoded at
    /// a time.
    fn render_post(
        &mut self,
        structure: &TemplateStructure,
        input: &PostExportInput,
        opts: &ExportOptions,
    ) -> SlidecastResult<(Vec<(String, Vec<u8>)>, SidecarText)> {
        let mut files = Vec::with_capacity(structure.slides.len());
        let mut slide_text = Vec::new();

        for (idx, slide) in structure.slides.iter().enumerate() {
            let layers = self.store.layers(slide.id)?;
            let mut view = match input.content.slide(slide.id) {
                Some(ps) => SlideView::from_post_slide(ps),
                None => SlideView::template_only(),
            };

            let (kept, removed) = filter_layers(opts.mode, idx, &layers, &view);
            view.retain_layers(|id| kept.iter().any(|l| l.id == id));

            let mut urls: Vec<String> = Vec::new();
            if structure.template.kind == TemplateKind::Video
                && let Some(u) = structure.template.video_url.clone()
            {
                urls.push(u);
            }
            if let Some(u) = view.background_url.clone() {
                urls.push(u);
            }
            for layer in &kept {
                if let Some(u) = view.overlay(layer.id).and_then(|o| o.image_url.clone()) {
                    urls.push(u);
                }
            }

            let images = PreloadedImages::preload(self.fetcher, urls, opts.preload);
            if images.failed_count() > 0 {
                tracing::warn!(
                    slide = %slide.id,
                    failed = images.failed_count(),
                    "some images failed to preload; exporting placeholders"
                );
            }

            let frame = self.compositor.render_slide(
                &structure.template,
                slide,
                &kept,
                &view,
                &images,
                SlideScale::Fixed(1.0),
            )?;
            files.push((format!("slide-{:02}.png", idx + 1), encode_png(&frame)?));

            if !removed.is_empty() {
                slide_text.push((idx as u32 + 1, removed));
            }
        }

        let sidecar = SidecarText {
            title: input
                .title
                .clone()
                .or_else(|| input.content.title.clone())
                .unwrap_or_default(),
            caption: input
                .caption
                .clone()
                .or_else(|| input.content.caption.clone())
                .unwrap_or_default(),
            slide_text,
        };
        Ok((files, sidecar))
    }
}

/// Apply the export mode's layer filter for one slide.
///
/// Returns the layers to render and the text content removed from this
/// slide (destined for the sidecar).
fn filter_layers(
    mode: ExportMode,
    slide_index: usize,
    layers: &[Layer],
    view: &SlideView,
) -> (Vec<Layer>, Vec<String>) {
    let resolved_text = |layer: &Layer| -> Option<String> {
        let template_text = layer.as_text().map(|t| t.text_content.as_str());
        let text = view
            .overlay(layer.id)
            .and_then(|o| o.text_content.as_deref())
            .or(template_text)?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    };

    let drop_layer = |layer: &Layer| match mode {
        ExportMode::WithText => false,
        ExportMode::ImagesOnly => layer.is_text(),
        ExportMode::FirstSlideNoText => {
            slide_index == 0 && layer.as_text().is_some_and(|t| !t.is_fixed)
        }
    };

    let mut kept = Vec::with_capacity(layers.len());
    let mut removed = Vec::new();
    for layer in layers {
        if drop_layer(layer) {
            if let Some(text) = resolved_text(layer) {
                removed.push(text);
            }
        } else {
            kept.push(layer.clone());
        }
    }
    (kept, removed)
}

fn encode_png(frame: &crate::render::SlideFrame) -> SlidecastResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| SlidecastError::export("frame buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| SlidecastError::export(format!("png encode: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
