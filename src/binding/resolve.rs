use rand::Rng as _;

use crate::binding::textgen::{
    GeneratedContent, GenerationOptions, GenerationRequest, TextGenerator, parse_generated,
};
use crate::credits::{CreditBalance, CreditCharge};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::{
    ImageRef, ImageSource, Layer, Post, PostContent, PostLayer, PostSlide, Slide, SlideBackground,
    Template,
};
use crate::store::{ContentStore, StoredImage};

const SYSTEM_PROMPT: &str = "You write copy for social media carousel posts. \
Respond with exactly one JSON object of the shape \
{\"title\": string, \"caption\": string, \"slides\": [{\"slide_id\": string, \
\"layers\": [{\"layer_id\": string, \"text_content\": string}]}]}. \
The title is short and contains no hashtags. The caption may end with at \
most three hashtags. Layer text never contains hashtags. Fill every layer \
listed in the request and no others.";

/// Resolve one post instance from a template.
///
/// Backgrounds and image layers resolve their collection bindings (one
/// independent uniform draw per slide and per layer); non-fixed text
/// layers are filled by the text-generation collaborator; fixed text
/// passes through unchanged. The result is a frozen snapshot that is
/// never re-resolved on later reads.
pub fn resolve_post_content(
    store: &dyn ContentStore,
    textgen: &dyn TextGenerator,
    template: &Template,
    slides: &[Slide],
    layers: &[Layer],
    brief: &str,
    opts: &GenerationOptions,
) -> SlidecastResult<PostContent> {
    let request = build_generation_request(template, slides, layers, brief, opts);
    let raw = textgen.generate(&request)?;
    let generated = parse_generated(&raw)?;

    let mut post_slides = Vec::with_capacity(slides.len());
    for slide in slides {
        let background_image_url = resolve_background(store, slide)?;

        let mut post_layers = Vec::new();
        for layer in layers.iter().filter(|l| l.slide_id == slide.id) {
            post_layers.push(resolve_layer(store, slide, layer, &generated)?);
        }

        post_slides.push(PostSlide {
            slide_id: slide.id,
            position: slide.position,
            background_image_url,
            layers: post_layers,
        });
    }

    Ok(PostContent {
        template_id: template.id,
        title: Some(generated.title),
        caption: Some(generated.caption),
        slides: post_slides,
    })
}

/// Generate a post under an optimistic credit charge.
///
/// The charge is applied before the generation call and committed only
/// when the whole resolution succeeds; any failure rolls the balance back
/// to its exact prior value, so no partial content is ever paid for.
pub fn generate_post(
    store: &dyn ContentStore,
    textgen: &dyn TextGenerator,
    balance: &mut CreditBalance,
    cost: u32,
    template: &Template,
    slides: &[Slide],
    layers: &[Layer],
    brief: &str,
    opts: &GenerationOptions,
) -> SlidecastResult<Post> {
    let charge = CreditCharge::begin(balance, cost).map_err(SlidecastError::from)?;
    let content = resolve_post_content(store, textgen, template, slides, layers, brief, opts)?;
    charge.commit();
    Ok(Post::new(content))
}

/// Resolve a slide's background to a concrete image URL, if it has one.
///
/// `collection_random` draws one image uniformly, independently per call;
/// an empty collection resolves to `None` and renders as a placeholder.
pub fn resolve_background(
    store: &dyn ContentStore,
    slide: &Slide,
) -> SlidecastResult<Option<String>> {
    match &slide.background {
        SlideBackground::None | SlideBackground::Color { .. } => Ok(None),
        SlideBackground::Image { image } => match image {
            ImageRef::Url { url } => Ok(Some(url.clone())),
            ImageRef::Stored { image_id } => Ok(Some(store.image(*image_id)?.url)),
        },
        SlideBackground::CollectionRandom { collection_id } => {
            let images = store.collection_images(*collection_id)?;
            Ok(pick_random(&images).map(|img| img.url.clone()))
        }
        SlideBackground::CollectionSpecific { image_id, .. } => {
            Ok(Some(store.image(*image_id)?.url))
        }
    }
}

fn resolve_layer(
    store: &dyn ContentStore,
    slide: &Slide,
    layer: &Layer,
    generated: &GeneratedContent,
) -> SlidecastResult<PostLayer> {
    match &layer.kind {
        crate::scene::LayerKind::Text(text) => {
            let content = if text.is_fixed {
                text.text_content.clone()
            } else {
                match generated.text_for(slide.id, layer.id) {
                    Some(s) => s.to_owned(),
                    None => {
                        tracing::warn!(
                            layer = %layer.id,
                            "generation response missing layer text; keeping template text"
                        );
                        text.text_content.clone()
                    }
                }
            };
            Ok(PostLayer {
                layer_id: layer.id,
                text_content: Some(content),
                image_url: None,
            })
        }
        crate::scene::LayerKind::Image(image) => {
            let url = match &image.source {
                ImageSource::Specific { image_id } | ImageSource::Upload { image_id } => {
                    Some(store.image(*image_id)?.url)
                }
                ImageSource::CollectionRandom { collection_id } => {
                    let images = store.collection_images(*collection_id)?;
                    pick_random(&images).map(|img| img.url.clone())
                }
            };
            Ok(PostLayer {
                layer_id: layer.id,
                text_content: None,
                image_url: url,
            })
        }
    }
}

fn pick_random(images: &[StoredImage]) -> Option<&StoredImage> {
    if images.is_empty() {
        return None;
    }
    let idx = rand::rng().random_range(0..images.len());
    images.get(idx)
}

fn build_generation_request(
    template: &Template,
    slides: &[Slide],
    layers: &[Layer],
    brief: &str,
    opts: &GenerationOptions,
) -> GenerationRequest {
    // Fixed text layers are excluded from the request entirely; the model
    // only sees what it is allowed to write.
    let slide_specs: Vec<serde_json::Value> = slides
        .iter()
        .map(|slide| {
            let layer_specs: Vec<serde_json::Value> = layers
                .iter()
                .filter(|l| l.slide_id == slide.id)
                .filter_map(|l| {
                    let text = l.as_text()?;
                    if text.is_fixed {
                        return None;
                    }
                    Some(serde_json::json!({
                        "layer_id": l.id,
                        "current_text": text.text_content,
                    }))
                })
                .collect();
            serde_json::json!({
                "slide_id": slide.id,
                "position": slide.position,
                "layers": layer_specs,
            })
        })
        .collect();

    let user_prompt = serde_json::json!({
        "template_prompt": template.prompt,
        "creative_brief": brief,
        "slides": slide_specs,
    })
    .to_string();

    GenerationRequest {
        system_prompt: SYSTEM_PROMPT.to_owned(),
        user_prompt,
        model: opts.model.clone(),
        temperature: opts.temperature,
        max_tokens: opts.max_tokens,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/binding/resolve.rs"]
mod tests;
