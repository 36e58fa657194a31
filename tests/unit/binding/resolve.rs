use super::*;
use crate::scene::{AspectRatio, CollectionId, ImageId, OrgId};
use crate::store::MemoryStore;

struct StubGenerator {
    reply: String,
}

impl TextGenerator for StubGenerator {
    fn generate(&self, _request: &GenerationRequest) -> SlidecastResult<String> {
        Ok(self.reply.clone())
    }
}

struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn generate(&self, _request: &GenerationRequest) -> SlidecastResult<String> {
        Err(SlidecastError::generation("provider down"))
    }
}

struct Fixture {
    store: MemoryStore,
    template: Template,
    slides: Vec<Slide>,
    layers: Vec<Layer>,
}

/// One slide holding a fixed text layer, a generated text layer, a
/// specific image layer, and a collection-random image layer.
fn fixture(collection_image_urls: &[&str]) -> Fixture {
    let mut store = MemoryStore::new();
    let template = Template::new(OrgId::new(), "fixture", AspectRatio::NineBySixteen);
    let slide = Slide::new(template.id, 0);

    let specific_image = ImageId::new();
    store.put_image(StoredImage {
        id: specific_image,
        url: "https://cdn.example/specific.png".to_owned(),
    });

    let collection = CollectionId::new();
    let mut members = Vec::new();
    for url in collection_image_urls {
        let id = ImageId::new();
        store.put_image(StoredImage {
            id,
            url: (*url).to_owned(),
        });
        members.push(id);
    }
    store.put_collection(collection, members);

    let mut fixed = Layer::text(slide.id, 0);
    {
        let t = fixed.as_text_mut().unwrap();
        t.text_content = "Brand tagline".to_owned();
        t.is_fixed = true;
    }
    let mut generated = Layer::text(slide.id, 1);
    generated.as_text_mut().unwrap().text_content = "placeholder".to_owned();
    let specific = Layer::image(
        slide.id,
        2,
        ImageSource::Specific {
            image_id: specific_image,
        },
    );
    let random = Layer::image(
        slide.id,
        3,
        ImageSource::CollectionRandom {
            collection_id: collection,
        },
    );

    Fixture {
        store,
        template,
        slides: vec![slide],
        layers: vec![fixed, generated, specific, random],
    }
}

fn reply_for(fx: &Fixture, generated_text: &str) -> String {
    let slide = fx.slides[0].id;
    let layer = fx.layers[1].id;
    format!(
        "{{\"title\": \"A title\", \"caption\": \"A caption #tag\", \
         \"slides\": [{{\"slide_id\": \"{slide}\", \"layers\": \
         [{{\"layer_id\": \"{layer}\", \"text_content\": \"{generated_text}\"}}]}}]}}"
    )
}

#[test]
fn fixed_text_passes_through_and_generated_text_is_applied() {
    let fx = fixture(&["https://cdn.example/c0.png"]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "Written by the model"),
    };

    let content = resolve_post_content(
        &fx.store,
        &generator,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "a creative brief",
        &GenerationOptions::default(),
    )
    .unwrap();

    assert_eq!(content.title.as_deref(), Some("A title"));
    assert_eq!(content.caption.as_deref(), Some("A caption #tag"));

    let slide = &content.slides[0];
    assert_eq!(
        slide.layer(fx.layers[0].id).unwrap().text_content.as_deref(),
        Some("Brand tagline")
    );
    assert_eq!(
        slide.layer(fx.layers[1].id).unwrap().text_content.as_deref(),
        Some("Written by the model")
    );
}

#[test]
fn image_layers_resolve_specific_and_collection_sources() {
    let fx = fixture(&["https://cdn.example/only.png"]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "x"),
    };

    let content = resolve_post_content(
        &fx.store,
        &generator,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap();

    let slide = &content.slides[0];
    assert_eq!(
        slide.layer(fx.layers[2].id).unwrap().image_url.as_deref(),
        Some("https://cdn.example/specific.png")
    );
    // a one-image collection always draws that image
    assert_eq!(
        slide.layer(fx.layers[3].id).unwrap().image_url.as_deref(),
        Some("https://cdn.example/only.png")
    );
}

#[test]
fn empty_collection_resolves_to_no_url() {
    let fx = fixture(&[]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "x"),
    };

    let content = resolve_post_content(
        &fx.store,
        &generator,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap();

    assert_eq!(
        content.slides[0].layer(fx.layers[3].id).unwrap().image_url,
        None
    );
}

#[test]
fn background_resolution_covers_each_variant() {
    let fx = fixture(&["https://cdn.example/bg.png"]);

    let mut url_slide = fx.slides[0].clone();
    url_slide.background = SlideBackground::Image {
        image: ImageRef::Url {
            url: "https://cdn.example/direct.png".to_owned(),
        },
    };
    assert_eq!(
        resolve_background(&fx.store, &url_slide).unwrap().as_deref(),
        Some("https://cdn.example/direct.png")
    );

    let mut color_slide = fx.slides[0].clone();
    color_slide.background = SlideBackground::Color {
        color: crate::scene::Color::WHITE,
    };
    assert_eq!(resolve_background(&fx.store, &color_slide).unwrap(), None);

    let mut missing = fx.slides[0].clone();
    missing.background = SlideBackground::Image {
        image: ImageRef::Stored {
            image_id: ImageId::new(),
        },
    };
    assert!(matches!(
        resolve_background(&fx.store, &missing),
        Err(SlidecastError::NotFound(_))
    ));
}

#[test]
fn persisted_content_is_a_frozen_snapshot() {
    let fx = fixture(&["https://cdn.example/a.png", "https://cdn.example/b.png"]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "frozen"),
    };

    let mut store = fx.store;
    let content = resolve_post_content(
        &store,
        &generator,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap();
    let post = Post::new(content);
    let post_id = post.id;
    store.insert_post(post).unwrap();

    let first = store.post(post_id).unwrap();
    let second = store.post(post_id).unwrap();
    assert_eq!(
        serde_json::to_value(&first.content).unwrap(),
        serde_json::to_value(&second.content).unwrap()
    );
}

#[test]
fn generation_failure_rolls_the_credit_charge_back_exactly() {
    let fx = fixture(&[]);
    let mut balance = CreditBalance::new(9);

    let err = generate_post(
        &fx.store,
        &FailingGenerator,
        &mut balance,
        1,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SlidecastError::Generation(_)));
    assert_eq!(balance.available(), 9);
}

#[test]
fn unparseable_output_also_fails_atomically() {
    let fx = fixture(&[]);
    let generator = StubGenerator {
        reply: "sorry, I can't help with that".to_owned(),
    };
    let mut balance = CreditBalance::new(4);

    let err = generate_post(
        &fx.store,
        &generator,
        &mut balance,
        2,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SlidecastError::Generation(_)));
    assert_eq!(balance.available(), 4);
}

#[test]
fn successful_generation_commits_the_charge() {
    let fx = fixture(&[]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "paid for"),
    };
    let mut balance = CreditBalance::new(4);

    let post = generate_post(
        &fx.store,
        &generator,
        &mut balance,
        1,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap();

    assert_eq!(balance.available(), 3);
    assert_eq!(post.status, crate::scene::PostStatus::Draft);
}

#[test]
fn insufficient_credits_is_a_typed_condition_and_spends_nothing() {
    let fx = fixture(&[]);
    let generator = StubGenerator {
        reply: reply_for(&fx, "never sent"),
    };
    let mut balance = CreditBalance::new(2);

    let err = generate_post(
        &fx.store,
        &generator,
        &mut balance,
        5,
        &fx.template,
        &fx.slides,
        &fx.layers,
        "",
        &GenerationOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        SlidecastError::InsufficientCredits {
            required: 5,
            available: 2
        }
    ));
    assert_eq!(balance.available(), 2);
}

#[test]
fn fixed_layers_are_excluded_from_the_generation_request() {
    let fx = fixture(&[]);
    let request = build_generation_request(
        &fx.template,
        &fx.slides,
        &fx.layers,
        "brief",
        &GenerationOptions::default(),
    );

    let fixed_id = fx.layers[0].id.to_string();
    let generated_id = fx.layers[1].id.to_string();
    assert!(!request.user_prompt.contains(&fixed_id));
    assert!(request.user_prompt.contains(&generated_id));
    assert!(request.system_prompt.contains("hashtags"));
}
