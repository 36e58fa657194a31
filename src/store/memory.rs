use std::collections::BTreeMap;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::{
    CollectionId, ImageId, Layer, Post, PostId, PostStatus, Slide, SlideId, Template, TemplateId,
};
use crate::store::{ContentStore, ObjectStorage, StoredImage};

/// In-memory [`ContentStore`] used by tests and the CLI.
#[derive(Default)]
pub struct MemoryStore {
    templates: BTreeMap<TemplateId, Template>,
    slides: BTreeMap<TemplateId, Vec<Slide>>,
    layers: BTreeMap<SlideId, Vec<Layer>>,
    images: BTreeMap<ImageId, StoredImage>,
    collections: BTreeMap<CollectionId, Vec<ImageId>>,
    posts: BTreeMap<PostId, Post>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image row.
    pub fn put_image(&mut self, image: StoredImage) {
        self.images.insert(image.id, image);
    }

    /// Register a collection's membership.
    pub fn put_collection(&mut self, id: CollectionId, image_ids: Vec<ImageId>) {
        self.collections.insert(id, image_ids);
    }
}

impl ContentStore for MemoryStore {
    fn template(&self, id: TemplateId) -> SlidecastResult<Template> {
        self.templates
            .get(&id)
            .cloned()
            .ok_or_else(|| SlidecastError::not_found(format!("template {id}")))
    }

    fn slides(&self, template: TemplateId) -> SlidecastResult<Vec<Slide>> {
        let mut slides = self.slides.get(&template).cloned().unwrap_or_default();
        slides.sort_by_key(|s| s.position);
        Ok(slides)
    }

    fn layers(&self, slide: SlideId) -> SlidecastResult<Vec<Layer>> {
        let mut layers = self.layers.get(&slide).cloned().unwrap_or_default();
        layers.sort_by_key(|l| l.position);
        Ok(layers)
    }

    fn image(&self, id: ImageId) -> SlidecastResult<StoredImage> {
        self.images
            .get(&id)
            .cloned()
            .ok_or_else(|| SlidecastError::not_found(format!("image {id}")))
    }

    fn images_by_ids(&self, ids: &[ImageId]) -> SlidecastResult<Vec<StoredImage>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.images.get(id).cloned())
            .collect())
    }

    fn collection_images(&self, id: CollectionId) -> SlidecastResult<Vec<StoredImage>> {
        let ids = self.collections.get(&id).cloned().unwrap_or_default();
        self.images_by_ids(&ids)
    }

    fn insert_template(
        &mut self,
        template: Template,
        slides: Vec<Slide>,
        layers: Vec<Layer>,
    ) -> SlidecastResult<()> {
        let id = template.id;
        self.templates.insert(id, template);
        self.replace_children(id, slides, layers)
    }

    fn update_template(&mut self, template: Template) -> SlidecastResult<()> {
        if !self.templates.contains_key(&template.id) {
            return Err(SlidecastError::not_found(format!(
                "template {}",
                template.id
            )));
        }
        self.templates.insert(template.id, template);
        Ok(())
    }

    fn replace_children(
        &mut self,
        template: TemplateId,
        slides: Vec<Slide>,
        layers: Vec<Layer>,
    ) -> SlidecastResult<()> {
        if let Some(old) = self.slides.remove(&template) {
            for slide in old {
                self.layers.remove(&slide.id);
            }
        }
        for layer in layers {
            self.layers.entry(layer.slide_id).or_default().push(layer);
        }
        self.slides.insert(template, slides);
        Ok(())
    }

    fn insert_post(&mut self, post: Post) -> SlidecastResult<()> {
        self.posts.insert(post.id, post);
        Ok(())
    }

    fn post(&self, id: PostId) -> SlidecastResult<Post> {
        self.posts
            .get(&id)
            .cloned()
            .ok_or_else(|| SlidecastError::not_found(format!("post {id}")))
    }

    fn update_post_status(&mut self, id: PostId, status: PostStatus) -> SlidecastResult<()> {
        let post = self
            .posts
            .get_mut(&id)
            .ok_or_else(|| SlidecastError::not_found(format!("post {id}")))?;
        post.status = status;
        Ok(())
    }
}

/// In-memory [`ObjectStorage`] with `memory://` URLs.
#[derive(Default)]
pub struct MemoryStorage {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for a path, if any.
    pub fn object(&self, path: &str) -> Option<&[u8]> {
        self.objects.get(path).map(|v| v.as_slice())
    }
}

impl ObjectStorage for MemoryStorage {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> SlidecastResult<()> {
        self.objects.insert(path.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}
