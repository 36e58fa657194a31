//! External collaborator seams.
//!
//! Persistence, object storage, and text generation are owned by the
//! embedding application; the engine talks to them through these traits.
//! [`MemoryStore`] backs tests and the CLI.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::foundation::error::SlidecastResult;
use crate::scene::{
    CollectionId, ImageId, Layer, Post, PostId, PostStatus, Slide, SlideId, Template, TemplateId,
};

pub use memory::{MemoryStorage, MemoryStore};

/// A stored image row with its public URL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: ImageId,
    pub url: String,
}

/// CRUD seam over the persistence collaborator.
///
/// Reads of slides and layers come back ordered by `position`; child
/// replacement is a single call so a transactional store can keep the
/// delete-then-reinsert shape atomic.
pub trait ContentStore {
    /// Fetch a template row.
    fn template(&self, id: TemplateId) -> SlidecastResult<Template>;

    /// Fetch a template's slides ordered by position.
    fn slides(&self, template: TemplateId) -> SlidecastResult<Vec<Slide>>;

    /// Fetch a slide's layers ordered by position (z-order).
    fn layers(&self, slide: SlideId) -> SlidecastResult<Vec<Layer>>;

    /// Fetch one image row.
    fn image(&self, id: ImageId) -> SlidecastResult<StoredImage>;

    /// Bulk-resolve image rows; missing ids are skipped.
    fn images_by_ids(&self, ids: &[ImageId]) -> SlidecastResult<Vec<StoredImage>>;

    /// All images in a collection.
    fn collection_images(&self, id: CollectionId) -> SlidecastResult<Vec<StoredImage>>;

    /// Insert a new template with its children.
    fn insert_template(
        &mut self,
        template: Template,
        slides: Vec<Slide>,
        layers: Vec<Layer>,
    ) -> SlidecastResult<()>;

    /// Update a template row in place.
    fn update_template(&mut self, template: Template) -> SlidecastResult<()>;

    /// Replace all of a template's slides and layers wholesale.
    fn replace_children(
        &mut self,
        template: TemplateId,
        slides: Vec<Slide>,
        layers: Vec<Layer>,
    ) -> SlidecastResult<()>;

    /// Insert a generated post.
    fn insert_post(&mut self, post: Post) -> SlidecastResult<()>;

    /// Fetch a post.
    fn post(&self, id: PostId) -> SlidecastResult<Post>;

    /// Update a post's status field.
    fn update_post_status(&mut self, id: PostId, status: PostStatus) -> SlidecastResult<()>;
}

/// Object storage seam: uploads are immediately publicly readable at the
/// returned URL.
pub trait ObjectStorage {
    /// Store bytes at `path`.
    fn upload(&mut self, path: &str, bytes: &[u8]) -> SlidecastResult<()>;

    /// Public URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

/// Upload a freshly-picked image and return the row to persist.
///
/// The returned image is what an `upload`-sourced layer references; its
/// URL is the storage collaborator's public URL for the path.
pub fn store_uploaded_image(
    storage: &mut dyn ObjectStorage,
    path: &str,
    bytes: &[u8],
) -> SlidecastResult<StoredImage> {
    storage.upload(path, bytes)?;
    Ok(StoredImage {
        id: ImageId::new(),
        url: storage.public_url(path),
    })
}
