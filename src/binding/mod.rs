//! Content binding: merging AI-generated and collection-resolved values
//! into a template's abstract layer definitions to produce one frozen,
//! renderable [`PostContent`](crate::scene::PostContent).

pub mod resolve;
pub mod textgen;

pub use resolve::{generate_post, resolve_post_content};
pub use textgen::{GeneratedContent, GenerationOptions, GenerationRequest, TextGenerator};
