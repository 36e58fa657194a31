//! Image asset fetching, decoding, and the export preload barrier.

pub mod fetch;

pub use fetch::{
    DirectoryFetcher, ImageFetcher, MemoryFetcher, PreloadOptions, PreloadedImages, PreparedImage,
};
