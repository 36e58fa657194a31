use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Default per-image time cap for the export preload barrier.
pub const DEFAULT_PRELOAD_CAP: Duration = Duration::from_secs(4);

/// Fetches raw image bytes for a public URL.
///
/// Implementations must return within `cap`; a slow or failed fetch is
/// recovered locally by the preloader (placeholder render), never
/// surfaced as a failure of the whole job.
pub trait ImageFetcher {
    /// Fetch the bytes behind `url`, bounded by `cap`.
    fn fetch(&self, url: &str, cap: Duration) -> SlidecastResult<Vec<u8>>;
}

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode image bytes and premultiply alpha.
pub fn decode_image(bytes: &[u8]) -> SlidecastResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> SlidecastResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SlidecastError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(SlidecastError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SlidecastError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SlidecastError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Fetcher that resolves URLs as paths under a local assets root.
///
/// Used by the CLI and tests; HTTP-backed fetchers belong to the
/// embedding application.
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    /// Resolve fetches relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for DirectoryFetcher {
    fn fetch(&self, url: &str, _cap: Duration) -> SlidecastResult<Vec<u8>> {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let norm = normalize_rel_path(rel)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            SlidecastError::export(format!("failed to read asset '{}': {e}", p.display()))
        })
    }
}

/// Fetcher backed by an in-memory URL map.
#[derive(Default)]
pub struct MemoryFetcher {
    objects: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a URL.
    pub fn put(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.objects.insert(url.into(), bytes);
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, url: &str, _cap: Duration) -> SlidecastResult<Vec<u8>> {
        self.objects
            .get(url)
            .cloned()
            .ok_or_else(|| SlidecastError::not_found(format!("no object at '{url}'")))
    }
}

/// Preload options for a render pass.
#[derive(Clone, Copy, Debug)]
pub struct PreloadOptions {
    /// Per-image fetch time cap.
    pub per_image_cap: Duration,
}

impl Default for PreloadOptions {
    fn default() -> Self {
        Self {
            per_image_cap: DEFAULT_PRELOAD_CAP,
        }
    }
}

/// Images resolved ahead of rasterization, keyed by URL.
///
/// Rasterizing before images decode produces blank boxes, so this barrier
/// is mandatory for export, not an optimization. A URL that failed to
/// fetch or decode maps to `None` and renders as a placeholder.
#[derive(Default)]
pub struct PreloadedImages {
    by_url: HashMap<String, Option<PreparedImage>>,
}

impl PreloadedImages {
    /// An empty set (nothing resolves).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch and decode every URL, recording failures as `None`.
    pub fn preload<I, S>(fetcher: &dyn ImageFetcher, urls: I, opts: PreloadOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_url = HashMap::new();
        for url in urls {
            let url = url.into();
            if by_url.contains_key(&url) {
                continue;
            }
            let prepared = match fetcher.fetch(&url, opts.per_image_cap) {
                Ok(bytes) => match decode_image(&bytes) {
                    Ok(img) => Some(img),
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "image decode failed; rendering placeholder");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "image fetch failed; rendering placeholder");
                    None
                }
            };
            by_url.insert(url, prepared);
        }
        Self { by_url }
    }

    /// Insert a prepared image directly.
    pub fn insert(&mut self, url: impl Into<String>, image: Option<PreparedImage>) {
        self.by_url.insert(url.into(), image);
    }

    /// The prepared image for `url`, if it loaded.
    pub fn get(&self, url: &str) -> Option<&PreparedImage> {
        self.by_url.get(url).and_then(|v| v.as_ref())
    }

    /// Number of URLs that failed to load or decode.
    pub fn failed_count(&self) -> usize {
        self.by_url.values().filter(|v| v.is_none()).count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
