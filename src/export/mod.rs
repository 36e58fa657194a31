//! The headless export pipeline: resolved slide sets in, zip archives of
//! rasterized PNGs (plus a text sidecar) out.

pub(crate) mod archive;
pub mod pipeline;

pub use pipeline::{ExportMode, ExportOptions, Exporter, PostExportInput};
