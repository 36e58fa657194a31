use std::io::{Cursor, Write as _};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// In-memory zip assembly.
pub(crate) struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub(crate) fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub(crate) fn add_file(&mut self, path: &str, bytes: &[u8]) -> SlidecastResult<()> {
        self.writer
            .start_file(path, SimpleFileOptions::default())
            .map_err(|e| SlidecastError::export(format!("zip entry '{path}': {e}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| SlidecastError::export(format!("zip entry '{path}': {e}")))?;
        Ok(())
    }

    pub(crate) fn finish(self) -> SlidecastResult<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| SlidecastError::export(format!("zip finalize: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// The `post-text.txt` sidecar: title, caption, and any text removed from
/// the rendered slides, grouped by slide number.
pub(crate) struct SidecarText {
    pub(crate) title: String,
    pub(crate) caption: String,
    /// `(1-based slide number, removed lines)` in slide order.
    pub(crate) slide_text: Vec<(u32, Vec<String>)>,
}

impl SidecarText {
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("TITLE:\n");
        out.push_str(&self.title);
        out.push_str("\n\nCAPTION:\n");
        out.push_str(&self.caption);
        out.push('\n');

        if !self.slide_text.is_empty() {
            out.push_str("\nSLIDE TEXT:\n");
            for (number, lines) in &self.slide_text {
                out.push_str(&format!("Slide {number}:\n"));
                for line in lines {
                    out.push_str(&format!("- {line}\n"));
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;
