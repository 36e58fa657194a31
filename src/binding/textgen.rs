use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scene::{LayerId, SlideId};

/// Request sent to the text-generation collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Tunables for a generation call.
#[derive(Clone, Debug)]
pub struct GenerationOptions {
    /// Model identifier passed through to the collaborator.
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "default".to_owned(),
            temperature: 0.8,
            max_tokens: 2000,
        }
    }
}

/// The opaque external text-generation service.
///
/// Returns raw text expected to parse as a [`GeneratedContent`] JSON
/// object; the engine strips markdown fences and extracts the first
/// `{...}` block before parsing.
pub trait TextGenerator {
    /// Run one generation request.
    fn generate(&self, request: &GenerationRequest) -> SlidecastResult<String>;
}

/// Parsed generation output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub caption: String,
    #[serde(default)]
    pub slides: Vec<GeneratedSlide>,
}

/// Generated text grouped per slide.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedSlide {
    pub slide_id: SlideId,
    #[serde(default)]
    pub layers: Vec<GeneratedLayer>,
}

/// Generated text for one layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedLayer {
    pub layer_id: LayerId,
    pub text_content: String,
}

impl GeneratedContent {
    /// Look up the generated string for a layer.
    pub fn text_for(&self, slide: SlideId, layer: LayerId) -> Option<&str> {
        self.slides
            .iter()
            .find(|s| s.slide_id == slide)
            .and_then(|s| s.layers.iter().find(|l| l.layer_id == layer))
            .map(|l| l.text_content.as_str())
    }
}

/// Parse raw collaborator output, treating any shape mismatch as a hard
/// generation failure.
pub fn parse_generated(raw: &str) -> SlidecastResult<GeneratedContent> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json)
        .map_err(|e| SlidecastError::generation(format!("unparseable generation output: {e}")))
}

/// Defensively extract the first `{...}` block from model output.
///
/// Strips markdown code fences first, then scans for a balanced object,
/// tracking string literals so braces inside them don't end the scan.
pub(crate) fn extract_json_object(raw: &str) -> SlidecastResult<&str> {
    let trimmed = strip_code_fences(raw);

    let start = trimmed
        .find('{')
        .ok_or_else(|| SlidecastError::generation("generation output contains no JSON object"))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in trimmed[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&trimmed[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    Err(SlidecastError::generation(
        "generation output contains an unterminated JSON object",
    ))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
#[path = "../../tests/unit/binding/textgen.rs"]
mod tests;
