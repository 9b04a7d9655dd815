//! Caption text handling: hashtag stripping, filename sanitization, and the
//! caption-source seam.
//!
//! Captions arrive as free text from an external generator (or from the
//! filename stem when none is configured). Before a caption names an output
//! file it is stripped of hashtag runs and reduced to a filesystem-safe
//! string. Both transforms are pure: the same input always yields the same
//! name, with no locale dependence.

use thiserror::Error;

/// Longest sanitized filename stem, in characters.
const MAX_NAME_LEN: usize = 100;

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("caption generation failed: {0}")]
    Generation(String),
    #[error("caption source returned empty text")]
    Empty,
}

/// What a caption source gets to work with: the raw filename stem and the
/// ready-made generation prompt built from it.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub stem: String,
    pub prompt: String,
}

impl CaptionRequest {
    pub fn for_stem(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            prompt: caption_prompt(stem),
        }
    }
}

/// Source of caption text for a processed image.
///
/// Implementations call out to a text generator; the pipeline only ever
/// consumes the returned string. An error (or empty text, which callers map
/// to [`CaptionError::Empty`]) abandons the single image, never the batch.
pub trait CaptionSource {
    fn caption(&self, request: &CaptionRequest) -> Result<String, CaptionError>;
}

/// Remove every contiguous `#` + word-character run, then trim.
///
/// Word characters follow the usual `\w` class: alphanumerics plus `_`,
/// Unicode-aware. Interior whitespace between surviving words is kept as-is.
pub fn strip_hashtags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' && chars.peek().is_some_and(|&n| is_word_char(n)) {
            while chars.peek().is_some_and(|&n| is_word_char(n)) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Reduce free text to a filesystem-safe name.
///
/// Keeps alphanumerics, space, `-`, `_`, and `#`; drops every other
/// character with no replacement (adjacent survivors become adjacent).
/// Surrounding whitespace is trimmed, remaining spaces become underscores,
/// and the result is cut at 100 characters, mid-word if that is where the
/// limit falls.
pub fn to_filename(text: &str) -> String {
    text.chars()
        .filter(|&c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '#')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_NAME_LEN)
        .collect()
}

/// Build the prompt handed to a caption source from a filename stem.
///
/// Underscores and dashes in the stem read as spaces so the generator sees
/// the photo description, not a slug.
pub fn caption_prompt(stem: &str) -> String {
    let description = stem.replace(['_', '-'], " ");
    format!(
        "Write a short, engaging social media caption for a photo described as: {description}\n\
         Only generate the caption, nothing else."
    )
}
