//! Page metadata extraction.
//!
//! Every page source carries an optional metadata block. Its location and
//! syntax depend on the page format:
//!
//! ## Markup pages (`.html`)
//!
//! A single comment anywhere in the file, holding relaxed JSON (see
//! [`crate::relaxed_json`]):
//!
//! ```html
//! <!-- monad { title: "About", layout: "wide", og: { image: "/og/about.png" } } -->
//! <h1>About</h1>
//! ```
//!
//! The block is cut out of the text; what remains is the body.
//!
//! ## Markdown pages (`.md`)
//!
//! A header fenced by `---` lines at the very top of the file, parsed as YAML.
//! Hand-written headers are often not valid YAML (`title: Part 1: Setup`), so
//! a failed YAML parse falls back to line-by-line `key: value` extraction.
//!
//! ## Degradation
//!
//! The parsing functions return [`FrontmatterError`] so callers can report
//! what went wrong, but [`parse_page`] never fails: a broken block yields
//! [`Meta::default()`] and the page still renders.

use crate::config::MarkdownConfig;
use crate::markdown;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

const MARKUP_OPEN: &str = "<!-- monad";
const COMMENT_CLOSE: &str = "-->";
const MARKDOWN_FENCE: &str = "---";

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("unterminated metadata comment")]
    Unterminated,
    #[error("invalid metadata: {0}")]
    Invalid(String),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("metadata has unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Source format of a page, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Markup,
    Markdown,
}

impl Format {
    /// Classify a path by extension. Returns `None` for non-page files.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "html" | "htm" => Some(Format::Markup),
            "md" | "markdown" => Some(Format::Markdown),
            _ => None,
        }
    }
}

/// Social card overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OgMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OgMeta {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.subtitle.is_none() && self.image.is_none()
    }
}

/// Per-page metadata.
///
/// Keys other than the recognized ones are kept in `extra` and exposed to
/// templates under `page.meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Raw markup injected into the layout's head slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og: Option<OgMeta>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Meta {
    /// Build a `Meta` from a parsed metadata object.
    ///
    /// Flat `og.title` / `og.subtitle` / `og.image` keys are folded into
    /// [`OgMeta`] alongside the nested `og: {...}` form.
    pub fn from_value(value: Value) -> Result<Meta, FrontmatterError> {
        if !value.is_object() {
            return Err(FrontmatterError::Invalid("expected an object".into()));
        }
        let mut meta: Meta = serde_json::from_value(value)?;
        let mut og = meta.og.take().unwrap_or_default();
        for (key, slot) in [
            ("og.title", &mut og.title),
            ("og.subtitle", &mut og.subtitle),
            ("og.image", &mut og.image),
        ] {
            if let Some(Value::String(s)) = meta.extra.remove(key) {
                slot.get_or_insert(s);
            }
        }
        if !og.is_empty() {
            meta.og = Some(og);
        }
        Ok(meta)
    }
}

// ============================================================================
// Markup pages
// ============================================================================

/// Location of the metadata comment inside a markup page.
struct MarkupBlock<'a> {
    start: usize,
    end: usize,
    content: &'a str,
}

fn find_markup_block(text: &str) -> Result<Option<MarkupBlock<'_>>, FrontmatterError> {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(MARKUP_OPEN) {
        let start = search_from + rel;
        let after_open = start + MARKUP_OPEN.len();
        // `<!-- monad:slot` and friends are template markers, not metadata.
        let is_block = text[after_open..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '{');
        if !is_block {
            search_from = after_open;
            continue;
        }
        let close_rel = text[after_open..]
            .find(COMMENT_CLOSE)
            .ok_or(FrontmatterError::Unterminated)?;
        let content_end = after_open + close_rel;
        return Ok(Some(MarkupBlock {
            start,
            end: content_end + COMMENT_CLOSE.len(),
            content: text[after_open..content_end].trim(),
        }));
    }
    Ok(None)
}

/// Parse the metadata comment of a markup page.
///
/// Returns `Ok(None)` when the page has no metadata block.
pub fn parse_markup_meta(text: &str) -> Result<Option<Meta>, FrontmatterError> {
    match find_markup_block(text)? {
        None => Ok(None),
        Some(block) => {
            let value = crate::relaxed_json::parse(block.content)
                .map_err(|e| FrontmatterError::Invalid(e.to_string()))?;
            Meta::from_value(value).map(Some)
        }
    }
}

/// Split a markup page into `(meta, body)`.
pub fn split_markup(text: &str) -> (Meta, String) {
    let block = match find_markup_block(text) {
        Ok(Some(block)) => block,
        Ok(None) => return (Meta::default(), text.to_string()),
        Err(e) => {
            tracing::warn!("ignoring page metadata: {e}");
            return (Meta::default(), text.to_string());
        }
    };

    let before = &text[..block.start];
    let after = &text[block.end..];
    let after = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);
    let body = format!("{before}{after}");

    let meta = crate::relaxed_json::parse(block.content)
        .map_err(|e| FrontmatterError::Invalid(e.to_string()))
        .and_then(Meta::from_value)
        .unwrap_or_else(|e| {
            tracing::warn!("ignoring page metadata: {e}");
            Meta::default()
        });
    (meta, body)
}

// ============================================================================
// Markdown pages
// ============================================================================

/// Separate a `---` fenced header from the rest of a markdown document.
///
/// Returns `(header, body)`; `header` is `None` when the document does not
/// open with a fence or the fence is never closed.
pub fn split_markdown_header(text: &str) -> (Option<&str>, &str) {
    let text_start = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_line_end) = text_start.find('\n') else {
        return (None, text);
    };
    if text_start[..first_line_end].trim_end_matches('\r') != MARKDOWN_FENCE {
        return (None, text);
    }

    let header_start = first_line_end + 1;
    let mut line_start = header_start;
    while line_start <= text_start.len() {
        let line_end = text_start[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text_start.len());
        let line = text_start[line_start..line_end].trim_end_matches('\r');
        if line == MARKDOWN_FENCE {
            let header = &text_start[header_start..line_start];
            let body_start = (line_end + 1).min(text_start.len());
            return (Some(header), &text_start[body_start..]);
        }
        if line_end == text_start.len() {
            break;
        }
        line_start = line_end + 1;
    }
    (None, text)
}

/// Strictly parse a markdown header as YAML.
pub fn parse_markdown_meta(header: &str) -> Result<Meta, FrontmatterError> {
    if header.trim().is_empty() {
        return Ok(Meta::default());
    }
    let value: Value = serde_yaml::from_str(header)?;
    Meta::from_value(value)
}

/// Line-by-line `key: value` extraction for headers that are not valid YAML.
pub fn parse_header_lines(header: &str) -> Meta {
    let mut meta = Meta::default();
    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = unquote(value.trim());
        if key.is_empty() || key.starts_with('#') {
            continue;
        }
        match key {
            "title" => meta.title = Some(value.to_string()),
            "description" => meta.description = Some(value.to_string()),
            "layout" => meta.layout = Some(value.to_string()),
            "head" => meta.head = Some(value.to_string()),
            _ => {
                meta.extra
                    .insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    meta
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Split a markdown page into `(meta, markdown_body)` without rendering.
pub fn split_markdown(text: &str) -> (Meta, String) {
    let (header, body) = split_markdown_header(text);
    let meta = match header {
        None => Meta::default(),
        Some(header) => parse_markdown_meta(header).unwrap_or_else(|e| {
            tracing::debug!("header is not YAML ({e}), using key: value lines");
            parse_header_lines(header)
        }),
    };
    (meta, body.to_string())
}

/// Split a page source into metadata and an HTML body.
///
/// Markdown bodies are rendered to HTML with the given flags. Never fails.
pub fn parse_page(text: &str, format: Format, markdown_config: &MarkdownConfig) -> (Meta, String) {
    match format {
        Format::Markup => split_markup(text),
        Format::Markdown => {
            let (meta, body) = split_markdown(text);
            (meta, markdown::render(&body, markdown_config))
        }
    }
}
