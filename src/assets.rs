//! Bundler hand-off and final document post-processing.
//!
//! The asset bundler is an external tool; all monad sees is its manifest, a
//! JSON map from entry name to the files it produced:
//!
//! ```json
//! { "main": ["/assets/main-3f9a.css", "/assets/main-81bc.js"] }
//! ```
//!
//! Stylesheets of the configured entries are linked before `</head>`, scripts
//! are loaded as modules before `</body>`. Entries missing from the manifest
//! are skipped.

use crate::config::AssetsConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset manifest {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("asset manifest {path} is not a map of entry name to paths: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: BTreeMap<String, Vec<String>>,
}

impl AssetManifest {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read the manifest at `path`. A manifest that does not exist yet (the
    /// bundler has not run) is treated as empty.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "asset manifest not found, no asset tags will be added");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AssetError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_json(&text).map_err(|source| AssetError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Tags for the given entries, in entry order.
    pub fn tags_for(&self, entries: &[String]) -> AssetTags {
        let mut tags = AssetTags::default();
        for entry in entries {
            let Some(files) = self.entries.get(entry) else {
                debug!(entry = %entry, "asset entry not in manifest");
                continue;
            };
            for file in files {
                let bare = file.split(['?', '#']).next().unwrap_or(file);
                if bare.ends_with(".css") {
                    tags.styles.push(file.clone());
                } else if bare.ends_with(".js") || bare.ends_with(".mjs") {
                    tags.scripts.push(file.clone());
                }
            }
        }
        tags
    }
}

/// Resolve the asset tags a build injects into every page.
pub fn site_tags(root: &Path, config: &AssetsConfig) -> Result<AssetTags, AssetError> {
    match &config.manifest {
        None => Ok(AssetTags::default()),
        Some(manifest) => Ok(AssetManifest::load(&root.join(manifest))?.tags_for(&config.entries)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetTags {
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
}

impl AssetTags {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.scripts.is_empty()
    }

    fn style_markup(&self) -> String {
        self.styles
            .iter()
            .map(|href| format!("<link rel=\"stylesheet\" href=\"{href}\">"))
            .collect()
    }

    fn script_markup(&self) -> String {
        self.scripts
            .iter()
            .map(|src| format!("<script type=\"module\" src=\"{src}\"></script>"))
            .collect()
    }
}

/// Insert `markup` before the last occurrence of `close_tag`, or append it
/// when the document has no such tag.
fn insert_before_close(html: &mut String, close_tag: &str, markup: &str) {
    if markup.is_empty() {
        return;
    }
    match find_ignore_ascii_case(html, close_tag) {
        Some(at) => html.insert_str(at, markup),
        None => html.push_str(markup),
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().rfind(needle)
}

/// Link stylesheets before `</head>` and scripts before `</body>`.
pub fn inject_assets(html: &str, tags: &AssetTags) -> String {
    let mut out = html.to_string();
    if tags.is_empty() {
        return out;
    }
    insert_before_close(&mut out, "</head>", &tags.style_markup());
    insert_before_close(&mut out, "</body>", &tags.script_markup());
    out
}

/// Minify a finished document. Closing tags and the `<html>`/`<head>`
/// openers are kept so the audit pass can still read the structure.
pub fn minify(html: &str) -> String {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    let bytes = minify_html::minify(html.as_bytes(), &cfg);
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
