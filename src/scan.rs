//! Page source discovery.
//!
//! Walks the pages directory and reads every page source into memory. Only
//! two kinds of file are pages:
//!
//! ```text
//! pages/
//! ├── index.html          # markup page, `<!-- monad {..} -->` metadata
//! ├── about.md            # markdown page, `---` header
//! ├── blog/
//! │   ├── index.html
//! │   └── first-post.md
//! └── _drafts/            # skipped: leading underscore
//!     └── wip.md
//! ```
//!
//! Files and directories whose names start with `.` or `_` are skipped, so
//! editor droppings and work-in-progress folders never become routes.
//! Sources are returned sorted by relative path, which keeps route tables,
//! reports and sitemaps stable across runs.

use crate::frontmatter::Format;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Pages directory not found: {0}")]
    MissingPagesDir(PathBuf),
}

/// One page source file, read once.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSource {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the pages directory; drives the route.
    pub rel_path: PathBuf,
    pub text: String,
    pub format: Format,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

/// Read every page under `pages_dir`, sorted by relative path.
pub fn scan_pages(pages_dir: &Path) -> Result<Vec<PageSource>, ScanError> {
    if !pages_dir.is_dir() {
        return Err(ScanError::MissingPagesDir(pages_dir.to_path_buf()));
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(pages_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(format) = Format::from_path(path) else {
            continue;
        };
        let rel_path = path
            .strip_prefix(pages_dir)
            .unwrap_or(path)
            .to_path_buf();
        debug!(page = %rel_path.display(), "found page source");
        sources.push(PageSource {
            path: path.to_path_buf(),
            text: fs::read_to_string(path)?,
            rel_path,
            format,
        });
    }

    sources.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(sources)
}
