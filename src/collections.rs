//! The collection store behind `collections.*` and loop blocks.
//!
//! A single JSON file, loaded once per build when `[collections] enabled`:
//!
//! ```json
//! {
//!   "posts": { "items": [ { "title": "First", "url": "/blog/first/" } ] },
//!   "authors": [ { "name": "Ann" } ]
//! }
//! ```
//!
//! Key order is kept as written, so loops render items in file order. The
//! file is trusted input: a missing or malformed store is a configuration
//! mistake and fails the build instead of silently rendering empty loops.

use crate::config::SiteConfig;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("collections file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("collections file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("collections file {0} must contain a JSON object at the top level")]
    NotAnObject(PathBuf),
}

/// Read and validate a collection store.
pub fn load_collections(path: &Path) -> Result<Value, CollectionError> {
    let text = fs::read_to_string(path).map_err(|source| CollectionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| CollectionError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(CollectionError::NotAnObject(path.to_path_buf()));
    }
    debug!(
        path = %path.display(),
        collections = value.as_object().map_or(0, |m| m.len()),
        "loaded collections"
    );
    Ok(value)
}

/// Load the store named by the config, or `None` when collections are off.
pub fn load_for_site(
    root: &Path,
    config: &SiteConfig,
) -> Result<Option<Arc<Value>>, CollectionError> {
    if !config.collections.enabled {
        return Ok(None);
    }
    load_collections(&root.join(&config.collections.file))
        .map(Arc::new)
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_in_file_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.json");
        fs::write(&path, r#"{"zeta": [1], "alpha": {"items": [{"b": 1, "a": 2}]}}"#).unwrap();

        let value = load_collections(&path).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        let item_keys: Vec<&String> = value["alpha"]["items"][0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(item_keys, vec!["b", "a"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_collections(&tmp.path().join("none.json")).unwrap_err();
        assert!(matches!(err, CollectionError::Io { .. }));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.json");
        fs::write(&path, "{ posts: [] }").unwrap();
        assert!(matches!(
            load_collections(&path).unwrap_err(),
            CollectionError::Json { .. }
        ));
    }

    #[test]
    fn top_level_must_be_object() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("c.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            load_collections(&path).unwrap_err(),
            CollectionError::NotAnObject(_)
        ));
    }

    #[test]
    fn disabled_collections_load_nothing() {
        let tmp = TempDir::new().unwrap();
        let config = SiteConfig::default();
        assert!(load_for_site(tmp.path(), &config).unwrap().is_none());
    }

    #[test]
    fn enabled_collections_load_configured_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("data")).unwrap();
        fs::write(tmp.path().join("data/collections.json"), r#"{"posts": []}"#).unwrap();
        let mut config = SiteConfig::default();
        config.collections.enabled = true;

        let store = load_for_site(tmp.path(), &config).unwrap().unwrap();
        assert!(store["posts"].is_array());
    }
}
