//! Source path → URL route and output file.
//!
//! | Source | clean, slash | clean, no slash | not clean |
//! |---|---|---|---|
//! | `index.html` | `/` → `index.html` | `/` → `index.html` | `/` → `index.html` |
//! | `about.md` | `/about/` → `about/index.html` | `/about` → `about/index.html` | `/about.html` → `about.html` |
//! | `blog/index.html` | `/blog/` → `blog/index.html` | `/blog` → `blog/index.html` | `/blog/` → `blog/index.html` |
//!
//! The whole table is computed before any page renders so link checks see
//! every route, and so two sources claiming one URL fail the build up front.

use crate::config::RoutingConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("route {route} is produced by both {first} and {second}")]
    Duplicate {
        route: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Absolute URL path, always starting with `/`.
    pub url: String,
    /// Output file relative to the output root.
    pub out_path: PathBuf,
}

/// Compute the route for a page at `rel_path` under the pages directory.
pub fn route_for(rel_path: &Path, routing: &RoutingConfig) -> Route {
    let mut segments: Vec<String> = rel_path
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let is_index = segments.last().is_some_and(|leaf| leaf == "index");
    if is_index {
        segments.pop();
    }

    if segments.is_empty() {
        return Route {
            url: "/".to_string(),
            out_path: PathBuf::from("index.html"),
        };
    }

    let joined = segments.join("/");
    let dir_out = {
        let mut p: PathBuf = segments.iter().collect();
        p.push("index.html");
        p
    };

    if is_index || routing.clean_urls {
        let url = if (is_index && !routing.clean_urls) || routing.trailing_slash {
            format!("/{joined}/")
        } else {
            format!("/{joined}")
        };
        Route {
            url,
            out_path: dir_out,
        }
    } else {
        Route {
            url: format!("/{joined}.html"),
            out_path: PathBuf::from(format!("{joined}.html")),
        }
    }
}

/// Canonical form of a URL path for comparison: query and fragment dropped,
/// a trailing `index.html` segment removed, trailing slash removed except
/// for `/`.
pub fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = match path.strip_suffix("index.html") {
        Some(dir) if dir.is_empty() || dir.ends_with('/') => dir,
        _ => path,
    };
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub source: PathBuf,
    pub route: Route,
}

/// Every route of the site, in source order, with a normalized index.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    by_url: BTreeMap<String, usize>,
}

impl RouteTable {
    /// Compute routes for `rel_paths`, rejecting two sources with one URL.
    pub fn build<'a>(
        rel_paths: impl IntoIterator<Item = &'a Path>,
        routing: &RoutingConfig,
    ) -> Result<Self, RouteError> {
        let mut table = Self::default();
        for rel in rel_paths {
            let route = route_for(rel, routing);
            let key = normalize_url(&route.url);
            if let Some(&existing) = table.by_url.get(&key) {
                return Err(RouteError::Duplicate {
                    route: route.url,
                    first: table.entries[existing].source.clone(),
                    second: rel.to_path_buf(),
                });
            }
            table.by_url.insert(key, table.entries.len());
            table.entries.push(RouteEntry {
                source: rel.to_path_buf(),
                route,
            });
        }
        Ok(table)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `url` names a route, ignoring trailing slash, query,
    /// fragment and a trailing `index.html`.
    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(&normalize_url(url))
    }

    pub fn find(&self, url: &str) -> Option<&RouteEntry> {
        self.by_url
            .get(&normalize_url(url))
            .map(|&i| &self.entries[i])
    }

    /// Route URLs in sorted order.
    pub fn sorted_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.entries.iter().map(|e| e.route.url.as_str()).collect();
        urls.sort_unstable();
        urls
    }
}
