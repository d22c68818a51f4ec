//! Layered render context.
//!
//! Templates see four top-level names:
//!
//! | Layer | Lifetime | Mutability |
//! |-------|----------|------------|
//! | `site` | whole build | shared, read-only |
//! | `page` | one page | read-only while rendering |
//! | `data` | one inclusion | built fresh per inclusion site |
//! | `collections` | whole build | shared, read-only |
//!
//! `site`, `page` and `collections` sit behind `Arc`, so deriving a child
//! context for a nested inclusion copies pointers plus the `data` map.

use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RenderContext {
    site: Arc<Value>,
    page: Arc<Value>,
    data: Map<String, Value>,
    collections: Option<Arc<Value>>,
}

impl RenderContext {
    pub fn new(site: Arc<Value>, page: Value) -> Self {
        Self {
            site,
            page: Arc::new(page),
            data: Map::new(),
            collections: None,
        }
    }

    pub fn with_collections(mut self, collections: Arc<Value>) -> Self {
        self.collections = Some(collections);
        self
    }

    /// Derive the context for a nested inclusion.
    ///
    /// The child's `data` layer is this context's `data` with `args` merged
    /// over it, one level deep. `self` is left untouched.
    pub fn with_data(&self, args: Map<String, Value>) -> Self {
        let mut child = self.clone();
        child.data.extend(args);
        child
    }

    pub fn site(&self) -> &Value {
        &self.site
    }

    pub fn page(&self) -> &Value {
        &self.page
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn collections(&self) -> Option<&Value> {
        self.collections.as_deref()
    }

    /// Resolve a dotted path such as `page.meta.tags.0`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.').map(str::trim);
        let layer = match segments.next()? {
            "site" => self.site.as_ref(),
            "page" => self.page.as_ref(),
            "collections" => self.collections.as_deref()?,
            "data" => {
                let key = segments.next();
                return match key {
                    None => None,
                    Some(key) => lookup_segments(self.data.get(key)?, segments),
                };
            }
            _ => return None,
        };
        lookup_segments(layer, segments)
    }

    /// Resolve a dotted path to display text; a miss is the empty string.
    pub fn lookup_text(&self, path: &str) -> String {
        self.lookup(path).map(value_to_text).unwrap_or_default()
    }
}

/// Walk `segments` into `root`. Numeric segments index into arrays.
pub fn lookup_segments<'a, 'p>(
    root: &'a Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve a dotted path against a JSON value.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    lookup_segments(root, path.split('.').map(str::trim))
}

/// Text inserted for a value: strings verbatim, scalars via `Display`,
/// `null` as nothing, containers as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RenderContext {
        RenderContext::new(
            Arc::new(json!({"title": "Site", "nav": ["a", "b"]})),
            json!({"title": "Page", "meta": {"tags": ["x", "y"]}}),
        )
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn lookup_layers() {
        let ctx = ctx();
        assert_eq!(ctx.lookup_text("site.title"), "Site");
        assert_eq!(ctx.lookup_text("page.title"), "Page");
        assert_eq!(ctx.lookup_text("page.meta.tags.1"), "y");
        assert_eq!(ctx.lookup_text("site.nav"), r#"["a","b"]"#);
    }

    #[test]
    fn miss_is_empty() {
        let ctx = ctx();
        assert_eq!(ctx.lookup_text("page.nope.deeper"), "");
        assert_eq!(ctx.lookup_text("unknown.layer"), "");
        assert_eq!(ctx.lookup_text("collections.posts"), "");
        assert_eq!(ctx.lookup_text("data.x"), "");
    }

    #[test]
    fn child_context_merges_data_without_touching_parent() {
        let parent = ctx().with_data(map(json!({"a": 1, "b": 2})));
        let child = parent.with_data(map(json!({"b": 3, "c": {"d": 4}})));

        assert_eq!(child.lookup_text("data.a"), "1");
        assert_eq!(child.lookup_text("data.b"), "3");
        assert_eq!(child.lookup_text("data.c.d"), "4");

        assert_eq!(parent.lookup_text("data.b"), "2");
        assert_eq!(parent.lookup_text("data.c"), "");
    }

    #[test]
    fn collections_layer() {
        let ctx = ctx().with_collections(Arc::new(json!({"posts": {"items": [1, 2]}})));
        assert_eq!(ctx.lookup_text("collections.posts.items.0"), "1");
    }

    #[test]
    fn value_text_forms() {
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!(true)), "true");
        assert_eq!(value_to_text(&json!(2.5)), "2.5");
        assert_eq!(value_to_text(&json!({"k": "v"})), r#"{"k":"v"}"#);
    }
}
