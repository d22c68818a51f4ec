//! Project configuration module.
//!
//! Handles loading, validating, and merging `monad.toml`. User values are
//! layered on top of the stock defaults, so a config file only needs the keys
//! it wants to change. The resulting [`SiteConfig`] is built once per build
//! and passed by reference into every stage; nothing reads configuration
//! from ambient state.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── monad.toml          # Project config (optional)
//! ├── pages/              # Page sources (.html / .md)
//! ├── fragments/          # Reusable fragments (_name.html)
//! │   └── layouts/        # Layout fragments (_default.html)
//! ├── public/             # Copied verbatim to the output root
//! └── data/
//!     └── collections.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! pages_dir = "pages"
//! fragments_dir = "fragments"
//! public_dir = "public"
//! output_dir = "dist"
//!
//! [site]                      # Free-form, exposed to templates as {{site.*}}
//! title = "My Site"
//! url = "https://example.com"
//!
//! [routing]
//! clean_urls = true           # /about/ instead of /about.html
//! trailing_slash = true       # /about/ instead of /about
//!
//! [markdown]
//! gfm = true                  # Tables, strikethrough, task lists, footnotes
//! breaks = false              # Soft line breaks become <br />
//! strict = false              # Plain CommonMark, no extensions
//!
//! [templates]
//! default_layout = "default"  # fragments/layouts/_default.html
//!
//! [collections]
//! enabled = false
//! file = "data/collections.json"
//!
//! [assets]
//! manifest = "dist/assets.json" # entry name -> final asset paths
//! entries = ["main"]
//!
//! [build]
//! minify = false
//!
//! [audit]
//! seo = "warn"                # off | warn | fail
//! links = "warn"
//! accessibility = "warn"
//! image_budget_kb = 300
//! min_contrast = 4.5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project config, looked up in the project root.
pub const CONFIG_FILENAME: &str = "monad.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `monad.toml`.
///
/// All fields have defaults. Directory fields are relative to the project
/// root passed to [`load_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding page sources.
    pub pages_dir: String,
    /// Directory holding fragment templates and layouts.
    pub fragments_dir: String,
    /// Directory copied verbatim into the output root.
    pub public_dir: String,
    /// Output root for rendered pages, reports and site files.
    pub output_dir: String,
    /// Global values exposed to every template as `site.*`.
    pub site: serde_json::Map<String, serde_json::Value>,
    pub routing: RoutingConfig,
    pub markdown: MarkdownConfig,
    pub templates: TemplatesConfig,
    pub collections: CollectionsConfig,
    pub assets: AssetsConfig,
    pub build: BuildConfig,
    pub audit: AuditConfig,
    pub sitemap: SitemapConfig,
    pub robots: RobotsConfig,
    pub redirects: RedirectsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pages_dir: "pages".to_string(),
            fragments_dir: "fragments".to_string(),
            public_dir: "public".to_string(),
            output_dir: "dist".to_string(),
            site: serde_json::Map::new(),
            routing: RoutingConfig::default(),
            markdown: MarkdownConfig::default(),
            templates: TemplatesConfig::default(),
            collections: CollectionsConfig::default(),
            assets: AssetsConfig::default(),
            build: BuildConfig::default(),
            audit: AuditConfig::default(),
            sitemap: SitemapConfig::default(),
            robots: RobotsConfig::default(),
            redirects: RedirectsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pages_dir.trim().is_empty() {
            return Err(ConfigError::Validation("pages_dir must not be empty".into()));
        }
        if self.pages_dir == self.output_dir {
            return Err(ConfigError::Validation(
                "pages_dir and output_dir must differ".into(),
            ));
        }
        if self.templates.default_layout.trim().is_empty() {
            return Err(ConfigError::Validation(
                "templates.default_layout must not be empty".into(),
            ));
        }
        if !(1.0..=21.0).contains(&self.audit.min_contrast) {
            return Err(ConfigError::Validation(
                "audit.min_contrast must be between 1 and 21".into(),
            ));
        }
        if self.collections.enabled && self.collections.file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collections.file must be set when collections are enabled".into(),
            ));
        }
        for rule in &self.redirects.rules {
            if !(300..=399).contains(&rule.status) {
                return Err(ConfigError::Validation(format!(
                    "redirect {} -> {} has non-redirect status {}",
                    rule.from, rule.to, rule.status
                )));
            }
        }
        Ok(())
    }

    pub fn pages_path(&self, root: &Path) -> PathBuf {
        root.join(&self.pages_dir)
    }

    pub fn fragments_path(&self, root: &Path) -> PathBuf {
        root.join(&self.fragments_dir)
    }

    pub fn public_path(&self, root: &Path) -> PathBuf {
        root.join(&self.public_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    /// `site.url` without a trailing slash, if configured.
    pub fn base_url(&self) -> Option<&str> {
        self.site
            .get("url")
            .and_then(|v| v.as_str())
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }
}

/// URL shaping flags used by the route mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Emit `segment/index.html` served as `/segment/` instead of `segment.html`.
    pub clean_urls: bool,
    /// Non-root routes end in `/`.
    pub trailing_slash: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            clean_urls: true,
            trailing_slash: true,
        }
    }
}

/// Flags forwarded to the markdown renderer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// GitHub-flavored extensions: tables, strikethrough, task lists, footnotes.
    pub gfm: bool,
    /// Convert soft line breaks into `<br />`.
    pub breaks: bool,
    /// Plain CommonMark; disables every extension.
    pub strict: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Layout used when a page's frontmatter names none.
    pub default_layout: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            default_layout: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsConfig {
    /// Load the collection store and expand loop blocks.
    pub enabled: bool,
    /// JSON file holding the collection store, relative to the project root.
    pub file: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: "data/collections.json".to_string(),
        }
    }
}

/// Hook into an external bundler's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// JSON file mapping entry name to final asset paths. Absent = no tags.
    pub manifest: Option<String>,
    /// Entries whose assets are linked from every page.
    pub entries: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            entries: vec!["main".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Minify every rendered document.
    pub minify: bool,
}

/// Three-way policy for one audit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Category is not evaluated.
    Off,
    /// Findings are reported.
    #[default]
    Warn,
    /// Findings are reported, then fail the build.
    Fail,
}

impl AuditMode {
    pub fn is_enabled(self) -> bool {
        self != AuditMode::Off
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub seo: AuditMode,
    pub links: AuditMode,
    pub accessibility: AuditMode,
    /// Images on disk heavier than this are flagged.
    pub image_budget_kb: u64,
    /// Minimum WCAG contrast ratio for inline-styled text.
    pub min_contrast: f64,
    pub seo_checks: SeoChecks,
    pub a11y_checks: A11yChecks,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            seo: AuditMode::Warn,
            links: AuditMode::Warn,
            accessibility: AuditMode::Warn,
            image_budget_kb: 300,
            min_contrast: 4.5,
            seo_checks: SeoChecks::default(),
            a11y_checks: A11yChecks::default(),
        }
    }
}

/// Individual SEO check toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeoChecks {
    pub title: bool,
    pub description: bool,
    pub h1: bool,
    pub img_alt: bool,
    pub img_size: bool,
    pub canonical: bool,
    /// Off by default: most sites declare the favicon once in a layout the
    /// audit cannot tell apart from a forgotten one.
    pub favicon: bool,
}

impl Default for SeoChecks {
    fn default() -> Self {
        Self {
            title: true,
            description: true,
            h1: true,
            img_alt: true,
            img_size: true,
            canonical: true,
            favicon: false,
        }
    }
}

/// Individual accessibility rule toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct A11yChecks {
    pub heading_order: bool,
    pub aria: bool,
    pub alt_text: bool,
    pub interactive_names: bool,
    pub tabindex: bool,
    pub anchor_href: bool,
    pub button_type: bool,
    pub click_handlers: bool,
    pub form_labels: bool,
    pub table_captions: bool,
    pub skip_link: bool,
    pub landmarks: bool,
    pub contrast: bool,
}

impl Default for A11yChecks {
    fn default() -> Self {
        Self {
            heading_order: true,
            aria: true,
            alt_text: true,
            interactive_names: true,
            tabindex: true,
            anchor_href: true,
            button_type: true,
            click_handlers: true,
            form_labels: true,
            table_captions: true,
            skip_link: true,
            landmarks: true,
            contrast: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Write `sitemap.xml` (requires `site.url`).
    pub enabled: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RobotsConfig {
    pub enabled: bool,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedirectsConfig {
    /// Write a Netlify `_redirects` file.
    pub netlify: bool,
    /// Write a Vercel `vercel.json` file.
    pub vercel: bool,
    pub rules: Vec<RedirectRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectRule {
    pub from: String,
    pub to: String,
    #[serde(default = "default_redirect_status")]
    pub status: u16,
}

fn default_redirect_status() -> u16 {
    301
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `monad.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project config from `monad.toml` in `root`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `monad.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# monad configuration
# ===================
# All settings are optional. Values shown below are the defaults.
# Directories are relative to the directory holding this file.
# Unknown keys will cause an error.

pages_dir = "pages"
fragments_dir = "fragments"
public_dir = "public"
output_dir = "dist"

# ---------------------------------------------------------------------------
# Site values, available to every template as {{site.KEY}}
# ---------------------------------------------------------------------------
[site]
# title = "My Site"
# description = "Used when a page has no description of its own."
# url = "https://example.com"   # Required for sitemap.xml

# ---------------------------------------------------------------------------
# URL shape
# ---------------------------------------------------------------------------
[routing]
# about.html -> /about/ (served from about/index.html)
clean_urls = true
# /about/ rather than /about
trailing_slash = true

# ---------------------------------------------------------------------------
# Markdown pages
# ---------------------------------------------------------------------------
[markdown]
gfm = true       # tables, strikethrough, task lists, footnotes
breaks = false   # soft line breaks become <br />
strict = false   # plain CommonMark, overrides gfm

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
[templates]
# Resolved as fragments/layouts/_<name>.html
default_layout = "default"

# ---------------------------------------------------------------------------
# Collections (loop blocks)
# ---------------------------------------------------------------------------
[collections]
enabled = false
file = "data/collections.json"

# ---------------------------------------------------------------------------
# Bundler output
# ---------------------------------------------------------------------------
[assets]
# manifest = "dist/assets.json"  # { "main": ["assets/main-1a2b.js", ...] }
entries = ["main"]

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
minify = false

# ---------------------------------------------------------------------------
# Audit: each category is "off", "warn" or "fail".
# "fail" aborts the build after all reports are written.
# ---------------------------------------------------------------------------
[audit]
seo = "warn"
links = "warn"
accessibility = "warn"
image_budget_kb = 300
min_contrast = 4.5

[audit.seo_checks]
title = true
description = true
h1 = true
img_alt = true
img_size = true
canonical = true
favicon = false

[audit.a11y_checks]
heading_order = true
aria = true
alt_text = true
interactive_names = true
tabindex = true
anchor_href = true
button_type = true
click_handlers = true
form_labels = true
table_captions = true
skip_link = true
landmarks = true
contrast = true

# ---------------------------------------------------------------------------
# Site files
# ---------------------------------------------------------------------------
[sitemap]
enabled = true

[robots]
enabled = true

[redirects]
netlify = false
vercel = false
# [[redirects.rules]]
# from = "/old/"
# to = "/new/"
# status = 301
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_directories() {
        let config = SiteConfig::default();
        assert_eq!(config.pages_dir, "pages");
        assert_eq!(config.fragments_dir, "fragments");
        assert_eq!(config.output_dir, "dist");
    }

    #[test]
    fn default_routing_is_clean_with_trailing_slash() {
        let config = SiteConfig::default();
        assert!(config.routing.clean_urls);
        assert!(config.routing.trailing_slash);
    }

    #[test]
    fn default_audit_warns_everywhere() {
        let config = SiteConfig::default();
        assert_eq!(config.audit.seo, AuditMode::Warn);
        assert_eq!(config.audit.links, AuditMode::Warn);
        assert_eq!(config.audit.accessibility, AuditMode::Warn);
        assert_eq!(config.audit.min_contrast, 4.5);
        assert!(!config.audit.seo_checks.favicon);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[routing]
clean_urls = false
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert!(!config.routing.clean_urls);
        // Default values preserved
        assert!(config.routing.trailing_slash);
        assert_eq!(config.templates.default_layout, "default");
    }

    #[test]
    fn parse_site_table_is_free_form() {
        let toml = r#"
[site]
title = "Field Notes"
url = "https://notes.example/"
nav = ["a", "b"]
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site["title"], "Field Notes");
        assert_eq!(config.site["nav"][1], "b");
        assert_eq!(config.base_url(), Some("https://notes.example"));
    }

    #[test]
    fn parse_audit_modes() {
        let toml = r#"
[audit]
seo = "off"
accessibility = "fail"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.audit.seo, AuditMode::Off);
        assert_eq!(config.audit.accessibility, AuditMode::Fail);
        assert_eq!(config.audit.links, AuditMode::Warn);
        assert!(!config.audit.seo.is_enabled());
    }

    #[test]
    fn parse_redirect_rules_default_status() {
        let toml = r#"
[redirects]
netlify = true

[[redirects.rules]]
from = "/old/"
to = "/new/"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.redirects.rules.len(), 1);
        assert_eq!(config.redirects.rules[0].status, 301);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.pages_dir, "pages");
        assert!(config.site.is_empty());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
output_dir = "public_html"

[site]
title = "Hello"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output_dir, "public_html");
        assert_eq!(config.site["title"], "Hello");
        assert_eq!(config.pages_dir, "pages");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[audit]
min_contrast = 40.0
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"minify = false"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"minify = true"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("minify").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[audit.seo_checks]
title = true
h1 = true
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[audit.seo_checks]
h1 = false
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let checks = merged.get("audit").unwrap().get("seo_checks").unwrap();
        assert_eq!(checks.get("h1").unwrap().as_bool(), Some(false));
        assert_eq!(checks.get("title").unwrap().as_bool(), Some(true));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[routing]
clean_url = true
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[routes]\nclean_urls = true\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_same_pages_and_output_dir() {
        let config = SiteConfig {
            output_dir: "pages".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_redirect_status() {
        let mut config = SiteConfig::default();
        config.redirects.rules.push(RedirectRule {
            from: "/a".into(),
            to: "/b".into(),
            status: 200,
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("status 200"));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.pages_dir, defaults.pages_dir);
        assert_eq!(config.routing, defaults.routing);
        assert_eq!(config.audit.image_budget_kb, defaults.audit.image_budget_kb);
        assert_eq!(config.assets.entries, defaults.assets.entries);
        assert!(config.site.is_empty());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["routing", "markdown", "templates", "collections", "audit", "sitemap"] {
            assert!(val.get(section).is_some(), "missing section {section}");
        }
    }
}
