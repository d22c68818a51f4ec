//! Shared test utilities for the monad test suite.
//!
//! Provides a throwaway project directory builder and lookup helpers that
//! work with build results (`RenderResult`, `Report`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new()
//!     .layout("default", "<html><body>{{slot:main}}</body></html>")
//!     .fragment("nav", "<nav></nav>")
//!     .page("index.html", "<h1>Home</h1>");
//! let summary = build(site.root(), &site.config()).unwrap();
//!
//! let home = find_result(&summary.results, "/");
//! assert_eq!(home.meta.title.as_deref(), Some("Home"));
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::render::RenderResult;
use crate::report::{PageReport, Report};
use crate::template::partials::fragment_rel_path;

// =========================================================================
// Fixture setup
// =========================================================================

/// A project directory in a temp dir, laid out with the default config.
///
/// Builder methods write their file immediately, so a fixture can be
/// extended after a first build.
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Default config with `site.title`, `site.description` and `site.url` set.
    pub fn config(&self) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.insert("title".into(), "Fixture".into());
        config.site.insert("description".into(), "A fixture site".into());
        config.site.insert("url".into(), "https://example.com".into());
        config
    }

    fn write(&self, rel: &Path, text: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub fn write_page(&self, rel: &str, text: &str) {
        self.write(&Path::new("pages").join(rel), text);
    }

    pub fn page(self, rel: &str, text: &str) -> Self {
        self.write_page(rel, text);
        self
    }

    /// Write a fragment under its include reference (`blog/card` → `blog/_card.html`).
    pub fn fragment(self, reference: &str, text: &str) -> Self {
        let rel = fragment_rel_path(reference).unwrap();
        self.write(&Path::new("fragments").join(rel), text);
        self
    }

    pub fn layout(self, name: &str, text: &str) -> Self {
        self.fragment(&format!("layouts/{name}"), text)
    }

    pub fn public(self, rel: &str, text: &str) -> Self {
        self.write(&Path::new("public").join(rel), text);
        self
    }

    pub fn file(self, rel: &str, text: &str) -> Self {
        self.write(Path::new(rel), text);
        self
    }
}

// =========================================================================
// Result lookups: panic with a clear message on miss
// =========================================================================

/// Find a render result by route URL. Panics if not found.
pub fn find_result<'a>(results: &'a [RenderResult], url: &str) -> &'a RenderResult {
    results.iter().find(|r| r.route.url == url).unwrap_or_else(|| {
        let urls: Vec<&str> = results.iter().map(|r| r.route.url.as_str()).collect();
        panic!("route '{url}' not found. Available: {urls:?}")
    })
}

/// Find a report entry by route URL. Panics if not found.
pub fn find_report_page<'a>(report: &'a Report, url: &str) -> &'a PageReport {
    report.pages.iter().find(|p| p.route == url).unwrap_or_else(|| {
        let urls: Vec<&str> = report.pages.iter().map(|p| p.route.as_str()).collect();
        panic!("route '{url}' not in report. Available: {urls:?}")
    })
}

/// `check` names of every warning on a page, in report order.
pub fn warning_checks(page: &PageReport) -> Vec<&str> {
    page.warnings.iter().map(|w| w.check.as_str()).collect()
}
