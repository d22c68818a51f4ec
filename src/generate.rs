//! Site build driver.
//!
//! A build runs in two phases:
//!
//! ```text
//! 1. Plan     pages/ → PageSource list → RouteTable      (fails on duplicate routes)
//! 2. Render   per page: render → audit → write
//!             then: report.json/html → sitemap, robots, redirects → audit policy
//! ```
//!
//! The whole route table exists before the first page renders, so the link
//! audit of page N can see page N+1. The `fail` audit policy is enforced
//! last: a failing build still leaves every page, report and site file on
//! disk for inspection.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about/index.html        # clean URLs
//! ├── <public_dir contents>   # copied verbatim
//! ├── sitemap.xml
//! ├── robots.txt
//! └── _audit/
//!     ├── report.json
//!     └── report.html
//! ```
//!
//! [`render_url`] serves the dev-server seam: it recomputes the whole site
//! and returns one page, with no caching between calls.

use crate::assets::{self, AssetError};
use crate::audit::{self, Category, PageAudit};
use crate::collections::{self, CollectionError};
use crate::config::SiteConfig;
use crate::render::{RenderResult, SiteRenderer};
use crate::report::Report;
use crate::routes::{RouteError, RouteTable};
use crate::scan::{self, PageSource, ScanError};
use crate::site_files;
use crate::template::FsFragments;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Route error: {0}")]
    Route(#[from] RouteError),
    #[error("Collections error: {0}")]
    Collection(#[from] CollectionError),
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
    #[error("audit failed: {count} warnings in fail-mode categories ({})", join_categories(.categories))]
    AuditFailed {
        count: usize,
        categories: Vec<Category>,
        /// The completed build, for callers that still want to show it.
        summary: Box<BuildSummary>,
    },
}

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(Category::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub output_dir: PathBuf,
    pub results: Vec<RenderResult>,
    pub report: Report,
    /// Files copied from the public directory.
    pub public_files: usize,
    /// Site files written (`sitemap.xml`, `robots.txt`, ...).
    pub site_files: Vec<&'static str>,
}

/// Phase 1 output: every page source and its route.
#[derive(Debug)]
pub struct SitePlan {
    pub pages: Vec<PageSource>,
    pub routes: RouteTable,
}

/// Scan the pages directory and build the route table.
pub fn plan(root: &Path, config: &SiteConfig) -> Result<SitePlan, BuildError> {
    let pages = scan::scan_pages(&config.pages_path(root))?;
    let routes = RouteTable::build(pages.iter().map(|p| p.rel_path.as_path()), &config.routing)?;
    debug!(pages = pages.len(), "route table built");
    Ok(SitePlan { pages, routes })
}

/// Render every planned page, in route-table order. No audit.
pub fn render_all(
    root: &Path,
    config: &SiteConfig,
    plan: &SitePlan,
) -> Result<Vec<RenderResult>, BuildError> {
    let fragments = FsFragments::new(config.fragments_path(root));
    let renderer = SiteRenderer::new(config, &fragments)
        .with_collections(collections::load_for_site(root, config)?)
        .with_assets(assets::site_tags(root, &config.assets)?);

    Ok(plan
        .pages
        .iter()
        .zip(plan.routes.entries())
        .map(|(page, entry)| renderer.render_page(page, &entry.route))
        .collect())
}

/// Run a full build of the project at `root`.
pub fn build(root: &Path, config: &SiteConfig) -> Result<BuildSummary, BuildError> {
    let output_dir = config.output_path(root);
    fs::create_dir_all(&output_dir)?;

    let public_dir = config.public_path(root);
    let public_files = if public_dir.is_dir() {
        copy_dir_recursive(&public_dir, &output_dir)?
    } else {
        0
    };

    let plan = plan(root, config)?;
    let mut results = render_all(root, config, &plan)?;

    for result in &mut results {
        let page = PageAudit {
            route: &result.route.url,
            config: &config.audit,
            routes: &plan.routes,
            output_root: Some(&output_dir),
        };
        result.warnings = audit::audit_page(&result.html, &page);

        let out_path = output_dir.join(&result.route.out_path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &result.html)?;
        debug!(route = %result.route.url, warnings = result.warnings.len(), "wrote page");
    }

    let report = Report::assemble(&results);
    report.write(&output_dir)?;
    let site_files = site_files::write_site_files(&output_dir, config, &plan.routes)?;
    info!(
        pages = results.len(),
        warnings = report.total(),
        output = %output_dir.display(),
        "build complete"
    );

    let failing = report.failing_categories(&config.audit);
    let summary = BuildSummary {
        output_dir,
        results,
        report,
        public_files,
        site_files,
    };
    if failing.is_empty() {
        return Ok(summary);
    }
    let count = failing.iter().map(|c| summary.report.count(*c)).sum();
    Err(BuildError::AuditFailed {
        count,
        categories: failing,
        summary: Box::new(summary),
    })
}

/// Render the page whose route matches `url` (after link normalization).
///
/// Recomputes the whole site on every call so edits to any page, fragment
/// or data file show up immediately.
pub fn render_url(root: &Path, config: &SiteConfig, url: &str) -> Result<Option<String>, BuildError> {
    let plan = plan(root, config)?;
    let results = render_all(root, config, &plan)?;
    let Some(entry) = plan.routes.find(url) else {
        debug!(url, "no route matches");
        return Ok(None);
    };
    Ok(results
        .into_iter()
        .find(|r| r.route.url == entry.route.url)
        .map(|r| r.html))
}

/// Copy `src` into `dst`, returning the number of files copied.
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}
