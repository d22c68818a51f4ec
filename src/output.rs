//! CLI output formatting for builds, audits and route listings.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its route and title, with the source and output files
//! shown as secondary context on indented lines. This makes the output
//! readable as a site inventory while still letting users trace a route back
//! to the file that produced it.
//!
//! # Output Format
//!
//! ## Routes
//!
//! ```text
//! 001 / → index.html
//!     Source: index.html
//! 002 /about/ → about/index.html
//!     Source: about.md
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 Home → index.html
//! 002 About → about/index.html (2 warnings)
//!
//! Site files
//!     sitemap.xml
//!     robots.txt
//!
//! Built 2 pages into dist, 3 public files copied, 2 warnings
//! ```
//!
//! ## Audit table
//!
//! ```text
//! Route     SEO  A11y  Link
//! /           0     0     0
//! /about/     1     0     1
//!     [seo/h1] page has no <h1>
//!     [link/internal_links] link to /x does not match any page or file
//! Total       1     0     1
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::audit::Category;
use crate::generate::BuildSummary;
use crate::report::Report;
use crate::routes::RouteTable;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format a page header: positional index + title, with optional warning count.
///
/// ```text
/// 001 Home → index.html
/// 002 About → about/index.html (2 warnings)
/// ```
fn page_header(index: usize, title: &str, out_path: &str, warnings: usize) -> String {
    match warnings {
        0 => format!("{} {} \u{2192} {}", format_index(index), title, out_path),
        n => format!(
            "{} {} \u{2192} {} ({})",
            format_index(index),
            title,
            out_path,
            plural(n, "warning")
        ),
    }
}

fn display_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Routes
// ============================================================================

pub fn format_routes(routes: &RouteTable) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in routes.entries().iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            entry.route.url,
            display_path(&entry.route.out_path)
        ));
        lines.push(format!("{}Source: {}", indent(1), display_path(&entry.source)));
    }
    if lines.is_empty() {
        lines.push("No pages found".to_string());
    }
    lines
}

pub fn print_routes(routes: &RouteTable) {
    for line in format_routes(routes) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, result) in summary.results.iter().enumerate() {
        let title = result.meta.title.as_deref().unwrap_or(&result.route.url);
        lines.push(page_header(
            i + 1,
            title,
            &display_path(&result.route.out_path),
            result.warnings.len(),
        ));
    }

    if !summary.site_files.is_empty() {
        lines.push(String::new());
        lines.push("Site files".to_string());
        for file in &summary.site_files {
            lines.push(format!("{}{}", indent(1), file));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {} into {}, {} copied, {}",
        plural(summary.results.len(), "page"),
        summary.output_dir.display(),
        plural(summary.public_files, "public file"),
        plural(summary.report.total(), "warning")
    ));
    lines
}

pub fn print_build_output(summary: &BuildSummary) {
    for line in format_build_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Audit table
// ============================================================================

fn category_heading(category: Category) -> &'static str {
    match category {
        Category::Seo => "SEO",
        Category::Accessibility => "A11y",
        Category::Link => "Link",
    }
}

/// Per-route warning counts, one column per category, with each page's
/// warnings listed under its row. Pages without warnings get a row only.
pub fn format_report_table(report: &Report) -> Vec<String> {
    let route_width = report
        .pages
        .iter()
        .map(|p| p.route.len())
        .chain(["Route".len(), "Total".len()])
        .max()
        .unwrap_or(5);

    let row = |label: &str, counts: &[usize]| {
        let mut line = format!("{label:<route_width$}");
        for count in counts {
            line.push_str(&format!("  {count:>4}"));
        }
        line
    };

    let mut header = format!("{:<route_width$}", "Route");
    for category in Category::ALL {
        header.push_str(&format!("  {:>4}", category_heading(category)));
    }

    let mut lines = vec![header];
    for page in &report.pages {
        let counts: Vec<usize> = Category::ALL
            .iter()
            .map(|c| page.warnings.iter().filter(|w| w.category == *c).count())
            .collect();
        lines.push(row(&page.route, &counts));
        for warning in &page.warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    let totals: Vec<usize> = Category::ALL.iter().map(|c| report.count(*c)).collect();
    lines.push(row("Total", &totals));
    lines
}

pub fn print_report_table(report: &Report) {
    for line in format_report_table(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Warning;
    use crate::config::RoutingConfig;
    use crate::frontmatter::Meta;
    use crate::render::RenderResult;
    use crate::routes::route_for;
    use std::path::{Path, PathBuf};

    fn result(rel: &str, title: Option<&str>, warnings: Vec<Warning>) -> RenderResult {
        RenderResult {
            route: route_for(Path::new(rel), &RoutingConfig::default()),
            source: PathBuf::from(rel),
            html: String::new(),
            warnings,
            meta: Meta {
                title: title.map(str::to_string),
                ..Meta::default()
            },
        }
    }

    fn sample() -> Vec<RenderResult> {
        vec![
            result("index.html", Some("Home"), Vec::new()),
            result(
                "about.md",
                Some("About"),
                vec![
                    Warning::new(Category::Seo, "h1", "page has no <h1>"),
                    Warning::new(Category::Link, "internal_links", "link to /x does not match any page or file"),
                ],
            ),
        ]
    }

    #[test]
    fn format_index_zero_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn page_header_shows_warning_count() {
        assert_eq!(page_header(1, "Home", "index.html", 0), "001 Home \u{2192} index.html");
        assert_eq!(
            page_header(2, "About", "about/index.html", 1),
            "002 About \u{2192} about/index.html (1 warning)"
        );
    }

    #[test]
    fn routes_listing() {
        let table = RouteTable::build(
            ["index.html", "about.md"].iter().map(Path::new),
            &RoutingConfig::default(),
        )
        .unwrap();
        assert_eq!(
            format_routes(&table),
            [
                "001 / \u{2192} index.html",
                "    Source: index.html",
                "002 /about/ \u{2192} about/index.html",
                "    Source: about.md",
            ]
        );
        assert_eq!(format_routes(&RouteTable::default()), ["No pages found"]);
    }

    #[test]
    fn build_output_lists_pages_and_totals() {
        let results = sample();
        let summary = BuildSummary {
            output_dir: PathBuf::from("dist"),
            report: Report::assemble(&results),
            results,
            public_files: 1,
            site_files: vec!["sitemap.xml", "robots.txt"],
        };
        let lines = format_build_output(&summary);
        assert_eq!(lines[0], "001 Home \u{2192} index.html");
        assert_eq!(lines[1], "002 About \u{2192} about/index.html (2 warnings)");
        assert!(lines.contains(&"    sitemap.xml".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Built 2 pages into dist, 1 public file copied, 2 warnings"
        );
    }

    #[test]
    fn report_table_columns_and_details() {
        let lines = format_report_table(&Report::assemble(&sample()));
        assert_eq!(lines[0], "Route     SEO  A11y  Link");
        assert_eq!(lines[1], "/           0     0     0");
        assert_eq!(lines[2], "/about/     1     0     1");
        assert_eq!(lines[3], "    [seo/h1] page has no <h1>");
        assert!(lines[4].starts_with("    [link/internal_links]"));
        assert_eq!(lines[5], "Total       1     0     1");
    }
}
