//! Audit report assembly.
//!
//! Collects every page's warnings into a [`Report`] and writes it twice under
//! the output root:
//!
//! ```text
//! dist/_audit/
//! ├── report.json   # machine-readable, pretty-printed
//! └── report.html   # standalone table for humans
//! ```

use crate::audit::{Category, Warning};
use crate::config::AuditConfig;
use crate::render::RenderResult;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the output root holding the reports.
pub const REPORT_DIR: &str = "_audit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub route: String,
    pub title: Option<String>,
    /// Output file relative to the output root.
    pub output: String,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub pages: Vec<PageReport>,
    /// Warning count per category. Every category is present, zero or not.
    pub totals: BTreeMap<Category, usize>,
}

impl Report {
    pub fn assemble(results: &[RenderResult]) -> Report {
        let mut totals: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        let pages = results
            .iter()
            .map(|result| {
                for warning in &result.warnings {
                    *totals.entry(warning.category).or_default() += 1;
                }
                PageReport {
                    route: result.route.url.clone(),
                    title: result.meta.title.clone(),
                    output: result.route.out_path.to_string_lossy().replace('\\', "/"),
                    warnings: result.warnings.clone(),
                }
            })
            .collect();
        Report { pages, totals }
    }

    pub fn total(&self) -> usize {
        self.totals.values().sum()
    }

    pub fn count(&self, category: Category) -> usize {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    /// Categories whose mode is `fail` and that have at least one warning.
    pub fn failing_categories(&self, config: &AuditConfig) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| c.mode(config) == crate::config::AuditMode::Fail && self.count(*c) > 0)
            .collect()
    }

    /// Write `report.json` and `report.html` under `<output_root>/_audit`.
    /// Returns the directory written to.
    pub fn write(&self, output_root: &Path) -> Result<PathBuf, std::io::Error> {
        let dir = output_root.join(REPORT_DIR);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join("report.json"), json)?;
        fs::write(dir.join("report.html"), render_html(self).into_string())?;
        Ok(dir)
    }
}

const REPORT_CSS: &str = "body{font:14px/1.5 system-ui,sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{border-bottom:1px solid #ddd;padding:.4rem .6rem;text-align:left;vertical-align:top}\
th{background:#f4f4f4}.seo{color:#8a4b00}.accessibility{color:#00548a}.link{color:#8a0020}\
.clean{color:#2a7a2a}";

fn render_html(report: &Report) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Audit report" }
                style { (PreEscaped(REPORT_CSS)) }
            }
            body {
                h1 { "Audit report" }
                p {
                    (report.pages.len()) " pages, " (report.total()) " warnings"
                    @for (category, count) in &report.totals {
                        " · " span class=(category) { (category) ": " (count) }
                    }
                }
                table {
                    thead {
                        tr { th { "Route" } th { "Title" } th { "Category" } th { "Check" } th { "Message" } }
                    }
                    tbody {
                        @for page in &report.pages {
                            @if page.warnings.is_empty() {
                                tr {
                                    td { a href=(page.route) { (page.route) } }
                                    td { (page.title.as_deref().unwrap_or("")) }
                                    td class="clean" colspan="3" { "no warnings" }
                                }
                            }
                            @for warning in &page.warnings {
                                tr {
                                    td { a href=(page.route) { (page.route) } }
                                    td { (page.title.as_deref().unwrap_or("")) }
                                    td class=(warning.category) { (warning.category) }
                                    td { code { (warning.check) } }
                                    td { (warning.message) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
