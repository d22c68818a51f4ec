//! # monad
//!
//! A static-site template compositor with a build-time audit. Pages are plain
//! HTML or Markdown files with a small metadata block; fragments, layouts and
//! a JSON collection store are composed into flat HTML documents, and every
//! document is then audited for SEO basics, accessibility and broken internal
//! links.
//!
//! # Architecture: Two-Phase Build
//!
//! ```text
//! 1. Plan     pages/  →  PageSource list  →  RouteTable
//! 2. Render   per page: frontmatter → slots → fragments → layout
//!                       → loops → interpolation → assets → minify
//!                       → audit → write
//!             then reports, site files, audit policy
//! ```
//!
//! The route table is complete before anything renders. That is what lets
//! the link audit judge every anchor against every page, and what lets two
//! sources claiming one URL fail the build before a single file is written.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Enumerates page sources under the pages directory |
//! | [`routes`] | Source path → URL + output file; route table with duplicate detection |
//! | [`frontmatter`] | Metadata block extraction for markup and Markdown pages |
//! | [`relaxed_json`] | Lenient JSON for metadata blocks and inclusion arguments |
//! | [`markdown`] | `pulldown-cmark` wrapper honoring the `[markdown]` flags |
//! | [`template`] | Fragments, interpolation, slots and loops |
//! | [`collections`] | Loads the JSON collection store for loop blocks |
//! | [`assets`] | Bundler manifest → `<link>`/`<script>` tags; HTML minification |
//! | [`render`] | The per-page pipeline producing a [`render::RenderResult`] |
//! | [`audit`] | SEO, accessibility and link checks over the final HTML |
//! | [`report`] | Aggregates warnings into `_audit/report.json` and `report.html` |
//! | [`site_files`] | `sitemap.xml`, `robots.txt`, redirect manifests |
//! | [`generate`] | Build driver and on-demand render |
//! | [`config`] | `monad.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Abort
//!
//! A page with a broken metadata block, a missing fragment or a loop over a
//! path that is not a list still renders. Missing fragments and bad loop
//! paths leave an HTML comment in the output and a `tracing` warning; broken
//! metadata falls back to defaults. Only problems that make the whole build
//! meaningless abort it: I/O failures, invalid config, an invalid collection
//! file and duplicate routes.
//!
//! ## One Final Interpolation Pass
//!
//! Slots and layouts are composed with token resolution deferred, then the
//! assembled node tree is interpolated once. Page values therefore reach the
//! layout as well as the body, and loop item tokens are still intact when the
//! loop expander runs. Fragments are the exception: each is interpolated
//! against its own inclusion arguments as it is spliced in, since those
//! arguments exist only at the inclusion site. Substituted values travel as
//! text nodes, so nothing is resolved twice.
//!
//! ## Injected Fragment Source
//!
//! The composer never touches the filesystem directly. It reads through the
//! [`template::FragmentSource`] trait, implemented by
//! [`template::FsFragments`] for builds and [`template::MemoryFragments`] for
//! tests. Reads are uncached so a dev-server render always sees the latest
//! files.
//!
//! ## Audit After Render, Policy Last
//!
//! Checks are plain functions over a tolerant DOM built with `quick-xml`;
//! each runs under a panic guard so one faulty rule cannot sink the build.
//! A category in `fail` mode aborts only after every page, report and site
//! file is on disk, so the report explaining the failure is always there.
//!
//! ## Values Are Not Escaped
//!
//! Fragments and data are trusted input. Interpolated values are inserted
//! verbatim so data can carry markup. This is not a sandbox.

pub mod assets;
pub mod audit;
pub mod collections;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod output;
pub mod relaxed_json;
pub mod render;
pub mod report;
pub mod routes;
pub mod scan;
pub mod site_files;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
