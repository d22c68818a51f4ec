//! Deployment files derived from the route table and config.
//!
//! | File | Written when |
//! |---|---|
//! | `sitemap.xml` | `[sitemap] enabled` and `site.url` set |
//! | `robots.txt` | `[robots] enabled` |
//! | `_redirects` | `[redirects] netlify` |
//! | `vercel.json` | `[redirects] vercel` |

use crate::config::{RedirectRule, SiteConfig};
use crate::routes::RouteTable;
use quick_xml::escape::escape;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::warn;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";
pub const NETLIFY_FILE: &str = "_redirects";
pub const VERCEL_FILE: &str = "vercel.json";

// ============================================================================
// Sitemap
// ============================================================================

/// One `<url>` per route, sorted, absolute against `base_url`.
pub fn sitemap_xml(base_url: &str, routes: &RouteTable) -> String {
    let base = base_url.trim_end_matches('/');
    let mut xml = String::with_capacity(64 + routes.len() * 64);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');
    for url in routes.sorted_urls() {
        let loc = format!("{base}{url}");
        xml.push_str(&format!("  <url>\n    <loc>{}</loc>\n  </url>\n", escape(loc.as_str())));
    }
    xml.push_str("</urlset>\n");
    xml
}

// ============================================================================
// robots.txt
// ============================================================================

pub fn robots_txt(sitemap_url: Option<&str>) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");
    if let Some(url) = sitemap_url {
        out.push_str(&format!("\nSitemap: {url}\n"));
    }
    out
}

// ============================================================================
// Redirects
// ============================================================================

/// Netlify `_redirects`: one `from to status` line per rule.
pub fn netlify_redirects(rules: &[RedirectRule]) -> String {
    rules
        .iter()
        .map(|r| format!("{} {} {}\n", r.from, r.to, r.status))
        .collect()
}

#[derive(Serialize)]
struct VercelConfig<'a> {
    redirects: Vec<VercelRedirect<'a>>,
}

#[derive(Serialize)]
struct VercelRedirect<'a> {
    source: &'a str,
    destination: &'a str,
    permanent: bool,
}

/// Vercel `vercel.json` with a `redirects` array. 301 and 308 are permanent.
pub fn vercel_json(rules: &[RedirectRule]) -> Result<String, serde_json::Error> {
    let config = VercelConfig {
        redirects: rules
            .iter()
            .map(|r| VercelRedirect {
                source: &r.from,
                destination: &r.to,
                permanent: matches!(r.status, 301 | 308),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&config)
}

// ============================================================================
// Writing
// ============================================================================

/// Write every enabled site file under `output_root`.
/// Returns the names of the files written.
pub fn write_site_files(
    output_root: &Path,
    config: &SiteConfig,
    routes: &RouteTable,
) -> Result<Vec<&'static str>, std::io::Error> {
    let mut written = Vec::new();

    let sitemap_url = match (config.sitemap.enabled, config.base_url()) {
        (true, Some(base)) => {
            fs::write(output_root.join(SITEMAP_FILE), sitemap_xml(base, routes))?;
            written.push(SITEMAP_FILE);
            Some(format!("{base}/{SITEMAP_FILE}"))
        }
        (true, None) => {
            warn!("sitemap enabled but site.url is not set, skipping {SITEMAP_FILE}");
            None
        }
        (false, _) => None,
    };

    if config.robots.enabled {
        fs::write(output_root.join(ROBOTS_FILE), robots_txt(sitemap_url.as_deref()))?;
        written.push(ROBOTS_FILE);
    }

    let rules = &config.redirects.rules;
    if config.redirects.netlify {
        fs::write(output_root.join(NETLIFY_FILE), netlify_redirects(rules))?;
        written.push(NETLIFY_FILE);
    }
    if config.redirects.vercel {
        fs::write(output_root.join(VERCEL_FILE), vercel_json(rules)?)?;
        written.push(VERCEL_FILE);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn table() -> RouteTable {
        let paths = ["index.html", "zeta.md", "about.html", "blog/a&b.html"];
        RouteTable::build(paths.iter().map(Path::new), &RoutingConfig::default()).unwrap()
    }

    fn rules() -> Vec<RedirectRule> {
        vec![
            RedirectRule {
                from: "/old/".into(),
                to: "/new/".into(),
                status: 301,
            },
            RedirectRule {
                from: "/tmp".into(),
                to: "/elsewhere".into(),
                status: 302,
            },
        ]
    }

    #[test]
    fn sitemap_is_sorted_and_escaped() {
        let xml = sitemap_xml("https://example.com/", &table());
        let locs: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<loc>"))
            .filter_map(|l| l.strip_suffix("</loc>"))
            .collect();
        assert_eq!(
            locs,
            [
                "https://example.com/",
                "https://example.com/about/",
                "https://example.com/blog/a&amp;b/",
                "https://example.com/zeta/",
            ]
        );
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn robots_with_and_without_sitemap() {
        assert_eq!(robots_txt(None), "User-agent: *\nAllow: /\n");
        assert!(robots_txt(Some("https://e.com/sitemap.xml")).ends_with("Sitemap: https://e.com/sitemap.xml\n"));
    }

    #[test]
    fn redirect_manifests() {
        assert_eq!(netlify_redirects(&rules()), "/old/ /new/ 301\n/tmp /elsewhere 302\n");
        let vercel: serde_json::Value = serde_json::from_str(&vercel_json(&rules()).unwrap()).unwrap();
        assert_eq!(
            vercel,
            json!({"redirects": [
                {"source": "/old/", "destination": "/new/", "permanent": true},
                {"source": "/tmp", "destination": "/elsewhere", "permanent": false},
            ]})
        );
    }

    #[test]
    fn write_respects_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        let written = write_site_files(tmp.path(), &config, &table()).unwrap();
        assert_eq!(written, [ROBOTS_FILE]);
        assert!(!tmp.path().join(SITEMAP_FILE).exists());

        config.site.insert("url".into(), json!("https://example.com"));
        config.redirects.netlify = true;
        config.redirects.vercel = true;
        config.redirects.rules = rules();
        let written = write_site_files(tmp.path(), &config, &table()).unwrap();
        assert_eq!(written, [SITEMAP_FILE, ROBOTS_FILE, NETLIFY_FILE, VERCEL_FILE]);
        let robots = fs::read_to_string(tmp.path().join(ROBOTS_FILE)).unwrap();
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
