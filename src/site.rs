//! Site chrome and the fetch-stage manifest.
//!
//! Every page shares a header (site name and navigation), a footer and a
//! domain-wide stylesheet. Each comes from the CMS when available and falls
//! back to `[site]` in `config.toml` otherwise:
//!
//! | Piece | Source | Fallback |
//! |-------|--------|----------|
//! | name | `SiteName` of the home record | `site.name` |
//! | menu | menu collection (`link1anchor`/`link1url` ...) | `site.menu` |
//! | css | style collection (`selector → declarations`) | empty |
//!
//! The `fetch` stage resolves the chrome together with the domain's records
//! and writes both to `manifest.json`. The `generate` stage reads that file
//! back, so a site can be regenerated without touching the network for
//! content.

use crate::config::{MenuEntry, SiteSection};
use crate::fetch::ContentClient;
use crate::pages::Catalog;
use crate::style::domain_css;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header, navigation and stylesheet shared by every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteChrome {
    pub name: String,
    pub menu: Vec<MenuEntry>,
    /// Domain-wide CSS for the `<style>` element.
    pub css: String,
}

impl SiteChrome {
    /// Pick CMS values where present, config fallbacks otherwise.
    pub fn resolve(
        site: &SiteSection,
        site_name: Option<&str>,
        menu: Vec<MenuEntry>,
        styles: Option<&Value>,
    ) -> Self {
        let name = site_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(site.name.as_str())
            .to_string();
        let menu = if menu.is_empty() {
            site.menu.clone()
        } else {
            menu
        };
        let css = styles.map(domain_css).unwrap_or_default();
        Self { name, menu, css }
    }
}

/// Output of the `fetch` stage, input of `generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub fetched_at: DateTime<Utc>,
    pub chrome: SiteChrome,
    pub catalog: Catalog,
}

/// Fetch the domain's records and site chrome in one go.
///
/// The three requests run concurrently. Chrome failures fall back to config
/// values; a failed record fetch yields an empty catalog.
pub async fn fetch_manifest(client: &ContentClient, site: &SiteSection) -> Manifest {
    let (records, menu, styles) = tokio::join!(
        client.records_for_domain(),
        client.fetch_menu(),
        client.fetch_domain_styles(),
    );

    let menu = menu.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "menu fetch failed, using configured menu");
        Vec::new()
    });
    let styles = styles.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "domain style fetch failed");
        None
    });

    let catalog = Catalog::from_records(records, client.domain());
    let site_name = catalog
        .home_record()
        .and_then(|home| home.attributes.site_name.as_deref());
    let chrome = SiteChrome::resolve(site, site_name, menu, styles.as_ref());
    tracing::info!(
        domain = %catalog.domain,
        records = catalog.records.len(),
        "fetched site content"
    );

    Manifest {
        fetched_at: Utc::now(),
        chrome,
        catalog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn entry(label: &str, url: &str) -> MenuEntry {
        MenuEntry {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    // =========================================================================
    // Fallbacks
    // =========================================================================

    #[test]
    fn defaults_when_cms_has_nothing() {
        let chrome = SiteChrome::resolve(&SiteSection::default(), None, Vec::new(), None);
        assert_eq!(chrome.name, "Default Site Name");
        assert_eq!(chrome.menu, vec![entry("Home", "/")]);
        assert_eq!(chrome.css, "");
    }

    #[test]
    fn blank_site_name_falls_back() {
        let site = SiteSection {
            name: "Configured".to_string(),
            ..Default::default()
        };
        let chrome = SiteChrome::resolve(&site, Some("  "), Vec::new(), None);
        assert_eq!(chrome.name, "Configured");
    }

    #[test]
    fn cms_values_win() {
        let chrome = SiteChrome::resolve(
            &SiteSection::default(),
            Some("Soap Co"),
            vec![entry("Soap", "/soap")],
            Some(&json!({"body": {"margin": 0}})),
        );
        assert_eq!(chrome.name, "Soap Co");
        assert_eq!(chrome.menu, vec![entry("Soap", "/soap")]);
        assert_eq!(chrome.css, "body { margin: 0; }");
    }

    // =========================================================================
    // fetch_manifest
    // =========================================================================

    #[tokio::test]
    async fn manifest_collects_records_and_chrome() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/articles");
                then.status(200).json_body(json!({"data": [
                    {"id": 1, "attributes": {"Domain": "a.com", "urlSlug": "/", "SiteName": "A Site"}},
                    {"id": 2, "attributes": {"Domain": "b.com", "urlSlug": "/"}},
                    {"id": 3, "attributes": {"Domain": "a.com", "urlSlug": "/x"}}
                ]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/menus");
                then.status(200).json_body(json!({"data": [
                    {"id": 1, "attributes": {"link1anchor": "X", "link1url": "/x"}}
                ]}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/styles");
                then.status(500);
            })
            .await;

        let config = ContentConfig {
            api_url: server.url("/api/articles"),
            menu_url: server.url("/api/menus"),
            styling_url: server.url("/api/styles"),
            ..Default::default()
        };
        let client = ContentClient::new(&config, "a.com");
        let manifest = fetch_manifest(&client, &SiteSection::default()).await;

        let ids: Vec<u64> = manifest.catalog.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(manifest.catalog.domain, "a.com");
        assert_eq!(manifest.chrome.name, "A Site");
        assert_eq!(manifest.chrome.menu, vec![entry("X", "/x")]);
        assert_eq!(manifest.chrome.css, "");
    }

    #[tokio::test]
    async fn unreachable_api_gives_empty_catalog() {
        let config = ContentConfig {
            api_url: "http://127.0.0.1:9/api/articles".to_string(),
            ..Default::default()
        };
        let client = ContentClient::new(&config, "a.com");
        let manifest = fetch_manifest(&client, &SiteSection::default()).await;
        assert!(manifest.catalog.is_empty());
        assert_eq!(manifest.chrome.name, "Default Site Name");
    }

    #[test]
    fn manifest_survives_json() {
        let manifest = Manifest {
            fetched_at: Utc::now(),
            chrome: SiteChrome::resolve(&SiteSection::default(), None, Vec::new(), None),
            catalog: Catalog::default(),
        };
        let text = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(back.chrome, manifest.chrome);
        assert_eq!(back.fetched_at, manifest.fetched_at);
    }
}
