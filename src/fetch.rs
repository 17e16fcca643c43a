//! Content API client.
//!
//! The content API returns the whole shared collection for every tenant in
//! one response; records are filtered down to the configured domain on this
//! side. Two optional side collections feed the site chrome: a domain-wide
//! style document and a navigation menu, both filtered by domain on the
//! server.
//!
//! [`ContentClient::fetch_all`] and the side lookups return `Result` so callers
//! can tell an empty collection from a failed one.
//! [`ContentClient::records_for_domain`] is the listing entry point used by the
//! build: any failure there is logged and turned into an empty list.

use crate::config::{ContentConfig, MenuEntry};
use crate::types::{Collection, ContentRecord};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Number of `linkNanchor`/`linkNurl` pairs in a menu record.
const MENU_LINK_SLOTS: usize = 3;

pub struct ContentClient {
    http: reqwest::Client,
    config: ContentConfig,
    domain: String,
}

impl ContentClient {
    pub fn new(config: &ContentConfig, domain: &str) -> Self {
        Self::with_client(reqwest::Client::new(), config, domain)
    }

    /// Share an existing connection pool.
    pub fn with_client(http: reqwest::Client, config: &ContentConfig, domain: &str) -> Self {
        Self {
            http,
            config: config.clone(),
            domain: domain.to_string(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        if self.config.api_token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.config.api_token)
        }
    }

    /// Fetch every record in the collection, all domains included.
    ///
    /// Records that do not decode are skipped with a warning instead of
    /// failing the whole collection.
    pub async fn fetch_all(&self) -> Result<Vec<ContentRecord>, FetchError> {
        let mut request = self.get(&self.config.api_url);
        if self.config.server_side_filter {
            request = request.query(&[("filters[Domain][$eq]", self.domain.as_str())]);
        }

        tracing::debug!(url = %self.config.api_url, "fetching content records");
        let response = request.send().await?.error_for_status()?;
        let collection: Collection<Value> = response.json().await?;

        let records = collection
            .data
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<ContentRecord>(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable content record");
                    None
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!(count = records.len(), "fetched content records");
        Ok(records)
    }

    /// Records of the configured domain, in API order. Empty on any failure.
    pub async fn records_for_domain(&self) -> Vec<ContentRecord> {
        match self.fetch_all().await {
            Ok(records) => records
                .into_iter()
                .filter(|r| r.attributes.domain == self.domain)
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, domain = %self.domain, "content fetch failed");
                Vec::new()
            }
        }
    }

    /// First record of a side collection filtered by domain, as raw
    /// attributes. `None` when the URL is not configured or nothing matched.
    async fn first_attributes(&self, url: &str) -> Result<Option<Value>, FetchError> {
        if url.trim().is_empty() {
            return Ok(None);
        }
        let response = self
            .get(url)
            .query(&[("filters[domain][$eq]", self.domain.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let collection: Collection<Value> = response.json().await?;
        Ok(collection
            .data
            .into_iter()
            .next()
            .and_then(|mut item| item.get_mut("attributes").map(Value::take)))
    }

    /// The domain-wide style document (`selector → declarations`).
    pub async fn fetch_domain_styles(&self) -> Result<Option<Value>, FetchError> {
        let attributes = self.first_attributes(&self.config.styling_url).await?;
        Ok(attributes
            .and_then(|mut a| a.get_mut("style").map(Value::take))
            .filter(|style| !style.is_null()))
    }

    /// Navigation entries from the menu collection, in slot order.
    pub async fn fetch_menu(&self) -> Result<Vec<MenuEntry>, FetchError> {
        let Some(attributes) = self.first_attributes(&self.config.menu_url).await? else {
            return Ok(Vec::new());
        };
        Ok(menu_entries(&attributes))
    }
}

/// Read the `linkNanchor`/`linkNurl` slots of a menu record. Slots missing
/// either half are skipped.
fn menu_entries(attributes: &Value) -> Vec<MenuEntry> {
    (1..=MENU_LINK_SLOTS)
        .filter_map(|n| {
            let label = attributes.get(format!("link{n}anchor"))?.as_str()?.trim();
            let url = attributes.get(format!("link{n}url"))?.as_str()?.trim();
            if label.is_empty() || url.is_empty() {
                return None;
            }
            Some(MenuEntry {
                label: label.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn record(id: u64, domain: &str, slug: &str) -> Value {
        json!({
            "id": id,
            "attributes": { "Domain": domain, "urlSlug": slug, "Title": format!("t{id}") }
        })
    }

    fn config(server: &MockServer) -> ContentConfig {
        ContentConfig {
            api_url: server.url("/api/articles"),
            api_token: "secret".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetch_all_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/articles")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({
                    "data": [record(1, "a.com", "/"), record(2, "b.com", "/x")]
                }));
            })
            .await;

        let client = ContentClient::new(&config(&server), "a.com");
        let records = client.fetch_all().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].attributes.url_slug, "/x");
    }

    #[tokio::test]
    async fn records_for_domain_filters_and_keeps_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/articles");
                then.status(200).json_body(json!({
                    "data": [
                        record(1, "a.com", "/b"),
                        record(2, "other.com", "/"),
                        record(3, "a.com", "/"),
                        record(4, "a.com", "/a"),
                    ]
                }));
            })
            .await;

        let client = ContentClient::new(&config(&server), "a.com");
        let ids: Vec<u64> = client
            .records_for_domain()
            .await
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn server_side_filter_adds_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/articles")
                    .query_param("filters[Domain][$eq]", "a.com");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let mut cfg = config(&server);
        cfg.server_side_filter = true;
        let client = ContentClient::new(&cfg, "a.com");
        assert!(client.fetch_all().await.unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_is_error_and_empty_listing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/articles");
                then.status(401).json_body(json!({"error": "unauthorized"}));
            })
            .await;

        let client = ContentClient::new(&config(&server), "a.com");
        assert!(matches!(client.fetch_all().await, Err(FetchError::Http(_))));
        assert!(client.records_for_domain().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_api_gives_empty_listing() {
        let cfg = ContentConfig {
            api_url: "http://127.0.0.1:9/api/articles".to_string(),
            ..Default::default()
        };
        let client = ContentClient::new(&cfg, "a.com");
        assert!(client.records_for_domain().await.is_empty());
    }

    #[tokio::test]
    async fn undecodable_records_are_skipped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/articles");
                then.status(200).json_body(json!({
                    "data": [{"id": "not-a-number"}, record(2, "a.com", "/")]
                }));
            })
            .await;

        let client = ContentClient::new(&config(&server), "a.com");
        let records = client.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 2);
    }

    // =========================================================================
    // Site chrome collections
    // =========================================================================

    #[tokio::test]
    async fn domain_styles_read_first_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/styles")
                    .query_param("filters[domain][$eq]", "a.com");
                then.status(200).json_body(json!({
                    "data": [{"id": 1, "attributes": {"style": {"body": {"margin": 0}}}}]
                }));
            })
            .await;

        let mut cfg = config(&server);
        cfg.styling_url = server.url("/api/styles");
        let client = ContentClient::new(&cfg, "a.com");
        let style = client.fetch_domain_styles().await.unwrap();

        mock.assert_async().await;
        assert_eq!(style, Some(json!({"body": {"margin": 0}})));
    }

    #[tokio::test]
    async fn unconfigured_side_collections_skip_requests() {
        let cfg = ContentConfig {
            api_url: "http://127.0.0.1:9/api/articles".to_string(),
            ..Default::default()
        };
        let client = ContentClient::new(&cfg, "a.com");
        assert_eq!(client.fetch_domain_styles().await.unwrap(), None);
        assert!(client.fetch_menu().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn menu_reads_link_slots() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/menus");
                then.status(200).json_body(json!({
                    "data": [{"id": 1, "attributes": {
                        "link1anchor": "Home", "link1url": "/",
                        "link2anchor": "Soap", "link2url": null,
                        "link3anchor": "Skincare", "link3url": "/skincare"
                    }}]
                }));
            })
            .await;

        let mut cfg = config(&server);
        cfg.menu_url = server.url("/api/menus");
        let client = ContentClient::new(&cfg, "a.com");
        let menu = client.fetch_menu().await.unwrap();

        assert_eq!(
            menu,
            vec![
                MenuEntry { label: "Home".into(), url: "/".into() },
                MenuEntry { label: "Skincare".into(), url: "/skincare".into() },
            ]
        );
    }

    #[test]
    fn menu_entries_ignore_blank_slots() {
        let entries = menu_entries(&json!({"link1anchor": " ", "link1url": "/"}));
        assert!(entries.is_empty());
    }
}
