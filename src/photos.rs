//! Stock-photo enrichment.
//!
//! Each record may carry comma-separated `imgkeywords`. The keywords are sent
//! to an Unsplash-compatible search API and the best match becomes the page's
//! illustration, together with the photographer credit the API terms require.
//!
//! Lookups are best effort. A failed request, a bad status or an
//! unexpected body is logged and reported as "no image"; it never fails the
//! page build.

use crate::config::PhotosConfig;
use serde::{Deserialize, Serialize};

/// A found image and its credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttribution {
    pub image_url: String,
    pub photographer_name: String,
    pub photographer_profile_url: String,
}

/// Anything that can turn keywords into an image.
#[async_trait::async_trait]
pub trait ImageSource: Send + Sync {
    async fn lookup(&self, keywords: &str) -> Option<ImageAttribution>;
}

#[async_trait::async_trait]
impl<T: ImageSource + ?Sized> ImageSource for &T {
    async fn lookup(&self, keywords: &str) -> Option<ImageAttribution> {
        (**self).lookup(keywords).await
    }
}

#[async_trait::async_trait]
impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    async fn lookup(&self, keywords: &str) -> Option<ImageAttribution> {
        (**self).lookup(keywords).await
    }
}

/// Used when photo search is disabled.
pub struct NoImages;

#[async_trait::async_trait]
impl ImageSource for NoImages {
    async fn lookup(&self, _keywords: &str) -> Option<ImageAttribution> {
        None
    }
}

/// Client for the `/search/photos` endpoint.
pub struct PhotoSearch {
    http: reqwest::Client,
    endpoint: String,
    access_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    user: Photographer,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
    links: ProfileLinks,
}

#[derive(Debug, Deserialize)]
struct ProfileLinks {
    html: String,
}

impl From<Photo> for ImageAttribution {
    fn from(photo: Photo) -> Self {
        Self {
            image_url: photo.urls.regular,
            photographer_name: photo.user.name,
            photographer_profile_url: photo.user.links.html,
        }
    }
}

impl PhotoSearch {
    pub fn new(config: &PhotosConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &PhotosConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/search/photos", config.api_url.trim_end_matches('/')),
            access_key: config.access_key.clone(),
        }
    }

    async fn search(&self, query: &str) -> Result<Option<ImageAttribution>, reqwest::Error> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("client_id", self.access_key.as_str()),
                ("per_page", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(ImageAttribution::from))
    }
}

#[async_trait::async_trait]
impl ImageSource for PhotoSearch {
    async fn lookup(&self, keywords: &str) -> Option<ImageAttribution> {
        let query = search_query(keywords);
        if query.is_empty() {
            return None;
        }
        match self.search(&query).await {
            Ok(Some(found)) => {
                tracing::debug!(%query, image = %found.image_url, "found image");
                Some(found)
            }
            Ok(None) => {
                tracing::debug!(%query, "no image found");
                None
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "image search failed");
                None
            }
        }
    }
}

/// Comma-separated keywords as a space-separated search query.
pub fn search_query(keywords: &str) -> String {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
