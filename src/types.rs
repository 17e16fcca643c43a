//! Content records as returned by the content API.
//!
//! The API wraps every record as `{ "id": .., "attributes": { .. } }` and uses
//! the field names the CMS editors chose (`urlSlug`, `MetaTitle`,
//! `imgkeywords`, ...). Those names are mapped onto snake_case fields here and
//! serialized back unchanged, so the `fetch` stage manifest stays readable
//! next to the CMS.
//!
//! The CMS happily stores `null` for any text field. Every text field
//! therefore deserializes `null` and missing values to empty, and records
//! never fail to decode because of an untouched field.

use crate::style::StyleSpec;
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope of a collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

/// One content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: u64,
    pub attributes: Attributes,
}

/// Editable fields of a content record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Tenant key.
    #[serde(rename = "Domain", default, deserialize_with = "null_as_default")]
    pub domain: String,
    /// `/`-prefixed path; `/` is the domain's home page.
    #[serde(rename = "urlSlug", default, deserialize_with = "null_as_default")]
    pub url_slug: String,

    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "H1", default, deserialize_with = "null_as_default")]
    pub h1: String,
    #[serde(rename = "MetaTitle", default, deserialize_with = "null_as_default")]
    pub meta_title: String,
    #[serde(rename = "MetaDescription", default, deserialize_with = "null_as_default")]
    pub meta_description: String,
    #[serde(rename = "SiteName", default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    /// Plain-text lead paragraph.
    #[serde(rename = "Paragraph", default, deserialize_with = "null_as_default")]
    pub paragraph: String,
    /// Raw Markdown body.
    #[serde(rename = "Markdown", default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(rename = "containerStyles", default, skip_serializing_if = "Option::is_none")]
    pub container_styles: Option<StyleSpec>,
    #[serde(rename = "headerStyles", default, skip_serializing_if = "Option::is_none")]
    pub header_styles: Option<StyleSpec>,
    #[serde(rename = "bodyStyles", default, skip_serializing_if = "Option::is_none")]
    pub body_styles: Option<StyleSpec>,
    #[serde(rename = "paragraphStyles", default, skip_serializing_if = "Option::is_none")]
    pub paragraph_styles: Option<StyleSpec>,

    #[serde(rename = "CanonicalURL", default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    /// Opaque JSON-LD document for the page head.
    #[serde(rename = "Schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,

    /// Comma-separated image search keywords.
    #[serde(rename = "imgkeywords", default, skip_serializing_if = "Option::is_none")]
    pub img_keywords: Option<String>,
}

impl ContentRecord {
    /// True for the domain's home page record: a slug of `/` or blank.
    pub fn is_home(&self) -> bool {
        self.route_slug().is_empty()
    }

    /// The slug as a route parameter, without leading or trailing `/`.
    pub fn route_slug(&self) -> &str {
        route_slug(&self.attributes.url_slug)
    }

    /// Root-relative link path, trailing `/` kept as authored.
    pub fn path(&self) -> String {
        slug_path(&self.attributes.url_slug)
    }

    /// Markdown body, if non-blank.
    pub fn markdown(&self) -> Option<&str> {
        self.attributes
            .markdown
            .as_deref()
            .filter(|m| !m.trim().is_empty())
    }

    /// Image keywords, if non-blank.
    pub fn img_keywords(&self) -> Option<&str> {
        self.attributes
            .img_keywords
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Strip surrounding whitespace and slashes from a slug.
pub fn route_slug(slug: &str) -> &str {
    slug.trim().trim_matches('/')
}

/// A slug as a root-relative path with exactly one leading `/`.
pub fn slug_path(slug: &str) -> String {
    format!("/{}", slug.trim().trim_start_matches('/'))
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
