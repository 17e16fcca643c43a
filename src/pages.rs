//! Page assembly: from fetched records to render-ready page models.
//!
//! A build starts from a [`Catalog`], the in-domain records of one content
//! fetch in API order. The [`PageAssembler`] turns the records a page needs
//! into [`PageModel`]s by running every derived-field step on its own copy:
//!
//! ```text
//! ContentRecord ─┬─ Markdown  → render_markdown → processed_markdown
//!                ├─ *Styles   → parse_styles    → styles
//!                ├─ CanonicalURL + urlSlug → canonical_url
//!                └─ imgkeywords → ImageSource::lookup → image
//! ```
//!
//! Three page kinds exist:
//!
//! - **Home**: the record whose slug is `/`, plus every other record as the
//!   related-article list. Image lookups for all of them run concurrently.
//! - **Article**: one record matched by route slug.
//! - **Sitemap**: every in-domain URL, home first.
//!
//! "Not found" is `None`. Nothing in this module fails the build.

use crate::canonical::canonical_url;
use crate::markdown::render_markdown;
use crate::photos::{ImageAttribution, ImageSource};
use crate::style::{StyleMap, parse_styles};
use crate::types::{self, Attributes, ContentRecord};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The in-domain records of one content fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub domain: String,
    pub records: Vec<ContentRecord>,
}

/// One sitemap URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub is_home: bool,
}

impl Catalog {
    /// Keep only the records of `domain`, preserving order.
    pub fn from_records(records: Vec<ContentRecord>, domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            records: records
                .into_iter()
                .filter(|r| r.attributes.domain == domain)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The home record. The first one wins if the CMS holds several.
    pub fn home_record(&self) -> Option<&ContentRecord> {
        let mut homes = self.records.iter().filter(|r| r.is_home());
        let home = homes.next();
        let extra = homes.count();
        if extra > 0 {
            tracing::warn!(domain = %self.domain, extra, "multiple home records, using the first");
        }
        home
    }

    /// Every record that is not a home record.
    pub fn related_records(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.iter().filter(|r| !r.is_home())
    }

    /// The non-home record whose route slug is `slug`. Surrounding `/` on
    /// either side is ignored.
    pub fn find_article(&self, slug: &str) -> Option<&ContentRecord> {
        let slug = types::route_slug(slug);
        if slug.is_empty() {
            return None;
        }
        self.related_records().find(|r| r.route_slug() == slug)
    }

    /// Route slugs of every article page, without surrounding `/`.
    ///
    /// Duplicates are dropped; the first record with a slug owns the route.
    pub fn article_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for record in self.related_records() {
            let slug = record.route_slug();
            if !seen.insert(slug) {
                tracing::warn!(slug, id = record.id, "duplicate slug, skipping record");
                continue;
            }
            paths.push(slug.to_string());
        }
        paths
    }

    /// Every in-domain URL, home first, others in catalog order.
    ///
    /// Slugs are normalized to a leading `/` and prefixed with
    /// `https://{domain}`. When no record is the home page, a home URL is
    /// synthesized. Repeated URLs appear once.
    pub fn sitemap(&self) -> Vec<SitemapEntry> {
        let mut seen = HashSet::new();
        let mut home = None;
        let mut others = Vec::new();

        for record in &self.records {
            let path = if record.is_home() {
                "/".to_string()
            } else {
                record.path()
            };
            let entry = SitemapEntry {
                url: format!("https://{}{}", self.domain, path),
                is_home: record.is_home(),
            };
            if !seen.insert(entry.url.clone()) {
                continue;
            }
            if entry.is_home {
                home = Some(entry);
            } else {
                others.push(entry);
            }
        }

        let home = home.unwrap_or_else(|| SitemapEntry {
            url: format!("https://{}/", self.domain),
            is_home: true,
        });
        std::iter::once(home).chain(others).collect()
    }
}

/// Region styles parsed from the four style fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionStyles {
    pub container: StyleMap,
    pub header: StyleMap,
    pub body: StyleMap,
    pub paragraph: StyleMap,
}

/// A record with its derived fields, ready for a template.
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    pub id: u64,
    pub attributes: Attributes,
    /// Sanitized HTML of the Markdown body.
    pub processed_markdown: Option<String>,
    pub image: Option<ImageAttribution>,
    pub styles: RegionStyles,
    pub canonical_url: String,
}

impl PageModel {
    /// `<title>` text: MetaTitle, falling back to Title.
    pub fn document_title(&self) -> &str {
        non_blank(&self.attributes.meta_title).unwrap_or(&self.attributes.title)
    }

    /// Main heading: H1, falling back to Title.
    pub fn heading(&self) -> &str {
        non_blank(&self.attributes.h1).unwrap_or(&self.attributes.title)
    }

    /// Root-relative link to the page.
    pub fn href(&self) -> String {
        types::slug_path(&self.attributes.url_slug)
    }

    /// First `max_chars` characters of the lead paragraph.
    pub fn excerpt(&self, max_chars: usize) -> String {
        self.attributes.paragraph.chars().take(max_chars).collect()
    }
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Home page: the home record and the related-article list.
#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub home: PageModel,
    pub related: Vec<PageModel>,
}

/// Builds page models from catalog records.
pub struct PageAssembler<S> {
    images: S,
    domain: String,
}

impl<S: ImageSource> PageAssembler<S> {
    pub fn new(images: S, domain: &str) -> Self {
        Self {
            images,
            domain: domain.to_string(),
        }
    }

    /// Every derived field except the image.
    pub fn prepare(&self, record: &ContentRecord) -> PageModel {
        let a = &record.attributes;
        let base = a
            .canonical_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.domain);

        PageModel {
            id: record.id,
            attributes: a.clone(),
            processed_markdown: record.markdown().map(render_markdown),
            image: None,
            styles: RegionStyles {
                container: parse_styles(a.container_styles.as_ref()),
                header: parse_styles(a.header_styles.as_ref()),
                body: parse_styles(a.body_styles.as_ref()),
                paragraph: parse_styles(a.paragraph_styles.as_ref()),
            },
            canonical_url: canonical_url(base, &a.url_slug),
        }
    }

    /// Prepare a record and look up its image.
    pub async fn enrich(&self, record: &ContentRecord) -> PageModel {
        let mut page = self.prepare(record);
        if let Some(keywords) = record.img_keywords() {
            page.image = self.images.lookup(keywords).await;
        }
        page
    }

    /// Assemble the home page, or `None` when the domain has no home record.
    pub async fn home(&self, catalog: &Catalog) -> Option<HomePage> {
        let Some(home) = catalog.home_record() else {
            tracing::warn!(domain = %catalog.domain, "home page content not found");
            return None;
        };

        let records: Vec<&ContentRecord> =
            std::iter::once(home).chain(catalog.related_records()).collect();
        let mut pages = join_all(records.into_iter().map(|r| self.enrich(r))).await;
        let related = pages.split_off(1);
        let home = pages.pop()?;

        Some(HomePage { home, related })
    }

    /// Assemble the article page for a route slug, or `None` if unknown.
    pub async fn article(&self, catalog: &Catalog, slug: &str) -> Option<PageModel> {
        self.article_from(catalog, slug, &mut HashMap::new()).await
    }

    /// Like [`article`](Self::article), but takes the page from `assembled`
    /// (keyed by record id) when the home grid already built it, so its image
    /// is looked up once per build.
    pub async fn article_from(
        &self,
        catalog: &Catalog,
        slug: &str,
        assembled: &mut HashMap<u64, PageModel>,
    ) -> Option<PageModel> {
        let Some(record) = catalog.find_article(slug) else {
            tracing::warn!(slug, "article not found");
            return None;
        };
        match assembled.remove(&record.id) {
            Some(page) => Some(page),
            None => Some(self.enrich(record).await),
        }
    }
}
