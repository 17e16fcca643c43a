//! HTML site generation.
//!
//! Final stage of the build. Reads the manifest written by the `fetch` stage,
//! assembles page models and writes the static site.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): the `/` record and a grid of every other
//!   article. Not written when the domain has no home record.
//! - **Articles** (`/{slug}/index.html`): one page per non-home record.
//! - **Sitemap** (`/sitemap/index.html` and `/sitemap.xml`): every URL of the
//!   domain, home first.
//! - **Not found** (`/404.html`): generic fallback for the web server.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── sitemap.xml
//! ├── sitemap/
//! │   └── index.html
//! ├── natural-cleaning-solutions/
//! │   └── index.html
//! └── guides/
//!     └── soap/
//!         └── index.html
//! ```
//!
//! ## Head
//!
//! Every content page carries its title (`MetaTitle`, else `Title`), meta
//! description, canonical link and the record's JSON-LD schema. The
//! stylesheet is `static/style.css` followed by the domain CSS from the CMS.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Record text is escaped by maud; only the sanitized Markdown output, the
//! stylesheet and the JSON-LD (with `</` escaped) are inserted raw.

use crate::pages::{Catalog, HomePage, PageAssembler, PageModel, SitemapEntry};
use crate::photos::{ImageAttribution, ImageSource};
use crate::site::{Manifest, SiteChrome};
use crate::style::StyleMap;
use chrono::Datelike;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Number of paragraph characters shown on a related-article card.
const EXCERPT_CHARS: usize = 100;

/// What a `generate` run wrote.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    /// Home page title, if `index.html` was written.
    pub home: Option<String>,
    /// `(title, output path)` of every article page written.
    pub articles: Vec<(String, String)>,
    /// Slugs that could not be written.
    pub skipped: Vec<String>,
    pub sitemap_urls: usize,
}

/// Read a manifest and write the site into `output_dir`.
pub async fn generate<S: ImageSource>(
    manifest_path: &Path,
    output_dir: &Path,
    images: S,
) -> Result<GenerateSummary, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    render_site(&manifest, output_dir, images).await
}

/// Write every page of `manifest` into `output_dir`.
pub async fn render_site<S: ImageSource>(
    manifest: &Manifest,
    output_dir: &Path,
    images: S,
) -> Result<GenerateSummary, GenerateError> {
    let catalog = &manifest.catalog;
    let assembler = PageAssembler::new(images, &catalog.domain);
    let layout = Layout {
        chrome: &manifest.chrome,
        css: format!("{}\n{}", CSS_STATIC, manifest.chrome.css),
        year: manifest.fetched_at.year(),
    };
    let mut summary = GenerateSummary::default();

    fs::create_dir_all(output_dir)?;

    let mut assembled: HashMap<u64, PageModel> = HashMap::new();
    if let Some(home) = assembler.home(catalog).await {
        fs::write(
            output_dir.join("index.html"),
            render_home(&home, &layout).into_string(),
        )?;
        summary.home = Some(home.home.document_title().to_string());
        assembled.extend(home.related.into_iter().map(|page| (page.id, page)));
    }

    for slug in catalog.article_paths() {
        let Some(dir) = article_dir(output_dir, &slug) else {
            tracing::warn!(slug = %slug, "slug is not a safe output path, skipping");
            summary.skipped.push(slug);
            continue;
        };
        let Some(page) = assembler.article_from(catalog, &slug, &mut assembled).await else {
            summary.skipped.push(slug);
            continue;
        };
        fs::create_dir_all(&dir)?;
        fs::write(
            dir.join("index.html"),
            render_article(&page, &layout).into_string(),
        )?;
        tracing::debug!(slug = %slug, "wrote article page");
        summary
            .articles
            .push((page.document_title().to_string(), format!("{slug}/index.html")));
    }

    let entries = catalog.sitemap();
    let sitemap_dir = output_dir.join("sitemap");
    fs::create_dir_all(&sitemap_dir)?;
    fs::write(
        sitemap_dir.join("index.html"),
        render_sitemap_page(&entries, &layout).into_string(),
    )?;
    fs::write(
        output_dir.join("sitemap.xml"),
        render_sitemap_xml(&entries, manifest).into_string(),
    )?;
    summary.sitemap_urls = entries.len();

    fs::write(
        output_dir.join("404.html"),
        render_not_found(&layout).into_string(),
    )?;

    tracing::info!(
        articles = summary.articles.len(),
        skipped = summary.skipped.len(),
        "site generated at {}",
        output_dir.display()
    );
    Ok(summary)
}

/// Output directory for an article slug, or `None` if the slug could escape
/// `output_dir` or name it directly. A trailing `/` is ignored.
fn article_dir(output_dir: &Path, slug: &str) -> Option<PathBuf> {
    let slug = slug.trim_end_matches('/');
    if slug.is_empty() || slug.contains('\\') {
        return None;
    }
    let mut dir = output_dir.to_path_buf();
    for segment in slug.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        dir.push(segment);
    }
    Some(dir)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Shared by every page of one build.
struct Layout<'a> {
    chrome: &'a SiteChrome,
    css: String,
    year: i32,
}

/// Head fields of a page.
struct PageHead<'a> {
    title: &'a str,
    description: Option<&'a str>,
    canonical: Option<&'a str>,
    schema: Option<String>,
}

impl<'a> PageHead<'a> {
    fn plain(title: &'a str) -> Self {
        Self {
            title,
            description: None,
            canonical: None,
            schema: None,
        }
    }

    fn for_page(page: &'a PageModel) -> Self {
        let description = page.attributes.meta_description.as_str();
        Self {
            title: page.document_title(),
            description: (!description.is_empty()).then_some(description),
            canonical: Some(page.canonical_url.as_str()),
            schema: page.attributes.schema.as_ref().and_then(json_ld),
        }
    }
}

/// Serialize a schema for a `<script type="application/ld+json">` body.
///
/// A string schema is used when it holds JSON. `</` is escaped so the
/// document cannot close the script element.
fn json_ld(schema: &Value) -> Option<String> {
    let text = match schema {
        Value::Null => return None,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => serde_json::to_string(&parsed).ok()?,
            Err(e) => {
                tracing::debug!(error = %e, "schema string is not JSON, skipping");
                return None;
            }
        },
        other => serde_json::to_string(other).ok()?,
    };
    Some(text.replace("</", "<\\/"))
}

/// Renders the base HTML document structure
fn base_document(head: &PageHead, layout: &Layout, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (head.title) }
                @if let Some(description) = head.description {
                    meta name="description" content=(description);
                }
                @if let Some(canonical) = head.canonical {
                    link rel="canonical" href=(canonical);
                }
                @if let Some(schema) = &head.schema {
                    script type="application/ld+json" { (PreEscaped(schema)) }
                }
                style { (PreEscaped(&layout.css)) }
            }
            body {
                (site_header(layout.chrome))
                main.page {
                    (content)
                }
                (site_footer(layout.chrome, layout.year))
            }
        }
    }
}

/// Renders the site header with name and navigation
fn site_header(chrome: &SiteChrome) -> Markup {
    html! {
        header.app-header {
            h1 { a href="/" { (chrome.name) } }
            nav.site-nav {
                @for item in &chrome.menu {
                    a.nav-link href=(item.url) { (item.label) }
                }
            }
        }
    }
}

fn site_footer(chrome: &SiteChrome, year: i32) -> Markup {
    html! {
        footer.app-footer {
            p { a href="/sitemap" { "sitemap" } }
            p { "Copyright © " (year) " " (chrome.name) ". All rights reserved." }
        }
    }
}

/// Image with the photographer credit.
fn image_figure(image: &ImageAttribution, alt: &str) -> Markup {
    html! {
        figure.image-container {
            img.artimg src=(image.image_url) alt=(alt) loading="lazy";
            figcaption.attribution {
                "Photo by "
                a href=(image.photographer_profile_url) rel="noopener" target="_blank" {
                    (image.photographer_name)
                }
            }
        }
    }
}

fn inline_style(styles: &StyleMap) -> Option<String> {
    let css = styles.to_inline_css();
    (!css.is_empty()).then_some(css)
}

/// Lead paragraph and Markdown body.
fn page_body(page: &PageModel) -> Markup {
    html! {
        div.content style=[inline_style(&page.styles.body)] {
            p style=[inline_style(&page.styles.paragraph)] { (page.attributes.paragraph) }
            @if let Some(body) = &page.processed_markdown {
                div.markdown { (PreEscaped(body)) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page with the related-article grid
fn render_home(page: &HomePage, layout: &Layout) -> Markup {
    let home = &page.home;
    let content = html! {
        div.container style=[inline_style(&home.styles.container)] {
            header.header style=[inline_style(&home.styles.header)] {
                h2 { (home.heading()) }
                h3 { (home.attributes.title) }
                @if let Some(image) = &home.image {
                    (image_figure(image, &home.attributes.title))
                }
            }
            (page_body(home))
            @if !page.related.is_empty() {
                section.article-selection {
                    div.article-grid {
                        @for article in &page.related {
                            a.article-card href=(article.href()) {
                                @if let Some(image) = &article.image {
                                    (image_figure(image, &article.attributes.title))
                                }
                                h3 { (article.attributes.title) }
                                p { (article.excerpt(EXCERPT_CHARS)) "..." }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(&PageHead::for_page(home), layout, content)
}

/// Renders an article page
fn render_article(page: &PageModel, layout: &Layout) -> Markup {
    let heading = page.heading();
    let content = html! {
        div.container style=[inline_style(&page.styles.container)] {
            header.header style=[inline_style(&page.styles.header)] {
                h1 { (heading) }
                @if page.attributes.title != heading {
                    h2 { (page.attributes.title) }
                }
                @if let Some(image) = &page.image {
                    (image_figure(image, &page.attributes.title))
                }
            }
            (page_body(page))
        }
    };

    base_document(&PageHead::for_page(page), layout, content)
}

/// Renders the human-readable sitemap
fn render_sitemap_page(entries: &[SitemapEntry], layout: &Layout) -> Markup {
    let content = html! {
        div.container {
            h1 { "Sitemap" }
            ul.sitemap {
                @for entry in entries {
                    li { a href=(entry.url) { (entry.url) } }
                }
            }
        }
    };

    base_document(&PageHead::plain("Sitemap"), layout, content)
}

/// Renders `sitemap.xml` for crawlers
fn render_sitemap_xml(entries: &[SitemapEntry], manifest: &Manifest) -> Markup {
    let lastmod = manifest.fetched_at.format("%Y-%m-%d").to_string();
    html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        "\n"
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for entry in entries {
                url {
                    loc { (entry.url) }
                    lastmod { (lastmod) }
                    @if entry.is_home {
                        priority { "1.0" }
                    }
                }
            }
        }
    }
}

fn render_not_found(layout: &Layout) -> Markup {
    let content = html! {
        div.container {
            h1 { "Page not found" }
            p { "The page you are looking for does not exist. " a href="/" { "Back to the home page" } "." }
        }
    };

    base_document(&PageHead::plain("Page not found"), layout, content)
}

/// Catalog summary for the `check` command: every record and where it goes.
pub fn planned_routes(catalog: &Catalog) -> Vec<(String, Option<String>)> {
    let mut routes = Vec::new();
    if let Some(home) = catalog.home_record() {
        routes.push((home.attributes.title.clone(), Some("index.html".to_string())));
    }
    let paths = catalog.article_paths();
    for slug in paths {
        let title = catalog
            .find_article(&slug)
            .map(|r| r.attributes.title.clone())
            .unwrap_or_default();
        let target = article_dir(Path::new(""), &slug).map(|_| format!("{slug}/index.html"));
        routes.push((title, target));
    }
    routes
}

// ============================================================================
// Tests
// ============================================================================
