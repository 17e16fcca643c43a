//! # headless-press
//!
//! A static site generator for one tenant of a shared headless-CMS article
//! collection. Articles live in the CMS as JSON records keyed by domain; this
//! crate pulls the records of one domain, renders their Markdown, looks up an
//! illustration for each page and writes a plain HTML site.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     content API  →  manifest.json   (records + site chrome)
//! 2. Generate  manifest     →  dist/           (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON. It pins the content of one build, so
//! a site can be regenerated, diffed or debugged without hitting the CMS
//! again. Image lookups happen in the generate stage.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | Content API client: article collection, domain styles, menu |
//! | [`site`] | Site chrome (name, menu, CSS) and the fetch-stage [`site::Manifest`] |
//! | [`pages`] | Page assembly: home, article by slug, sitemap |
//! | [`generate`] | Renders page models to HTML with Maud and writes the output tree |
//! | [`markdown`] | CMS Markdown → sanitized GFM HTML |
//! | [`style`] | Per-region style specs → CSS declarations |
//! | [`canonical`] | Canonical URL construction |
//! | [`photos`] | Stock-photo lookup with photographer attribution |
//! | [`types`] | Content records as the API returns them |
//! | [`config`] | `config.toml` loading, environment overrides, validation |
//! | [`output`] | CLI output formatting for each stage |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## One Fetch Per Build
//!
//! The content API returns every tenant's records in one collection. The
//! fetch stage reads it once and keeps the domain's subset; every page of the
//! build is assembled from that snapshot, so all pages agree on the content.
//!
//! ## Best-Effort Enrichment
//!
//! Images, styles and chrome are decoration. A failed photo lookup, an
//! unparsable style string or an unreachable menu endpoint degrades to
//! nothing plus a logged warning. Only filesystem errors while writing the
//! output abort a build.
//!
//! ## Sanitized Markdown
//!
//! CMS editors are trusted to write content, not markup. Markdown is rendered
//! with `pulldown-cmark` and the HTML passed through `ammonia` before it is
//! inserted into a page; everything else is escaped by Maud.

pub mod canonical;
pub mod config;
pub mod fetch;
pub mod generate;
pub mod logging;
pub mod markdown;
pub mod output;
pub mod pages;
pub mod photos;
pub mod site;
pub mod style;
pub mod types;
