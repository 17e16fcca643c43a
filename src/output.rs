//! CLI output formatting for all pipeline stages.
//!
//! Output is **information-centric**: every record is shown by its positional
//! index and title, with the slug and other CMS fields as indented context
//! lines. The same record reads the same way in `fetch`, `check` and
//! `generate` output.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! example.com (3 records)
//! Home
//!     001 Welcome
//!         Slug: /
//! Articles
//!     001 Natural cleaning
//!         Slug: /natural-cleaning
//!         Keywords: soap, vinegar
//!     002 Organic skincare
//!         Slug: /organic-skincare
//!
//! Chrome
//!     Name: Soap Co
//!     Menu: Home → /, Cleaning → /natural-cleaning
//!     CSS: 412 bytes
//! ```
//!
//! ## Check
//!
//! The fetch inventory followed by the routes a build would write:
//!
//! ```text
//! Routes
//!     001 Welcome → index.html
//!     002 Natural cleaning → natural-cleaning/index.html
//!     003 Broken → (unsafe slug, skipped)
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 Natural cleaning → natural-cleaning/index.html
//! 002 Organic skincare → organic-skincare/index.html
//! Sitemap → sitemap/index.html, sitemap.xml (3 URLs)
//! Generated 1 home page, 2 articles
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::site::Manifest;
use crate::types::ContentRecord;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Record title, or the slug in parens when the title is blank.
///
/// ```text
/// 001 Natural cleaning
/// 001 (/natural-cleaning)
/// ```
fn record_line(index: usize, record: &ContentRecord) -> String {
    let title = record.attributes.title.trim();
    if title.is_empty() {
        format!("{} ({})", format_index(index), record.attributes.url_slug)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn record_lines(lines: &mut Vec<String>, index: usize, record: &ContentRecord) {
    let a = &record.attributes;
    lines.push(format!("{}{}", indent(1), record_line(index, record)));
    lines.push(format!("{}Slug: {}", indent(2), a.url_slug));
    if let Some(keywords) = record.img_keywords() {
        lines.push(format!("{}Keywords: {}", indent(2), keywords.trim()));
    }
    let description = truncate_desc(a.meta_description.trim(), 60);
    if !description.is_empty() {
        lines.push(format!("{}Description: {}", indent(2), description));
    }
}

// ============================================================================
// Stage 1: Fetch output
// ============================================================================

/// Format the content inventory of a fetched manifest.
pub fn format_fetch_output(manifest: &Manifest) -> Vec<String> {
    let catalog = &manifest.catalog;
    let mut lines = vec![format!(
        "{} ({} records)",
        catalog.domain,
        catalog.records.len()
    )];

    lines.push("Home".to_string());
    match catalog.home_record() {
        Some(home) => record_lines(&mut lines, 1, home),
        None => lines.push(format!("{}(none)", indent(1))),
    }

    let related: Vec<&ContentRecord> = catalog.related_records().collect();
    if !related.is_empty() {
        lines.push("Articles".to_string());
        for (i, record) in related.iter().enumerate() {
            record_lines(&mut lines, i + 1, record);
        }
    }

    let chrome = &manifest.chrome;
    lines.push(String::new());
    lines.push("Chrome".to_string());
    lines.push(format!("{}Name: {}", indent(1), chrome.name));
    let menu = chrome
        .menu
        .iter()
        .map(|m| format!("{} \u{2192} {}", m.label, m.url))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("{}Menu: {}", indent(1), menu));
    if chrome.css.is_empty() {
        lines.push(format!("{}CSS: none", indent(1)));
    } else {
        lines.push(format!("{}CSS: {} bytes", indent(1), chrome.css.len()));
    }

    lines
}

/// Print fetch output to stdout.
pub fn print_fetch_output(manifest: &Manifest) {
    for line in format_fetch_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the fetch inventory plus the routes a build would write.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = format_fetch_output(manifest);
    lines.push(String::new());
    lines.push("Routes".to_string());
    for (i, (title, target)) in crate::generate::planned_routes(&manifest.catalog)
        .into_iter()
        .enumerate()
    {
        let target = target.unwrap_or_else(|| "(unsafe slug, skipped)".to_string());
        lines.push(format!(
            "{}{} {} \u{2192} {}",
            indent(1),
            format_index(i + 1),
            title,
            target
        ));
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    match &summary.home {
        Some(_) => lines.push("Home \u{2192} index.html".to_string()),
        None => lines.push("Home \u{2192} (no home record, skipped)".to_string()),
    }

    for (i, (title, path)) in summary.articles.iter().enumerate() {
        lines.push(format!("{} {} \u{2192} {}", format_index(i + 1), title, path));
    }

    if !summary.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for slug in &summary.skipped {
            lines.push(format!("{}{}", indent(1), slug));
        }
    }

    lines.push(format!(
        "Sitemap \u{2192} sitemap/index.html, sitemap.xml ({} URLs)",
        summary.sitemap_urls
    ));
    lines.push(format!(
        "Generated {} home page, {} articles",
        usize::from(summary.home.is_some()),
        summary.articles.len()
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{}", line);
    }
}
