//! Canonical URL construction.
//!
//! Editors fill `CanonicalURL` inconsistently: sometimes the bare domain,
//! sometimes the domain plus the article path, with or without a scheme or
//! trailing slash. [`canonical_url`] folds every variant into one `https://`
//! URL without repeating the slug.

/// Build the canonical `https://` URL for `slug` under `base`.
///
/// | base | slug | result |
/// |---|---|---|
/// | `example.com/` | `/foo/` | `https://example.com/foo` |
/// | `example.com/foo` | `foo` | `https://example.com/foo` |
/// | `example.com` | `` | `https://example.com` |
///
/// The "already ends with slug" check only matches whole path segments, so
/// `example.com/barfoo` with slug `foo` still gets `/foo` appended. With an
/// empty base the slug stands in as the host; with both empty the result is
/// `https://localhost`.
pub fn canonical_url(base: &str, slug: &str) -> String {
    let base = strip_scheme(base.trim()).trim_end_matches('/');
    let slug = slug.trim().trim_matches('/');

    match (base.is_empty(), slug.is_empty()) {
        (true, true) => "https://localhost".to_string(),
        (true, false) => format!("https://{slug}"),
        (false, true) => format!("https://{base}"),
        (false, false) if ends_with_segments(base, slug) => format!("https://{base}"),
        (false, false) => format!("https://{base}/{slug}"),
    }
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if url
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
        {
            return &url[scheme.len()..];
        }
    }
    url
}

/// True when `path` ends with `suffix` and the match starts on a `/` boundary.
fn ends_with_segments(path: &str, suffix: &str) -> bool {
    match path.strip_suffix(suffix) {
        Some(head) => head.is_empty() || head.ends_with('/'),
        None => false,
    }
}
