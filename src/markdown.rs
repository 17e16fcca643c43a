//! Markdown body rendering.
//!
//! Article bodies come out of the CMS with two authoring quirks that break a
//! CommonMark parser, so they are repaired before parsing:
//!
//! - Newlines stored as the literal two characters `\n`.
//! - ATX headings written without the mandatory space (`##Title`).
//!
//! Rendering uses pulldown-cmark with the GitHub-flavored extensions
//! (tables, strikethrough, task lists, footnotes) plus bare-URL autolinking,
//! and the
//! resulting HTML goes through `ammonia` so raw HTML in a body cannot inject
//! scripts into the page.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use std::sync::LazyLock;

/// Bare `http(s)://` URLs in text. Trailing sentence punctuation is left out.
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]*[^\s<>".,;:!?')\]]"#).expect("bare URL pattern is valid")
});

/// Render a CMS Markdown body to sanitized HTML.
pub fn render_markdown(raw: &str) -> String {
    let source = normalize_headings(&unescape_newlines(raw));
    let parser = Parser::new_ext(&source, gfm_options());

    let mut body = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut body, autolink(parser).into_iter());

    sanitizer().clean(&body).to_string()
}

fn gfm_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Default ammonia policy plus the disabled checkboxes task lists render and
/// the `id` footnote references point at.
fn sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("div", &["id"]);
    builder
}

/// Turn literal `\n` escape sequences into real line breaks.
pub fn unescape_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Insert the missing space after heading markers at the start of a line.
///
/// `##Title` becomes `## Title`. Lines that already have the space, runs of
/// more than six `#`, and anything inside fenced code blocks are unchanged,
/// so well-formed input passes through untouched.
pub fn normalize_headings(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut fence: Option<Fence> = None;

    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let trimmed = line.trim_start();
        match fence {
            Some(open) => {
                if open.closed_by(trimmed) {
                    fence = None;
                }
                out.push_str(line);
                continue;
            }
            None => {
                if let Some(opened) = Fence::open(trimmed) {
                    fence = Some(opened);
                    out.push_str(line);
                    continue;
                }
            }
        }

        let hashes = line.bytes().take_while(|&b| b == b'#').count();
        let rest = &line[hashes..];
        let needs_space = (1..=6).contains(&hashes)
            && rest
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace());
        if needs_space {
            out.push_str(&line[..hashes]);
            out.push(' ');
            out.push_str(rest);
        } else {
            out.push_str(line);
        }
    }
    out
}

/// An open fenced code block: its marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// The fence a line opens, if any. A backtick fence's info string cannot
    /// contain a backtick, so ```` ```code``` ```` is an inline code span.
    fn open(line: &str) -> Option<Self> {
        let marker = line.chars().next().filter(|&c| c == '`' || c == '~')?;
        let len = line.chars().take_while(|&c| c == marker).count();
        if len < 3 {
            return None;
        }
        let info = &line[len..];
        if marker == '`' && info.contains('`') {
            return None;
        }
        Some(Self { marker, len })
    }

    /// A closing fence uses the same marker, at least as long, and nothing
    /// after it but whitespace.
    fn closed_by(self, line: &str) -> bool {
        let len = line.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && line[len..].trim().is_empty()
    }
}

/// Wrap bare URLs found in text in autolinks.
///
/// Text inside links, images and code blocks is left alone, including links
/// written as raw `<a>` tags.
fn autolink<'a>(parser: Parser<'a>) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut suppress = 0usize;

    for event in merge_text(parser) {
        match event {
            Event::Html(ref raw) | Event::InlineHtml(ref raw) => {
                let (opened, closed) = anchor_tags(raw);
                suppress = (suppress + opened).saturating_sub(closed);
                events.push(event);
            }
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => {
                suppress += 1;
                events.push(event);
            }
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                suppress = suppress.saturating_sub(1);
                events.push(event);
            }
            Event::Text(text) if suppress == 0 && BARE_URL.is_match(&text) => {
                let mut last = 0;
                for m in BARE_URL.find_iter(&text) {
                    if m.start() > last {
                        events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
                    }
                    let url = m.as_str().to_string();
                    events.push(Event::Start(Tag::Link {
                        link_type: LinkType::Autolink,
                        dest_url: CowStr::from(url.clone()),
                        title: CowStr::from(""),
                        id: CowStr::from(""),
                    }));
                    events.push(Event::Text(CowStr::from(url)));
                    events.push(Event::End(TagEnd::Link));
                    last = m.end();
                }
                if last < text.len() {
                    events.push(Event::Text(CowStr::from(text[last..].to_string())));
                }
            }
            other => events.push(other),
        }
    }
    events
}

/// Count the `<a ...>` and `</a>` tags in a raw HTML fragment.
fn anchor_tags(raw: &str) -> (usize, usize) {
    let lower = raw.to_ascii_lowercase();
    let opened = lower
        .match_indices("<a")
        .filter(|(i, _)| {
            lower[i + 2..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_whitespace())
        })
        .count();
    (opened, lower.matches("</a>").count())
}

/// Join adjacent text events; the parser splits text at characters such as
/// `_` that could have started emphasis, which would cut URLs apart.
fn merge_text<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut merged: Vec<Event<'a>> = Vec::new();
    for event in events {
        if let Event::Text(next) = &event {
            if let Some(Event::Text(prev)) = merged.last_mut() {
                let joined = format!("{prev}{next}");
                *prev = CowStr::from(joined);
                continue;
            }
        }
        merged.push(event);
    }
    merged
}
