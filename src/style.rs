//! Style specs: CMS style fields to CSS.
//!
//! Editors fill the four region style fields (`containerStyles`,
//! `headerStyles`, `bodyStyles`, `paragraphStyles`) either with a JSON object
//! or with a string holding serialized JSON. [`StyleSpec`] captures both shapes
//! at the deserialization boundary, and [`parse_styles`] resolves either one
//! into a [`StyleMap`].
//!
//! Parsing is total: malformed input logs a diagnostic and yields an empty
//! map, it never fails a page build.
//!
//! Property names are kept exactly as authored (usually camelCase, the way
//! the editors write React inline styles). The conversion to real CSS
//! declarations happens only when rendering, in [`StyleMap::to_inline_css`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A style field as stored in the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum StyleSpec {
    /// A JSON object of property → value.
    Structured(Map<String, Value>),
    /// The same object, JSON-encoded into a string.
    Encoded(String),
    /// Any other JSON shape (numbers, arrays, booleans).
    Unrecognized(Value),
}

impl From<Value> for StyleSpec {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => StyleSpec::Structured(map),
            Value::String(s) => StyleSpec::Encoded(s),
            other => StyleSpec::Unrecognized(other),
        }
    }
}

impl From<StyleSpec> for Value {
    fn from(spec: StyleSpec) -> Self {
        match spec {
            StyleSpec::Structured(map) => Value::Object(map),
            StyleSpec::Encoded(s) => Value::String(s),
            StyleSpec::Unrecognized(v) => v,
        }
    }
}

/// CSS property names mapped to their authored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(Map<String, Value>);

impl StyleMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.0.get(property)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Render as the body of a `style` attribute.
    ///
    /// camelCase names become kebab-case (`backgroundColor` →
    /// `background-color`, `WebkitTransition` → `-webkit-transition`).
    /// Non-zero numbers get a `px` unit unless the property is unitless.
    /// Values that are not strings or numbers are dropped.
    pub fn to_inline_css(&self) -> String {
        let mut declarations = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            let property = css_property_name(name);
            let rendered = match value {
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                Value::Number(n) => {
                    let is_zero = n.as_f64().is_some_and(|f| f == 0.0);
                    if is_zero || UNITLESS_PROPERTIES.contains(&property.as_str()) {
                        n.to_string()
                    } else {
                        format!("{n}px")
                    }
                }
                other => {
                    tracing::debug!(property = %name, value = %other, "skipping style value");
                    continue;
                }
            };
            declarations.push(format!("{property}: {rendered}"));
        }
        declarations.join("; ")
    }
}

impl From<Map<String, Value>> for StyleMap {
    fn from(map: Map<String, Value>) -> Self {
        StyleMap(map)
    }
}

/// Properties that take plain numbers (React's unitless list, abridged).
const UNITLESS_PROPERTIES: &[&str] = &[
    "animation-iteration-count",
    "column-count",
    "fill-opacity",
    "flex",
    "flex-grow",
    "flex-shrink",
    "font-weight",
    "grid-column",
    "grid-row",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "stroke-opacity",
    "tab-size",
    "widows",
    "z-index",
    "zoom",
];

/// Resolve a style field into a property map.
///
/// Absent fields, undecodable strings and non-object shapes all degrade to an
/// empty map with a logged diagnostic.
pub fn parse_styles(spec: Option<&StyleSpec>) -> StyleMap {
    match spec {
        None => {
            tracing::debug!("no style spec, using empty styles");
            StyleMap::default()
        }
        Some(StyleSpec::Structured(map)) => StyleMap(map.clone()),
        Some(StyleSpec::Encoded(raw)) => {
            if raw.trim().is_empty() {
                return StyleMap::default();
            }
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => StyleMap(map),
                Ok(other) => {
                    tracing::warn!(value = %other, "style string is not a JSON object");
                    StyleMap::default()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error parsing styles string");
                    StyleMap::default()
                }
            }
        }
        Some(StyleSpec::Unrecognized(value)) => {
            tracing::warn!(value = %value, "invalid styles format");
            StyleMap::default()
        }
    }
}

/// Convert a style property name to its CSS spelling.
fn css_property_name(name: &str) -> String {
    if name.starts_with("--") || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    if name.starts_with("ms") && name[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    // A leading capital (`WebkitTransition`) yields the vendor dash naturally.
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Render the domain-wide style document into a stylesheet.
///
/// The document is an object of `selector → { property: value }`. Rule
/// bodies that are not objects are skipped. Property names are used as
/// written. Any `<` is escaped so the result cannot close a `<style>` element.
pub fn domain_css(document: &Value) -> String {
    let Some(selectors) = document.as_object() else {
        if !document.is_null() {
            tracing::warn!("domain style document is not an object");
        }
        return String::new();
    };

    let mut rules = Vec::with_capacity(selectors.len());
    for (selector, body) in selectors {
        let Some(declarations) = body.as_object() else {
            tracing::debug!(selector = %selector, "skipping non-object style rule");
            continue;
        };
        let body = declarations
            .iter()
            .filter_map(|(prop, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some(format!("{prop}: {value};"))
            })
            .collect::<Vec<_>>()
            .join(" ");
        rules.push(format!("{selector} {{ {body} }}"));
    }
    rules.join(" ").replace('<', "\\3c ")
}
