//! Site configuration module.
//!
//! Handles loading, overriding and validating `config.toml`. Every component
//! receives the section it needs at construction time; nothing reads global
//! state after startup.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! domain = "example.com"        # Tenant key, also the public host name
//! name = "Default Site Name"    # Used when the home record has no SiteName
//!
//! [[site.menu]]                 # Fallback navigation (when the menu API is empty)
//! label = "Home"
//! url = "/"
//!
//! [content]
//! api_url = "https://cms.example.com/api/articles"
//! api_token = ""                # Bearer token
//! server_side_filter = false    # Ask the API to filter by domain too
//! styling_url = ""              # Optional domain-wide CSS collection
//! menu_url = ""                 # Optional navigation menu collection
//!
//! [photos]
//! enabled = true
//! api_url = "https://api.unsplash.com"
//! access_key = ""
//! ```
//!
//! ## Environment Overrides
//!
//! Secrets and per-deployment values can be supplied through the environment
//! instead of the file. They are applied after the file is parsed and before
//! validation:
//!
//! | Variable | Key |
//! |---|---|
//! | `HEADLESS_PRESS_DOMAIN` | `site.domain` |
//! | `HEADLESS_PRESS_API_URL` | `content.api_url` |
//! | `HEADLESS_PRESS_API_TOKEN` | `content.api_token` |
//! | `HEADLESS_PRESS_PHOTOS_ACCESS_KEY` | `photos.access_key` |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

pub const ENV_DOMAIN: &str = "HEADLESS_PRESS_DOMAIN";
pub const ENV_API_URL: &str = "HEADLESS_PRESS_API_URL";
pub const ENV_API_TOKEN: &str = "HEADLESS_PRESS_API_TOKEN";
pub const ENV_PHOTOS_ACCESS_KEY: &str = "HEADLESS_PRESS_PHOTOS_ACCESS_KEY";

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Tenant selection and site-level fallbacks.
    pub site: SiteSection,
    /// Content API endpoints and credentials.
    pub content: ContentConfig,
    /// Stock-photo search settings.
    pub photos: PhotosConfig,
}

/// Tenant selection and fallbacks for the site chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Domain key partitioning the shared content collection. Also used as the
    /// public host name in sitemap URLs.
    pub domain: String,
    /// Site name shown in the header when the home record has none.
    pub name: String,
    /// Navigation used when the menu API is not configured or returns nothing.
    pub menu: Vec<MenuEntry>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            domain: String::new(),
            name: "Default Site Name".to_string(),
            menu: vec![MenuEntry {
                label: "Home".to_string(),
                url: "/".to_string(),
            }],
        }
    }
}

/// One navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuEntry {
    pub label: String,
    pub url: String,
}

/// Content API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Collection endpoint returning every article record.
    pub api_url: String,
    /// Bearer token sent in the `Authorization` header.
    pub api_token: String,
    /// Also pass the domain as a query filter. Records are filtered
    /// client-side either way.
    pub server_side_filter: bool,
    /// Domain-wide style collection. Empty disables the lookup.
    pub styling_url: String,
    /// Navigation menu collection. Empty disables the lookup.
    pub menu_url: String,
}

/// Stock-photo search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    pub enabled: bool,
    /// Base URL of the search API; `/search/photos` is appended.
    pub api_url: String,
    pub access_key: String,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.unsplash.com".to_string(),
            access_key: String::new(),
        }
    }
}

impl PhotosConfig {
    /// Photo search runs only when enabled and a key is present.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.access_key.trim().is_empty()
    }
}

impl SiteConfig {
    /// Validate that the values needed for a build are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.domain must not be empty".into(),
            ));
        }
        if self.site.domain.contains('/') {
            return Err(ConfigError::Validation(
                "site.domain must be a bare host name without scheme or path".into(),
            ));
        }
        if self.content.api_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content.api_url must not be empty".into(),
            ));
        }
        if self.photos.enabled && self.photos.api_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "photos.api_url must not be empty when photos are enabled".into(),
            ));
        }
        Ok(())
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production; tests pass a closure over a fixed map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup(ENV_DOMAIN) {
            self.site.domain = domain;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.content.api_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.content.api_token = token;
        }
        if let Some(key) = lookup(ENV_PHOTOS_ACCESS_KEY) {
            self.photos.access_key = key;
        }
    }
}

/// Parse a config file as-is, without environment overrides or validation.
///
/// Returns the defaults when the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load the config file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = load_raw_config(path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    if config.photos.enabled && !config.photos.is_active() {
        tracing::warn!("photos.access_key is empty, image enrichment disabled");
    }
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# headless-press configuration
# ============================
# Values shown below are the defaults, except site.domain and
# content.api_url which have no default and must be set (here or through
# the environment).
#
# Environment overrides:
#   HEADLESS_PRESS_DOMAIN             -> site.domain
#   HEADLESS_PRESS_API_URL            -> content.api_url
#   HEADLESS_PRESS_API_TOKEN          -> content.api_token
#   HEADLESS_PRESS_PHOTOS_ACCESS_KEY  -> photos.access_key
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Domain key of the records to publish. Also the public host name.
domain = "example.com"

# Header name when the home record carries no SiteName.
name = "Default Site Name"

# Navigation used when the menu API is not configured or returns nothing.
[[site.menu]]
label = "Home"
url = "/"

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[content]
# Collection endpoint returning all article records.
api_url = "https://cms.example.com/api/articles"

# Bearer token. Prefer HEADLESS_PRESS_API_TOKEN over committing it here.
api_token = ""

# Also ask the API to filter by domain. Records are filtered locally anyway.
server_side_filter = false

# Domain-wide style collection (empty = skip).
styling_url = ""

# Navigation menu collection (empty = skip).
menu_url = ""

# ---------------------------------------------------------------------------
# Stock photos
# ---------------------------------------------------------------------------
[photos]
enabled = true
api_url = "https://api.unsplash.com"

# Prefer HEADLESS_PRESS_PHOTOS_ACCESS_KEY. Empty disables image lookups.
access_key = ""
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn valid_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.domain = "example.com".to_string();
        config.content.api_url = "https://cms.example.com/api/articles".to_string();
        config
    }

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.name, "Default Site Name");
        assert_eq!(config.site.menu.len(), 1);
        assert_eq!(config.site.menu[0].url, "/");
        assert!(config.photos.enabled);
        assert_eq!(config.photos.api_url, "https://api.unsplash.com");
        assert!(!config.content.server_side_filter);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[site]
domain = "shop.example"

[content]
api_url = "https://cms/api/articles"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.domain, "shop.example");
        // Defaults preserved
        assert_eq!(config.site.name, "Default Site Name");
        assert_eq!(config.photos.api_url, "https://api.unsplash.com");
    }

    #[test]
    fn parse_menu_entries() {
        let toml = r#"
[[site.menu]]
label = "Home"
url = "/"

[[site.menu]]
label = "Skincare"
url = "/organic-skincare"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.menu.len(), 2);
        assert_eq!(config.site.menu[1].label, "Skincare");
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r#"
[content]
api_ur = "x"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[photoz]\nenabled = true\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_requires_domain() {
        let mut config = valid_config();
        config.site.domain = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.domain"));
    }

    #[test]
    fn validate_rejects_domain_with_path() {
        let mut config = valid_config();
        config.site.domain = "https://example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_requires_api_url() {
        let mut config = valid_config();
        config.content.api_url.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("content.api_url"));
    }

    #[test]
    fn validate_photos_url_only_when_enabled() {
        let mut config = valid_config();
        config.photos.api_url.clear();
        assert!(config.validate().is_err());

        config.photos.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn photos_inactive_without_key() {
        let mut photos = PhotosConfig::default();
        assert!(!photos.is_active());
        photos.access_key = "abc".to_string();
        assert!(photos.is_active());
        photos.enabled = false;
        assert!(!photos.is_active());
    }

    // =========================================================================
    // Environment overrides
    // =========================================================================

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = valid_config();
        let env: HashMap<&str, &str> = [
            (ENV_DOMAIN, "other.example"),
            (ENV_API_TOKEN, "secret"),
            (ENV_PHOTOS_ACCESS_KEY, "key"),
        ]
        .into_iter()
        .collect();

        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.site.domain, "other.example");
        assert_eq!(config.content.api_token, "secret");
        assert_eq!(config.photos.access_key, "key");
        // Not overridden
        assert_eq!(
            config.content.api_url,
            "https://cms.example.com/api/articles"
        );
    }

    #[test]
    fn env_overrides_absent_keep_values() {
        let mut config = valid_config();
        config.apply_env_overrides(|_| None);
        assert_eq!(config.site.domain, "example.com");
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_raw_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_raw_config(&tmp.path().join("config.toml")).unwrap();
        assert!(config.site.domain.is_empty());
        assert_eq!(config.site.name, "Default Site Name");
    }

    #[test]
    fn load_raw_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[site]
domain = "news.example"
name = "News"
"#,
        )
        .unwrap();

        let config = load_raw_config(&path).unwrap();
        assert_eq!(config.site.domain, "news.example");
        assert_eq!(config.site.name, "News");
    }

    #[test]
    fn load_raw_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_raw_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_parses_and_validates() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.site.domain, "example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[site]"));
        assert!(content.contains("[[site.menu]]"));
        assert!(content.contains("[content]"));
        assert!(content.contains("[photos]"));
    }
}
