//! Site configuration module.
//!
//! Handles loading and validating `config.toml` from the source root. Keys
//! the file leaves out keep their stock defaults, and command-line flags
//! override both.
//!
//! ## Config File Location
//!
//! ```text
//! md-input/
//! ├── config.toml              # Optional, overrides stock defaults
//! ├── a.md
//! └── sub/
//!     └── b.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Documentation"
//! subtitle = "Explore all available documents and guides"
//! extension = ".md"         # Documents to pick up
//! theme = "sunset"          # Built-in theme or <theme_dir>/<name>.css
//! # theme_dir = "themes"    # Searched before the built-in themes
//! code_stylesheet = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css"
//! code_script = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js"
//!
//! [markdown]
//! raw_html = true
//! typographer = true
//! footnotes = true
//! heading_attributes = true
//! attributes = true
//! linkify = true
//! tables = true
//! strikethrough = true
//! tasklists = true
//! toc_marker = "[[toc]]"
//! toc_levels = [1, 2, 3]
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::render::RenderOptions;
use crate::scan::normalize_extension;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name looked up in the source root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Heading of the home page.
    pub title: String,
    /// Line shown under the home page heading.
    pub subtitle: String,
    /// Extension of the documents to pick up, with or without the dot.
    pub extension: String,
    /// Stylesheet installed as `style/styles.css`.
    pub theme: String,
    /// Directory searched for `<theme>.css` before the built-in themes.
    /// Relative paths are taken from the source root.
    pub theme_dir: Option<PathBuf>,
    /// Code highlighting stylesheet linked from every page. Empty to omit.
    pub code_stylesheet: String,
    /// highlight.js build loaded by every page; the page script runs it over
    /// fenced code. Empty to leave code unhighlighted.
    pub code_script: String,
    /// Markdown rendering settings.
    pub markdown: RenderOptions,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_string(),
            subtitle: "Explore all available documents and guides".to_string(),
            extension: ".md".to_string(),
            theme: crate::theme::DEFAULT_THEME.to_string(),
            theme_dir: None,
            code_stylesheet:
                "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css"
                    .to_string(),
            code_script: "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js"
                .to_string(),
            markdown: RenderOptions::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if normalize_extension(self.extension.trim()).is_empty() {
            return Err(ConfigError::Validation(
                "extension must not be empty".into(),
            ));
        }
        if self.theme.trim().is_empty() {
            return Err(ConfigError::Validation("theme must not be empty".into()));
        }
        if self.markdown.toc_marker.trim().is_empty() {
            return Err(ConfigError::Validation(
                "markdown.toc_marker must not be empty".into(),
            ));
        }
        if let Some(level) = self
            .markdown
            .toc_levels
            .iter()
            .find(|l| !(1..=6).contains(*l))
        {
            return Err(ConfigError::Validation(format!(
                "markdown.toc_levels must be 1-6, got {level}"
            )));
        }
        Ok(())
    }

    /// Theme directory with relative paths taken from `source_root`.
    pub fn theme_dir_in(&self, source_root: &Path) -> Option<PathBuf> {
        self.theme_dir.as_ref().map(|dir| source_root.join(dir))
    }
}

/// Load config from `config.toml` in the source root.
///
/// Keys missing from the file keep their defaults. A missing file or a
/// missing source root yields the stock defaults; the scanner reports an
/// unreadable root on its own.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mdsite Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the source root (md-input/config.toml).
# Command-line flags override the values set here.
# Unknown keys will cause an error.

# Heading and subheading of the home page.
title = "Documentation"
subtitle = "Explore all available documents and guides"

# Extension of the documents to pick up. Matching is case-sensitive.
extension = ".md"

# Stylesheet installed as style/styles.css.
# Built-in themes: sunset, paper.
theme = "sunset"

# Directory searched for <theme>.css before the built-in themes,
# relative to the source root.
# theme_dir = "themes"

# Code highlighting, done in the browser by highlight.js.
# The stylesheet styles highlighted code; the script does the highlighting.
# "" omits either one.
code_stylesheet = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css"
code_script = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js"

# ---------------------------------------------------------------------------
# Markdown rendering
# ---------------------------------------------------------------------------
[markdown]
# Pass HTML in documents through unescaped.
raw_html = true

# Smart quotes, dashes and ellipses.
typographer = true

footnotes = true

# {#id .class} annotations after headings.
heading_attributes = true

# {#id .class key=value} annotations. Right after a link, emphasis or code
# span they apply to that element; at the end of a paragraph, to the paragraph.
attributes = true

# Turn bare URLs and email addresses into links.
linkify = true

tables = true
strikethrough = true
tasklists = true

# A paragraph holding only this text becomes the document's table of contents.
toc_marker = "[[toc]]"

# Heading levels listed in the table of contents (1-6).
toc_levels = [1, 2, 3]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Documentation");
        assert_eq!(config.extension, ".md");
        assert_eq!(config.theme, "sunset");
        assert!(config.theme_dir.is_none());
        assert_eq!(config.markdown.toc_marker, "[[toc]]");
        assert_eq!(config.markdown.toc_levels, vec![1, 2, 3]);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
theme = "paper"

[markdown]
raw_html = false
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.theme, "paper");
        assert!(!config.markdown.raw_html);
        // Defaults preserved
        assert_eq!(config.title, "Documentation");
        assert!(config.markdown.footnotes);
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_returns_default_for_missing_root() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("missing")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
title = "Handbook"
extension = "txt"
theme_dir = "themes"

[markdown]
toc_levels = [2, 3]
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Handbook");
        assert_eq!(config.extension, "txt");
        assert_eq!(config.theme_dir, Some(PathBuf::from("themes")));
        assert_eq!(config.markdown.toc_levels, vec![2, 3]);
        // Unspecified values should be defaults
        assert_eq!(config.subtitle, SiteConfig::default().subtitle);
        assert!(config.markdown.tables);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn theme_dir_is_relative_to_source_root() {
        let config = SiteConfig {
            theme_dir: Some(PathBuf::from("themes")),
            ..SiteConfig::default()
        };
        assert_eq!(
            config.theme_dir_in(Path::new("/src")),
            Some(PathBuf::from("/src/themes"))
        );
        assert_eq!(SiteConfig::default().theme_dir_in(Path::new("/src")), None);
    }

    #[test]
    fn nested_table_keeps_unlisted_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[markdown]\ntables = false").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert!(!config.markdown.tables);
        assert!(config.markdown.footnotes);
        assert_eq!(config.markdown.toc_marker, "[[toc]]");
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("titel = \"typo\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[markdown]\nlinkfy = true");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "colour = \"red\"").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    fn validation_message(config: SiteConfig) -> String {
        match config.validate() {
            Err(ConfigError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_empty_extension() {
        for ext in ["", ".", "  "] {
            let config = SiteConfig {
                extension: ext.to_string(),
                ..SiteConfig::default()
            };
            assert!(validation_message(config).contains("extension"));
        }
    }

    #[test]
    fn validate_rejects_empty_theme() {
        let config = SiteConfig {
            theme: " ".to_string(),
            ..SiteConfig::default()
        };
        assert!(validation_message(config).contains("theme"));
    }

    #[test]
    fn validate_rejects_toc_level_out_of_range() {
        for level in [0, 7] {
            let mut config = SiteConfig::default();
            config.markdown.toc_levels = vec![1, level];
            assert!(validation_message(config).contains(&level.to_string()));
        }
    }

    #[test]
    fn validate_toc_level_boundaries_ok() {
        let mut config = SiteConfig::default();
        config.markdown.toc_levels = vec![1, 6];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_toc_marker() {
        let mut config = SiteConfig::default();
        config.markdown.toc_marker = String::new();
        assert!(validation_message(config).contains("toc_marker"));
    }

    #[test]
    fn validation_runs_on_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "extension = \"\"").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
