//! Theme name to stylesheet resolution.
//!
//! A theme is a single stylesheet installed as `style/styles.css`. Names are
//! looked up in the theme directory first (`<theme_dir>/<name>.css`), then
//! among the themes compiled into the binary. Anything else is
//! [`ThemeError::NotFound`], raised before a single page is written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "sunset";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("sunset", include_str!("../static/themes/sunset.css")),
    ("paper", include_str!("../static/themes/paper.css")),
];

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("theme '{name}' not found (built-in themes: {})", builtin_names().join(", "))]
    NotFound { name: String },
    #[error("reading theme {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Names of the themes compiled into the binary.
pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN_THEMES.iter().map(|(name, _)| *name).collect()
}

/// Built-in themes as `(name, stylesheet)` pairs.
pub fn builtin_themes() -> &'static [(&'static str, &'static str)] {
    BUILTIN_THEMES
}

/// Stylesheet contents for `name`.
pub fn resolve_theme(name: &str, theme_dir: Option<&Path>) -> Result<String, ThemeError> {
    let not_found = || ThemeError::NotFound {
        name: name.to_string(),
    };
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(not_found());
    }

    if let Some(dir) = theme_dir {
        let path = dir.join(format!("{name}.css"));
        match fs::read_to_string(&path) {
            Ok(css) => return Ok(css),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(ThemeError::Read { path, source }),
        }
    }

    BUILTIN_THEMES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, css)| css.to_string())
        .ok_or_else(not_found)
}
