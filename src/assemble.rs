//! Page assembly.
//!
//! Wraps a rendered fragment in the full page document and writes it to its
//! mirrored location under `html/`:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ <head> title, stylesheets, favicon       │
//! ├──────────────────────────────────────────┤
//! │ dark mode toggle                         │
//! │ Home link                                │
//! │ Pages panel (every page, grouped by dir) │
//! │ rendered fragment, inserted verbatim     │
//! │ page script                              │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Every href to a shared asset comes from the page's [`LinkContext`], and the
//! context is checked against the file actually being written before anything
//! touches the disk.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Titles and navigation labels are escaped; the fragment is not.

use crate::config::SiteConfig;
use crate::navigation::{DirectoryGroup, NavEntry};
use crate::paths::{FAVICON, LinkContext, LinkError, SCRIPT, STYLESHEET};
use crate::types::OutputPage;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("creating directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("writing {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Shared asset hrefs as seen from one document.
#[derive(Debug, Clone)]
pub(crate) struct AssetLinks {
    pub stylesheet: String,
    pub favicon: String,
    pub script: String,
}

impl AssetLinks {
    pub(crate) fn for_page(link: &LinkContext<'_>) -> Self {
        Self {
            stylesheet: link.asset_href(STYLESHEET),
            favicon: link.asset_href(FAVICON),
            script: link.asset_href(SCRIPT),
        }
    }
}

/// Render `page` and write it below `output_root`. Returns the markup written.
pub fn assemble(
    output_root: &Path,
    page: &OutputPage,
    fragment: &str,
    navigation: &[DirectoryGroup],
    link: LinkContext<'_>,
    site: &SiteConfig,
) -> Result<String, AssembleError> {
    let file = page.path.output_file(output_root);
    link.verify(output_root, &file)?;

    let markup = render_page(page, fragment, navigation, &link, site).into_string();

    if let Some(dir) = file.parent() {
        fs::create_dir_all(dir).map_err(|source| AssembleError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(&file, &markup).map_err(|source| AssembleError::Write {
        path: file.clone(),
        source,
    })?;
    Ok(markup)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// The code highlighter is loaded ahead of the page script, which runs it
/// over every fenced block once the document has loaded.
pub(crate) fn base_document(
    title: &str,
    site: &SiteConfig,
    assets: &AssetLinks,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if !site.code_stylesheet.is_empty() {
                    link rel="stylesheet" href=(site.code_stylesheet);
                }
                link rel="stylesheet" href=(assets.stylesheet);
                link rel="icon" type="image/x-icon" href=(assets.favicon);
            }
            body {
                (content)
                @if !site.code_script.is_empty() {
                    script src=(site.code_script) {}
                }
                script src=(assets.script) {}
            }
        }
    }
}

/// Renders the collapsible "Pages" panel listing every page.
pub fn render_pages_panel(navigation: &[DirectoryGroup]) -> Markup {
    html! {
        div.table-of-pages-header {
            h3.toggle-pages-btn onclick="toggleTableOfPages()" { "Pages" }
        }
        div.table-of-pages.hidden {
            ul {
                @for group in navigation {
                    @if group.is_root() {
                        @for entry in &group.entries {
                            (render_panel_entry(entry))
                        }
                    } @else {
                        li {
                            strong { (group.label) }
                            ul {
                                @for entry in &group.entries {
                                    (render_panel_entry(entry))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_panel_entry(entry: &NavEntry) -> Markup {
    let class = entry.active.then_some("active");
    html! {
        li class=[class] {
            a href=(entry.href) class=[class] { (entry.display_name) }
        }
    }
}

/// Renders a generated page.
pub fn render_page(
    page: &OutputPage,
    fragment: &str,
    navigation: &[DirectoryGroup],
    link: &LinkContext<'_>,
    site: &SiteConfig,
) -> Markup {
    let content = html! {
        div.body-main-container {
            button.toggle-btn onclick="handleDarkModeToggle()" {
                span.sun { "☀️" }
                span.moon { "🌙" }
            }
            a.home-link href=(link.home_href()) { "Home" }
            (render_pages_panel(navigation))
            main.page-content {
                (PreEscaped(fragment))
            }
        }
    };

    base_document(&page.display_name, site, &AssetLinks::for_page(link), content)
}

// ============================================================================
// Tests
// ============================================================================
