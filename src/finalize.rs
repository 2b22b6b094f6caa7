//! Shared assets and the home page.
//!
//! [`install_assets`] writes the files every page links to. It runs once, before
//! any page is assembled. [`finalize`] writes `index.html` after every page
//! exists:
//!
//! ```text
//! site-output/
//! ├── index.html            # finalize
//! ├── style/styles.css      # install_assets (the resolved theme)
//! ├── favicon/favicon.ico   # install_assets
//! ├── js/index.js           # install_assets
//! └── html/...              # assemble
//! ```

use crate::assemble::{AssetLinks, base_document};
use crate::config::SiteConfig;
use crate::navigation::{DirectoryGroup, NavEntry, NavOrigin, build_groups};
use crate::paths::{FAVICON, HOME_PAGE, SCRIPT, STYLESHEET};
use crate::types::OutputPage;
use chrono::NaiveDate;
use maud::{Markup, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub(crate) const SCRIPT_SOURCE: &str = include_str!("../static/index.js");
const FAVICON_BYTES: &[u8] = include_bytes!("../static/favicon.ico");

#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("creating directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("writing {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// What the home page shows besides the page list.
#[derive(Debug, Clone)]
pub struct HomePage<'a> {
    pub site: &'a SiteConfig,
    /// Date printed in the footer.
    pub generated_on: NaiveDate,
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), FinalizeError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| FinalizeError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| FinalizeError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the stylesheet, favicon and page script. Returns the files written.
pub fn install_assets(output_root: &Path, stylesheet: &str) -> Result<Vec<PathBuf>, FinalizeError> {
    let assets: [(&str, &[u8]); 3] = [
        (STYLESHEET, stylesheet.as_bytes()),
        (FAVICON, FAVICON_BYTES),
        (SCRIPT, SCRIPT_SOURCE.as_bytes()),
    ];
    let mut written = Vec::with_capacity(assets.len());
    for (relative, contents) in assets {
        let path = output_root.join(relative);
        write_file(&path, contents)?;
        written.push(path);
    }
    Ok(written)
}

/// Write the home page listing every page. Returns the file written.
pub fn finalize(
    output_root: &Path,
    pages: &[OutputPage],
    home: &HomePage<'_>,
) -> Result<PathBuf, FinalizeError> {
    let groups = build_groups(pages, NavOrigin::Home);
    let markup = render_home(&groups, pages.len(), home).into_string();
    let path = output_root.join(HOME_PAGE);
    write_file(&path, markup.as_bytes())?;
    Ok(path)
}

/// Footer line of the home page.
pub fn footer_text(generated_on: NaiveDate, total: usize) -> String {
    format!(
        "Generated on {} • Total documents: {total}",
        generated_on.format("%Y-%m-%d")
    )
}

fn render_home_entry(entry: &NavEntry) -> Markup {
    html! {
        li.home-toc-item {
            a.home-toc-link href=(entry.href) { (entry.display_name) }
        }
    }
}

/// Renders the home page.
pub fn render_home(groups: &[DirectoryGroup], total: usize, home: &HomePage<'_>) -> Markup {
    let assets = AssetLinks {
        stylesheet: STYLESHEET.to_string(),
        favicon: FAVICON.to_string(),
        script: SCRIPT.to_string(),
    };

    let content = html! {
        div.home-container {
            header.home-header {
                h1.home-title { (home.site.title) }
                p.home-subtitle { (home.site.subtitle) }
            }
            div.home-toc {
                div.home-toc-header {
                    h2.home-toc-title { "Table of Contents" }
                }
                ul.home-toc-list {
                    @for group in groups {
                        @if group.is_root() {
                            @for entry in &group.entries {
                                (render_home_entry(entry))
                            }
                        } @else {
                            li.home-toc-item {
                                strong.home-toc-group { (group.label) }
                                ul.home-toc-list.home-toc-nested {
                                    @for entry in &group.entries {
                                        (render_home_entry(entry))
                                    }
                                }
                            }
                        }
                    }
                }
            }
            footer.home-footer {
                p { (footer_text(home.generated_on, total)) }
            }
        }
    };

    base_document(&home.site.title, home.site, &assets, content)
}
