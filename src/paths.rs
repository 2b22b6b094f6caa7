//! Output locations and the relative links between them.
//!
//! Every generated page lives under the pages root (`html/`) at the same
//! relative location as its source document, with the extension swapped:
//!
//! ```text
//! md-input/a.md            →  site-output/html/a.html
//! md-input/sub/b.md        →  site-output/html/sub/b.html
//! md-input/sub/deep/c.md   →  site-output/html/sub/deep/c.html
//! ```
//!
//! [`PagePath::mirror`] is the only place that mapping is computed. The page's
//! depth, its output file, its navigation group and every link leaving it are
//! all derived from the resulting [`PagePath`], so the link depth and the
//! actual nesting cannot drift apart.
//!
//! Shared assets sit at fixed locations under the output root. A page at depth
//! `d` reaches them by climbing `d` directory levels plus the fixed `html/`
//! level:
//!
//! ```text
//! html/a.html          depth 0   ../style/styles.css
//! html/sub/b.html      depth 1   ../../style/styles.css
//! ```
//!
//! Hrefs always use forward slashes, whatever the host separator is.

use crate::naming;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directory under the output root holding every generated page.
pub const PAGES_DIR: &str = "html";
/// Extension given to generated pages.
pub const PAGE_EXTENSION: &str = "html";
/// Home page, relative to the output root.
pub const HOME_PAGE: &str = "index.html";
/// Shared stylesheet, relative to the output root.
pub const STYLESHEET: &str = "style/styles.css";
/// Shared script, relative to the output root.
pub const SCRIPT: &str = "js/index.js";
/// Site icon, relative to the output root.
pub const FAVICON: &str = "favicon/favicon.ico";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("{} is not a document inside the input root {}", .document.display(), .root.display())]
    OutsideRoot { document: PathBuf, root: PathBuf },
    #[error("path of {} is not valid UTF-8", .document.display())]
    NonUtf8 { document: PathBuf },
    #[error(
        "{} is nested {actual} levels below {} but its links climb {expected}",
        .file.display(),
        .root.display()
    )]
    DepthMismatch {
        file: PathBuf,
        root: PathBuf,
        expected: usize,
        actual: usize,
    },
}

/// Location of a generated page relative to the pages root.
///
/// Stored as path segments: zero or more directories followed by the page
/// file name (`["sub", "b.html"]`). Ordering and equality are by segments,
/// so two `PagePath`s compare equal exactly when they name the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PagePath {
    segments: Vec<String>,
}

impl PagePath {
    /// Mirror a source document into the page tree.
    ///
    /// `document` must be a file below `input_root`; its relative location is
    /// kept and only the last extension is replaced with `.html`.
    pub fn mirror(input_root: &Path, document: &Path) -> Result<Self, LinkError> {
        let outside = || LinkError::OutsideRoot {
            document: document.to_path_buf(),
            root: input_root.to_path_buf(),
        };
        let relative = document.strip_prefix(input_root).map_err(|_| outside())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| LinkError::NonUtf8 {
                        document: document.to_path_buf(),
                    })?;
                    segments.push(part.to_string());
                }
                Component::CurDir => {}
                _ => return Err(outside()),
            }
        }

        let file_name = segments.pop().ok_or_else(outside)?;
        segments.push(format!(
            "{}.{}",
            naming::file_stem(&file_name),
            PAGE_EXTENSION
        ));
        Ok(Self { segments })
    }

    /// Number of directories between the pages root and this page.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// Page file name, e.g. `b.html`.
    pub fn file_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Parent directory relative to the pages root, `/`-joined.
    /// Empty for pages at the root.
    pub fn directory_key(&self) -> String {
        self.segments[..self.depth()].join("/")
    }

    /// Path relative to the pages root, e.g. `sub/b.html`.
    pub fn as_url(&self) -> String {
        self.segments.join("/")
    }

    /// Path relative to the output root, e.g. `html/sub/b.html`.
    pub fn site_url(&self) -> String {
        format!("{}/{}", PAGES_DIR, self.as_url())
    }

    /// File this page is written to.
    pub fn output_file(&self, output_root: &Path) -> PathBuf {
        let mut file = output_root.join(PAGES_DIR);
        file.extend(&self.segments);
        file
    }

    /// Link context for rendering this page.
    pub fn link_context(&self) -> LinkContext<'_> {
        LinkContext {
            depth: self.depth(),
            from: self,
        }
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_url())
    }
}

impl Serialize for PagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_url())
    }
}

/// Nesting of a document below the input root (`0` for root documents).
pub fn asset_depth(input_root: &Path, document: &Path) -> Result<usize, LinkError> {
    Ok(PagePath::mirror(input_root, document)?.depth())
}

/// Relative href from one document to another.
///
/// Both arguments are `/`-separated paths from the same root. The last segment
/// of `from` is the current document, so the base directory is everything
/// before it.
///
/// ```
/// use mdsite::paths::relative_link;
///
/// assert_eq!(relative_link("html/sub/b.html", "html/a.html"), "../a.html");
/// assert_eq!(relative_link("html/a.html", "html/sub/b.html"), "sub/b.html");
/// assert_eq!(relative_link("html/a.html", "html/a.html"), "a.html");
/// ```
pub fn relative_link(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_dir.len() - common);
    let down = to_segs[common..].join("/");

    let link = format!("{ups}{down}");
    if link.is_empty() {
        "./".to_string()
    } else {
        link
    }
}

/// Links leaving one page.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Nesting of the page below the pages root.
    pub depth: usize,
    /// The page being rendered.
    pub from: &'a PagePath,
}

impl LinkContext<'_> {
    /// Directory levels between the page and the output root.
    pub fn levels_to_root(&self) -> usize {
        self.depth + 1
    }

    /// Href of a shared asset given relative to the output root.
    pub fn asset_href(&self, asset: &str) -> String {
        format!("{}{asset}", "../".repeat(self.levels_to_root()))
    }

    /// Href of the home page.
    pub fn home_href(&self) -> String {
        self.asset_href(HOME_PAGE)
    }

    /// Href of another page.
    pub fn link_to(&self, target: &PagePath) -> String {
        relative_link(&self.from.site_url(), &target.site_url())
    }

    /// Check that `file`, as it will be written, sits exactly as deep below
    /// `output_root` as this context's asset links assume.
    pub fn verify(&self, output_root: &Path, file: &Path) -> Result<(), LinkError> {
        let relative = file
            .strip_prefix(output_root)
            .map_err(|_| LinkError::OutsideRoot {
                document: file.to_path_buf(),
                root: output_root.to_path_buf(),
            })?;
        let actual = relative.components().count().saturating_sub(1);
        if actual != self.levels_to_root() {
            return Err(LinkError::DepthMismatch {
                file: file.to_path_buf(),
                root: output_root.to_path_buf(),
                expected: self.levels_to_root(),
                actual,
            });
        }
        Ok(())
    }
}
