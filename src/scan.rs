//! Input tree discovery.
//!
//! Stage 1 of the build. Walks the input root and collects every file whose
//! extension matches the configured one, at any depth:
//!
//! ```text
//! md-input/
//! ├── config.toml            # ignored (wrong extension)
//! ├── a.md                   # found
//! ├── sub/
//! │   ├── b.md               # found
//! │   └── diagram.png        # ignored
//! └── .drafts/
//!     └── c.md               # found (no ignore rules)
//! ```
//!
//! ## Rules
//!
//! - Every subdirectory is entered, hidden ones included.
//! - Symlinks are not followed, so a link cycle cannot trap the walk.
//! - Extension matching is exact and case-sensitive: with `.md`, `A.MD` is
//!   not a document.
//! - Results come back in filesystem enumeration order. Display order is the
//!   navigation builder's job.
//! - Any unreadable directory aborts the scan. A site silently missing a
//!   subtree is worse than no site.

use crate::types::SourceDocument;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read input directory {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("walking input tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Everything the scanner found.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTree {
    /// Canonical input root. Every document path starts with it.
    pub root: PathBuf,
    /// Extension that was matched, without the leading dot.
    pub extension: String,
    pub documents: Vec<SourceDocument>,
}

/// Strip the leading dot so `.md` and `md` mean the same thing.
pub fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

/// Collect every document below `root` with the given extension.
pub fn scan(root: &Path, extension: &str) -> Result<SourceTree, ScanError> {
    let root_error = |source| ScanError::Root {
        path: root.to_path_buf(),
        source,
    };
    let root = root.canonicalize().map_err(root_error)?;
    // Fails for files and unreadable directories alike.
    fs::read_dir(&root).map_err(root_error)?;

    let extension = normalize_extension(extension);
    let mut documents = Vec::new();

    for entry in WalkDir::new(&root).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() != Some(OsStr::new(extension)) {
            continue;
        }
        documents.push(SourceDocument {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.into_path(),
        });
    }

    Ok(SourceTree {
        root,
        extension: extension.to_string(),
        documents,
    })
}
