//! Types shared across pipeline stages.
//!
//! A [`SourceDocument`] is what the scanner finds on disk. An [`OutputPage`]
//! is the same document placed in the generated site: it carries the mirrored
//! [`PagePath`] and the label shown in every table of contents.

use crate::naming;
use crate::paths::{LinkError, PagePath};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A document discovered in the input tree.
///
/// Identity is the absolute path; the scanner canonicalizes the input root so
/// two documents are the same exactly when their paths are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceDocument {
    /// File name including extension, e.g. `b.md`.
    pub name: String,
    /// Absolute path of the file.
    pub path: PathBuf,
}

/// A document's place in the generated site.
#[derive(Debug, Clone, Serialize)]
pub struct OutputPage {
    /// Label used for the page title and navigation entries.
    pub display_name: String,
    /// Location below the pages root.
    pub path: PagePath,
    pub source: SourceDocument,
}

impl OutputPage {
    /// Place a document in the page tree mirrored from `input_root`.
    pub fn plan(input_root: &Path, source: SourceDocument) -> Result<Self, LinkError> {
        let path = PagePath::mirror(input_root, &source.path)?;
        Ok(Self {
            display_name: naming::display_name(&source.name),
            path,
            source,
        })
    }
}
