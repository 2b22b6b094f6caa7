//! # mdsite
//!
//! A static site generator for a tree of markdown documents. Every document
//! becomes one HTML page at the same relative location, every page lists every
//! other page, and a home page ties the whole set together.
//!
//! # Architecture: One Sequential Pipeline
//!
//! ```text
//! 1. Theme      config.theme  →  stylesheet        (resolved, nothing written)
//! 2. Scan       md-input/     →  SourceTree        (every *.md, any depth)
//! 3. Plan       SourceTree    →  [OutputPage]      (mirrored html/ paths)
//! 4. Assets     stylesheet    →  style/, favicon/, js/
//! 5. Pages      OutputPage    →  html/**/*.html    (render + assemble, one at a time)
//! 6. Home       [OutputPage]  →  index.html
//! ```
//!
//! [`pipeline::build_site`] runs the stages in order and stops at the first
//! error. Rendering a document is delegated to a [`render::Render`]
//! implementation, so the pipeline itself knows nothing about markdown.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the input root and collects documents by extension |
//! | [`paths`] | `PagePath` mirroring, asset depth, relative links and their consistency check |
//! | [`types`] | `SourceDocument` and `OutputPage`, shared by every stage |
//! | [`naming`] | Display names derived from file names |
//! | [`navigation`] | Directory-grouped page lists for the home page and the per-page panel |
//! | [`render`] | The `Render` seam and the pulldown-cmark markdown renderer |
//! | [`assemble`] | Page template (Maud) and writing pages to disk |
//! | [`finalize`] | Shared assets and the home page |
//! | [`theme`] | Theme name to stylesheet resolution |
//! | [`config`] | `config.toml` loading, merging with defaults, and validation |
//! | [`pipeline`] | `build_site`, progress events and the composed error type |
//! | [`output`] | CLI output formatting for scan and build |
//!
//! # Design Decisions
//!
//! ## One Function Owns the Output Location
//!
//! A page's output file, its depth, its navigation group and every relative
//! link it contains all come from [`paths::PagePath::mirror`]. The assembler
//! additionally checks the link depth against the file it is about to write,
//! so a page can never be written with stylesheet links that point nowhere.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Titles and navigation labels are escaped automatically; the
//! rendered document fragment is inserted as-is.
//!
//! ## Everything Embedded
//!
//! The built-in themes, the page script and the favicon are compiled into the
//! binary. A build needs nothing but the input tree.

pub mod assemble;
pub mod config;
pub mod finalize;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod scan;
pub mod theme;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
