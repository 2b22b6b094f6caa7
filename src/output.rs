//! CLI output formatting for the scan and build commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every document is its semantic identity (positional index and title)
//! with filesystem paths shown as secondary context via indented `Source:`
//! lines. This makes the output readable as a content inventory while still
//! letting users trace every page back to its document.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Documents (3)
//! 001 About
//!     Source: about.md
//! Guides
//!     002 Install
//!         Source: guides/install.md
//!     003 Usage
//!         Source: guides/Usage.md
//! ```
//!
//! ## Build
//!
//! ```text
//! Scanned md-input: 3 documents
//! Theme sunset
//!     site-output/style/styles.css
//!     site-output/favicon/favicon.ico
//!     site-output/js/index.js
//! 001 About → html/about.html
//!     Source: about.md
//! 002 Install → html/guides/install.html
//!     Source: guides/install.md
//! Home → site-output/index.html (3 documents)
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::navigation::{NavOrigin, build_groups};
use crate::pipeline::BuildEvent;
use crate::types::OutputPage;
use std::error::Error;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn documents_noun(n: usize) -> &'static str {
    if n == 1 { "document" } else { "documents" }
}

/// Forward-slash display of a path relative to some root.
fn display_relative(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Scan output
// ============================================================================

/// Format the documents found by a scan, grouped as in the navigation.
pub fn format_scan_output(root: &Path, pages: &[OutputPage]) -> Vec<String> {
    let mut lines = vec![format!("Documents ({})", pages.len())];
    let mut position = 0;

    for group in build_groups(pages, NavOrigin::Home) {
        let depth = if group.is_root() {
            0
        } else {
            lines.push(group.label.clone());
            1
        };
        for entry in &group.entries {
            position += 1;
            lines.push(format!(
                "{}{} {}",
                indent(depth),
                format_index(position),
                entry.display_name
            ));
            if let Some(page) = pages.iter().find(|p| p.path == entry.path) {
                let source = page.source.path.strip_prefix(root).unwrap_or(&page.source.path);
                lines.push(format!(
                    "{}Source: {}",
                    indent(depth + 1),
                    display_relative(source)
                ));
            }
        }
    }
    lines
}

pub fn print_scan_output(root: &Path, pages: &[OutputPage]) {
    for line in format_scan_output(root, pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Scanned { root, documents } => vec![format!(
            "Scanned {}: {} {}",
            root.display(),
            documents,
            documents_noun(*documents)
        )],
        BuildEvent::PathCollision {
            page,
            first,
            second,
        } => vec![
            format!("Warning: {page} is produced by two documents"),
            format!("{}Source: {}", indent(1), display_relative(first)),
            format!("{}Source: {} (written last)", indent(1), display_relative(second)),
        ],
        BuildEvent::AssetsInstalled { theme, files } => {
            let mut lines = vec![format!("Theme {theme}")];
            lines.extend(
                files
                    .iter()
                    .map(|f| format!("{}{}", indent(1), f.display())),
            );
            lines
        }
        BuildEvent::PageWritten {
            index,
            title,
            source,
            output,
        } => vec![
            format!("{} {} \u{2192} {}", format_index(*index), title, output),
            format!("{}Source: {}", indent(1), display_relative(source)),
        ],
        BuildEvent::HomeWritten { path, documents } => vec![format!(
            "Home \u{2192} {} ({} {})",
            path.display(),
            documents,
            documents_noun(*documents)
        )],
    }
}

pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Themes and errors
// ============================================================================

/// Format the built-in theme list, marking the default.
pub fn format_themes(names: &[&str], default: &str) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            if *name == default {
                format!("{name} (default)")
            } else {
                name.to_string()
            }
        })
        .collect()
}

/// Format an error followed by its chain of causes.
pub fn format_error(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    let mut cause = err.source();
    while let Some(source) = cause {
        lines.push(format!("{}caused by: {source}", indent(1)));
        cause = source.source();
    }
    lines
}

pub fn print_error(err: &dyn Error) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}
