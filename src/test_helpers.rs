//! Shared test utilities for the mdsite test suite.
//!
//! Provides input-tree setup, page planning without touching the disk, and
//! lookup helpers over navigation groups that panic with the available
//! options on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let pages = plan_pages(&["a.md", "sub/b.md"]);
//! let groups = build_groups(&pages, NavOrigin::Home);
//!
//! assert_eq!(group_keys(&groups), vec!["", "sub"]);
//! assert_eq!(find_entry(&groups, "B").href, "html/sub/b.html");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::navigation::{DirectoryGroup, NavEntry};
use crate::types::{OutputPage, SourceDocument};

/// Input root used by [`plan_pages`]. Never read from disk.
pub const PLAN_ROOT: &str = "/docs";

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/docs");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create a temp directory holding the given `(relative path, contents)`
/// files. Parent directories are created as needed.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (relative, contents) in files {
        let path = tmp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
    tmp
}

// =========================================================================
// Page planning
// =========================================================================

/// Plan output pages for documents at the given paths below [`PLAN_ROOT`].
pub fn plan_pages(relative: &[&str]) -> Vec<OutputPage> {
    let root = Path::new(PLAN_ROOT);
    relative
        .iter()
        .map(|rel| {
            let path = root.join(rel);
            let source = SourceDocument {
                name: path.file_name().unwrap().to_string_lossy().into_owned(),
                path,
            };
            OutputPage::plan(root, source).unwrap()
        })
        .collect()
}

/// Find a planned page by its url below the pages root. Panics if not found.
pub fn find_page<'a>(pages: &'a [OutputPage], url: &str) -> &'a OutputPage {
    pages
        .iter()
        .find(|p| p.path.as_url() == url)
        .unwrap_or_else(|| {
            let urls: Vec<String> = pages.iter().map(|p| p.path.as_url()).collect();
            panic!("page '{url}' not found. Available: {urls:?}")
        })
}

// =========================================================================
// Navigation lookups
// =========================================================================

/// All group keys in order.
pub fn group_keys(groups: &[DirectoryGroup]) -> Vec<&str> {
    groups.iter().map(|g| g.key.as_str()).collect()
}

/// Entry display names of one group in order.
pub fn entry_names(group: &DirectoryGroup) -> Vec<&str> {
    group
        .entries
        .iter()
        .map(|e| e.display_name.as_str())
        .collect()
}

/// Find an entry by display name in any group. Panics if not found.
pub fn find_entry<'a>(groups: &'a [DirectoryGroup], display_name: &str) -> &'a NavEntry {
    groups
        .iter()
        .flat_map(|g| &g.entries)
        .find(|e| e.display_name == display_name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = groups.iter().flat_map(entry_names).collect();
            panic!("entry '{display_name}' not found. Available: {names:?}")
        })
}

/// Find a group by key. Panics if not found.
pub fn find_group<'a>(groups: &'a [DirectoryGroup], key: &str) -> &'a DirectoryGroup {
    groups.iter().find(|g| g.key == key).unwrap_or_else(|| {
        let keys = group_keys(groups);
        panic!("group '{key}' not found. Available: {keys:?}")
    })
}

/// Assert that the groups match an expected shape.
///
/// Each entry is `(group key, entry display names)` in order.
///
/// ```rust
/// assert_nav_shape(&groups, &[
///     ("", &["A"]),
///     ("sub", &["B", "C"]),
/// ]);
/// ```
pub fn assert_nav_shape(groups: &[DirectoryGroup], expected: &[(&str, &[&str])]) {
    let expected_keys: Vec<&str> = expected.iter().map(|(k, _)| *k).collect();
    assert_eq!(group_keys(groups), expected_keys, "group keys mismatch");

    for (key, names) in expected {
        let group = find_group(groups, key);
        assert_eq!(
            entry_names(group),
            names.to_vec(),
            "entries of group '{key}' mismatch"
        );
    }
}
