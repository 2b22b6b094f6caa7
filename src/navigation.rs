//! Directory-grouped navigation over the whole page set.
//!
//! Two places list every page: the home page table of contents and the
//! "Pages" panel on each generated page. Both are built here from the same
//! page list, differing only in where links start from:
//!
//! - [`NavOrigin::Home`]: hrefs are relative to the output root
//!   (`html/sub/b.html`) and nothing is active.
//! - [`NavOrigin::Page`]: hrefs are relative to the page being rendered and
//!   the entry for that page is marked active.
//!
//! ## Grouping
//!
//! Each page belongs to exactly one group, keyed by its parent directory
//! relative to the input root. Root pages share the [`ROOT_KEY`] group.
//!
//! ```text
//! a.md, sub/b.md, sub/deep/c.md
//!   ""          → [A]
//!   "sub"       → [B]        label "Sub"
//!   "sub/deep"  → [C]        label "Sub/deep"
//! ```
//!
//! ## Ordering
//!
//! Groups are ordered by key, so the root group always comes first. Entries
//! within a group are ordered by display name compared without regard to
//! case, then with case, then by path. Groups are rebuilt on every call and
//! never cached, so the result depends only on the page set and the origin.

use crate::naming;
use crate::paths::{PagePath, relative_link};
use crate::types::OutputPage;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Group key for pages directly under the input root.
pub const ROOT_KEY: &str = "";

/// Where navigation links start from.
#[derive(Debug, Clone, Copy)]
pub enum NavOrigin<'a> {
    /// The home page at the output root.
    Home,
    /// A generated page; its own entry is marked active.
    Page(&'a PagePath),
}

/// One linkable page in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub display_name: String,
    pub href: String,
    pub path: PagePath,
    pub active: bool,
}

/// Pages sharing a parent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryGroup {
    /// Parent directory relative to the input root, `/`-separated.
    pub key: String,
    /// Key with its first character capitalized, for display.
    pub label: String,
    pub entries: Vec<NavEntry>,
}

impl DirectoryGroup {
    pub fn is_root(&self) -> bool {
        self.key == ROOT_KEY
    }
}

/// Group `pages` by directory with links from `origin`.
pub fn build_groups(pages: &[OutputPage], origin: NavOrigin<'_>) -> Vec<DirectoryGroup> {
    let mut by_dir: HashMap<String, Vec<NavEntry>> = HashMap::new();

    for page in pages {
        let (href, active) = match origin {
            NavOrigin::Home => (page.path.site_url(), false),
            NavOrigin::Page(current) => (
                relative_link(&current.site_url(), &page.path.site_url()),
                *current == page.path,
            ),
        };
        by_dir
            .entry(page.path.directory_key())
            .or_default()
            .push(NavEntry {
                display_name: page.display_name.clone(),
                href,
                path: page.path.clone(),
                active,
            });
    }

    let mut groups: Vec<DirectoryGroup> = by_dir
        .into_iter()
        .map(|(key, mut entries)| {
            entries.sort_by(compare_entries);
            DirectoryGroup {
                label: naming::capitalize_first(&key),
                key,
                entries,
            }
        })
        .collect();
    groups.sort_by(|a, b| compare_group_keys(&a.key, &b.key));
    groups
}

/// Root group first, then keys ascending.
pub fn compare_group_keys(a: &str, b: &str) -> Ordering {
    (a != ROOT_KEY).cmp(&(b != ROOT_KEY)).then_with(|| a.cmp(b))
}

/// Display name ignoring case, then with case, then page path.
pub fn compare_entries(a: &NavEntry, b: &NavEntry) -> Ordering {
    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Number of entries marked active across all groups.
pub fn active_count(groups: &[DirectoryGroup]) -> usize {
    groups
        .iter()
        .flat_map(|g| &g.entries)
        .filter(|e| e.active)
        .count()
}
