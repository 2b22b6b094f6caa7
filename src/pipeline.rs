//! The build, start to finish.
//!
//! ```text
//! theme     config.theme        →  stylesheet text     (nothing written yet)
//! scan      md-input/           →  SourceTree
//! plan      SourceTree          →  [OutputPage]        (mirrored paths)
//! assets    stylesheet          →  style/styles.css    (+ favicon, script)
//! pages     each OutputPage     →  html/<path>.html    (read, render, assemble)
//! home      [OutputPage]        →  index.html
//! ```
//!
//! Everything is sequential. Each document is read, rendered and written
//! before the next one starts, and the first error aborts the run; files
//! already written stay in place. The theme is resolved before the input tree
//! is even scanned, so an unknown theme is reported first and leaves the
//! output untouched.
//!
//! Progress is reported as [`BuildEvent`]s over an optional channel. The
//! pipeline never prints.

use crate::assemble::{AssembleError, assemble};
use crate::config::{ConfigError, SiteConfig};
use crate::finalize::{FinalizeError, HomePage, finalize, install_assets};
use crate::navigation::{NavOrigin, build_groups};
use crate::paths::LinkError;
use crate::render::Render;
use crate::scan::{self, ScanError};
use crate::theme::{ThemeError, resolve_theme};
use crate::types::{OutputPage, SourceDocument};
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("reading {}", .document.display())]
    Read {
        document: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("building page for {}", .document.display())]
    Assemble {
        document: PathBuf,
        #[source]
        source: AssembleError,
    },
    #[error(transparent)]
    Finalize(#[from] FinalizeError),
}

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Input root.
    pub source: PathBuf,
    /// Output root.
    pub output: PathBuf,
    /// Resolved configuration; command-line overrides already applied.
    pub config: SiteConfig,
    /// Date shown on the home page.
    pub generated_on: NaiveDate,
}

/// Progress reported while building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// The input tree was scanned.
    Scanned { root: PathBuf, documents: usize },
    /// Two documents map to the same page; the later one overwrites the other.
    PathCollision {
        page: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Stylesheet, favicon and script are in place.
    AssetsInstalled { theme: String, files: Vec<PathBuf> },
    /// One page was written.
    PageWritten {
        /// 1-based position in write order.
        index: usize,
        title: String,
        /// Source document relative to the input root.
        source: PathBuf,
        /// Page location relative to the output root.
        output: String,
    },
    /// The home page was written.
    HomeWritten { path: PathBuf, documents: usize },
}

/// What a finished build produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    pub output: PathBuf,
    /// Pages written, in write order, relative to the output root.
    pub pages: Vec<String>,
    pub home: PathBuf,
    pub collisions: usize,
}

fn emit(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Place every document in the page tree, ordered by page path.
pub fn plan_site(root: &Path, documents: Vec<SourceDocument>) -> Result<Vec<OutputPage>, LinkError> {
    let mut pages = documents
        .into_iter()
        .map(|doc| OutputPage::plan(root, doc))
        .collect::<Result<Vec<_>, _>>()?;
    pages.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.source.path.cmp(&b.source.path)));
    Ok(pages)
}

/// Neighbouring pages (in [`plan_site`] order) that share a page path.
pub fn find_collisions(pages: &[OutputPage]) -> Vec<(&OutputPage, &OutputPage)> {
    pages
        .windows(2)
        .filter(|pair| pair[0].path == pair[1].path)
        .map(|pair| (&pair[0], &pair[1]))
        .collect()
}

fn relative_source(root: &Path, document: &Path) -> PathBuf {
    document
        .strip_prefix(root)
        .unwrap_or(document)
        .to_path_buf()
}

/// Run the whole build.
pub fn build_site(
    options: &BuildOptions,
    renderer: &dyn Render,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    let config = &options.config;
    let output = options.output.as_path();

    let theme_dir = config.theme_dir_in(&options.source);
    let stylesheet = resolve_theme(&config.theme, theme_dir.as_deref())?;

    let tree = scan::scan(&options.source, &config.extension)?;
    emit(
        events,
        BuildEvent::Scanned {
            root: tree.root.clone(),
            documents: tree.documents.len(),
        },
    );

    let pages = plan_site(&tree.root, tree.documents)?;
    let collisions = find_collisions(&pages);
    for (first, second) in &collisions {
        emit(
            events,
            BuildEvent::PathCollision {
                page: first.path.site_url(),
                first: relative_source(&tree.root, &first.source.path),
                second: relative_source(&tree.root, &second.source.path),
            },
        );
    }
    let collision_count = collisions.len();

    let files = install_assets(output, &stylesheet)?;
    emit(
        events,
        BuildEvent::AssetsInstalled {
            theme: config.theme.clone(),
            files,
        },
    );

    let mut written = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let document = &page.source.path;
        let raw = fs::read_to_string(document).map_err(|source| BuildError::Read {
            document: document.clone(),
            source,
        })?;
        let fragment = renderer.render(&raw);
        let navigation = build_groups(&pages, NavOrigin::Page(&page.path));

        assemble(
            output,
            page,
            &fragment,
            &navigation,
            page.path.link_context(),
            config,
        )
        .map_err(|source| BuildError::Assemble {
            document: document.clone(),
            source,
        })?;

        emit(
            events,
            BuildEvent::PageWritten {
                index: i + 1,
                title: page.display_name.clone(),
                source: relative_source(&tree.root, document),
                output: page.path.site_url(),
            },
        );
        written.push(page.path.site_url());
    }

    let home = HomePage {
        site: config,
        generated_on: options.generated_on,
    };
    let home_path = finalize(output, &pages, &home)?;
    emit(
        events,
        BuildEvent::HomeWritten {
            path: home_path.clone(),
            documents: pages.len(),
        },
    );

    Ok(BuildSummary {
        output: output.to_path_buf(),
        pages: written,
        home: home_path,
        collisions: collision_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MarkdownRenderer;
    use crate::test_helpers::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn options(source: &Path, output: &Path) -> BuildOptions {
        BuildOptions {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            config: SiteConfig::default(),
            generated_on: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    /// Renderer that echoes its input inside a marker element.
    struct Echo;

    impl Render for Echo {
        fn render(&self, raw: &str) -> String {
            format!("<pre class=\"echo\">{raw}</pre>")
        }
    }

    #[test]
    fn plan_orders_pages_by_path() {
        let pages = plan_pages(&["sub/b.md", "a.md", "c.md", "sub/a.md"]);
        let docs: Vec<SourceDocument> = pages.into_iter().map(|p| p.source).collect();
        let planned = plan_site(Path::new(PLAN_ROOT), docs).unwrap();
        let urls: Vec<String> = planned.iter().map(|p| p.path.as_url()).collect();
        assert_eq!(urls, vec!["a.html", "c.html", "sub/a.html", "sub/b.html"]);
    }

    #[test]
    fn collisions_found_between_same_page_paths() {
        let mut pages = plan_pages(&["a.md", "b.md"]);
        let mut twin = pages[0].clone();
        twin.source.path = PathBuf::from("/docs/a.MD");
        pages.insert(1, twin);

        let collisions = find_collisions(&pages);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0.path.as_url(), "a.html");
        assert!(find_collisions(&plan_pages(&["a.md", "sub/a.md"])).is_empty());
    }

    #[test]
    fn build_writes_every_page_and_home() {
        let src = write_tree(&[("a.md", "# A"), ("sub/b.md", "# B")]);
        let out = TempDir::new().unwrap();
        let summary =
            build_site(&options(src.path(), out.path()), &MarkdownRenderer::default(), None)
                .unwrap();

        assert_eq!(summary.pages, vec!["html/a.html", "html/sub/b.html"]);
        assert_eq!(summary.collisions, 0);
        assert!(out.path().join("html/a.html").is_file());
        assert!(out.path().join("html/sub/b.html").is_file());
        assert!(out.path().join("index.html").is_file());
        assert!(out.path().join("style/styles.css").is_file());
    }

    #[test]
    fn build_of_fixtures() {
        let src = setup_fixtures();
        let out = TempDir::new().unwrap();
        let summary =
            build_site(&options(src.path(), out.path()), &MarkdownRenderer::default(), None)
                .unwrap();
        assert_eq!(
            summary.pages,
            vec![
                "html/about.html",
                "html/getting-started.html",
                "html/guides/Usage.html",
                "html/guides/advanced/tuning.html",
                "html/guides/install.html",
            ]
        );

        let tuning = fs::read_to_string(out.path().join("html/guides/advanced/tuning.html")).unwrap();
        assert!(tuning.contains(r#"id="tuning-guide""#));
        assert!(tuning.contains(r#"href="../../../style/styles.css""#));
        assert!(tuning.contains(r#"href="../install.html""#));

        let started = fs::read_to_string(out.path().join("html/getting-started.html")).unwrap();
        assert!(started.contains("table-of-contents"));
        assert!(started.contains("line-break-container"));
    }

    #[test]
    fn renderer_output_reaches_page() {
        let src = write_tree(&[("a.md", "raw *text*")]);
        let out = TempDir::new().unwrap();
        build_site(&options(src.path(), out.path()), &Echo, None).unwrap();
        let html = fs::read_to_string(out.path().join("html/a.html")).unwrap();
        assert!(html.contains(r#"<pre class="echo">raw *text*</pre>"#));
    }

    #[test]
    fn events_follow_pipeline_order() {
        let src = write_tree(&[("a.md", "a"), ("sub/b.md", "b")]);
        let out = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        build_site(&options(src.path(), out.path()), &Echo, Some(&tx)).unwrap();
        drop(tx);
        let events: Vec<BuildEvent> = rx.iter().collect();

        assert!(matches!(events[0], BuildEvent::Scanned { documents: 2, .. }));
        assert!(matches!(events[1], BuildEvent::AssetsInstalled { .. }));
        assert_eq!(
            events[2],
            BuildEvent::PageWritten {
                index: 1,
                title: "A".into(),
                source: PathBuf::from("a.md"),
                output: "html/a.html".into(),
            }
        );
        assert_eq!(
            events[3],
            BuildEvent::PageWritten {
                index: 2,
                title: "B".into(),
                source: Path::new("sub").join("b.md"),
                output: "html/sub/b.html".into(),
            }
        );
        assert!(matches!(events[4], BuildEvent::HomeWritten { documents: 2, .. }));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn unknown_theme_writes_nothing() {
        let src = write_tree(&[("a.md", "# A")]);
        let out = TempDir::new().unwrap();
        let mut opts = options(src.path(), &out.path().join("site"));
        opts.config.theme = "nonexistent".into();

        let err = build_site(&opts, &Echo, None).unwrap_err();
        assert!(matches!(err, BuildError::Theme(ThemeError::NotFound { .. })));
        assert!(!out.path().join("site").exists());
    }

    #[test]
    fn unknown_theme_reported_before_scan_errors() {
        let tmp = TempDir::new().unwrap();
        let mut opts = options(&tmp.path().join("missing"), &tmp.path().join("out"));
        opts.config.theme = "nonexistent".into();

        let err = build_site(&opts, &Echo, None).unwrap_err();
        assert!(matches!(err, BuildError::Theme(ThemeError::NotFound { .. })));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn theme_dir_relative_to_source() {
        let src = write_tree(&[("a.md", ""), ("themes/mine.css", "/* mine */")]);
        let out = TempDir::new().unwrap();
        let mut opts = options(src.path(), out.path());
        opts.config.theme = "mine".into();
        opts.config.theme_dir = Some(PathBuf::from("themes"));

        build_site(&opts, &Echo, None).unwrap();
        let css = fs::read_to_string(out.path().join("style/styles.css")).unwrap();
        assert_eq!(css, "/* mine */");
    }

    #[test]
    fn configured_extension_selects_documents() {
        let src = write_tree(&[("a.md", ""), ("notes.txt", "plain")]);
        let out = TempDir::new().unwrap();
        let mut opts = options(src.path(), out.path());
        opts.config.extension = "txt".into();

        let summary = build_site(&opts, &Echo, None).unwrap();
        assert_eq!(summary.pages, vec!["html/notes.html"]);
    }

    #[test]
    fn missing_source_is_scan_error() {
        let tmp = TempDir::new().unwrap();
        let result = build_site(
            &options(&tmp.path().join("missing"), &tmp.path().join("out")),
            &Echo,
            None,
        );
        assert!(matches!(result, Err(BuildError::Scan(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_document_names_the_document() {
        let src = write_tree(&[("a.md", "")]);
        // Invalid UTF-8 cannot be read as text
        fs::write(src.path().join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();
        let out = TempDir::new().unwrap();

        let err = build_site(&options(src.path(), out.path()), &Echo, None).unwrap_err();
        match err {
            BuildError::Read { document, .. } => assert!(document.ends_with("bad.md")),
            other => panic!("expected read error, got {other:?}"),
        }
        // Pages before the failure stay written
        assert!(out.path().join("html/a.html").is_file());
        assert!(!out.path().join("index.html").exists());
    }
}
