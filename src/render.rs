//! Document text to HTML fragment.
//!
//! The pipeline treats rendering as a black box behind [`Render`]: raw
//! document text goes in, an HTML fragment comes out, and the fragment is
//! inserted into the page verbatim. [`MarkdownRenderer`] is the implementation
//! the binary uses.
//!
//! ## Markdown Features
//!
//! Parsing is done by pulldown-cmark; the event stream is then rewritten in a
//! few passes before being serialized:
//!
//! - **Bare links**: URLs with a scheme and email addresses in running text
//!   become links. Text inside links and code is left alone.
//! - **Attribute annotations**: `{#id .class key=value}` right after a link,
//!   emphasis or code span applies to that element; at the end of a
//!   paragraph it applies to the paragraph.
//! - **Anchored headings**: every heading gets an `id`. Explicit
//!   `{#id .class}` annotations win; otherwise the id is a slug of the heading
//!   text, suffixed `-1`, `-2`, ... when already taken. Ids set by
//!   annotations anywhere in the document count as taken.
//! - **Table of contents**: a paragraph holding only the TOC marker
//!   (`[[toc]]` by default) becomes a nested list of links to the document's
//!   headings at the configured levels.
//! - **Line-break fences**: a fence tagged `lb` or `linebreak` renders each
//!   non-blank line as its own `span.line-break-text`.
//! - **Code fences** keep their `language-*` class; highlight.js picks them
//!   up in the browser. Unknown languages are not an error; the code stays
//!   plain escaped text.
//! - **Raw HTML** passes through unless disabled, in which case it is escaped.
//!
//! Options live in [`RenderOptions`], owned by each renderer instance, so
//! renderers with different settings can coexist.

use linkify::{LinkFinder, LinkKind};
use maud::{Escaper, Markup, html};
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
    TextMergeStream, html as md_html,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Write as _;

/// Turns raw document text into an HTML fragment.
pub trait Render {
    fn render(&self, raw: &str) -> String;
}

/// Markdown rendering settings (`[markdown]` in `config.toml`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Pass inline and block HTML through unescaped.
    pub raw_html: bool,
    /// Smart quotes, dashes and ellipses.
    pub typographer: bool,
    pub footnotes: bool,
    /// `{#id .class}` annotations on headings.
    pub heading_attributes: bool,
    /// `{#id .class key=value}` annotations on paragraphs and inline elements.
    pub attributes: bool,
    /// Turn bare URLs and email addresses into links.
    pub linkify: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    /// Paragraph text replaced by the table of contents.
    pub toc_marker: String,
    /// Heading levels listed in the table of contents.
    pub toc_levels: Vec<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            raw_html: true,
            typographer: true,
            footnotes: true,
            heading_attributes: true,
            attributes: true,
            linkify: true,
            tables: true,
            strikethrough: true,
            tasklists: true,
            toc_marker: "[[toc]]".to_string(),
            toc_levels: vec![1, 2, 3],
        }
    }
}

impl RenderOptions {
    /// pulldown-cmark extensions enabled by these options.
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        let flags = [
            (self.typographer, Options::ENABLE_SMART_PUNCTUATION),
            (self.footnotes, Options::ENABLE_FOOTNOTES),
            (self.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
            (self.tables, Options::ENABLE_TABLES),
            (self.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (self.tasklists, Options::ENABLE_TASKLISTS),
        ];
        for (enabled, flag) in flags {
            if enabled {
                options.insert(flag);
            }
        }
        options
    }
}

/// Markdown renderer backed by pulldown-cmark.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, raw: &str) -> String {
        let parser = Parser::new_ext(raw, self.options.parser_options());
        let mut events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();

        if !self.options.raw_html {
            escape_raw_html(&mut events);
        }
        if self.options.linkify {
            events = linkify_text(events);
        }
        let mut taken = HashSet::new();
        if self.options.attributes {
            events = apply_attributes(events, &mut taken);
        }
        let headings = anchor_headings(&mut events, taken);
        let events = rewrite_blocks(events, &headings, &self.options);

        let mut out = String::with_capacity(raw.len() * 3 / 2);
        md_html::push_html(&mut out, events.into_iter());
        out
    }
}

// ============================================================================
// Bare links
// ============================================================================

/// Turn URLs and email addresses in plain text into links.
fn linkify_text(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let finder = LinkFinder::new();
    let mut out = Vec::with_capacity(events.len());
    // Nesting depth of links, images and code blocks; their text stays as is.
    let mut skip = 0usize;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => skip += 1,
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                skip = skip.saturating_sub(1)
            }
            Event::InlineHtml(tag) if tag.starts_with("<a ") => skip += 1,
            Event::InlineHtml(tag) if tag.starts_with("</a") => skip = skip.saturating_sub(1),
            Event::Text(text) if skip == 0 => {
                let text: &str = text;
                if finder.links(text).next().is_some() {
                    push_linked(&mut out, &finder, text);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn push_linked(out: &mut Vec<Event<'_>>, finder: &LinkFinder, text: &str) {
    for span in finder.spans(text) {
        let dest = match span.kind() {
            Some(LinkKind::Url) => span.as_str().to_string(),
            Some(LinkKind::Email) => format!("mailto:{}", span.as_str()),
            _ => {
                out.push(Event::Text(CowStr::from(span.as_str().to_string())));
                continue;
            }
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(span.as_str().to_string())));
        out.push(Event::End(TagEnd::Link));
    }
}

// ============================================================================
// Attribute annotations
// ============================================================================

/// Parsed `{#id .class key=value}` annotation.
#[derive(Debug, Default, PartialEq)]
struct Attributes {
    id: Option<String>,
    classes: Vec<String>,
    pairs: Vec<(String, String)>,
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

/// Split on whitespace outside quotes. Curly quotes count, since smart
/// punctuation runs before this sees the text.
fn attribute_tokens(inner: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut closing: Option<char> = None;

    for c in inner.chars() {
        match closing {
            Some(close) if c == close => closing = None,
            Some(_) => current.push(c),
            None => match c {
                '"' => closing = Some('"'),
                '\u{201c}' | '\u{201d}' => closing = Some('\u{201d}'),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if closing.is_some() {
        return None;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Some(tokens)
}

impl Attributes {
    /// Parse what sits between the braces. `None` unless every token is an
    /// id, a class or a key with an optional value.
    fn parse(inner: &str) -> Option<Self> {
        let tokens = attribute_tokens(inner)?;
        if tokens.is_empty() {
            return None;
        }
        let mut attrs = Attributes::default();
        for token in tokens {
            if let Some(id) = token.strip_prefix('#') {
                if !is_attribute_name(id) {
                    return None;
                }
                attrs.id = Some(id.to_string());
            } else if let Some(class) = token.strip_prefix('.') {
                if !is_attribute_name(class) {
                    return None;
                }
                attrs.classes.push(class.to_string());
            } else {
                let (key, value) = token.split_once('=').unwrap_or((token.as_str(), ""));
                if !is_attribute_name(key) {
                    return None;
                }
                attrs.pairs.push((key.to_string(), value.to_string()));
            }
        }
        Some(attrs)
    }

    /// Attribute list with a leading space, values escaped.
    fn to_html(&self) -> String {
        let mut out = String::new();
        let mut push = |name: &str, value: &str| {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            let _ = Escaper::new(&mut out).write_str(value);
            out.push('"');
        };
        if let Some(id) = &self.id {
            push("id", id);
        }
        if !self.classes.is_empty() {
            push("class", &self.classes.join(" "));
        }
        for (key, value) in &self.pairs {
            push(key, value);
        }
        out
    }
}

/// An annotation opening `text`, and the byte length it spans.
fn leading_attributes(text: &str) -> Option<(Attributes, usize)> {
    let inner = text.strip_prefix('{')?;
    let close = inner.find('}')?;
    let attrs = Attributes::parse(&inner[..close])?;
    Some((attrs, close + 2))
}

/// An annotation closing `text`, and the text before it.
fn trailing_attributes(text: &str) -> Option<(&str, Attributes)> {
    let body = text.trim_end().strip_suffix('}')?;
    let open = body.rfind('{')?;
    let attrs = Attributes::parse(&body[open + 1..])?;
    Some((&text[..open], attrs))
}

/// Rewrite `event` as raw HTML carrying `attrs` on its opening tag.
fn annotate(event: &mut Event<'_>, attrs: &Attributes) {
    let mut markup = String::new();
    md_html::push_html(&mut markup, std::iter::once(event.clone()));
    if let Some(at) = markup.find('>') {
        markup.insert_str(at, &attrs.to_html());
        *event = Event::InlineHtml(CowStr::from(markup));
    }
}

fn annotate_paragraph(out: &mut Vec<Event<'_>>, start: usize, taken: &mut HashSet<String>) {
    let Some(Event::Text(text)) = out.last() else {
        return;
    };
    let Some((kept, attrs)) = trailing_attributes(text) else {
        return;
    };
    let kept = kept.trim_end().to_string();
    out.pop();
    if !kept.is_empty() {
        out.push(Event::Text(CowStr::from(kept)));
    }
    taken.extend(attrs.id.clone());
    annotate(&mut out[start], &attrs);
}

/// Apply annotations to the element they follow. Ids handed out this way are
/// added to `taken`.
fn apply_attributes<'a>(events: Vec<Event<'a>>, taken: &mut HashSet<String>) -> Vec<Event<'a>> {
    let mut out: Vec<Event<'a>> = Vec::with_capacity(events.len());
    // Positions in `out` of the Start events still open.
    let mut open: Vec<usize> = Vec::new();
    // Position of the Start matching the End pushed last.
    let mut closed: Option<usize> = None;

    for event in events {
        match event {
            Event::Start(tag) => {
                open.push(out.len());
                out.push(Event::Start(tag));
            }
            Event::End(TagEnd::Paragraph) => {
                if let Some(start) = open.pop() {
                    annotate_paragraph(&mut out, start, taken);
                }
                out.push(Event::End(TagEnd::Paragraph));
            }
            Event::End(end) => {
                closed = open.pop();
                out.push(Event::End(end));
            }
            Event::Text(text) => {
                let target = match out.last() {
                    Some(Event::End(
                        TagEnd::Link | TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough,
                    )) => closed,
                    Some(Event::Code(_)) => Some(out.len() - 1),
                    _ => None,
                };
                if let Some(target) = target {
                    if let Some((attrs, consumed)) = leading_attributes(&text) {
                        taken.extend(attrs.id.clone());
                        annotate(&mut out[target], &attrs);
                        let rest = &text[consumed..];
                        if !rest.is_empty() {
                            out.push(Event::Text(CowStr::from(rest.to_string())));
                        }
                        continue;
                    }
                }
                out.push(Event::Text(text));
            }
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// Headings
// ============================================================================

/// A heading as listed in the table of contents.
#[derive(Debug, Clone, PartialEq)]
struct Heading {
    level: u8,
    id: String,
    text: String,
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn escape_raw_html(events: &mut [Event<'_>]) {
    for event in events.iter_mut() {
        if let Event::Html(html) | Event::InlineHtml(html) = event {
            let text = html.clone();
            *event = Event::Text(text);
        }
    }
}

/// Slug used as a heading anchor: lower-cased words joined by `-`, keeping
/// letters, digits, `-` and `_`.
fn slugify(text: &str) -> String {
    let joined = text
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let slug: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn unique_slug(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Give every heading an id and collect them in document order.
///
/// `used` holds ids already assigned elsewhere in the document. Explicit
/// heading ids are claimed before any slug is generated.
fn anchor_headings(events: &mut [Event<'_>], mut used: HashSet<String>) -> Vec<Heading> {
    used.extend(events.iter().filter_map(|event| match event {
        Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
        _ => None,
    }));
    let mut headings = Vec::new();

    let mut i = 0;
    while i < events.len() {
        let (level, explicit_id) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (heading_level_to_num(*level), id.as_ref().map(|s| s.to_string()))
            }
            _ => {
                i += 1;
                continue;
            }
        };

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }

        let id = match explicit_id {
            Some(id) => id,
            None => {
                let id = unique_slug(slugify(&text), &mut used);
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
                    *slot = Some(CowStr::from(id.clone()));
                }
                id
            }
        };

        headings.push(Heading {
            level,
            id,
            text: text.trim().to_string(),
        });
        i = end + 1;
    }

    headings
}

/// Replace TOC marker paragraphs and line-break fences.
fn rewrite_blocks<'a>(
    events: Vec<Event<'a>>,
    headings: &[Heading],
    options: &RenderOptions,
) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Paragraph) => {
                if let Some(end) = marker_paragraph_end(&events, i, &options.toc_marker) {
                    let toc = render_toc(headings, &options.toc_levels);
                    out.push(Event::Html(CowStr::from(toc.into_string())));
                    i = end + 1;
                    continue;
                }
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if is_line_break_fence(info) =>
            {
                let mut body = String::new();
                let mut end = i + 1;
                while end < events.len() {
                    match &events[end] {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(t) => body.push_str(t),
                        _ => {}
                    }
                    end += 1;
                }
                out.push(Event::Html(CowStr::from(
                    render_line_breaks(&body).into_string(),
                )));
                i = end + 1;
                continue;
            }
            _ => {}
        }
        out.push(events[i].clone());
        i += 1;
    }

    out
}

fn is_line_break_fence(info: &str) -> bool {
    matches!(info.trim(), "lb" | "linebreak")
}

/// Index of the paragraph end if the paragraph starting at `start` holds only
/// the marker text.
fn marker_paragraph_end(events: &[Event<'_>], start: usize, marker: &str) -> Option<usize> {
    let mut text = String::new();
    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == marker).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }
    None
}

struct TocNode<'h> {
    heading: &'h Heading,
    children: Vec<TocNode<'h>>,
}

/// Nest headings: each heading owns the deeper headings that follow it.
fn toc_tree<'h>(items: &[&'h Heading]) -> Vec<TocNode<'h>> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let level = items[i].level;
        let mut j = i + 1;
        while j < items.len() && items[j].level > level {
            j += 1;
        }
        nodes.push(TocNode {
            heading: items[i],
            children: toc_tree(&items[i + 1..j]),
        });
        i = j;
    }
    nodes
}

fn render_toc(headings: &[Heading], levels: &[u8]) -> Markup {
    let listed: Vec<&Heading> = headings
        .iter()
        .filter(|h| levels.contains(&h.level))
        .collect();
    let tree = toc_tree(&listed);
    html! {
        div.table-of-contents {
            @if !tree.is_empty() {
                (toc_list(&tree))
            }
        }
    }
}

fn toc_list(nodes: &[TocNode<'_>]) -> Markup {
    html! {
        ul {
            @for node in nodes {
                li {
                    a href={ "#" (node.heading.id) } { (node.heading.text) }
                    @if !node.children.is_empty() {
                        (toc_list(&node.children))
                    }
                }
            }
        }
    }
}

fn render_line_breaks(body: &str) -> Markup {
    html! {
        div.line-break-container {
            @for line in body.lines().filter(|l| !l.trim().is_empty()) {
                span.line-break-text { (line) }
            }
        }
    }
}
