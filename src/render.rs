//! Markdown rendering for page bodies.
//!
//! Wraps `pulldown-cmark` with one fixed configuration: pipe tables, fenced
//! code, footnotes, explicit `{#id}` heading attributes, generated heading
//! anchors, and a table of contents collected from the headings. Emphasis
//! markers inside a word are left as literal text. Raw HTML in the source is
//! escaped and shown as text, never passed through, and links or images with
//! a script-capable scheme lose their destination.
//!
//! Rendering is a pure function of the input bytes.

use crate::models::{Rendered, TocEntry};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;
use std::ops::Range;

/// URL schemes that can execute script when followed or loaded.
const UNSAFE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render raw page bytes into HTML plus a table of contents.
///
/// Invalid UTF-8 is replaced rather than rejected; page content is opaque
/// bytes in storage.
pub fn render(raw: &[u8]) -> Rendered {
    let text = String::from_utf8_lossy(raw);
    let parsed: Vec<(Event, Range<usize>)> =
        Parser::new_ext(&text, options()).into_offset_iter().collect();
    let mut events: Vec<Event> = drop_intra_word_emphasis(&text, parsed)
        .into_iter()
        .map(suppress_raw_html)
        .map(neutralize_unsafe_links)
        .collect();
    let toc = assign_heading_ids(&mut events);

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut out, events.into_iter());

    Rendered { html: out, toc }
}

fn suppress_raw_html(event: Event) -> Event {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

fn is_unsafe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn neutralize_unsafe_links(event: Event) -> Event {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

/// Turn emphasis that opens or closes inside a word back into its literal
/// delimiters, so `foo*bar*baz` stays plain text.
///
/// An opening delimiter preceded by a letter or digit, or a closing delimiter
/// followed by one, is intra-word.
fn drop_intra_word_emphasis<'a>(
    source: &'a str,
    parsed: Vec<(Event<'a>, Range<usize>)>,
) -> Vec<Event<'a>> {
    // One entry per open Emphasis/Strong: the closing delimiter to emit
    // as text, or None when the pair is kept.
    let mut open: Vec<Option<&'a str>> = Vec::new();
    let mut events = Vec::with_capacity(parsed.len());

    for (event, range) in parsed {
        match event {
            Event::Start(tag @ (Tag::Emphasis | Tag::Strong)) => {
                let width = if matches!(tag, Tag::Strong) { 2 } else { 1 };
                let before = source[..range.start].chars().next_back();
                let after = source[range.end..].chars().next();
                let delimiters = (range.end - range.start >= 2 * width)
                    .then(|| {
                        let opening = source.get(range.start..range.start + width)?;
                        let closing = source.get(range.end - width..range.end)?;
                        Some((opening, closing))
                    })
                    .flatten();
                match delimiters {
                    Some((opening, closing)) if is_word_char(before) || is_word_char(after) => {
                        events.push(Event::Text(CowStr::Borrowed(opening)));
                        open.push(Some(closing));
                    }
                    _ => {
                        events.push(Event::Start(tag));
                        open.push(None);
                    }
                }
            }
            Event::End(end @ (TagEnd::Emphasis | TagEnd::Strong)) => match open.pop().flatten() {
                Some(closing) => events.push(Event::Text(CowStr::Borrowed(closing))),
                None => events.push(Event::End(end)),
            },
            other => events.push(other),
        }
    }

    events
}

/// Give every heading an anchor id and collect the headings in order.
///
/// Explicit `{#id}` attributes are reserved before any slug is generated, so
/// a generated id never takes one. Generated slugs, and explicit ids repeated
/// on a later heading, are suffixed with `-1`, `-2`, ... until unique.
fn assign_heading_ids(events: &mut [Event]) -> Vec<TocEntry> {
    let reserved: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut toc = Vec::new();

    for i in 0..events.len() {
        let (level, explicit) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (*level, id.as_ref().map(|s| s.to_string()))
            }
            _ => continue,
        };
        let title = heading_text(&events[i + 1..]);
        let id = match explicit {
            Some(id) if !taken.contains(&id) => id,
            Some(id) => unique_id(&id, |c| reserved.contains(c) || taken.contains(c)),
            None => unique_id(&slugify(&title), |c| {
                reserved.contains(c) || taken.contains(c)
            }),
        };
        taken.insert(id.clone());

        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }
        toc.push(TocEntry {
            level: level as u8,
            id,
            title,
        });
    }

    toc
}

fn heading_text(events: &[Event]) -> String {
    let mut title = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => title.push_str(t),
            Event::SoftBreak | Event::HardBreak => title.push(' '),
            _ => {}
        }
    }
    title.trim().to_string()
}

/// Lowercase, keep alphanumerics, and join the rest with single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("section");
    }
    slug
}

fn unique_id(base: &str, in_use: impl Fn(&str) -> bool) -> String {
    let mut candidate = base.to_string();
    let mut n = 1;
    while in_use(&candidate) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    candidate
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a table of contents as a `<nav>` of anchor links.
///
/// Returns an empty string when there are no headings.
pub fn toc_html(toc: &[TocEntry]) -> String {
    if toc.is_empty() {
        return String::new();
    }
    let mut out = String::from("<nav class=\"toc\">\n<ul>\n");
    for entry in toc {
        out.push_str(&format!(
            "<li class=\"toc-h{}\"><a href=\"#{}\">{}</a></li>\n",
            entry.level,
            escape_html(&entry.id),
            escape_html(&entry.title)
        ));
    }
    out.push_str("</ul>\n</nav>\n");
    out
}
