//! Output formatting for the wiki CLI.
//!
//! This module provides two output modes:
//! - **JSON**: Compact machine-readable output (default)
//! - **Pretty**: Human-readable formatted output (enabled via `--pretty`)

use crate::models::{PageView, Rendered, RevisionId};
use serde::Serialize;

/// Output mode for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Compact JSON output.
    Json,
    /// Human-readable formatted output.
    Pretty,
}

/// Result of `page save`.
#[derive(Debug, Clone, Serialize)]
pub struct Saved {
    pub name: String,
    pub id: RevisionId,
}

/// Result of `page history`.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub name: String,
    pub versions: Vec<RevisionId>,
}

/// Serialize a value to compact JSON and print to stdout.
///
/// # Panics
///
/// Panics if serialization fails, which should only happen if the type has a
/// broken `Serialize` implementation.
pub fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string(value).expect("failed to serialize to JSON");
    println!("{}", json);
}

fn join_ids(ids: &[RevisionId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Print a page view in human-readable format.
///
/// Format:
/// ```text
/// Page:     Main
/// Version:  2
/// Versions: 1, 2
///
/// <raw body>
/// ```
pub fn print_pretty_view(view: &PageView) {
    println!("Page:     {}", view.title);
    match view.version {
        Some(id) => println!("Version:  {}", id),
        None => println!("Version:  (unsaved)"),
    }
    println!("Versions: {}", join_ids(&view.known_versions));
    println!();
    println!("{}", view.body_text());
}

pub fn print_pretty_saved(saved: &Saved) {
    println!("Saved '{}' as version {}", saved.name, saved.id);
}

pub fn print_pretty_history(history: &History) {
    if history.versions.is_empty() {
        println!("(no versions of '{}')", history.name);
        return;
    }
    for id in &history.versions {
        println!("{}/{}", history.name, id);
    }
}

pub fn print_pretty_rendered(rendered: &Rendered) {
    print!("{}", crate::render::toc_html(&rendered.toc));
    print!("{}", rendered.html);
}

/// Generic output dispatcher that handles both JSON and Pretty modes.
///
/// ```ignore
/// print(mode, &view, || print_pretty_view(&view));
/// ```
pub fn print<T: Serialize>(mode: OutputMode, value: &T, pretty_fn: impl FnOnce()) {
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Pretty => pretty_fn(),
    }
}
