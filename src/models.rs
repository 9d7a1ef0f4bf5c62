//! Core data structures for the wiki.
//!
//! These structs are the shared language between the repository layer (SQL),
//! the resolver, the HTTP templates, and the CLI output layer (serde_json).
//! They are plain data with no business logic.

use serde::{Serialize, Serializer};

/// Storage-assigned row id. Doubles as the revision number: higher is newer.
pub type RevisionId = i64;

/// One immutable stored copy of a page's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRevision {
    pub id: RevisionId,
    pub name: String,
    #[serde(serialize_with = "lossy_text")]
    pub content: Vec<u8>,
}

/// Which revision of a page a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The revision with the highest id for the name.
    Current,
    /// Exactly this revision id, which must belong to the name.
    Exact(RevisionId),
}

impl VersionSelector {
    pub fn from_option(version: Option<RevisionId>) -> Self {
        match version {
            Some(id) => Self::Exact(id),
            None => Self::Current,
        }
    }
}

/// A heading collected while rendering, used to build the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Anchor id emitted on the heading element.
    pub id: String,
    /// Plain text of the heading.
    pub title: String,
}

/// Output of the markup renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Request-scoped view of a page, assembled from one or more revision reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub title: String,
    #[serde(serialize_with = "lossy_text")]
    pub body: Vec<u8>,
    pub rendered_body: String,
    pub toc: Vec<TocEntry>,
    /// Id of the resolved revision; `None` for a page that was never saved.
    pub version: Option<RevisionId>,
    /// Every id ever recorded for `title`, ascending.
    pub known_versions: Vec<RevisionId>,
}

impl PageView {
    /// An empty page, used when the edit flow finds nothing to pre-populate.
    pub fn blank(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: Vec::new(),
            rendered_body: String::new(),
            toc: Vec::new(),
            version: None,
            known_versions: Vec::new(),
        }
    }

    /// A view of `revision` with its history but without rendered output.
    pub fn from_revision(revision: PageRevision, known_versions: Vec<RevisionId>) -> Self {
        Self {
            title: revision.name,
            body: revision.content,
            rendered_body: String::new(),
            toc: Vec::new(),
            version: Some(revision.id),
            known_versions,
        }
    }

    pub fn with_rendered(self, rendered: Rendered) -> Self {
        Self {
            rendered_body: rendered.html,
            toc: rendered.toc,
            ..self
        }
    }

    /// The raw body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Serialize raw page bytes as a string so JSON output stays readable.
fn lossy_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}
