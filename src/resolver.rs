//! Version resolution: turns a page name and an optional version into the
//! revision to show, plus the page's full version history.

use crate::db::WikiError;
use crate::models::{PageRevision, PageView, VersionSelector};
use crate::render;
use crate::repo;
use rusqlite::Connection;

pub use crate::validation::parse_version_token;

/// Fetch the revision selected by `selector`.
///
/// A missing exact version is reported the same way as a missing page.
pub fn resolve(conn: &Connection, name: &str, selector: VersionSelector) -> Result<PageRevision, WikiError> {
    match selector {
        VersionSelector::Current => repo::query_current(conn, name),
        VersionSelector::Exact(id) => repo::query_exact(conn, name, id),
    }
}

/// Build the view of a page: resolved revision, rendered body, history.
///
/// Rendering only happens once a revision has been found.
pub fn load_view(conn: &Connection, name: &str, selector: VersionSelector) -> Result<PageView, WikiError> {
    let revision = resolve(conn, name, selector)?;
    let rendered = render::render(&revision.content);
    let versions = repo::list_version_ids(conn, name)?;
    Ok(PageView::from_revision(revision, versions).with_rendered(rendered))
}

/// Build the page model for the edit form.
///
/// Falls back to a blank page when nothing is stored under `name` (or under
/// the requested version); other errors propagate.
pub fn load_for_edit(conn: &Connection, name: &str, selector: VersionSelector) -> Result<PageView, WikiError> {
    match resolve(conn, name, selector) {
        Ok(revision) => {
            let versions = repo::list_version_ids(conn, name)?;
            Ok(PageView::from_revision(revision, versions))
        }
        Err(e) if e.is_not_found() => Ok(PageView::blank(name)),
        Err(e) => Err(e),
    }
}
