//! Repository layer: all SQL for page revisions.
//!
//! Plain functions that take a `rusqlite::Connection` as their first
//! parameter and return `Result<T, WikiError>`. Rows are only ever inserted;
//! there is no update or delete.

use crate::db::WikiError;
use crate::models::{PageRevision, RevisionId};
use crate::validation;
use rusqlite::types::{Type, ValueRef};
use rusqlite::Connection;

/// Map a rusqlite Row to a PageRevision.
/// Expects columns in order: id, name, text
fn row_to_revision(row: &rusqlite::Row) -> Result<PageRevision, rusqlite::Error> {
    // Written as BLOB by this crate, but older rows may hold TEXT.
    let content = match row.get_ref(2)? {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => bytes.to_vec(),
        ValueRef::Null => Vec::new(),
        ValueRef::Integer(_) => {
            return Err(rusqlite::Error::InvalidColumnType(2, "text".to_string(), Type::Integer))
        }
        ValueRef::Real(_) => {
            return Err(rusqlite::Error::InvalidColumnType(2, "text".to_string(), Type::Real))
        }
    };
    Ok(PageRevision {
        id: row.get(0)?,
        name: row.get(1)?,
        content,
    })
}

fn not_found(name: &str, id: Option<RevisionId>) -> WikiError {
    match id {
        Some(id) => WikiError::NotFound(format!("Page '{}' has no version {}", name, id)),
        None => WikiError::NotFound(format!("Page '{}' not found", name)),
    }
}

/// Appends one revision row and returns its storage-assigned id.
///
/// The insert runs in its own transaction, committed before returning.
///
/// # Errors
/// Returns `WikiError::Db` if the statement or the commit fails.
pub fn insert_revision(conn: &Connection, name: &str, content: &[u8]) -> Result<RevisionId, WikiError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO pages (name, text) VALUES (?1, ?2)",
        rusqlite::params![name, content],
    )
    .map_err(WikiError::Db)?;
    let id = tx.last_insert_rowid();

    tx.commit()?;

    Ok(id)
}

/// Retrieves the current (highest id) revision of a page.
///
/// # Errors
/// Returns `WikiError::NotFound` if the page was never saved.
pub fn query_current(conn: &Connection, name: &str) -> Result<PageRevision, WikiError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, text FROM pages
             WHERE id = (SELECT MAX(id) FROM pages WHERE name = ?1)",
        )
        .map_err(WikiError::Db)?;

    let revision = stmt
        .query_row([name], |row| row_to_revision(row))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => not_found(name, None),
            _ => WikiError::Db(e),
        })?;

    tracing::debug!(name, id = revision.id, "Read current revision");
    Ok(revision)
}

/// Retrieves one exact revision of a page.
///
/// # Errors
/// Returns `WikiError::NotFound` if `id` does not exist or belongs to another
/// page.
pub fn query_exact(conn: &Connection, name: &str, id: RevisionId) -> Result<PageRevision, WikiError> {
    let mut stmt = conn
        .prepare("SELECT id, name, text FROM pages WHERE id = ?1 AND name = ?2")
        .map_err(WikiError::Db)?;

    let revision = stmt
        .query_row(rusqlite::params![id, name], |row| row_to_revision(row))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => not_found(name, Some(id)),
            _ => WikiError::Db(e),
        })?;

    tracing::debug!(name, id, "Read versioned revision");
    Ok(revision)
}

/// Lists every revision id recorded for a page, oldest first.
///
/// Returns an empty vector for a page that was never saved.
pub fn list_version_ids(conn: &Connection, name: &str) -> Result<Vec<RevisionId>, WikiError> {
    let mut stmt = conn
        .prepare("SELECT id FROM pages WHERE name = ?1 ORDER BY id")
        .map_err(WikiError::Db)?;

    let ids = stmt
        .query_map([name], |row| row.get(0))
        .map_err(WikiError::Db)?
        .collect::<Result<Vec<RevisionId>, _>>()
        .map_err(WikiError::Db)?;

    Ok(ids)
}

/// Saves new content for a page. Always appends; never merges.
///
/// Saving identical content twice produces two revisions.
///
/// # Errors
/// Returns `WikiError::InvalidInput` for a bad page name, `WikiError::Db` if
/// the insert fails.
pub fn save_page(conn: &Connection, name: &str, content: &[u8]) -> Result<RevisionId, WikiError> {
    validation::validate_page_name(name)?;
    let id = insert_revision(conn, name, content)?;
    tracing::info!(name, id, bytes = content.len(), "Saved page revision");
    Ok(id)
}

// =============================================================================
// Tests
// =============================================================================
