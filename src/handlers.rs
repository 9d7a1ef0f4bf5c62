//! Handlers for the view, edit, and save flows.
//!
//! Path segments are checked against the page-name and version patterns
//! before any store access; anything else is a plain 404. Store work runs on
//! the blocking pool through [`Store::call`](crate::db::Store::call).

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::VersionSelector;
use crate::state::AppState;
use crate::{repo, resolver, templates, validation};

/// Page the root URL redirects to.
pub const FRONT_PAGE: &str = "Main";

/// Form body posted by the edit page.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub code: String,
}

/// 302 redirect, matching what browsers expect after a form post.
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Validate path segments into a page name and version selector.
fn page_target(name: &str, version: Option<&str>) -> AppResult<VersionSelector> {
    validation::validate_page_name(name).map_err(|_| AppError::NoRoute)?;
    let version = match version {
        Some(token) => Some(validation::parse_version_token(token).map_err(|_| AppError::NoRoute)?),
        None => None,
    };
    Ok(VersionSelector::from_option(version))
}

/// GET /
pub async fn root() -> Response {
    found(format!("/view/{}", FRONT_PAGE))
}

/// GET /view/{name}
pub async fn view(State(state): State<AppState>, Path(name): Path<String>) -> AppResult<Response> {
    view_page(state, name, None).await
}

/// GET /view/{name}/{version}
pub async fn view_version(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> AppResult<Response> {
    view_page(state, name, Some(version)).await
}

/// Render the page, or send the browser to the edit form if nothing is
/// stored under that name and version.
async fn view_page(state: AppState, name: String, version: Option<String>) -> AppResult<Response> {
    let selector = page_target(&name, version.as_deref())?;

    let lookup = name.clone();
    let result = state
        .store
        .call(move |conn| resolver::load_view(conn, &lookup, selector))
        .await;

    match result {
        Ok(view) => Ok(Html(templates::view_page(&view)).into_response()),
        Err(e) if e.is_not_found() => {
            tracing::debug!(name = %name, "Page not found, redirecting to edit");
            Ok(found(format!("/edit/{}", name)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /edit/{name}
pub async fn edit(State(state): State<AppState>, Path(name): Path<String>) -> AppResult<Response> {
    edit_page(state, name, None).await
}

/// GET /edit/{name}/{version}
pub async fn edit_version(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> AppResult<Response> {
    edit_page(state, name, Some(version)).await
}

async fn edit_page(state: AppState, name: String, version: Option<String>) -> AppResult<Response> {
    let selector = page_target(&name, version.as_deref())?;

    let view = state
        .store
        .call(move |conn| resolver::load_for_edit(conn, &name, selector))
        .await?;

    Ok(Html(templates::edit_page(&view)).into_response())
}

/// POST /save/{name}
///
/// Appends a new revision and redirects to the view. Storage failures become
/// a 500 for this request only.
pub async fn save(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Form(form): Form<SaveForm>,
) -> AppResult<Response> {
    page_target(&name, None)?;

    let target = name.clone();
    state
        .store
        .call(move |conn| repo::save_page(conn, &target, form.code.as_bytes()))
        .await?;

    Ok(found(format!("/view/{}", name)))
}
