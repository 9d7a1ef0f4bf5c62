//! Integration tests for the HTTP surface: view, edit, save, redirects.

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use wiki::config::ServerConfig;
use wiki::db::Store;
use wiki::router::build_app_router;
use wiki::state::AppState;

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        ..ServerConfig::default()
    }
}

fn build_test_app_with(store: Store) -> Router {
    build_app_router(AppState::new(store, test_config()))
}

fn build_test_app() -> Router {
    build_test_app_with(Store::open_in_memory().expect("Failed to open in-memory store"))
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Redirects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_redirects_to_front_page() {
    let app = build_test_app();
    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/view/Main");
}

#[tokio::test]
async fn viewing_unsaved_page_redirects_to_edit() {
    let app = build_test_app();
    let response = get(&app, "/view/Orphan").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/edit/Orphan");
}

#[tokio::test]
async fn viewing_unknown_version_redirects_to_edit() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=%23+Hello").await;

    let response = get(&app, "/view/Main/99").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/edit/Main");
}

// ---------------------------------------------------------------------------
// Save and view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_redirects_to_view_and_renders_markdown() {
    let app = build_test_app();

    let saved = post_form(&app, "/save/Main", "code=%23+Hello").await;
    assert_eq!(saved.status(), StatusCode::FOUND);
    assert_eq!(location(&saved), "/view/Main");

    let response = get(&app, "/view/Main").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1 id=\"hello\">Hello</h1>"), "{html}");
    assert!(html.contains("Version 1"));
}

#[tokio::test]
async fn second_save_is_current_and_first_stays_addressable() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=%23+Hello").await;
    post_form(&app, "/save/Main", "code=%23+World").await;

    let current = body_text(get(&app, "/view/Main").await).await;
    assert!(current.contains("World"));
    assert!(current.contains("Version 2"));
    assert!(current.contains("<a href=\"/view/Main/1\">1</a>"));

    let old = get(&app, "/view/Main/1").await;
    assert_eq!(old.status(), StatusCode::OK);
    let old = body_text(old).await;
    assert!(old.contains("<h1 id=\"hello\">Hello</h1>"));
    assert!(old.contains("Version 1"));
    assert!(old.contains("<a href=\"/view/Main/2\">2</a>"));
}

#[tokio::test]
async fn rendered_view_escapes_raw_html() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=%3Cscript%3Ealert(1)%3C%2Fscript%3E").await;

    let html = body_text(get(&app, "/view/Main").await).await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn editing_unsaved_page_shows_blank_form() {
    let app = build_test_app();
    let response = get(&app, "/edit/Orphan").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("action=\"/save/Orphan\""));
    assert!(html.contains("cols=\"80\">\n</textarea>"));
}

#[tokio::test]
async fn editing_prepopulates_current_content() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=%23+Hello").await;
    post_form(&app, "/save/Main", "code=%23+World").await;

    let html = body_text(get(&app, "/edit/Main").await).await;
    assert!(html.contains(">\n# World</textarea>"), "{html}");
}

#[tokio::test]
async fn editing_explicit_version_prepopulates_that_version() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=%23+Hello").await;
    post_form(&app, "/save/Main", "code=%23+World").await;

    let html = body_text(get(&app, "/edit/Main/1").await).await;
    assert!(html.contains(">\n# Hello</textarea>"), "{html}");
    assert!(html.contains("Based on version 1"));
}

// ---------------------------------------------------------------------------
// Route-level rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_numeric_version_is_404() {
    let app = build_test_app();
    post_form(&app, "/save/Main", "code=x").await;

    assert_eq!(get(&app, "/view/Main/abc").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/edit/Main/-1").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_page_name_is_404() {
    let app = build_test_app();

    assert_eq!(get(&app, "/view/no-dash").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/edit/dot.dot").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/view/a/1/2").await.status(), StatusCode::NOT_FOUND);

    let response = post_form(&app, "/save/bad%20name", "code=x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn save_requires_post() {
    let app = build_test_app();
    let response = get(&app, "/save/Main").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// Failures and shared state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storage_failure_is_500_for_that_request_only() {
    // A store whose schema was never created: every statement fails.
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let app = build_test_app_with(Store::new(conn));

    let response = post_form(&app, "/save/Main", "code=x").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.contains("no such table"), "{text}");

    // The app keeps serving.
    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let response = get(&app, "/view/Main").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn concurrent_saves_all_get_distinct_versions() {
    let store = Store::open_in_memory().unwrap();
    let app = build_test_app_with(store.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            post_form(&app, "/save/Busy", &format!("code=edit+{i}")).await.status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::FOUND);
    }

    let ids = store
        .with_conn(|conn| wiki::repo::list_version_ids(conn, "Busy"))
        .unwrap();
    assert_eq!(ids.len(), 8);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn static_files_are_served() {
    let app = build_test_app();
    let response = get(&app, "/static/wiki.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("nav.toc"));
}
