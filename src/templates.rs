//! HTML pages for the view and edit flows.
//!
//! Everything interpolated here is escaped except the rendered Markdown body,
//! which the renderer already produced with raw HTML suppressed.

use crate::models::PageView;
use crate::render::{escape_html, toc_html};

fn layout(title: &str, main: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/wiki.css\">\n</head>\n<body>\n{main}</body>\n</html>\n",
        title = escape_html(title),
        main = main,
    )
}

fn version_links(view: &PageView) -> String {
    if view.known_versions.is_empty() {
        return String::new();
    }
    let name = escape_html(&view.title);
    let mut out = String::from("<p class=\"versions\">Versions: ");
    for id in &view.known_versions {
        if Some(*id) == view.version {
            out.push_str(&format!("<strong>{}</strong> ", id));
        } else {
            out.push_str(&format!("<a href=\"/view/{}/{}\">{}</a> ", name, id, id));
        }
    }
    out.push_str("</p>\n");
    out
}

/// The read-only page: heading, history links, table of contents, body.
pub fn view_page(view: &PageView) -> String {
    let name = escape_html(&view.title);
    let edit_href = match view.version {
        Some(id) => format!("/edit/{}/{}", name, id),
        None => format!("/edit/{}", name),
    };
    let mut main = format!("<h1>{}</h1>\n", name);
    if let Some(id) = view.version {
        main.push_str(&format!("<p class=\"version\">Version {}</p>\n", id));
    }
    main.push_str(&format!("<p>[<a href=\"{}\">edit</a>]</p>\n", edit_href));
    main.push_str(&version_links(view));
    main.push_str(&toc_html(&view.toc));
    main.push_str("<div class=\"body\">\n");
    main.push_str(&view.rendered_body);
    main.push_str("</div>\n");
    layout(&view.title, &main)
}

/// The edit form, pre-filled with the page body (empty for a new page).
///
/// A newline follows the opening `<textarea>` tag because HTML parsers drop
/// the first newline of its content; a body starting with a newline keeps it.
pub fn edit_page(view: &PageView) -> String {
    let name = escape_html(&view.title);
    let mut main = format!("<h1>Editing {}</h1>\n", name);
    if let Some(id) = view.version {
        main.push_str(&format!("<p class=\"version\">Based on version {}</p>\n", id));
    }
    main.push_str(&format!(
        "<form action=\"/save/{name}\" method=\"POST\">\n\
         <textarea name=\"code\" rows=\"20\" cols=\"80\">\n{body}</textarea>\n\
         <div><input type=\"submit\" value=\"Save\"></div>\n\
         </form>\n",
        name = name,
        body = escape_html(&view.body_text()),
    ));
    main.push_str(&version_links(view));
    layout(&format!("Editing {}", view.title), &main)
}
