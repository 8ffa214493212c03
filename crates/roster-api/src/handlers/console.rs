//! `GET /` — the embedded web console, a single static page driving the
//! JSON API from the browser.

use axum::response::Html;

pub async fn page() -> Html<&'static str> {
  Html(include_str!("../console.html"))
}
