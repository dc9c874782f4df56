//! Web UI Module
//!
//! Server-rendered catalog screens, the loan workflow, login/logout and the
//! admin console. Everything is HTML rendered from embedded tera templates.

mod routes;
mod templates;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Create the web UI router.
pub fn router() -> Router<Arc<AppState>> {
    routes::create_router()
}

/// Render the error page with the given status. Falls back to plain text if
/// the template itself fails.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let mut context = routes::anonymous_context();
    context.insert("status", &status.as_u16());
    context.insert("message", message);

    match templates::render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message.to_string()).into_response(),
    }
}
