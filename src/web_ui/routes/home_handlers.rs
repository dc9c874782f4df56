//! Home page and health check.

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;

use crate::error::Result;
use crate::session::VISITS_KEY;
use crate::state::AppState;
use super::utils::{render_template, visitor, with_session_cookie};

/// Home page: catalog counts and the per-session visit counter
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let session_id = state.sessions.resolve(visitor.session_id.as_deref());
    // Shows previous visits; this one is counted for next time
    let num_visits = state.sessions.increment(&session_id, VISITS_KEY);
    let counts = state.catalog.counts().await?;

    let mut context = visitor.context();
    context.insert("counts", &counts);
    context.insert("num_visits", &num_visits);

    let response = render_template("index.html", &context)?;
    Ok(with_session_cookie(response, &visitor, &session_id))
}

pub async fn health() -> &'static str {
    "OK"
}
