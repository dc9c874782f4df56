//! Authentication route handlers for login and logout.

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::session::{expired_session_cookie, AUTH_USER_KEY};
use crate::state::AppState;
use super::utils::{render_template, visitor, with_session_cookie, Visitor};

const LOGIN_FAILED: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(serde::Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form data
#[derive(serde::Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

fn render_login(visitor: &Visitor, username: &str, next: &str, error: Option<&str>) -> Result<Response> {
    let mut context = visitor.context();
    context.insert("username", username);
    context.insert("next", next);
    context.insert("error", &error);
    render_template("login.html", &context)
}

/// Login page (GET)
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    render_login(&visitor, "", query.next.as_deref().unwrap_or(""), None)
}

/// Login submit (POST)
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    match state.auth.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            let session_id = state.sessions.resolve(visitor.session_id.as_deref());
            state.sessions.set(&session_id, AUTH_USER_KEY, Value::from(user.id));
            tracing::info!("User '{}' logged in", user.username);

            let response = Redirect::to(safe_next(form.next.as_deref())).into_response();
            Ok(with_session_cookie(response, &visitor, &session_id))
        }
        Err(CatalogError::AuthFailed) => render_login(
            &visitor,
            &form.username,
            form.next.as_deref().unwrap_or(""),
            Some(LOGIN_FAILED),
        ),
        Err(e) => Err(e),
    }
}

/// Logout (GET)
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    if let Some(session_id) = &visitor.session_id {
        state.sessions.flush(session_id);
    }
    if let Some(user) = &visitor.user {
        tracing::info!("User '{}' logged out", user.username);
    }

    let mut response = Redirect::to("/").into_response();
    if let Ok(value) = HeaderValue::from_str(&expired_session_cookie()) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/myvegetables/")), "/myvegetables/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
