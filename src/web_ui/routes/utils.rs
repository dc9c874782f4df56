//! Shared utilities and helper functions for web UI.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;
use tera::Context;

use crate::auth::CAN_MARK_RETURNED;
use crate::db::entities::user;
use crate::error::{CatalogError, Result};
use crate::session::{session_cookie, session_id_from_headers, AUTH_USER_KEY};
use crate::state::AppState;
use crate::web_ui::templates;

/// Who is making the request
pub struct Visitor {
    /// Session id from the cookie, if the client sent one
    pub session_id: Option<String>,
    pub user: Option<user::Model>,
}

impl Visitor {
    /// Template context with the navigation variables filled in.
    pub fn context(&self) -> Context {
        let mut context = anonymous_context();
        if let Some(user) = &self.user {
            context.insert("current_user", &user.username);
            context.insert("can_mark_returned", &user.has_perm(CAN_MARK_RETURNED));
            context.insert("is_staff", &(user.is_staff || user.is_superuser));
        }
        context
    }
}

pub fn anonymous_context() -> Context {
    let mut context = Context::new();
    context.insert("current_user", &Option::<String>::None);
    context.insert("can_mark_returned", &false);
    context.insert("is_staff", &false);
    context
}

/// Resolve the session cookie to a logged-in user, if any.
pub async fn visitor(state: &AppState, headers: &HeaderMap) -> Result<Visitor> {
    let session_id = session_id_from_headers(headers);
    let user_id = session_id
        .as_deref()
        .and_then(|sid| state.sessions.get(sid, AUTH_USER_KEY))
        .and_then(|v| v.as_i64());

    let user = match (user_id, session_id.as_deref()) {
        (Some(id), Some(sid)) => {
            let user = state.auth.get_user(id as i32).await?;
            if user.is_none() {
                // account deleted while logged in
                state.sessions.remove(sid, AUTH_USER_KEY);
            }
            user
        }
        _ => None,
    };
    Ok(Visitor { session_id, user })
}

/// Helper to render a template
pub fn render_template(name: &str, context: &Context) -> Result<Response> {
    let html = templates::render(name, context)?;
    Ok(Html(html).into_response())
}

/// Attach the session cookie unless the client already holds `session_id`.
pub fn with_session_cookie(mut response: Response, visitor: &Visitor, session_id: &str) -> Response {
    if visitor.session_id.as_deref() == Some(session_id) {
        return response;
    }
    if let Ok(value) = HeaderValue::from_str(&session_cookie(session_id)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Integer path ids; anything else is a missing page, not a bad request.
pub fn parse_id(raw: &str, what: &str) -> Result<i32> {
    raw.parse()
        .map_err(|_| CatalogError::not_found(format!("{} {}", what, raw)))
}
