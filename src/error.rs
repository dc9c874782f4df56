use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::web_ui;

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise `CatalogError::Invalid`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Invalid(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn not_found(what: impl fmt::Display) -> Self {
        CatalogError::NotFound(what.to_string())
    }

    /// Single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        CatalogError::Invalid(errors)
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            CatalogError::AuthRequired => {
                return Redirect::to("/accounts/login/").into_response();
            }
            CatalogError::AuthFailed => (StatusCode::FORBIDDEN, self.to_string()),
            CatalogError::PermissionDenied => {
                tracing::warn!("Permission denied");
                (StatusCode::FORBIDDEN, self.to_string())
            }
            CatalogError::Invalid(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            CatalogError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            CatalogError::Template(e) => {
                tracing::error!("Template error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            CatalogError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        web_ui::error_page(status, &message)
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
