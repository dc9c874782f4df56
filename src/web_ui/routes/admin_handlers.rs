//! Admin console handlers. One set of handlers serves every registered model.

use axum::{
    extract::{Form, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::admin::{Inline, ListQuery, ModelAdmin, Submission};
use crate::auth::require_staff;
use crate::error::Result;
use crate::forms::{FieldKind, FormData, FormField};
use crate::state::AppState;
use super::utils::{render_template, visitor, Visitor};

#[derive(serde::Serialize)]
struct ModelView {
    slug: &'static str,
    name: &'static str,
    name_plural: &'static str,
}

impl ModelView {
    fn of(admin: &dyn ModelAdmin) -> Self {
        Self {
            slug: admin.slug(),
            name: admin.name(),
            name_plural: admin.name_plural(),
        }
    }
}

#[derive(serde::Serialize)]
struct ModelSummary {
    slug: &'static str,
    name_plural: &'static str,
    count: u64,
}

async fn staff_visitor(state: &AppState, headers: &HeaderMap) -> Result<Visitor> {
    let visitor = visitor(state, headers).await?;
    require_staff(visitor.user.clone())?;
    Ok(visitor)
}

fn changelist_url(admin: &dyn ModelAdmin) -> String {
    format!("/admin/{}/", admin.slug())
}

struct FormPage<'a> {
    admin: &'a dyn ModelAdmin,
    heading: String,
    action: String,
    key: Option<&'a str>,
    fields: Vec<FormField>,
    inline: Option<Inline>,
}

fn render_form(visitor: &Visitor, page: FormPage<'_>) -> Result<Response> {
    let has_errors = page
        .fields
        .iter()
        .any(|f| f.kind != FieldKind::ReadOnly && !f.errors.is_empty());

    let mut context = visitor.context();
    context.insert("model", &ModelView::of(page.admin));
    context.insert("heading", &page.heading);
    context.insert("action", &page.action);
    context.insert("key", &page.key);
    context.insert("fields", &page.fields);
    context.insert("inline", &page.inline);
    context.insert("has_errors", &has_errors);
    render_template("admin_form.html", &context)
}

/// Registered models with row counts
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;

    let mut models = Vec::new();
    for admin in state.admin.models() {
        models.push(ModelSummary {
            slug: admin.slug(),
            name_plural: admin.name_plural(),
            count: admin.count(&state.catalog).await?,
        });
    }

    let mut context = visitor.context();
    context.insert("models", &models);
    render_template("admin_index.html", &context)
}

pub async fn changelist(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let rows = admin.rows(&state.catalog, &query).await?;

    let mut context = visitor.context();
    context.insert("model", &ModelView::of(admin.as_ref()));
    context.insert("headers", admin.list_display());
    context.insert("rows", &rows);
    context.insert("filters", &admin.filters(&query));
    render_template("admin_list.html", &context)
}

pub async fn add_page(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let fields = admin.blank_form(&state.catalog).await?;

    render_form(
        &visitor,
        FormPage {
            admin: admin.as_ref(),
            heading: format!("Add {}", admin.name().to_lowercase()),
            action: format!("/admin/{}/add/", admin.slug()),
            key: None,
            fields,
            inline: None,
        },
    )
}

pub async fn add_submit(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let form = FormData::new(pairs);

    match admin.submit(&state.catalog, None, &form).await? {
        Submission::Saved { key, label } => {
            tracing::info!("Admin added {} {} ({})", admin.name(), key, label);
            Ok(Redirect::to(&changelist_url(admin.as_ref())).into_response())
        }
        Submission::Rejected(fields) => render_form(
            &visitor,
            FormPage {
                admin: admin.as_ref(),
                heading: format!("Add {}", admin.name().to_lowercase()),
                action: format!("/admin/{}/add/", admin.slug()),
                key: None,
                fields,
                inline: None,
            },
        ),
    }
}

pub async fn change_page(
    State(state): State<Arc<AppState>>,
    Path((model, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let (fields, inline) = admin.change_form(&state.catalog, &key).await?;
    let label = admin.object_label(&state.catalog, &key).await?;

    render_form(
        &visitor,
        FormPage {
            admin: admin.as_ref(),
            heading: format!("Change {}: {}", admin.name().to_lowercase(), label),
            action: format!("/admin/{}/{}/change/", admin.slug(), key),
            key: Some(&key),
            fields,
            inline,
        },
    )
}

pub async fn change_submit(
    State(state): State<Arc<AppState>>,
    Path((model, key)): Path<(String, String)>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let form = FormData::new(pairs);

    match admin.submit(&state.catalog, Some(&key), &form).await? {
        Submission::Saved { label, .. } => {
            tracing::info!("Admin changed {} {} ({})", admin.name(), key, label);
            Ok(Redirect::to(&changelist_url(admin.as_ref())).into_response())
        }
        Submission::Rejected(fields) => {
            let (_, inline) = admin.change_form(&state.catalog, &key).await?;
            let label = admin.object_label(&state.catalog, &key).await?;
            render_form(
                &visitor,
                FormPage {
                    admin: admin.as_ref(),
                    heading: format!("Change {}: {}", admin.name().to_lowercase(), label),
                    action: format!("/admin/{}/{}/change/", admin.slug(), key),
                    key: Some(&key),
                    fields,
                    inline,
                },
            )
        }
    }
}

pub async fn delete_page(
    State(state): State<Arc<AppState>>,
    Path((model, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    let label = admin.object_label(&state.catalog, &key).await?;

    let mut context = visitor.context();
    context.insert("model", &ModelView::of(admin.as_ref()));
    context.insert("key", &key);
    context.insert("label", &label);
    render_template("admin_confirm_delete.html", &context)
}

pub async fn delete_submit(
    State(state): State<Arc<AppState>>,
    Path((model, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    staff_visitor(&state, &headers).await?;
    let admin = state.admin.get(&model)?;
    admin.remove(&state.catalog, &key).await?;
    tracing::info!("Admin deleted {} {}", admin.name(), key);
    Ok(Redirect::to(&changelist_url(admin.as_ref())).into_response())
}
