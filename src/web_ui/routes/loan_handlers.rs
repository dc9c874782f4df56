//! Borrowed listings and the renewal form.

use axum::{
    extract::{Form, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::auth::{require_login, require_perm, CAN_MARK_RETURNED};
use crate::catalog::renewal::{clean_renewal_date, proposed_renewal_date};
use crate::db::entities::vegetable_instance;
use crate::error::{CatalogError, Result};
use crate::forms::{format_date, FormField};
use crate::state::AppState;
use super::utils::{render_template, today, visitor, Visitor};

/// Instance on loan, flattened for templates
#[derive(serde::Serialize)]
struct LoanView {
    id: String,
    vegetable_id: Option<i32>,
    title: String,
    borrower: String,
    exp_date: String,
    is_overdue: bool,
}

#[derive(serde::Serialize)]
struct PageView {
    number: u64,
    num_pages: u64,
    has_previous: bool,
    has_next: bool,
}

#[derive(serde::Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RenewForm {
    #[serde(default)]
    pub renewal_date: String,
}

async fn loan_views(
    state: &AppState,
    instances: Vec<vegetable_instance::Model>,
    today: NaiveDate,
) -> Result<Vec<LoanView>> {
    let vegetable_ids: Vec<i32> = instances.iter().filter_map(|i| i.vegetable_id).collect();
    let borrower_ids: Vec<i32> = instances.iter().filter_map(|i| i.borrower_id).collect();
    let vegetables = state.catalog.vegetables_by_ids(&vegetable_ids).await?;
    let borrowers = state.catalog.users_by_ids(&borrower_ids).await?;

    Ok(instances
        .into_iter()
        .map(|inst| LoanView {
            title: inst
                .vegetable_id
                .and_then(|id| vegetables.get(&id))
                .map(|v| v.title.clone())
                .unwrap_or_default(),
            borrower: inst
                .borrower_id
                .and_then(|id| borrowers.get(&id))
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            exp_date: format_date(inst.exp_date),
            is_overdue: inst.is_overdue(today),
            vegetable_id: inst.vegetable_id,
            id: inst.id,
        })
        .collect())
}

/// The requesting user's loans, ten per page
pub async fn my_borrowed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let user = require_login(visitor.user.clone())?;

    let number = match query.page.as_deref() {
        None | Some("") => 1,
        Some(raw) => raw
            .parse()
            .map_err(|_| CatalogError::not_found(format!("Page {}", raw)))?,
    };
    let page = state.catalog.loans_for_user(user.id, number).await?;
    let page_view = PageView {
        number: page.number,
        num_pages: page.num_pages,
        has_previous: page.has_previous(),
        has_next: page.has_next(),
    };
    let loans = loan_views(&state, page.items, today()).await?;

    let mut context = visitor.context();
    context.insert("loans", &loans);
    context.insert("page", &page_view);
    render_template("my_borrowed.html", &context)
}

/// Everything currently on loan, for staff who can renew
pub async fn all_borrowed(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    require_perm(visitor.user.clone(), CAN_MARK_RETURNED)?;

    let loans = loan_views(&state, state.catalog.all_loans().await?, today()).await?;

    let mut context = visitor.context();
    context.insert("loans", &loans);
    render_template("all_borrowed.html", &context)
}

fn renewal_field(value: Option<NaiveDate>) -> FormField {
    FormField::date("renewal_date", "Renewal date", value)
        .required()
        .help("Enter a date between now and 4 weeks (default 3).")
}

async fn render_renewal(
    state: &AppState,
    visitor: &Visitor,
    instance: vegetable_instance::Model,
    field: FormField,
) -> Result<Response> {
    let loan = loan_views(state, vec![instance], today())
        .await?
        .pop()
        .ok_or_else(|| CatalogError::Internal("renewal view missing".into()))?;

    let mut context = visitor.context();
    context.insert("instance", &loan);
    context.insert("field", &field);
    render_template("renew.html", &context)
}

pub async fn renew_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    require_perm(visitor.user.clone(), CAN_MARK_RETURNED)?;
    let instance = state.catalog.get_instance(&id).await?;

    let field = renewal_field(Some(proposed_renewal_date(today())));
    render_renewal(&state, &visitor, instance, field).await
}

pub async fn renew_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<RenewForm>,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let librarian = require_perm(visitor.user.clone(), CAN_MARK_RETURNED)?;
    let instance = state.catalog.get_instance(&id).await?;
    let today = today();

    match clean_renewal_date(&form.renewal_date, today) {
        Ok(date) => {
            state.catalog.renew_instance(&instance.id, date, today).await?;
            tracing::debug!("{} renewed {} until {}", librarian.username, instance.id, date);
            Ok(Redirect::to("/borrowed/").into_response())
        }
        Err(e) => {
            let mut field = renewal_field(None);
            field.value = form.renewal_date;
            field.errors.push(e.to_string());
            render_renewal(&state, &visitor, instance, field).await
        }
    }
}
