//! Farmer listing, detail and the create/update/delete screens.

use axum::{
    extract::{Form, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::catalog::FarmerInput;
use crate::db::entities::farmer;
use crate::error::{CatalogError, FieldErrors, Result};
use crate::forms::{apply_submission, format_date, Choice, FormData, FormField};
use crate::state::AppState;
use super::utils::{parse_id, render_template, visitor, Visitor};

#[derive(serde::Serialize)]
struct FarmerView {
    id: i32,
    name: String,
    born: String,
    died: String,
}

impl From<&farmer::Model> for FarmerView {
    fn from(f: &farmer::Model) -> Self {
        Self {
            id: f.id,
            name: f.to_string(),
            born: format_date(f.date_of_birth),
            died: format_date(f.date_of_death),
        }
    }
}

#[derive(serde::Serialize)]
struct VegetableSummary {
    id: i32,
    title: String,
    summary: String,
}

/// Prefilled date of death on the create form
fn initial_date_of_death() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2018, 5, 1)
}

fn farmer_fields(first: &str, last: &str, born: Option<NaiveDate>, died: Option<NaiveDate>) -> Vec<FormField> {
    vec![
        FormField::text("first_name", "First name", first).required(),
        FormField::text("last_name", "Last name", last).required(),
        FormField::date("date_of_birth", "Date of birth", born),
        FormField::date("date_of_death", "Died", died),
    ]
}

/// The create form also picks families; the update form leaves them alone.
async fn create_fields(state: &AppState) -> Result<Vec<FormField>> {
    let families = state
        .catalog
        .list_families()
        .await?
        .into_iter()
        .map(|f| Choice::new(f.id, f.name))
        .collect();
    let mut fields = farmer_fields("", "", None, initial_date_of_death());
    fields.push(FormField::multi_select("families", "Families", families, &[]));
    Ok(fields)
}

/// Parse the submitted form. Without `with_families` the farmer's family
/// links stay as they are.
fn parse_farmer(form: &FormData, with_families: bool) -> (FarmerInput, FieldErrors) {
    let mut errors = FieldErrors::new();
    let input = FarmerInput {
        first_name: form.text("first_name"),
        last_name: form.text("last_name"),
        date_of_birth: form.optional_date("date_of_birth", &mut errors),
        date_of_death: form.optional_date("date_of_death", &mut errors),
        family_ids: with_families.then(|| form.ids("families", &mut errors)),
    };
    errors.merge(input.validate());
    (input, errors)
}

fn render_form(visitor: &Visitor, heading: &str, action: &str, cancel_url: &str, fields: &[FormField]) -> Result<Response> {
    let mut context = visitor.context();
    context.insert("heading", heading);
    context.insert("action", action);
    context.insert("cancel_url", cancel_url);
    context.insert("fields", fields);
    render_template("farmer_form.html", &context)
}

/// Re-render showing what was submitted alongside the errors.
fn rejected(
    visitor: &Visitor,
    (heading, action, cancel_url): (&str, &str, &str),
    mut fields: Vec<FormField>,
    form: &FormData,
    errors: FieldErrors,
) -> Result<Response> {
    apply_submission(&mut fields, form, &errors);
    render_form(visitor, heading, action, cancel_url, &fields)
}

pub async fn farmer_list(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let farmers: Vec<FarmerView> = state.catalog.list_farmers().await?.iter().map(FarmerView::from).collect();

    let mut context = visitor.context();
    context.insert("farmers", &farmers);
    render_template("farmer_list.html", &context)
}

pub async fn farmer_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let farmer = state.catalog.get_farmer(parse_id(&id, "Farmer")?).await?;
    let families = state.catalog.farmer_families(farmer.id).await?;
    let vegetables: Vec<VegetableSummary> = state
        .catalog
        .farmer_vegetables(farmer.id)
        .await?
        .into_iter()
        .map(|v| VegetableSummary {
            id: v.id,
            title: v.title,
            summary: v.summary,
        })
        .collect();

    let family_names: Vec<&str> = families.iter().map(|f| f.name.as_str()).collect();
    let mut context = visitor.context();
    context.insert("farmer", &FarmerView::from(&farmer));
    context.insert("families", &family_names.join(", "));
    context.insert("vegetables", &vegetables);
    render_template("farmer_detail.html", &context)
}

pub async fn create_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let fields = create_fields(&state).await?;
    render_form(&visitor, "Create farmer", "/farmer/create/", "/farmers/", &fields)
}

pub async fn create_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let page = ("Create farmer", "/farmer/create/", "/farmers/");
    let form = FormData::new(pairs);
    let (input, errors) = parse_farmer(&form, true);
    if !errors.is_empty() {
        return rejected(&visitor, page, create_fields(&state).await?, &form, errors);
    }

    match state.catalog.create_farmer(input).await {
        Ok(farmer) => Ok(Redirect::to(&format!("/farmer/{}", farmer.id)).into_response()),
        Err(CatalogError::Invalid(errors)) => {
            rejected(&visitor, page, create_fields(&state).await?, &form, errors)
        }
        Err(e) => Err(e),
    }
}

pub async fn update_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let farmer = state.catalog.get_farmer(parse_id(&id, "Farmer")?).await?;
    let fields = farmer_fields(&farmer.first_name, &farmer.last_name, farmer.date_of_birth, farmer.date_of_death);
    let action = format!("/farmer/{}/update/", farmer.id);
    let cancel_url = format!("/farmer/{}", farmer.id);
    render_form(&visitor, &format!("Update {}", farmer), &action, &cancel_url, &fields)
}

pub async fn update_submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let farmer = state.catalog.get_farmer(parse_id(&id, "Farmer")?).await?;
    let heading = format!("Update {}", farmer);
    let action = format!("/farmer/{}/update/", farmer.id);
    let cancel_url = format!("/farmer/{}", farmer.id);

    let page = (heading.as_str(), action.as_str(), cancel_url.as_str());
    let blank = || farmer_fields("", "", None, None);

    let form = FormData::new(pairs);
    let (input, errors) = parse_farmer(&form, false);
    if !errors.is_empty() {
        return rejected(&visitor, page, blank(), &form, errors);
    }

    match state.catalog.update_farmer(farmer.id, input).await {
        Ok(updated) => Ok(Redirect::to(&format!("/farmer/{}", updated.id)).into_response()),
        Err(CatalogError::Invalid(errors)) => rejected(&visitor, page, blank(), &form, errors),
        Err(e) => Err(e),
    }
}

pub async fn delete_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let farmer = state.catalog.get_farmer(parse_id(&id, "Farmer")?).await?;
    let vegetable_count = state.catalog.farmer_vegetables(farmer.id).await?.len();

    let mut context = visitor.context();
    context.insert("farmer", &FarmerView::from(&farmer));
    context.insert("vegetable_count", &vegetable_count);
    render_template("farmer_confirm_delete.html", &context)
}

pub async fn delete_submit(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Response> {
    state.catalog.delete_farmer(parse_id(&id, "Farmer")?).await?;
    Ok(Redirect::to("/farmers/").into_response())
}
