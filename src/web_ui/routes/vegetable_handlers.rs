//! Vegetable listing and detail pages.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;

use crate::error::Result;
use crate::forms::format_date;
use crate::state::AppState;
use super::utils::{parse_id, render_template, today, visitor};

#[derive(serde::Serialize)]
struct VegetableRow {
    id: i32,
    title: String,
    farmer: Option<String>,
}

#[derive(serde::Serialize)]
struct VegetableView {
    id: i32,
    title: String,
    summary: String,
    isbn: String,
}

#[derive(serde::Serialize)]
struct FarmerLink {
    id: i32,
    name: String,
}

#[derive(serde::Serialize)]
struct InstanceView {
    id: String,
    harvest: String,
    status: String,
    status_label: &'static str,
    exp_date: String,
    is_overdue: bool,
}

pub async fn vegetable_list(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let vegetables = state.catalog.list_vegetables().await?;
    let farmer_ids: Vec<i32> = vegetables.iter().filter_map(|v| v.farmer_id).collect();
    let farmers = state.catalog.farmers_by_ids(&farmer_ids).await?;

    let rows: Vec<VegetableRow> = vegetables
        .into_iter()
        .map(|v| VegetableRow {
            farmer: v.farmer_id.and_then(|id| farmers.get(&id)).map(|f| f.to_string()),
            id: v.id,
            title: v.title,
        })
        .collect();

    let mut context = visitor.context();
    context.insert("vegetables", &rows);
    render_template("vegetable_list.html", &context)
}

pub async fn vegetable_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let visitor = visitor(&state, &headers).await?;
    let vegetable = state.catalog.get_vegetable(parse_id(&id, "Vegetable")?).await?;

    let farmer = match vegetable.farmer_id {
        Some(farmer_id) => state
            .catalog
            .farmers_by_ids(&[farmer_id])
            .await?
            .remove(&farmer_id)
            .map(|f| FarmerLink { id: f.id, name: f.to_string() }),
        None => None,
    };
    let families = state.catalog.vegetable_families(vegetable.id).await?;
    let today = today();
    let instances: Vec<InstanceView> = state
        .catalog
        .vegetable_instances(vegetable.id)
        .await?
        .into_iter()
        .map(|inst| InstanceView {
            status_label: inst.status_label(),
            exp_date: format_date(inst.exp_date),
            is_overdue: inst.is_overdue(today),
            id: inst.id,
            harvest: inst.harvest,
            status: inst.status,
        })
        .collect();

    let mut context = visitor.context();
    context.insert(
        "vegetable",
        &VegetableView {
            id: vegetable.id,
            title: vegetable.title,
            summary: vegetable.summary,
            isbn: vegetable.isbn,
        },
    );
    context.insert("farmer", &farmer);
    let families: Vec<&str> = families.iter().map(|f| f.name.as_str()).collect();
    context.insert("families", &families.join(", "));
    context.insert("instances", &instances);
    render_template("vegetable_detail.html", &context)
}
