//! Administrative console.
//!
//! Every entity type implements [`AdminModel`] once: how to fetch, list,
//! render, parse and persist it. The object-safe [`ModelAdmin`] adapter lets
//! one set of handlers serve all registered models by URL slug.

mod models;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::auth::AuthManager;
use crate::catalog::Catalog;
use crate::error::{CatalogError, FieldErrors, Result};
use crate::forms::{apply_submission, FormData, FormField};

pub use models::{FamilyAdmin, FarmerAdmin, UserAdmin, VegetableAdmin, VegetableInstanceAdmin};

/// List page query
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub exp_date: Option<String>,
}

impl ListQuery {
    /// Query string for this list with `param` replaced by `value`; a blank
    /// value drops the parameter.
    pub fn with(&self, param: &str, value: &str) -> String {
        let mut pairs = Vec::new();
        for (name, current) in [("status", &self.status), ("exp_date", &self.exp_date)] {
            let value = if name == param { Some(value) } else { current.as_deref() };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.push(format!("{}={}", name, value));
            }
        }
        pairs.join("&")
    }
}

/// One table row in a change list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRow {
    pub key: String,
    pub cells: Vec<String>,
}

/// One link in a filter bar (e.g. status = On loan)
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    pub label: String,
    /// Query string the link leads to
    pub query: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterGroup {
    pub title: &'static str,
    pub options: Vec<FilterOption>,
}

/// Related rows shown on a change page
#[derive(Debug, Clone, Serialize)]
pub struct Inline {
    pub title: &'static str,
    pub model: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<AdminRow>,
}

/// Per-entity admin behaviour.
#[async_trait]
pub trait AdminModel: Send + Sync + 'static {
    type Model: Send + Sync;
    type Input: Send + Sync;

    const SLUG: &'static str;
    const NAME: &'static str;
    const NAME_PLURAL: &'static str;
    const LIST_DISPLAY: &'static [&'static str];

    fn key(model: &Self::Model) -> String;
    async fn label(&self, catalog: &Catalog, model: &Self::Model) -> Result<String>;

    async fn count(&self, catalog: &Catalog) -> Result<u64>;
    async fn fetch(&self, catalog: &Catalog, key: &str) -> Result<Self::Model>;
    async fn fetch_all(&self, catalog: &Catalog, query: &ListQuery) -> Result<Vec<Self::Model>>;
    async fn cells(&self, catalog: &Catalog, models: &[Self::Model]) -> Result<Vec<Vec<String>>>;

    /// Fields pre-filled from `model`, or blank for the add page.
    async fn fields(&self, catalog: &Catalog, model: Option<&Self::Model>) -> Result<Vec<FormField>>;
    fn parse(&self, form: &FormData) -> std::result::Result<Self::Input, FieldErrors>;

    async fn create(&self, catalog: &Catalog, input: Self::Input) -> Result<Self::Model>;
    async fn update(&self, catalog: &Catalog, key: &str, input: Self::Input) -> Result<Self::Model>;
    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()>;

    fn filters(&self, _query: &ListQuery) -> Vec<FilterGroup> {
        Vec::new()
    }

    async fn inline(&self, _catalog: &Catalog, _model: &Self::Model) -> Result<Option<Inline>> {
        Ok(None)
    }
}

/// Result of submitting an add/change form
pub enum Submission {
    Saved { key: String, label: String },
    Rejected(Vec<FormField>),
}

/// Object-safe view of an [`AdminModel`] for dispatch by slug.
#[async_trait]
pub trait ModelAdmin: Send + Sync {
    fn slug(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn name_plural(&self) -> &'static str;
    fn list_display(&self) -> &'static [&'static str];
    fn filters(&self, query: &ListQuery) -> Vec<FilterGroup>;

    async fn count(&self, catalog: &Catalog) -> Result<u64>;
    async fn rows(&self, catalog: &Catalog, query: &ListQuery) -> Result<Vec<AdminRow>>;
    async fn object_label(&self, catalog: &Catalog, key: &str) -> Result<String>;
    async fn blank_form(&self, catalog: &Catalog) -> Result<Vec<FormField>>;
    async fn change_form(&self, catalog: &Catalog, key: &str) -> Result<(Vec<FormField>, Option<Inline>)>;
    async fn submit(&self, catalog: &Catalog, key: Option<&str>, form: &FormData) -> Result<Submission>;
    async fn remove(&self, catalog: &Catalog, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: AdminModel> ModelAdmin for T {
    fn slug(&self) -> &'static str {
        T::SLUG
    }

    fn name(&self) -> &'static str {
        T::NAME
    }

    fn name_plural(&self) -> &'static str {
        T::NAME_PLURAL
    }

    fn list_display(&self) -> &'static [&'static str] {
        T::LIST_DISPLAY
    }

    fn filters(&self, query: &ListQuery) -> Vec<FilterGroup> {
        AdminModel::filters(self, query)
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        AdminModel::count(self, catalog).await
    }

    async fn rows(&self, catalog: &Catalog, query: &ListQuery) -> Result<Vec<AdminRow>> {
        let models = self.fetch_all(catalog, query).await?;
        let cells = self.cells(catalog, &models).await?;
        Ok(models
            .iter()
            .zip(cells)
            .map(|(model, cells)| AdminRow {
                key: T::key(model),
                cells,
            })
            .collect())
    }

    async fn object_label(&self, catalog: &Catalog, key: &str) -> Result<String> {
        let model = self.fetch(catalog, key).await?;
        self.label(catalog, &model).await
    }

    async fn blank_form(&self, catalog: &Catalog) -> Result<Vec<FormField>> {
        self.fields(catalog, None).await
    }

    async fn change_form(&self, catalog: &Catalog, key: &str) -> Result<(Vec<FormField>, Option<Inline>)> {
        let model = self.fetch(catalog, key).await?;
        let fields = self.fields(catalog, Some(&model)).await?;
        let inline = self.inline(catalog, &model).await?;
        Ok((fields, inline))
    }

    async fn submit(&self, catalog: &Catalog, key: Option<&str>, form: &FormData) -> Result<Submission> {
        // Resolve the target first so a bad key is a 404, not a form error
        let existing = match key {
            Some(key) => Some(self.fetch(catalog, key).await?),
            None => None,
        };

        let outcome = match self.parse(form) {
            Ok(input) => match key {
                Some(key) => self.update(catalog, key, input).await,
                None => self.create(catalog, input).await,
            },
            Err(errors) => Err(CatalogError::Invalid(errors)),
        };

        match outcome {
            Ok(model) => Ok(Submission::Saved {
                key: T::key(&model),
                label: self.label(catalog, &model).await?,
            }),
            Err(CatalogError::Invalid(errors)) => {
                let mut fields = self.fields(catalog, existing.as_ref()).await?;
                apply_submission(&mut fields, form, &errors);
                Ok(Submission::Rejected(fields))
            }
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, catalog: &Catalog, key: &str) -> Result<()> {
        self.delete(catalog, key).await
    }
}

/// Registry of admin-managed models
pub struct AdminSite {
    models: Vec<Arc<dyn ModelAdmin>>,
}

impl AdminSite {
    pub fn new(auth: AuthManager) -> Self {
        Self {
            models: vec![
                Arc::new(FamilyAdmin),
                Arc::new(FarmerAdmin),
                Arc::new(VegetableAdmin),
                Arc::new(VegetableInstanceAdmin),
                Arc::new(UserAdmin::new(auth)),
            ],
        }
    }

    pub fn models(&self) -> &[Arc<dyn ModelAdmin>] {
        &self.models
    }

    pub fn get(&self, slug: &str) -> Result<Arc<dyn ModelAdmin>> {
        self.models
            .iter()
            .find(|m| m.slug() == slug)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(format!("Admin model '{}'", slug)))
    }
}
