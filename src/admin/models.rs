//! Admin registrations for the catalog entities.

use async_trait::async_trait;
use sea_orm::{EntityTrait, PaginatorTrait};

use super::{AdminModel, AdminRow, FilterGroup, FilterOption, Inline, ListQuery};
use crate::auth::{AuthManager, UserInput, PERMISSIONS};
use crate::catalog::{Catalog, DueFilter, FamilyInput, FarmerInput, InstanceInput, VegetableInput};
use crate::db::entities::vegetable_instance::LoanStatus;
use crate::db::entities::{family, farmer, user, vegetable, vegetable_instance};
use crate::error::{CatalogError, FieldErrors, Result};
use crate::forms::{format_date, status_choices, Choice, FormData, FormField};

/// Shown for empty optional values in change lists.
const EMPTY_VALUE: &str = "-";

fn or_empty(value: String) -> String {
    if value.is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        value
    }
}

fn parse_key(key: &str, what: &str) -> Result<i32> {
    key.parse()
        .map_err(|_| CatalogError::not_found(format!("{} {}", what, key)))
}

/// Field rules run even when some inputs failed to parse, so every problem
/// shows up at once.
fn finish<I>(input: I, mut errors: FieldErrors, validate: impl Fn(&I) -> FieldErrors) -> std::result::Result<I, FieldErrors> {
    errors.merge(validate(&input));
    if errors.is_empty() {
        Ok(input)
    } else {
        Err(errors)
    }
}

async fn family_choices(catalog: &Catalog) -> Result<Vec<Choice>> {
    Ok(catalog
        .list_families()
        .await?
        .into_iter()
        .map(|f| Choice::new(f.id, f.name))
        .collect())
}

fn family_keys(families: &[family::Model]) -> Vec<String> {
    families.iter().map(|f| f.id.to_string()).collect()
}

pub struct FamilyAdmin;

#[async_trait]
impl AdminModel for FamilyAdmin {
    type Model = family::Model;
    type Input = FamilyInput;

    const SLUG: &'static str = "family";
    const NAME: &'static str = "Family";
    const NAME_PLURAL: &'static str = "Families";
    const LIST_DISPLAY: &'static [&'static str] = &["Name"];

    fn key(model: &family::Model) -> String {
        model.id.to_string()
    }

    async fn label(&self, _catalog: &Catalog, model: &family::Model) -> Result<String> {
        Ok(model.name.clone())
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        Ok(family::Entity::find().count(catalog.db()).await?)
    }

    async fn fetch(&self, catalog: &Catalog, key: &str) -> Result<family::Model> {
        catalog.get_family(parse_key(key, "Family")?).await
    }

    async fn fetch_all(&self, catalog: &Catalog, _query: &ListQuery) -> Result<Vec<family::Model>> {
        catalog.list_families().await
    }

    async fn cells(&self, _catalog: &Catalog, models: &[family::Model]) -> Result<Vec<Vec<String>>> {
        Ok(models.iter().map(|f| vec![f.name.clone()]).collect())
    }

    async fn fields(&self, _catalog: &Catalog, model: Option<&family::Model>) -> Result<Vec<FormField>> {
        let name = model.map(|f| f.name.clone()).unwrap_or_default();
        Ok(vec![FormField::text("name", "Name", name)
            .required()
            .help("Enter a vegetable family (e.g. Root Vegetable, Allium)")])
    }

    fn parse(&self, form: &FormData) -> std::result::Result<FamilyInput, FieldErrors> {
        finish(FamilyInput { name: form.text("name") }, FieldErrors::new(), FamilyInput::validate)
    }

    async fn create(&self, catalog: &Catalog, input: FamilyInput) -> Result<family::Model> {
        catalog.create_family(input).await
    }

    async fn update(&self, catalog: &Catalog, key: &str, input: FamilyInput) -> Result<family::Model> {
        catalog.update_family(parse_key(key, "Family")?, input).await
    }

    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()> {
        catalog.delete_family(parse_key(key, "Family")?).await
    }
}

pub struct FarmerAdmin;

#[async_trait]
impl AdminModel for FarmerAdmin {
    type Model = farmer::Model;
    type Input = FarmerInput;

    const SLUG: &'static str = "farmer";
    const NAME: &'static str = "Farmer";
    const NAME_PLURAL: &'static str = "Farmers";
    const LIST_DISPLAY: &'static [&'static str] = &["Last name", "First name", "Date of birth", "Died"];

    fn key(model: &farmer::Model) -> String {
        model.id.to_string()
    }

    async fn label(&self, _catalog: &Catalog, model: &farmer::Model) -> Result<String> {
        Ok(model.to_string())
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        Ok(farmer::Entity::find().count(catalog.db()).await?)
    }

    async fn fetch(&self, catalog: &Catalog, key: &str) -> Result<farmer::Model> {
        catalog.get_farmer(parse_key(key, "Farmer")?).await
    }

    async fn fetch_all(&self, catalog: &Catalog, _query: &ListQuery) -> Result<Vec<farmer::Model>> {
        catalog.list_farmers().await
    }

    async fn cells(&self, _catalog: &Catalog, models: &[farmer::Model]) -> Result<Vec<Vec<String>>> {
        Ok(models
            .iter()
            .map(|f| {
                vec![
                    f.last_name.clone(),
                    f.first_name.clone(),
                    or_empty(format_date(f.date_of_birth)),
                    or_empty(format_date(f.date_of_death)),
                ]
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog, model: Option<&farmer::Model>) -> Result<Vec<FormField>> {
        let selected = match model {
            Some(f) => family_keys(&catalog.farmer_families(f.id).await?),
            None => Vec::new(),
        };
        Ok(vec![
            FormField::text("first_name", "First name", model.map(|f| f.first_name.clone()).unwrap_or_default()).required(),
            FormField::text("last_name", "Last name", model.map(|f| f.last_name.clone()).unwrap_or_default()).required(),
            FormField::date("date_of_birth", "Date of birth", model.and_then(|f| f.date_of_birth)),
            FormField::date("date_of_death", "Died", model.and_then(|f| f.date_of_death)),
            FormField::multi_select("families", "Families", family_choices(catalog).await?, &selected),
        ])
    }

    fn parse(&self, form: &FormData) -> std::result::Result<FarmerInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = FarmerInput {
            first_name: form.text("first_name"),
            last_name: form.text("last_name"),
            date_of_birth: form.optional_date("date_of_birth", &mut errors),
            date_of_death: form.optional_date("date_of_death", &mut errors),
            family_ids: Some(form.ids("families", &mut errors)),
        };
        finish(input, errors, FarmerInput::validate)
    }

    async fn create(&self, catalog: &Catalog, input: FarmerInput) -> Result<farmer::Model> {
        catalog.create_farmer(input).await
    }

    async fn update(&self, catalog: &Catalog, key: &str, input: FarmerInput) -> Result<farmer::Model> {
        catalog.update_farmer(parse_key(key, "Farmer")?, input).await
    }

    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()> {
        catalog.delete_farmer(parse_key(key, "Farmer")?).await
    }
}

pub struct VegetableAdmin;

#[async_trait]
impl AdminModel for VegetableAdmin {
    type Model = vegetable::Model;
    type Input = VegetableInput;

    const SLUG: &'static str = "vegetable";
    const NAME: &'static str = "Vegetable";
    const NAME_PLURAL: &'static str = "Vegetables";
    const LIST_DISPLAY: &'static [&'static str] = &["Title", "Farmer", "Family"];

    fn key(model: &vegetable::Model) -> String {
        model.id.to_string()
    }

    async fn label(&self, _catalog: &Catalog, model: &vegetable::Model) -> Result<String> {
        Ok(model.title.clone())
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        Ok(vegetable::Entity::find().count(catalog.db()).await?)
    }

    async fn fetch(&self, catalog: &Catalog, key: &str) -> Result<vegetable::Model> {
        catalog.get_vegetable(parse_key(key, "Vegetable")?).await
    }

    async fn fetch_all(&self, catalog: &Catalog, _query: &ListQuery) -> Result<Vec<vegetable::Model>> {
        catalog.list_vegetables().await
    }

    async fn cells(&self, catalog: &Catalog, models: &[vegetable::Model]) -> Result<Vec<Vec<String>>> {
        let farmer_ids: Vec<i32> = models.iter().filter_map(|v| v.farmer_id).collect();
        let farmers = catalog.farmers_by_ids(&farmer_ids).await?;

        let mut rows = Vec::with_capacity(models.len());
        for veg in models {
            let farmer = veg
                .farmer_id
                .and_then(|id| farmers.get(&id))
                .map(|f| f.to_string())
                .unwrap_or_default();
            let families = catalog.display_family(veg.id).await?;
            rows.push(vec![veg.title.clone(), or_empty(farmer), families]);
        }
        Ok(rows)
    }

    async fn fields(&self, catalog: &Catalog, model: Option<&vegetable::Model>) -> Result<Vec<FormField>> {
        let farmers = catalog
            .list_farmers()
            .await?
            .into_iter()
            .map(|f| Choice::new(f.id, f.to_string()))
            .collect();
        let selected = match model {
            Some(v) => family_keys(&catalog.vegetable_families(v.id).await?),
            None => Vec::new(),
        };
        let (title, summary, isbn) = model
            .map(|v| (v.title.clone(), v.summary.clone(), v.isbn.clone()))
            .unwrap_or_default();

        Ok(vec![
            FormField::text("title", "Title", title).required(),
            FormField::select("farmer", "Farmer", farmers, model.and_then(|v| v.farmer_id).map(|id| id.to_string())),
            FormField::textarea("summary", "Summary", summary)
                .required()
                .help("Enter a brief description of the vegetable"),
            FormField::text("isbn", "ISBN", isbn)
                .required()
                .help("13 Character ISBN number"),
            FormField::multi_select("families", "Families", family_choices(catalog).await?, &selected)
                .help("Select a family for this vegetable"),
        ])
    }

    fn parse(&self, form: &FormData) -> std::result::Result<VegetableInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = VegetableInput {
            title: form.text("title"),
            summary: form.text("summary"),
            isbn: form.text("isbn"),
            farmer_id: form.optional_id("farmer", &mut errors),
            family_ids: Some(form.ids("families", &mut errors)),
        };
        finish(input, errors, VegetableInput::validate)
    }

    async fn create(&self, catalog: &Catalog, input: VegetableInput) -> Result<vegetable::Model> {
        catalog.create_vegetable(input).await
    }

    async fn update(&self, catalog: &Catalog, key: &str, input: VegetableInput) -> Result<vegetable::Model> {
        catalog.update_vegetable(parse_key(key, "Vegetable")?, input).await
    }

    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()> {
        catalog.delete_vegetable(parse_key(key, "Vegetable")?).await
    }

    async fn inline(&self, catalog: &Catalog, model: &vegetable::Model) -> Result<Option<Inline>> {
        let rows = catalog
            .vegetable_instances(model.id)
            .await?
            .into_iter()
            .map(|inst| AdminRow {
                cells: vec![
                    inst.id.clone(),
                    inst.harvest.clone(),
                    or_empty(inst.status_label().to_string()),
                    or_empty(format_date(inst.exp_date)),
                ],
                key: inst.id,
            })
            .collect();
        Ok(Some(Inline {
            title: "Vegetable instances",
            model: VegetableInstanceAdmin::SLUG,
            headers: &["Id", "Harvest", "Status", "Due back"],
            rows,
        }))
    }
}

pub struct VegetableInstanceAdmin;

#[async_trait]
impl AdminModel for VegetableInstanceAdmin {
    type Model = vegetable_instance::Model;
    type Input = InstanceInput;

    const SLUG: &'static str = "vegetableinstance";
    const NAME: &'static str = "Vegetable instance";
    const NAME_PLURAL: &'static str = "Vegetable instances";
    const LIST_DISPLAY: &'static [&'static str] = &["Vegetable", "Status", "Borrower", "Due back", "Id"];

    fn key(model: &vegetable_instance::Model) -> String {
        model.id.clone()
    }

    async fn label(&self, catalog: &Catalog, model: &vegetable_instance::Model) -> Result<String> {
        let title = match model.vegetable_id {
            Some(id) => catalog.vegetables_by_ids(&[id]).await?.remove(&id).map(|v| v.title),
            None => None,
        };
        Ok(format!("{} ({})", model.id, title.unwrap_or_default()))
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        Ok(vegetable_instance::Entity::find().count(catalog.db()).await?)
    }

    async fn fetch(&self, catalog: &Catalog, key: &str) -> Result<vegetable_instance::Model> {
        catalog.get_instance(key).await
    }

    async fn fetch_all(&self, catalog: &Catalog, query: &ListQuery) -> Result<Vec<vegetable_instance::Model>> {
        let status = query.status.as_deref().and_then(LoanStatus::from_code);
        match query.exp_date.as_deref().and_then(DueFilter::from_code) {
            Some(due) => {
                let today = chrono::Local::now().date_naive();
                catalog.filter_instances(status, due, today).await
            }
            None => catalog.list_instances(status).await,
        }
    }

    async fn cells(&self, catalog: &Catalog, models: &[vegetable_instance::Model]) -> Result<Vec<Vec<String>>> {
        let vegetable_ids: Vec<i32> = models.iter().filter_map(|i| i.vegetable_id).collect();
        let borrower_ids: Vec<i32> = models.iter().filter_map(|i| i.borrower_id).collect();
        let vegetables = catalog.vegetables_by_ids(&vegetable_ids).await?;
        let borrowers = catalog.users_by_ids(&borrower_ids).await?;

        Ok(models
            .iter()
            .map(|inst| {
                let title = inst
                    .vegetable_id
                    .and_then(|id| vegetables.get(&id))
                    .map(|v| v.title.clone())
                    .unwrap_or_default();
                let borrower = inst
                    .borrower_id
                    .and_then(|id| borrowers.get(&id))
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                vec![
                    or_empty(title),
                    or_empty(inst.status_label().to_string()),
                    or_empty(borrower),
                    or_empty(format_date(inst.exp_date)),
                    inst.id.clone(),
                ]
            })
            .collect())
    }

    async fn fields(&self, catalog: &Catalog, model: Option<&vegetable_instance::Model>) -> Result<Vec<FormField>> {
        let vegetables = catalog
            .list_vegetables()
            .await?
            .into_iter()
            .map(|v| Choice::new(v.id, v.title))
            .collect();
        let users = catalog
            .list_users()
            .await?
            .into_iter()
            .map(|u| Choice::new(u.id, u.username))
            .collect();

        let mut fields = Vec::new();
        if let Some(inst) = model {
            fields.push(FormField::read_only("id", "Id", inst.id.clone()));
        }
        fields.extend([
            FormField::select(
                "vegetable",
                "Vegetable",
                vegetables,
                model.and_then(|i| i.vegetable_id).map(|id| id.to_string()),
            ),
            FormField::text("harvest", "Harvest", model.map(|i| i.harvest.clone()).unwrap_or_default()).required(),
            FormField::select(
                "status",
                "Status",
                status_choices(),
                Some(model.map(|i| i.status.clone()).unwrap_or_else(|| LoanStatus::default().code().to_string())),
            )
            .help("Vegetable availability"),
            FormField::date("exp_date", "Due back", model.and_then(|i| i.exp_date)),
            FormField::select(
                "borrower",
                "Borrower",
                users,
                model.and_then(|i| i.borrower_id).map(|id| id.to_string()),
            ),
        ]);
        Ok(fields)
    }

    fn parse(&self, form: &FormData) -> std::result::Result<InstanceInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = InstanceInput {
            vegetable_id: form.optional_id("vegetable", &mut errors),
            harvest: form.text("harvest"),
            exp_date: form.optional_date("exp_date", &mut errors),
            status: form.status("status", &mut errors),
            borrower_id: form.optional_id("borrower", &mut errors),
        };
        finish(input, errors, InstanceInput::validate)
    }

    async fn create(&self, catalog: &Catalog, input: InstanceInput) -> Result<vegetable_instance::Model> {
        catalog.create_instance(input).await
    }

    async fn update(&self, catalog: &Catalog, key: &str, input: InstanceInput) -> Result<vegetable_instance::Model> {
        catalog.update_instance(key, input).await
    }

    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()> {
        catalog.delete_instance(key).await
    }

    fn filters(&self, query: &ListQuery) -> Vec<FilterGroup> {
        let status = query.status.as_deref().and_then(LoanStatus::from_code);
        let due = query.exp_date.as_deref().and_then(DueFilter::from_code);

        let by_status = std::iter::once(FilterOption {
            label: "All".to_string(),
            query: query.with("status", ""),
            active: status.is_none(),
        })
        .chain(LoanStatus::ALL.iter().map(|s| FilterOption {
            label: s.label().to_string(),
            query: query.with("status", s.code()),
            active: status == Some(*s),
        }))
        .collect();

        let by_due = std::iter::once(FilterOption {
            label: "Any date".to_string(),
            query: query.with("exp_date", ""),
            active: due.is_none(),
        })
        .chain(DueFilter::ALL.iter().map(|d| FilterOption {
            label: d.label().to_string(),
            query: query.with("exp_date", d.code()),
            active: due == Some(*d),
        }))
        .collect();

        vec![
            FilterGroup { title: "By status", options: by_status },
            FilterGroup { title: "By due back", options: by_due },
        ]
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

/// Accounts, their staff flags and granted permissions.
pub struct UserAdmin {
    auth: AuthManager,
}

impl UserAdmin {
    pub fn new(auth: AuthManager) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl AdminModel for UserAdmin {
    type Model = user::Model;
    type Input = UserInput;

    const SLUG: &'static str = "user";
    const NAME: &'static str = "User";
    const NAME_PLURAL: &'static str = "Users";
    const LIST_DISPLAY: &'static [&'static str] = &["Username", "Staff status", "Superuser status"];

    fn key(model: &user::Model) -> String {
        model.id.to_string()
    }

    async fn label(&self, _catalog: &Catalog, model: &user::Model) -> Result<String> {
        Ok(model.username.clone())
    }

    async fn count(&self, catalog: &Catalog) -> Result<u64> {
        Ok(user::Entity::find().count(catalog.db()).await?)
    }

    async fn fetch(&self, _catalog: &Catalog, key: &str) -> Result<user::Model> {
        let id = parse_key(key, "User")?;
        self.auth
            .get_user(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("User {}", key)))
    }

    async fn fetch_all(&self, catalog: &Catalog, _query: &ListQuery) -> Result<Vec<user::Model>> {
        catalog.list_users().await
    }

    async fn cells(&self, _catalog: &Catalog, models: &[user::Model]) -> Result<Vec<Vec<String>>> {
        Ok(models
            .iter()
            .map(|u| vec![u.username.clone(), yes_no(u.is_staff), yes_no(u.is_superuser)])
            .collect())
    }

    async fn fields(&self, _catalog: &Catalog, model: Option<&user::Model>) -> Result<Vec<FormField>> {
        let permissions = PERMISSIONS
            .iter()
            .map(|(code, label)| Choice::new(code, *label))
            .collect();
        let granted: Vec<String> = PERMISSIONS
            .iter()
            .filter(|(code, _)| model.is_some_and(|u| u.has_explicit_perm(code)))
            .map(|(code, _)| code.to_string())
            .collect();

        let password = match model {
            Some(_) => FormField::password("password", "Password").help("Leave blank to keep the current password"),
            None => FormField::password("password", "Password").required(),
        };
        Ok(vec![
            FormField::text("username", "Username", model.map(|u| u.username.clone()).unwrap_or_default())
                .required()
                .help("150 characters or fewer. Letters, digits and @/./+/-/_ only."),
            password,
            FormField::checkbox("is_staff", "Staff status", model.is_some_and(|u| u.is_staff))
                .help("Designates whether the user can log into the admin site."),
            FormField::checkbox("is_superuser", "Superuser status", model.is_some_and(|u| u.is_superuser))
                .help("Designates that this user has all permissions without explicitly assigning them."),
            FormField::multi_select("permissions", "User permissions", permissions, &granted),
        ])
    }

    fn parse(&self, form: &FormData) -> std::result::Result<UserInput, FieldErrors> {
        let password = form.text("password");
        let input = UserInput {
            username: form.text("username"),
            password: (!password.is_empty()).then_some(password),
            is_staff: form.flag("is_staff"),
            is_superuser: form.flag("is_superuser"),
            permissions: form.all("permissions").into_iter().map(String::from).collect(),
        };
        finish(input, FieldErrors::new(), UserInput::validate)
    }

    async fn create(&self, _catalog: &Catalog, input: UserInput) -> Result<user::Model> {
        self.auth.create_user(input).await
    }

    async fn update(&self, _catalog: &Catalog, key: &str, input: UserInput) -> Result<user::Model> {
        self.auth.update_user(parse_key(key, "User")?, input).await
    }

    async fn delete(&self, catalog: &Catalog, key: &str) -> Result<()> {
        catalog.delete_user(parse_key(key, "User")?).await
    }
}
