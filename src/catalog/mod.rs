//! Catalog store: CRUD over families, farmers, vegetables and their instances.
//!
//! Optional references are nulled explicitly on delete (inside a transaction)
//! instead of relying on SQLite's foreign-key enforcement, so a deleted
//! vegetable, farmer or user never takes dependent rows with it.

pub mod inputs;
pub mod renewal;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait, Value,
};
use uuid::Uuid;

use crate::db::entities::vegetable_instance::LoanStatus;
use crate::db::entities::{
    family, farmer, farmer_family, user, vegetable, vegetable_family, vegetable_instance,
};
use crate::error::{CatalogError, FieldErrors, Result};
use crate::forms::INVALID_CHOICE;

pub use inputs::{FamilyInput, FarmerInput, InstanceInput, VegetableInput};

/// Page size of the "my loans" listing.
pub const LOANS_PER_PAGE: u64 = 10;

/// How many family names the admin column shows.
const DISPLAY_FAMILY_LIMIT: usize = 3;

/// Dashboard counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CatalogCounts {
    pub vegetables: u64,
    pub instances: u64,
    pub instances_available: u64,
    pub farmers: u64,
}

/// One page of a paginated listing (1-based page numbers)
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

/// Expiry-date windows for narrowing the instance list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    Today,
    PastWeek,
    ThisMonth,
    ThisYear,
    NoDate,
    HasDate,
}

impl DueFilter {
    pub const ALL: [DueFilter; 6] = [
        DueFilter::Today,
        DueFilter::PastWeek,
        DueFilter::ThisMonth,
        DueFilter::ThisYear,
        DueFilter::NoDate,
        DueFilter::HasDate,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DueFilter::Today => "today",
            DueFilter::PastWeek => "past_7_days",
            DueFilter::ThisMonth => "this_month",
            DueFilter::ThisYear => "this_year",
            DueFilter::NoDate => "no_date",
            DueFilter::HasDate => "has_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DueFilter::Today => "Today",
            DueFilter::PastWeek => "Past 7 days",
            DueFilter::ThisMonth => "This month",
            DueFilter::ThisYear => "This year",
            DueFilter::NoDate => "No date",
            DueFilter::HasDate => "Has date",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    /// Half-open `[start, end)` range for the calendar windows.
    fn window(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let tomorrow = today + Duration::days(1);
        match self {
            DueFilter::Today => Some((today, tomorrow)),
            DueFilter::PastWeek => Some((today - Duration::days(7), tomorrow)),
            DueFilter::ThisMonth => {
                let start = today.with_day(1)?;
                let end = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((start, end))
            }
            DueFilter::ThisYear => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            )),
            DueFilter::NoDate | DueFilter::HasDate => None,
        }
    }

    fn condition(self, today: NaiveDate) -> Condition {
        let column = vegetable_instance::Column::ExpDate;
        match (self, self.window(today)) {
            (DueFilter::NoDate, _) => Condition::all().add(column.is_null()),
            (_, Some((start, end))) => Condition::all().add(column.gte(start)).add(column.lt(end)),
            _ => Condition::all().add(column.is_not_null()),
        }
    }
}

/// Join up to three family names for list displays.
fn join_family_names(families: &[family::Model]) -> String {
    families
        .iter()
        .take(DISPLAY_FAMILY_LIMIT)
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Instance ids are UUIDs; anything else can never match a row.
fn parse_instance_id(id: &str) -> Result<String> {
    Uuid::parse_str(id)
        .map(|u| u.hyphenated().to_string())
        .map_err(|_| CatalogError::not_found(format!("Vegetable instance {}", id)))
}

/// Database-backed catalog operations
#[derive(Clone)]
pub struct Catalog {
    db: Arc<DatabaseConnection>,
}

impl Catalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    async fn exists<E>(&self, id: i32) -> Result<bool>
    where
        E: EntityTrait,
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    {
        Ok(E::find_by_id(id).one(self.db()).await?.is_some())
    }

    async fn check_families(&self, errors: &mut FieldErrors, family_ids: Option<&Vec<i32>>) -> Result<()> {
        let Some(ids) = family_ids else {
            return Ok(());
        };
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(());
        }
        let found = family::Entity::find()
            .filter(family::Column::Id.is_in(ids.clone()))
            .count(self.db())
            .await?;
        if found != ids.len() as u64 {
            errors.add("families", INVALID_CHOICE);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Dashboard
    // ---------------------------------------------------------------------

    pub async fn counts(&self) -> Result<CatalogCounts> {
        let db = self.db();
        Ok(CatalogCounts {
            vegetables: vegetable::Entity::find().count(db).await?,
            instances: vegetable_instance::Entity::find().count(db).await?,
            instances_available: vegetable_instance::Entity::find()
                .filter(vegetable_instance::Column::Status.eq(LoanStatus::Available.code()))
                .count(db)
                .await?,
            farmers: farmer::Entity::find().count(db).await?,
        })
    }

    // ---------------------------------------------------------------------
    // Families
    // ---------------------------------------------------------------------

    pub async fn list_families(&self) -> Result<Vec<family::Model>> {
        Ok(family::Entity::find()
            .order_by_asc(family::Column::Name)
            .all(self.db())
            .await?)
    }

    pub async fn get_family(&self, id: i32) -> Result<family::Model> {
        family::Entity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("Family {}", id)))
    }

    pub async fn create_family(&self, input: FamilyInput) -> Result<family::Model> {
        input.validate().into_result()?;

        let model = family::ActiveModel {
            name: Set(input.name.trim().to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await?;

        tracing::info!("Created family {} ({})", model.id, model.name);
        Ok(model)
    }

    pub async fn update_family(&self, id: i32, input: FamilyInput) -> Result<family::Model> {
        let existing = self.get_family(id).await?;
        input.validate().into_result()?;

        let mut active: family::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        Ok(active.update(self.db()).await?)
    }

    /// Removes the family and its links; vegetables and farmers stay.
    pub async fn delete_family(&self, id: i32) -> Result<()> {
        self.get_family(id).await?;

        let txn = self.db.begin().await?;
        vegetable_family::Entity::delete_many()
            .filter(vegetable_family::Column::FamilyId.eq(id))
            .exec(&txn)
            .await?;
        farmer_family::Entity::delete_many()
            .filter(farmer_family::Column::FamilyId.eq(id))
            .exec(&txn)
            .await?;
        family::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Deleted family {}", id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Farmers
    // ---------------------------------------------------------------------

    pub async fn list_farmers(&self) -> Result<Vec<farmer::Model>> {
        Ok(farmer::Entity::find()
            .order_by_asc(farmer::Column::LastName)
            .order_by_asc(farmer::Column::FirstName)
            .all(self.db())
            .await?)
    }

    pub async fn get_farmer(&self, id: i32) -> Result<farmer::Model> {
        farmer::Entity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("Farmer {}", id)))
    }

    pub async fn farmers_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, farmer::Model>> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let farmers = farmer::Entity::find()
            .filter(farmer::Column::Id.is_in(ids))
            .all(self.db())
            .await?;
        Ok(farmers.into_iter().map(|f| (f.id, f)).collect())
    }

    pub async fn farmer_families(&self, farmer_id: i32) -> Result<Vec<family::Model>> {
        let farmer = self.get_farmer(farmer_id).await?;
        Ok(farmer
            .find_related(family::Entity)
            .order_by_asc(family::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn farmer_vegetables(&self, farmer_id: i32) -> Result<Vec<vegetable::Model>> {
        Ok(vegetable::Entity::find()
            .filter(vegetable::Column::FarmerId.eq(farmer_id))
            .order_by_asc(vegetable::Column::Title)
            .all(self.db())
            .await?)
    }

    pub async fn create_farmer(&self, input: FarmerInput) -> Result<farmer::Model> {
        let mut errors = input.validate();
        self.check_families(&mut errors, input.family_ids.as_ref()).await?;
        errors.into_result()?;

        let txn = self.db.begin().await?;
        let model = farmer::ActiveModel {
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            date_of_birth: Set(input.date_of_birth),
            date_of_death: Set(input.date_of_death),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if let Some(ids) = &input.family_ids {
            replace_farmer_families(&txn, model.id, ids).await?;
        }
        txn.commit().await?;

        tracing::info!("Created farmer {} ({})", model.id, model);
        Ok(model)
    }

    pub async fn update_farmer(&self, id: i32, input: FarmerInput) -> Result<farmer::Model> {
        let existing = self.get_farmer(id).await?;
        let mut errors = input.validate();
        self.check_families(&mut errors, input.family_ids.as_ref()).await?;
        errors.into_result()?;

        let txn = self.db.begin().await?;
        let mut active: farmer::ActiveModel = existing.into();
        active.first_name = Set(input.first_name.trim().to_string());
        active.last_name = Set(input.last_name.trim().to_string());
        active.date_of_birth = Set(input.date_of_birth);
        active.date_of_death = Set(input.date_of_death);
        let model = active.update(&txn).await?;
        if let Some(ids) = &input.family_ids {
            replace_farmer_families(&txn, id, ids).await?;
        }
        txn.commit().await?;

        Ok(model)
    }

    /// Deletes the farmer; their vegetables lose the owner reference.
    pub async fn delete_farmer(&self, id: i32) -> Result<()> {
        self.get_farmer(id).await?;

        let txn = self.db.begin().await?;
        let orphaned = vegetable::Entity::update_many()
            .col_expr(vegetable::Column::FarmerId, Expr::value(Value::Int(None)))
            .filter(vegetable::Column::FarmerId.eq(id))
            .exec(&txn)
            .await?;
        farmer_family::Entity::delete_many()
            .filter(farmer_family::Column::FarmerId.eq(id))
            .exec(&txn)
            .await?;
        farmer::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            "Deleted farmer {} ({} vegetables unassigned)",
            id,
            orphaned.rows_affected
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Vegetables
    // ---------------------------------------------------------------------

    pub async fn list_vegetables(&self) -> Result<Vec<vegetable::Model>> {
        Ok(vegetable::Entity::find()
            .order_by_asc(vegetable::Column::Id)
            .all(self.db())
            .await?)
    }

    pub async fn get_vegetable(&self, id: i32) -> Result<vegetable::Model> {
        vegetable::Entity::find_by_id(id)
            .one(self.db())
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("Vegetable {}", id)))
    }

    pub async fn vegetables_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, vegetable::Model>> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let vegetables = vegetable::Entity::find()
            .filter(vegetable::Column::Id.is_in(ids))
            .all(self.db())
            .await?;
        Ok(vegetables.into_iter().map(|v| (v.id, v)).collect())
    }

    pub async fn vegetable_families(&self, vegetable_id: i32) -> Result<Vec<family::Model>> {
        let vegetable = self.get_vegetable(vegetable_id).await?;
        Ok(vegetable
            .find_related(family::Entity)
            .order_by_asc(family::Column::Id)
            .all(self.db())
            .await?)
    }

    /// Comma-joined names of (at most) the first three families.
    pub async fn display_family(&self, vegetable_id: i32) -> Result<String> {
        let families = self.vegetable_families(vegetable_id).await?;
        Ok(join_family_names(&families))
    }

    pub async fn vegetable_instances(&self, vegetable_id: i32) -> Result<Vec<vegetable_instance::Model>> {
        Ok(vegetable_instance::Entity::find()
            .filter(vegetable_instance::Column::VegetableId.eq(vegetable_id))
            .order_by_asc(vegetable_instance::Column::ExpDate)
            .order_by_asc(vegetable_instance::Column::Id)
            .all(self.db())
            .await?)
    }

    async fn check_vegetable_refs(&self, input: &VegetableInput) -> Result<()> {
        let mut errors = input.validate();
        if let Some(farmer_id) = input.farmer_id {
            if !self.exists::<farmer::Entity>(farmer_id).await? {
                errors.add("farmer", INVALID_CHOICE);
            }
        }
        self.check_families(&mut errors, input.family_ids.as_ref()).await?;
        errors.into_result()
    }

    pub async fn create_vegetable(&self, input: VegetableInput) -> Result<vegetable::Model> {
        self.check_vegetable_refs(&input).await?;

        let txn = self.db.begin().await?;
        let model = vegetable::ActiveModel {
            title: Set(input.title.trim().to_string()),
            farmer_id: Set(input.farmer_id),
            summary: Set(input.summary.trim().to_string()),
            isbn: Set(input.isbn.trim().to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if let Some(ids) = &input.family_ids {
            replace_vegetable_families(&txn, model.id, ids).await?;
        }
        txn.commit().await?;

        tracing::info!("Created vegetable {} ({})", model.id, model.title);
        Ok(model)
    }

    pub async fn update_vegetable(&self, id: i32, input: VegetableInput) -> Result<vegetable::Model> {
        let existing = self.get_vegetable(id).await?;
        self.check_vegetable_refs(&input).await?;

        let txn = self.db.begin().await?;
        let mut active: vegetable::ActiveModel = existing.into();
        active.title = Set(input.title.trim().to_string());
        active.farmer_id = Set(input.farmer_id);
        active.summary = Set(input.summary.trim().to_string());
        active.isbn = Set(input.isbn.trim().to_string());
        let model = active.update(&txn).await?;
        if let Some(ids) = &input.family_ids {
            replace_vegetable_families(&txn, id, ids).await?;
        }
        txn.commit().await?;

        Ok(model)
    }

    /// Deletes the vegetable; its instances survive with no vegetable.
    pub async fn delete_vegetable(&self, id: i32) -> Result<()> {
        self.get_vegetable(id).await?;

        let txn = self.db.begin().await?;
        let orphaned = vegetable_instance::Entity::update_many()
            .col_expr(vegetable_instance::Column::VegetableId, Expr::value(Value::Int(None)))
            .filter(vegetable_instance::Column::VegetableId.eq(id))
            .exec(&txn)
            .await?;
        vegetable_family::Entity::delete_many()
            .filter(vegetable_family::Column::VegetableId.eq(id))
            .exec(&txn)
            .await?;
        vegetable::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            "Deleted vegetable {} ({} instances detached)",
            id,
            orphaned.rows_affected
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Vegetable instances
    // ---------------------------------------------------------------------

    fn instances_with_status(status: Option<LoanStatus>) -> Select<vegetable_instance::Entity> {
        let query = vegetable_instance::Entity::find();
        match status {
            Some(status) => query.filter(vegetable_instance::Column::Status.eq(status.code())),
            None => query,
        }
    }

    async fn ordered_instances(&self, query: Select<vegetable_instance::Entity>) -> Result<Vec<vegetable_instance::Model>> {
        Ok(query
            .order_by_asc(vegetable_instance::Column::ExpDate)
            .order_by_asc(vegetable_instance::Column::Id)
            .all(self.db())
            .await?)
    }

    /// All instances ordered by expiration date, optionally filtered by status.
    pub async fn list_instances(&self, status: Option<LoanStatus>) -> Result<Vec<vegetable_instance::Model>> {
        self.ordered_instances(Self::instances_with_status(status)).await
    }

    /// Instances narrowed by status and an expiry window relative to `today`.
    pub async fn filter_instances(
        &self,
        status: Option<LoanStatus>,
        due: DueFilter,
        today: NaiveDate,
    ) -> Result<Vec<vegetable_instance::Model>> {
        let query = Self::instances_with_status(status).filter(due.condition(today));
        self.ordered_instances(query).await
    }

    pub async fn get_instance(&self, id: &str) -> Result<vegetable_instance::Model> {
        let id = parse_instance_id(id)?;
        vegetable_instance::Entity::find_by_id(id.clone())
            .one(self.db())
            .await?
            .ok_or_else(|| CatalogError::not_found(format!("Vegetable instance {}", id)))
    }

    async fn check_instance_refs(&self, input: &InstanceInput) -> Result<()> {
        let mut errors = input.validate();
        if let Some(vegetable_id) = input.vegetable_id {
            if !self.exists::<vegetable::Entity>(vegetable_id).await? {
                errors.add("vegetable", INVALID_CHOICE);
            }
        }
        if let Some(borrower_id) = input.borrower_id {
            if !self.exists::<user::Entity>(borrower_id).await? {
                errors.add("borrower", INVALID_CHOICE);
            }
        }
        errors.into_result()
    }

    /// Creates an instance under a freshly generated UUID.
    pub async fn create_instance(&self, input: InstanceInput) -> Result<vegetable_instance::Model> {
        self.check_instance_refs(&input).await?;

        let model = vegetable_instance::ActiveModel {
            id: Set(Uuid::new_v4().hyphenated().to_string()),
            vegetable_id: Set(input.vegetable_id),
            harvest: Set(input.harvest.trim().to_string()),
            exp_date: Set(input.exp_date),
            borrower_id: Set(input.borrower_id),
            status: Set(input.status.code().to_string()),
        }
        .insert(self.db())
        .await?;

        tracing::info!("Created vegetable instance {}", model.id);
        Ok(model)
    }

    pub async fn update_instance(&self, id: &str, input: InstanceInput) -> Result<vegetable_instance::Model> {
        let existing = self.get_instance(id).await?;
        self.check_instance_refs(&input).await?;

        let mut active: vegetable_instance::ActiveModel = existing.into();
        active.vegetable_id = Set(input.vegetable_id);
        active.harvest = Set(input.harvest.trim().to_string());
        active.exp_date = Set(input.exp_date);
        active.borrower_id = Set(input.borrower_id);
        active.status = Set(input.status.code().to_string());
        Ok(active.update(self.db()).await?)
    }

    pub async fn delete_instance(&self, id: &str) -> Result<()> {
        let existing = self.get_instance(id).await?;
        vegetable_instance::Entity::delete_by_id(existing.id.clone())
            .exec(self.db())
            .await?;
        tracing::info!("Deleted vegetable instance {}", existing.id);
        Ok(())
    }

    /// Moves the expiration date. Status and borrower are left as they are.
    pub async fn renew_instance(
        &self,
        id: &str,
        new_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<vegetable_instance::Model> {
        let existing = self.get_instance(id).await?;
        renewal::validate_renewal_date(new_date, today)
            .map_err(|e| CatalogError::invalid("renewal_date", e.to_string()))?;

        let mut active: vegetable_instance::ActiveModel = existing.into();
        active.exp_date = Set(Some(new_date));
        let model = active.update(self.db()).await?;

        tracing::info!("Renewed vegetable instance {} until {}", model.id, new_date);
        Ok(model)
    }

    // ---------------------------------------------------------------------
    // Loans
    // ---------------------------------------------------------------------

    /// Instances on loan to `borrower_id`, soonest expiry first.
    pub async fn loans_for_user(&self, borrower_id: i32, page: u64) -> Result<Page<vegetable_instance::Model>> {
        let paginator = vegetable_instance::Entity::find()
            .filter(vegetable_instance::Column::BorrowerId.eq(borrower_id))
            .filter(vegetable_instance::Column::Status.eq(LoanStatus::OnLoan.code()))
            .order_by_asc(vegetable_instance::Column::ExpDate)
            .order_by_asc(vegetable_instance::Column::Id)
            .paginate(self.db(), LOANS_PER_PAGE);

        let totals = paginator.num_items_and_pages().await?;
        let num_pages = totals.number_of_pages.max(1);
        if page == 0 || page > num_pages {
            return Err(CatalogError::not_found(format!("Page {}", page)));
        }

        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            number: page,
            num_pages,
            total: totals.number_of_items,
        })
    }

    /// Every instance currently on loan, soonest expiry first.
    pub async fn all_loans(&self) -> Result<Vec<vegetable_instance::Model>> {
        self.list_instances(Some(LoanStatus::OnLoan)).await
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    pub async fn users_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, user::Model>> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(self.db())
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    pub async fn list_users(&self) -> Result<Vec<user::Model>> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Username)
            .all(self.db())
            .await?)
    }

    /// Deletes a user; instances they borrowed keep existing, unborrowed.
    pub async fn delete_user(&self, id: i32) -> Result<()> {
        if !self.exists::<user::Entity>(id).await? {
            return Err(CatalogError::not_found(format!("User {}", id)));
        }

        let txn = self.db.begin().await?;
        vegetable_instance::Entity::update_many()
            .col_expr(vegetable_instance::Column::BorrowerId, Expr::value(Value::Int(None)))
            .filter(vegetable_instance::Column::BorrowerId.eq(id))
            .exec(&txn)
            .await?;
        user::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}

async fn replace_vegetable_families<C: ConnectionTrait>(conn: &C, vegetable_id: i32, ids: &[i32]) -> Result<()> {
    vegetable_family::Entity::delete_many()
        .filter(vegetable_family::Column::VegetableId.eq(vegetable_id))
        .exec(conn)
        .await?;

    let links: Vec<vegetable_family::ActiveModel> = dedup_ids(ids)
        .into_iter()
        .map(|family_id| vegetable_family::ActiveModel {
            vegetable_id: Set(vegetable_id),
            family_id: Set(family_id),
        })
        .collect();
    if !links.is_empty() {
        vegetable_family::Entity::insert_many(links).exec(conn).await?;
    }
    Ok(())
}

async fn replace_farmer_families<C: ConnectionTrait>(conn: &C, farmer_id: i32, ids: &[i32]) -> Result<()> {
    farmer_family::Entity::delete_many()
        .filter(farmer_family::Column::FarmerId.eq(farmer_id))
        .exec(conn)
        .await?;

    let links: Vec<farmer_family::ActiveModel> = dedup_ids(ids)
        .into_iter()
        .map(|family_id| farmer_family::ActiveModel {
            farmer_id: Set(farmer_id),
            family_id: Set(family_id),
        })
        .collect();
    if !links.is_empty() {
        farmer_family::Entity::insert_many(links).exec(conn).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::init_database;
    use chrono::Duration;
    use tempfile::TempDir;

    pub(crate) async fn test_catalog() -> (TempDir, Catalog) {
        let temp_dir = TempDir::new().unwrap();
        let db = init_database(&temp_dir.path().join("catalog.db")).await.unwrap();
        (temp_dir, Catalog::new(Arc::new(db)))
    }

    pub(crate) async fn insert_user(catalog: &Catalog, username: &str) -> user::Model {
        user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(String::new()),
            is_staff: Set(false),
            is_superuser: Set(false),
            permissions: Set(String::new()),
            created_at: Set(0),
            ..Default::default()
        }
        .insert(catalog.db())
        .await
        .unwrap()
    }

    pub(crate) async fn carrot(catalog: &Catalog) -> vegetable::Model {
        catalog
            .create_vegetable(VegetableInput {
                title: "Carrot".into(),
                summary: "Orange root".into(),
                isbn: "9780000000001".into(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(vegetable_id: i32, borrower: i32, exp: Option<NaiveDate>, status: LoanStatus) -> InstanceInput {
        InstanceInput {
            vegetable_id: Some(vegetable_id),
            harvest: "Autumn".into(),
            exp_date: exp,
            status,
            borrower_id: Some(borrower),
        }
    }

    #[tokio::test]
    async fn test_instance_gets_uuid_and_maintenance_status() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;

        let inst = catalog
            .create_instance(InstanceInput {
                vegetable_id: Some(veg.id),
                harvest: "Spring 2024".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(Uuid::parse_str(&inst.id).is_ok());
        assert_eq!(inst.loan_status(), Some(LoanStatus::Maintenance));
        assert_eq!(catalog.get_instance(&inst.id).await.unwrap(), inst);
    }

    #[tokio::test]
    async fn test_deleting_vegetable_nulls_instances() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let first = catalog
            .create_instance(InstanceInput {
                vegetable_id: Some(veg.id),
                harvest: "A".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = catalog
            .create_instance(InstanceInput {
                vegetable_id: Some(veg.id),
                harvest: "B".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        catalog.delete_vegetable(veg.id).await.unwrap();

        assert!(matches!(catalog.get_vegetable(veg.id).await, Err(CatalogError::NotFound(_))));
        for id in [&first.id, &second.id] {
            let inst = catalog.get_instance(id).await.unwrap();
            assert_eq!(inst.vegetable_id, None);
        }
        assert_eq!(catalog.counts().await.unwrap().instances, 2);
    }

    #[tokio::test]
    async fn test_deleting_farmer_nulls_vegetables() {
        let (_dir, catalog) = test_catalog().await;
        let farmer = catalog
            .create_farmer(FarmerInput {
                first_name: "Ada".into(),
                last_name: "Furrow".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let veg = catalog
            .create_vegetable(VegetableInput {
                title: "Leek".into(),
                summary: "Mild onion".into(),
                isbn: "9780000000002".into(),
                farmer_id: Some(farmer.id),
                family_ids: None,
            })
            .await
            .unwrap();

        catalog.delete_farmer(farmer.id).await.unwrap();

        assert_eq!(catalog.get_vegetable(veg.id).await.unwrap().farmer_id, None);
    }

    #[tokio::test]
    async fn test_deleting_user_nulls_borrower() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let user = insert_user(&catalog, "borrower").await;
        let inst = catalog
            .create_instance(loan(veg.id, user.id, None, LoanStatus::OnLoan))
            .await
            .unwrap();

        catalog.delete_user(user.id).await.unwrap();

        let inst = catalog.get_instance(&inst.id).await.unwrap();
        assert_eq!(inst.borrower_id, None);
        assert_eq!(inst.loan_status(), Some(LoanStatus::OnLoan));
    }

    #[tokio::test]
    async fn test_renewal_updates_only_expiry() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let user = insert_user(&catalog, "reader").await;
        let today = date(2024, 2, 1);
        let inst = catalog
            .create_instance(loan(veg.id, user.id, Some(date(2024, 1, 1)), LoanStatus::Reserved))
            .await
            .unwrap();

        let new_date = today + Duration::weeks(2);
        let renewed = catalog.renew_instance(&inst.id, new_date, today).await.unwrap();

        assert_eq!(renewed.exp_date, Some(new_date));
        assert_eq!(renewed.status, inst.status);
        assert_eq!(renewed.borrower_id, inst.borrower_id);
        assert_eq!(renewed.harvest, inst.harvest);
    }

    #[tokio::test]
    async fn test_rejected_renewal_leaves_expiry() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let user = insert_user(&catalog, "reader").await;
        let today = date(2024, 2, 1);
        let original = Some(date(2024, 2, 5));
        let inst = catalog
            .create_instance(loan(veg.id, user.id, original, LoanStatus::OnLoan))
            .await
            .unwrap();

        for bad in [today - Duration::days(1), today + Duration::weeks(5)] {
            let result = catalog.renew_instance(&inst.id, bad, today).await;
            match result {
                Err(CatalogError::Invalid(errors)) => assert_eq!(errors.get("renewal_date").len(), 1),
                other => panic!("expected validation failure, got {:?}", other),
            }
        }

        assert_eq!(catalog.get_instance(&inst.id).await.unwrap().exp_date, original);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_instance_ids() {
        let (_dir, catalog) = test_catalog().await;
        let today = date(2024, 2, 1);

        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            catalog.renew_instance(&missing, today, today).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.get_instance("not-a-uuid").await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_loans_for_user_filters_and_orders() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let alice = insert_user(&catalog, "alice").await;
        let bob = insert_user(&catalog, "bob").await;

        let late = catalog
            .create_instance(loan(veg.id, alice.id, Some(date(2024, 3, 1)), LoanStatus::OnLoan))
            .await
            .unwrap();
        let early = catalog
            .create_instance(loan(veg.id, alice.id, Some(date(2024, 1, 15)), LoanStatus::OnLoan))
            .await
            .unwrap();
        // Reserved for alice, and on loan to bob: neither belongs in alice's list
        catalog
            .create_instance(loan(veg.id, alice.id, Some(date(2024, 1, 1)), LoanStatus::Reserved))
            .await
            .unwrap();
        catalog
            .create_instance(loan(veg.id, bob.id, Some(date(2024, 1, 2)), LoanStatus::OnLoan))
            .await
            .unwrap();

        let page = catalog.loans_for_user(alice.id, 1).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![early.id, late.id]);
        assert_eq!(page.total, 2);
        assert!(!page.has_next());

        assert_eq!(catalog.all_loans().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_loans_pagination() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let user = insert_user(&catalog, "avid").await;
        for day in 1..=12 {
            catalog
                .create_instance(loan(veg.id, user.id, Some(date(2024, 1, day)), LoanStatus::OnLoan))
                .await
                .unwrap();
        }

        let first = catalog.loans_for_user(user.id, 1).await.unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next());

        let second = catalog.loans_for_user(user.id, 2).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].exp_date, Some(date(2024, 1, 11)));
        assert!(second.has_previous());

        assert!(matches!(catalog.loans_for_user(user.id, 3).await, Err(CatalogError::NotFound(_))));

        let nobody = insert_user(&catalog, "idle").await;
        assert!(catalog.loans_for_user(nobody.id, 1).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_counts() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        catalog
            .create_farmer(FarmerInput {
                first_name: "Ada".into(),
                last_name: "Furrow".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        for status in [LoanStatus::Available, LoanStatus::Available, LoanStatus::Maintenance] {
            catalog
                .create_instance(InstanceInput {
                    vegetable_id: Some(veg.id),
                    harvest: "Winter".into(),
                    status,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let counts = catalog.counts().await.unwrap();
        assert_eq!(
            counts,
            CatalogCounts {
                vegetables: 1,
                instances: 3,
                instances_available: 2,
                farmers: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_farmers_ordered_by_name() {
        let (_dir, catalog) = test_catalog().await;
        for (first, last) in [("Zoe", "Barley"), ("Abe", "Barley"), ("Cy", "Acorn")] {
            catalog
                .create_farmer(FarmerInput {
                    first_name: first.into(),
                    last_name: last.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = catalog
            .list_farmers()
            .await
            .unwrap()
            .iter()
            .map(|f| f.to_string())
            .collect();
        assert_eq!(names, vec!["Acorn, Cy", "Barley, Abe", "Barley, Zoe"]);
    }

    #[tokio::test]
    async fn test_filter_instances_by_due_window() {
        let (_dir, catalog) = test_catalog().await;
        let veg = carrot(&catalog).await;
        let today = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();

        for (harvest, exp_date) in [
            ("today", Some(today)),
            ("last week", Some(today - Duration::days(5))),
            ("early december", Some(NaiveDate::from_ymd_opt(2024, 12, 2).unwrap())),
            ("spring", Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())),
            ("next year", Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())),
            ("undated", None),
        ] {
            catalog
                .create_instance(InstanceInput {
                    vegetable_id: Some(veg.id),
                    harvest: harvest.into(),
                    exp_date,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let harvests = |due: DueFilter| {
            let catalog = catalog.clone();
            async move {
                catalog
                    .filter_instances(None, due, today)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|i| i.harvest)
                    .collect::<Vec<_>>()
            }
        };

        assert_eq!(harvests(DueFilter::Today).await, vec!["today"]);
        assert_eq!(harvests(DueFilter::PastWeek).await, vec!["last week", "today"]);
        assert_eq!(harvests(DueFilter::ThisMonth).await, vec!["early december", "last week", "today"]);
        assert_eq!(harvests(DueFilter::ThisYear).await.len(), 4);
        assert_eq!(harvests(DueFilter::NoDate).await, vec!["undated"]);
        assert_eq!(harvests(DueFilter::HasDate).await.len(), 5);

        assert!(catalog
            .filter_instances(Some(LoanStatus::OnLoan), DueFilter::HasDate, today)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(DueFilter::from_code("past_7_days"), Some(DueFilter::PastWeek));
        assert_eq!(DueFilter::from_code("someday"), None);
    }

    #[tokio::test]
    async fn test_display_family_caps_at_three() {
        let (_dir, catalog) = test_catalog().await;
        let mut ids = Vec::new();
        for name in ["Root", "Allium", "Brassica", "Legume"] {
            ids.push(catalog.create_family(FamilyInput { name: name.into() }).await.unwrap().id);
        }
        let veg = catalog
            .create_vegetable(VegetableInput {
                title: "Mixed box".into(),
                summary: "A bit of everything".into(),
                isbn: "9780000000003".into(),
                farmer_id: None,
                family_ids: Some(ids.clone()),
            })
            .await
            .unwrap();

        assert_eq!(catalog.vegetable_families(veg.id).await.unwrap().len(), 4);
        assert_eq!(catalog.display_family(veg.id).await.unwrap(), "Root, Allium, Brassica");

        // Deleting a family only drops the link
        catalog.delete_family(ids[0]).await.unwrap();
        assert_eq!(catalog.display_family(veg.id).await.unwrap(), "Allium, Brassica, Legume");
    }

    #[tokio::test]
    async fn test_unknown_references_rejected() {
        let (_dir, catalog) = test_catalog().await;
        let result = catalog
            .create_vegetable(VegetableInput {
                title: "Ghost".into(),
                summary: "Owned by nobody".into(),
                isbn: "9780000000004".into(),
                farmer_id: Some(999),
                family_ids: Some(vec![42]),
            })
            .await;

        match result {
            Err(CatalogError::Invalid(errors)) => {
                assert_eq!(errors.get("farmer"), &[INVALID_CHOICE.to_string()]);
                assert_eq!(errors.get("families"), &[INVALID_CHOICE.to_string()]);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(catalog.counts().await.unwrap().vegetables, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_links_when_families_omitted() {
        let (_dir, catalog) = test_catalog().await;
        let root = catalog.create_family(FamilyInput { name: "Root".into() }).await.unwrap();
        let farmer = catalog
            .create_farmer(FarmerInput {
                first_name: "Ada".into(),
                last_name: "Furrow".into(),
                family_ids: Some(vec![root.id]),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = catalog
            .update_farmer(
                farmer.id,
                FarmerInput {
                    first_name: "Ada".into(),
                    last_name: "Field".into(),
                    date_of_birth: Some(date(1970, 5, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.last_name, "Field");
        assert_eq!(updated.date_of_birth, Some(date(1970, 5, 1)));
        assert_eq!(catalog.farmer_families(farmer.id).await.unwrap(), vec![root]);
    }
}
