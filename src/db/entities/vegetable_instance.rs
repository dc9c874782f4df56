//! Vegetable instance entity - a specific harvested copy that can be borrowed

use std::fmt;

use sea_orm::entity::prelude::*;

/// Availability of an instance, persisted as a single-character code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vegetable_instances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // hyphenated UUID v4
    pub vegetable_id: Option<i32>,
    pub harvest: String,
    pub exp_date: Option<Date>,
    pub borrower_id: Option<i32>,
    pub status: String, // "m", "o", "a", "r"; blank allowed
}

impl Model {
    /// Parsed status; `None` for a blank or unknown code.
    pub fn loan_status(&self) -> Option<LoanStatus> {
        LoanStatus::from_code(&self.status)
    }

    pub fn status_label(&self) -> &'static str {
        self.loan_status().map(LoanStatus::label).unwrap_or("")
    }

    /// True only when an expiration date is set and has passed.
    pub fn is_overdue(&self, today: Date) -> bool {
        matches!(self.exp_date, Some(exp) if today > exp)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vegetable::Entity",
        from = "Column::VegetableId",
        to = "super::vegetable::Column::Id",
        on_delete = "SetNull"
    )]
    Vegetable,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BorrowerId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Borrower,
}

impl Related<super::vegetable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vegetable.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrower.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
