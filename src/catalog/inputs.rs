//! Write payloads for catalog entities and their field rules.

use chrono::NaiveDate;

use crate::db::entities::vegetable_instance::LoanStatus;
use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";

fn check_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize, required: bool) {
    let len = value.chars().count();
    if required && value.trim().is_empty() {
        errors.add(field, REQUIRED);
    } else if len > max_len {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max_len, len
            ),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyInput {
    pub name: String,
}

impl FamilyInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name, 200, true);
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmerInput {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    /// `None` leaves existing family links untouched on update.
    pub family_ids: Option<Vec<i32>>,
}

impl FarmerInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "first_name", &self.first_name, 100, true);
        check_text(&mut errors, "last_name", &self.last_name, 100, true);
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VegetableInput {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub farmer_id: Option<i32>,
    /// `None` leaves existing family links untouched on update.
    pub family_ids: Option<Vec<i32>>,
}

impl VegetableInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "title", &self.title, 200, true);
        check_text(&mut errors, "summary", &self.summary, 1000, true);
        check_text(&mut errors, "isbn", &self.isbn, 13, true);
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceInput {
    pub vegetable_id: Option<i32>,
    pub harvest: String,
    pub exp_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl InstanceInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "harvest", &self.harvest, 200, true);
        errors
    }
}
