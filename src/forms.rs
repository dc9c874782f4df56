//! HTML form plumbing shared by the admin console and the management screens.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::entities::vegetable_instance::LoanStatus;
use crate::error::FieldErrors;

pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Accepted date inputs: ISO (`<input type="date">`) and US-style.
const DATE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Submitted `application/x-www-form-urlencoded` pairs. Keeps repeated keys,
/// which multi-selects rely on.
#[derive(Debug, Clone, Default)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// First value for `name`, or an empty string.
    pub fn text(&self, name: &str) -> String {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    pub fn all(&self, name: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn optional_date(&self, name: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
        let raw = self.text(name);
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            errors.add(name, INVALID_DATE);
        }
        parsed
    }

    pub fn optional_id(&self, name: &str, errors: &mut FieldErrors) -> Option<i32> {
        let raw = self.text(name);
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add(name, INVALID_CHOICE);
                None
            }
        }
    }

    pub fn ids(&self, name: &str, errors: &mut FieldErrors) -> Vec<i32> {
        let mut ids = Vec::new();
        for raw in self.all(name) {
            match raw.trim().parse() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    errors.add(name, INVALID_CHOICE);
                    break;
                }
            }
        }
        ids
    }

    /// Checkboxes are only submitted when ticked.
    pub fn flag(&self, name: &str) -> bool {
        !self.text(name).is_empty()
    }

    /// Blank falls back to the default status.
    pub fn status(&self, name: &str, errors: &mut FieldErrors) -> LoanStatus {
        let raw = self.text(name);
        if raw.trim().is_empty() {
            return LoanStatus::default();
        }
        LoanStatus::from_code(raw.trim()).unwrap_or_else(|| {
            errors.add(name, INVALID_CHOICE);
            LoanStatus::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    TextArea,
    Date,
    Select,
    MultiSelect,
    ReadOnly,
    Password,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
            selected: false,
        }
    }
}

/// A form field ready for template rendering
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub choices: Vec<Choice>,
    pub help: Option<&'static str>,
    pub errors: Vec<String>,
}

impl FormField {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            value: String::new(),
            choices: Vec::new(),
            help: None,
            errors: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text).with_value(value)
    }

    pub fn textarea(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::TextArea).with_value(value)
    }

    pub fn date(name: &'static str, label: &'static str, value: Option<NaiveDate>) -> Self {
        Self::new(name, label, FieldKind::Date).with_value(format_date(value))
    }

    /// Never rendered back to the browser.
    pub fn password(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    pub fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        Self::new(name, label, FieldKind::Checkbox).with_value(if checked { "on" } else { "" })
    }

    pub fn read_only(name: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::ReadOnly).with_value(value)
    }

    /// Single choice; an empty-valued "---------" option stands for none.
    pub fn select(name: &'static str, label: &'static str, choices: Vec<Choice>, selected: Option<String>) -> Self {
        let mut field = Self::new(name, label, FieldKind::Select);
        field.choices = std::iter::once(Choice::new("", "---------"))
            .chain(choices)
            .collect();
        field.select_values(&[selected.unwrap_or_default()]);
        field
    }

    pub fn multi_select(name: &'static str, label: &'static str, choices: Vec<Choice>, selected: &[String]) -> Self {
        let mut field = Self::new(name, label, FieldKind::MultiSelect);
        field.choices = choices;
        field.select_values(selected);
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn select_values(&mut self, selected: &[String]) {
        for choice in &mut self.choices {
            choice.selected = selected.contains(&choice.value);
        }
        self.value = selected.first().cloned().unwrap_or_default();
    }

    /// Show what the user submitted (and its errors) instead of the stored value.
    pub fn apply_submission(&mut self, form: &FormData, errors: &FieldErrors) {
        match self.kind {
            FieldKind::ReadOnly => {}
            FieldKind::Password => self.value.clear(),
            FieldKind::Select => self.select_values(&[form.text(self.name)]),
            FieldKind::MultiSelect => {
                let selected: Vec<String> = form.all(self.name).into_iter().map(String::from).collect();
                self.select_values(&selected);
            }
            _ => self.value = form.text(self.name),
        }
        self.errors = errors.get(self.name).to_vec();
    }
}

/// Overlay a rejected submission onto freshly built fields.
pub fn apply_submission(fields: &mut [FormField], form: &FormData, errors: &FieldErrors) {
    for field in fields.iter_mut() {
        field.apply_submission(form, errors);
    }
}

pub fn status_choices() -> Vec<Choice> {
    LoanStatus::ALL
        .iter()
        .map(|s| Choice::new(s.code(), s.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 5, 1);
        assert_eq!(parse_date("2018-05-01"), expected);
        assert_eq!(parse_date("05/01/2018"), expected);
        assert_eq!(parse_date("1 May 2018"), None);
    }

    #[test]
    fn test_optional_fields() {
        let data = form(&[("born", ""), ("died", "yesterday"), ("farmer", "3"), ("vegetable", "x")]);
        let mut errors = FieldErrors::new();

        assert_eq!(data.optional_date("born", &mut errors), None);
        assert_eq!(data.optional_date("died", &mut errors), None);
        assert_eq!(data.optional_id("farmer", &mut errors), Some(3));
        assert_eq!(data.optional_id("vegetable", &mut errors), None);
        assert_eq!(data.optional_id("missing", &mut errors), None);

        assert_eq!(errors.get("born").len(), 0);
        assert_eq!(errors.get("died"), &[INVALID_DATE.to_string()]);
        assert_eq!(errors.get("vegetable"), &[INVALID_CHOICE.to_string()]);
    }

    #[test]
    fn test_repeated_keys_and_status() {
        let data = form(&[("families", "1"), ("families", "4"), ("status", "o")]);
        let mut errors = FieldErrors::new();
        assert_eq!(data.ids("families", &mut errors), vec![1, 4]);
        assert_eq!(data.status("status", &mut errors), LoanStatus::OnLoan);
        assert_eq!(form(&[]).status("status", &mut errors), LoanStatus::Maintenance);
        assert!(errors.is_empty());

        form(&[("status", "z")]).status("status", &mut errors);
        assert_eq!(errors.get("status"), &[INVALID_CHOICE.to_string()]);
    }

    #[test]
    fn test_select_marks_choice() {
        let field = FormField::select(
            "farmer",
            "Farmer",
            vec![Choice::new(1, "Furrow, Ada"), Choice::new(2, "Field, Bo")],
            Some("2".into()),
        );
        let selected: Vec<_> = field.choices.iter().filter(|c| c.selected).map(|c| c.label.as_str()).collect();
        assert_eq!(selected, vec!["Field, Bo"]);
        assert_eq!(field.choices[0].label, "---------");
    }

    #[test]
    fn test_apply_submission_keeps_input_and_errors() {
        let mut fields = vec![
            FormField::text("first_name", "First name", "Ada").required(),
            FormField::multi_select("families", "Families", vec![Choice::new(1, "Root"), Choice::new(2, "Allium")], &[]),
            FormField::read_only("id", "Id", "abc"),
        ];
        let data = form(&[("first_name", ""), ("families", "2"), ("id", "tampered")]);
        let mut errors = FieldErrors::new();
        errors.add("first_name", "This field is required.");

        apply_submission(&mut fields, &data, &errors);

        assert_eq!(fields[0].value, "");
        assert_eq!(fields[0].errors.len(), 1);
        assert!(fields[1].choices[1].selected && !fields[1].choices[0].selected);
        assert_eq!(fields[2].value, "abc");
    }

    #[test]
    fn test_password_and_checkbox_fields() {
        let mut fields = vec![
            FormField::password("password", "Password"),
            FormField::checkbox("is_staff", "Staff status", true),
        ];
        assert_eq!(fields[1].value, "on");

        let data = form(&[("password", "hunter2")]);
        assert!(!data.flag("is_staff"));
        assert!(form(&[("is_staff", "on")]).flag("is_staff"));

        apply_submission(&mut fields, &data, &FieldErrors::new());
        assert_eq!(fields[0].value, "");
        assert_eq!(fields[1].value, "");
    }
}
