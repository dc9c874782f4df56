//! Renewal date rules for vegetable instances.
//!
//! A renewal may move an instance's expiration date anywhere from today up to
//! four weeks ahead. The form proposes three weeks when nothing was submitted.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Format accepted from the renewal form (`<input type="date">`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn default_renewal_period() -> Duration {
    Duration::weeks(3)
}

pub fn max_renewal_period() -> Duration {
    Duration::weeks(4)
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalError {
    #[error("Enter a valid date.")]
    Unparseable,

    #[error("Invalid date - renewal in past")]
    InPast,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Date pre-filled in the renewal form.
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + default_renewal_period()
}

pub fn validate_renewal_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if date < today {
        return Err(RenewalError::InPast);
    }
    if date > today + max_renewal_period() {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(date)
}

/// Parse and validate a submitted renewal date.
pub fn clean_renewal_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| RenewalError::Unparseable)?;
    validate_renewal_date(date, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_proposed_date_is_three_weeks_out() {
        assert_eq!(
            proposed_renewal_date(today()),
            NaiveDate::from_ymd_opt(2024, 2, 22).unwrap()
        );
        assert_eq!(proposed_renewal_date(today()) - today(), Duration::days(21));
    }

    #[test]
    fn test_rejects_past_dates() {
        let yesterday = today() - Duration::days(1);
        assert_eq!(validate_renewal_date(yesterday, today()), Err(RenewalError::InPast));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        assert_eq!(validate_renewal_date(today(), today()), Ok(today()));
        let limit = today() + Duration::days(28);
        assert_eq!(validate_renewal_date(limit, today()), Ok(limit));
        assert_eq!(
            validate_renewal_date(limit + Duration::days(1), today()),
            Err(RenewalError::TooFarAhead)
        );
    }

    #[test]
    fn test_five_weeks_rejected_two_weeks_accepted() {
        let five_weeks = today() + Duration::weeks(5);
        let two_weeks = today() + Duration::weeks(2);
        assert_eq!(validate_renewal_date(five_weeks, today()), Err(RenewalError::TooFarAhead));
        assert_eq!(validate_renewal_date(two_weeks, today()), Ok(two_weeks));
    }

    #[test]
    fn test_clean_parses_form_value() {
        assert_eq!(
            clean_renewal_date(" 2024-02-10 ", today()),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())
        );
        assert_eq!(clean_renewal_date("10/02/2024", today()), Err(RenewalError::Unparseable));
        assert_eq!(clean_renewal_date("", today()), Err(RenewalError::Unparseable));
        assert_eq!(clean_renewal_date("2024-01-31", today()), Err(RenewalError::InPast));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RenewalError::InPast.to_string(), "Invalid date - renewal in past");
        assert_eq!(
            RenewalError::TooFarAhead.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
    }
}
