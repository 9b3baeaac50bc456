//! Field validation for incoming mutation drafts.
//!
//! These are the domain rules, not transport plumbing: a draft that fails
//! here never becomes an intent, so nothing invalid ever reaches the bus.

use crate::record::EntryType;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw mutation fields as submitted by a client, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    /// Calendar date as submitted, `YYYY-MM-DD`.
    pub date: String,
    /// Entry type as submitted; matched case-insensitively.
    pub entry_type: String,
}

/// Why a draft was rejected. Each variant maps to a distinct 400-class
/// message at the HTTP tier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("amount is invalid: {0}")]
    InvalidAmount(f64),

    #[error("type is invalid: {0}")]
    InvalidType(String),

    #[error("date is invalid: {0}")]
    InvalidDate(String),

    #[error("date cannot be set in the future: {0}")]
    FutureDate(NaiveDate),
}

/// A draft that passed validation, with parsed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExpense {
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub entry_type: EntryType,
}

impl ExpenseDraft {
    /// Check every field rule and parse the typed values.
    ///
    /// Rules: non-empty title (after trimming), finite non-negative
    /// amount, a known entry type, a parseable calendar date that is not
    /// after today (UTC).
    pub fn validate(&self) -> Result<ValidatedExpense, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }

        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }

        let entry_type = EntryType::parse(&self.entry_type)
            .ok_or_else(|| ValidationError::InvalidType(self.entry_type.clone()))?;

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        if date > Utc::now().date_naive() {
            return Err(ValidationError::FutureDate(date));
        }

        Ok(ValidatedExpense {
            title: title.to_string(),
            description: self.description.clone(),
            amount: self.amount,
            date,
            entry_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn draft() -> ExpenseDraft {
        ExpenseDraft {
            title: "Lunch".to_string(),
            description: None,
            amount: 12.5,
            date: "2024-03-01".to_string(),
            entry_type: "debit".to_string(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        let validated = draft().validate().unwrap();
        assert_eq!(validated.title, "Lunch");
        assert_eq!(validated.amount, 12.5);
        assert_eq!(validated.entry_type, EntryType::Debit);
        assert_eq!(validated.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn title_is_trimmed() {
        let mut d = draft();
        d.title = "  Lunch  ".to_string();
        assert_eq!(d.validate().unwrap().title, "Lunch");
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert_eq!(d.validate().unwrap_err(), ValidationError::MissingTitle);
    }

    #[test]
    fn negative_and_non_finite_amounts_are_rejected() {
        let mut d = draft();
        d.amount = -0.01;
        assert!(matches!(d.validate(), Err(ValidationError::InvalidAmount(_))));

        d.amount = f64::NAN;
        assert!(matches!(d.validate(), Err(ValidationError::InvalidAmount(_))));

        d.amount = f64::INFINITY;
        assert!(matches!(d.validate(), Err(ValidationError::InvalidAmount(_))));

        d.amount = 0.0;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut d = draft();
        d.entry_type = "transfer".to_string();
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::InvalidType("transfer".to_string())
        );
    }

    #[test]
    fn type_match_is_case_insensitive() {
        let mut d = draft();
        d.entry_type = "Credit".to_string();
        assert_eq!(d.validate().unwrap().entry_type, EntryType::Credit);
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let mut d = draft();
        d.date = "03/01/2024".to_string();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn future_date_is_rejected_today_is_not() {
        let mut d = draft();
        let today = Utc::now().date_naive();

        d.date = today.to_string();
        assert!(d.validate().is_ok());

        d.date = today.checked_add_days(Days::new(1)).unwrap().to_string();
        assert!(matches!(d.validate(), Err(ValidationError::FutureDate(_))));
    }
}
