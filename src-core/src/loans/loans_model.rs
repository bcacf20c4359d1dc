use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(
    Queryable, Identifiable, Selectable, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::loans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub start_date: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Loan {
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").ok()
    }

    /// Calendar year the loan starts in, read from the `YYYY` prefix.
    pub fn start_year(&self) -> Option<i32> {
        self.start_date.get(..4).and_then(|y| y.parse().ok())
    }
}

/// Request body for creating a loan. Fields are optional so that a missing one is
/// reported as a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoan {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::loans)]
pub struct NewLoanDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub start_date: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewLoanDB {
    pub fn new(user_id: &str, name: String, amount: f64, start_date: String) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: format!("loan-{}", now.timestamp_millis()),
            user_id: user_id.to_string(),
            name,
            amount,
            start_date,
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
        }
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::loans)]
pub struct LoanChangeset {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub start_date: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

pub fn validate_loan_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::missing_field("name"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_loan_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::invalid_input(format!(
            "Loan amount must be a non-negative number, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Normalizes a start date to `YYYY-MM-DD`; full ISO timestamps are cut to the day.
pub fn validate_start_date(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::missing_field("startDate"));
    }
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| Error::invalid_input(format!("Invalid start date '{}'", trimmed)))
}

impl NewLoan {
    pub fn validate(self, user_id: &str) -> Result<NewLoanDB> {
        let name = validate_loan_name(
            self.name
                .as_deref()
                .ok_or_else(|| Error::missing_field("name"))?,
        )?;
        let amount =
            validate_loan_amount(self.amount.ok_or_else(|| Error::missing_field("amount"))?)?;
        let start_date = validate_start_date(
            self.start_date
                .as_deref()
                .ok_or_else(|| Error::missing_field("startDate"))?,
        )?;
        Ok(NewLoanDB::new(user_id, name, amount, start_date))
    }
}

impl LoanUpdate {
    pub fn validate(self) -> Result<LoanChangeset> {
        Ok(LoanChangeset {
            name: self.name.as_deref().map(validate_loan_name).transpose()?,
            amount: self.amount.map(validate_loan_amount).transpose()?,
            start_date: self.start_date.as_deref().map(validate_start_date).transpose()?,
            updated_at: Some(chrono::Utc::now().naive_utc()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn new_loan_requires_all_fields() {
        let err = NewLoan {
            name: Some("Car".into()),
            amount: None,
            start_date: Some("2024-03-01".into()),
        }
        .validate("u1")
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingField(ref f)) if f == "amount"
        ));

        let err = NewLoan {
            name: Some("   ".into()),
            amount: Some(10.0),
            start_date: Some("2024-03-01".into()),
        }
        .validate("u1")
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingField(_))));
    }

    #[test]
    fn new_loan_gets_timestamp_id_and_normalized_date() {
        let loan = NewLoan {
            name: Some(" Mortgage ".into()),
            amount: Some(250_000.0),
            start_date: Some("2023-05-10T00:00:00.000Z".into()),
        }
        .validate("u1")
        .unwrap();
        assert!(loan.id.starts_with("loan-"));
        assert_eq!(loan.name, "Mortgage");
        assert_eq!(loan.start_date, "2023-05-10");
    }

    #[test]
    fn rejects_bad_amounts_and_dates() {
        assert!(validate_loan_amount(-1.0).is_err());
        assert!(validate_loan_amount(f64::NAN).is_err());
        assert!(validate_start_date("10/05/2023").is_err());
        assert!(validate_start_date("").is_err());
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let changes = LoanUpdate {
            amount: Some(5.0),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.amount, Some(5.0));
        assert!(changes.name.is_none());
        assert!(changes.start_date.is_none());
        assert!(changes.updated_at.is_some());
    }
}
