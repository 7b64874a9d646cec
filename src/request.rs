//! Plan request body and its validation into loan terms
//!
//! Amounts arrive as strings in whole currency units, the rate as a decimal
//! percentage string and the start date as an RFC 3339 timestamp.

use crate::error::RequestError;
use crate::loan::LoanTerms;
use crate::money::Money;
use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Longest plan a request may ask for (100 years of monthly installments).
/// Bounds the size of a single response.
pub const MAX_DURATION_MONTHS: i64 = 1200;

/// Body of a plan generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    /// Whole currency units, e.g. "5000"
    #[serde(alias = "LoanAmount")]
    pub loan_amount: String,

    /// Number of months (JSON number or numeric string)
    #[serde(alias = "Duration", deserialize_with = "duration_field")]
    pub duration: i64,

    /// Annual percentage, e.g. "5.0"
    #[serde(alias = "NominalRate")]
    pub nominal_rate: String,

    /// RFC 3339 timestamp of the first due date
    #[serde(alias = "StartDate")]
    pub start_date: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationField {
    Number(i64),
    Text(String),
}

fn duration_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<DurationField>::deserialize(deserializer)? {
        None => Ok(0),
        Some(DurationField::Number(n)) => Ok(n),
        Some(DurationField::Text(s)) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("duration {:?}: {}", s, e))),
    }
}

impl GenerateRequest {
    /// Check each field in turn and build the loan terms, with the amount in cents
    pub fn validate(&self) -> Result<LoanTerms, RequestError> {
        if self.duration <= 0 {
            return Err(RequestError::Duration);
        }
        if self.duration > MAX_DURATION_MONTHS {
            return Err(RequestError::DurationTooLong(self.duration));
        }
        let duration_months = u32::try_from(self.duration).map_err(|_| RequestError::Duration)?;

        let loan_amount: i64 = self
            .loan_amount
            .parse()
            .map_err(|e: std::num::ParseIntError| RequestError::InvalidLoanAmount(e.to_string()))?;
        if loan_amount <= 0 {
            return Err(RequestError::NonPositiveLoanAmount(loan_amount));
        }
        let cents = loan_amount
            .checked_mul(100)
            .ok_or(RequestError::LoanAmountOverflow(loan_amount))?;

        let nominal_rate: f64 = self
            .nominal_rate
            .parse()
            .map_err(|e: std::num::ParseFloatError| RequestError::InvalidNominalRate(e.to_string()))?;
        if !nominal_rate.is_finite() || nominal_rate <= 0.0 {
            return Err(RequestError::NonPositiveNominalRate(nominal_rate));
        }

        let start_date = DateTime::parse_from_rfc3339(&self.start_date)
            .map_err(|e| RequestError::InvalidStartDate(e.to_string()))?;

        Ok(LoanTerms::new(Money::from_cents(cents), duration_months, nominal_rate, start_date)?)
    }
}
