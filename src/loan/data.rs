//! Validated loan terms feeding the amortization engine

use crate::error::PlanError;
use crate::money::Money;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// The four scalars that fully determine an annuity plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanTerms {
    /// Loan identifier (batch runs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<u32>,

    /// Amount borrowed, in cents
    principal: Money,

    /// Number of monthly installments
    duration_months: u32,

    /// Nominal annual rate in percent (5.0 means 5%)
    annual_rate_percent: f64,

    /// Due date of the first installment
    start_date: DateTime<FixedOffset>,
}

impl LoanTerms {
    /// Check the terms against what the annuity formula can handle
    pub fn new(
        principal: Money,
        duration_months: u32,
        annual_rate_percent: f64,
        start_date: DateTime<FixedOffset>,
    ) -> Result<Self, PlanError> {
        if !principal.is_positive() {
            return Err(PlanError::NonPositivePrincipal(principal.cents()));
        }
        if duration_months == 0 {
            return Err(PlanError::ZeroDuration);
        }
        if !annual_rate_percent.is_finite() || annual_rate_percent <= 0.0 {
            return Err(PlanError::NonPositiveRate(annual_rate_percent));
        }

        Ok(Self {
            loan_id: None,
            principal,
            duration_months,
            annual_rate_percent,
            start_date,
        })
    }

    /// Tag the terms with a loan-book identifier
    pub fn with_loan_id(mut self, loan_id: u32) -> Self {
        self.loan_id = Some(loan_id);
        self
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn duration_months(&self) -> u32 {
        self.duration_months
    }

    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }

    pub fn start_date(&self) -> DateTime<FixedOffset> {
        self.start_date
    }

    /// Whether the 0-based month index is the final installment
    pub fn is_last_month(&self, month_index: u32) -> bool {
        month_index + 1 == self.duration_months
    }
}
