//! Error types for plan generation, request validation and loan-book loading

use thiserror::Error;

/// Loan terms the amortization formula cannot handle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("principal must be positive, got {0} cents")]
    NonPositivePrincipal(i64),

    #[error("duration must be at least one month")]
    ZeroDuration,

    /// Zero makes the annuity denominator vanish; NaN/inf poison every row
    #[error("annual interest rate must be a positive finite percentage, got {0}")]
    NonPositiveRate(f64),

    #[error("due date for month {month} is outside the supported calendar range")]
    DateOutOfRange { month: u32 },

    #[error("amounts for month {month} do not fit in 64-bit cents")]
    AmountOverflow { month: u32 },
}

/// Rejections raised while validating a plan request body
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("duration request param is missing/invalid")]
    Duration,

    #[error("duration {0} exceeds the maximum of {max} months", max = crate::request::MAX_DURATION_MONTHS)]
    DurationTooLong(i64),

    #[error("loanAmount request param is invalid: {0}")]
    InvalidLoanAmount(String),

    #[error("incorrect loan amount: {0}")]
    NonPositiveLoanAmount(i64),

    #[error("loan amount {0} is too large to express in cents")]
    LoanAmountOverflow(i64),

    #[error("nominalRate request param is invalid: {0}")]
    InvalidNominalRate(String),

    #[error("incorrect nominalRate: {0}")]
    NonPositiveNominalRate(f64),

    #[error("startDate request param is invalid: {0}")]
    InvalidStartDate(String),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Failures while reading a CSV loan book
#[derive(Debug, Error)]
pub enum LoanBookError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("loan {loan_id}: invalid start date {value:?}: {source}")]
    StartDate {
        loan_id: u32,
        value: String,
        source: chrono::ParseError,
    },

    #[error("loan {loan_id}: {source}")]
    Row { loan_id: u32, source: PlanError },
}
