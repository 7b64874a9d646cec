//! Annuity Plan - repayment schedules for fixed-rate annuity loans
//!
//! This library provides:
//! - Level payment calculation from the annuity formula
//! - Monthly interest/principal split with 30/360 accrual
//! - Final-installment balancing so every plan ends at exactly zero
//! - Request validation for the HTTP endpoint
//! - Parallel plan generation for CSV loan books

pub mod money;
pub mod error;
pub mod loan;
pub mod plan;
pub mod request;
pub mod batch;

// Re-export commonly used types
pub use money::Money;
pub use error::{LoanBookError, PlanError, RequestError};
pub use loan::LoanTerms;
pub use plan::{compute_schedule, AnnuityEngine, AnnuityPlan, DueDateRule, PlanConfig, PlanPayment};
pub use request::GenerateRequest;
pub use batch::PlanRunner;
