//! Annuity plan generation: level payment, 30/360 accrual and the monthly schedule

pub mod calendar;
mod state;
mod engine;
mod payments;

pub use calendar::{add_months, DueDateRule};
pub use state::PlanState;
pub use engine::{
    compute_schedule, level_payment, monthly_interest, AnnuityEngine, PlanConfig, DUE_DATE_RULE_ENV,
};
pub use payments::{rfc3339, AnnuityPlan, PlanPayment, PlanSummary};
