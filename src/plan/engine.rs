//! Core amortization engine for annuity repayment plans

use super::calendar::{add_months, DueDateRule};
use super::payments::{AnnuityPlan, PlanPayment};
use super::state::PlanState;
use crate::error::PlanError;
use crate::loan::LoanTerms;
use crate::money::Money;
use chrono::{DateTime, FixedOffset};
use std::env;

/// Environment variable selecting the due-date rule for binaries
pub const DUE_DATE_RULE_ENV: &str = "DUE_DATE_RULE";

/// Configuration for plan generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanConfig {
    /// Month-end handling for due dates
    pub due_date_rule: DueDateRule,
}

impl PlanConfig {
    pub fn with_rule(due_date_rule: DueDateRule) -> Self {
        Self { due_date_rule }
    }

    /// Read overrides from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var(DUE_DATE_RULE_ENV) {
            match value.parse() {
                Ok(rule) => config.due_date_rule = rule,
                Err(e) => log::warn!("ignoring {}: {}", DUE_DATE_RULE_ENV, e),
            }
        }

        config
    }
}

/// Level installment from the annuity formula `P * r / (1 - (1 + r)^-n)`,
/// with `r` the monthly rate derived from the annual percentage.
///
/// `None` when the installment does not fit in 64-bit cents.
pub fn level_payment(principal: Money, duration_months: u32, annual_rate_percent: f64) -> Option<Money> {
    let rate = annual_rate_percent / 12.0 / 100.0;
    Money::from_f64_cents(annuity_payment(principal.as_f64_cents(), duration_months, rate))
}

fn annuity_payment(principal_cents: f64, duration_months: u32, monthly_rate: f64) -> f64 {
    principal_cents * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-f64::from(duration_months)))
}

/// One month of interest on `balance` under 30/360, computed from the annual
/// rate directly rather than the monthly rate used for the level payment.
pub fn monthly_interest(balance: Money, annual_rate_percent: f64) -> Option<Money> {
    Money::from_f64_cents(annual_rate_percent * 30.0 * balance.as_f64_cents() / (360.0 * 100.0))
}

/// Generate a plan with the default configuration
pub fn compute_schedule(
    principal: Money,
    duration_months: u32,
    annual_rate_percent: f64,
    start_date: DateTime<FixedOffset>,
) -> Result<AnnuityPlan, PlanError> {
    AnnuityEngine::default().compute_schedule(principal, duration_months, annual_rate_percent, start_date)
}

/// Main amortization engine
#[derive(Debug, Clone, Default)]
pub struct AnnuityEngine {
    config: PlanConfig,
}

impl AnnuityEngine {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Validate the four loan scalars and generate the plan
    pub fn compute_schedule(
        &self,
        principal: Money,
        duration_months: u32,
        annual_rate_percent: f64,
        start_date: DateTime<FixedOffset>,
    ) -> Result<AnnuityPlan, PlanError> {
        let terms = LoanTerms::new(principal, duration_months, annual_rate_percent, start_date)?;
        self.project_loan(&terms)
    }

    /// Generate the plan for already-validated terms.
    ///
    /// Fails when a due date leaves chrono's calendar range, or when an
    /// amount (including the plan's total paid) does not fit in 64-bit cents.
    pub fn project_loan(&self, terms: &LoanTerms) -> Result<AnnuityPlan, PlanError> {
        let level = level_payment(terms.principal(), terms.duration_months(), terms.annual_rate_percent())
            .ok_or(PlanError::AmountOverflow { month: 1 })?;
        log::debug!(
            "plan for {} over {} months at {}%: level payment {} ({} rule)",
            terms.principal(),
            terms.duration_months(),
            terms.annual_rate_percent(),
            level,
            self.config.due_date_rule,
        );

        let mut plan = AnnuityPlan::new(terms.loan_id, level);
        let mut state = PlanState::from_terms(terms);

        for _ in 0..terms.duration_months() {
            state.advance_month();
            let payment = self.calculate_month(terms, &mut state, level)?;
            plan.add_payment(payment);
        }

        // Keeps every summary total representable
        terms
            .principal()
            .checked_add(state.interest_to_date)
            .ok_or(PlanError::AmountOverflow { month: terms.duration_months() })?;

        debug_assert_eq!(state.closing_balance, Money::ZERO);
        log::debug!("plan complete: {} payments, interest {}", plan.len(), state.interest_to_date);

        Ok(plan)
    }

    /// Split one month's installment into interest and principal
    fn calculate_month(
        &self,
        terms: &LoanTerms,
        state: &mut PlanState,
        level: Money,
    ) -> Result<PlanPayment, PlanError> {
        let month_index = state.month_index();
        let date = add_months(terms.start_date(), month_index, self.config.due_date_rule)
            .ok_or(PlanError::DateOutOfRange { month: state.payment_number })?;

        let month = state.payment_number;
        let overflow = || PlanError::AmountOverflow { month };

        let opening = state.opening_balance;
        let interest = monthly_interest(opening, terms.annual_rate_percent()).ok_or_else(overflow)?;

        // Final installment clears whatever rounding left on the balance
        let payment_amount = if terms.is_last_month(month_index) {
            opening.checked_add(interest).ok_or_else(overflow)?
        } else {
            level
        };

        let principal = payment_amount.checked_sub(interest).ok_or_else(overflow)?;
        let closing = opening.checked_sub(principal).ok_or_else(overflow)?;
        let interest_to_date = state.interest_to_date.checked_add(interest).ok_or_else(overflow)?;

        log::trace!(
            "payment {}: opening {} interest {} principal {} closing {}",
            state.payment_number,
            opening,
            interest,
            principal,
            closing,
        );

        state.closing_balance = closing;
        state.interest_to_date = interest_to_date;

        Ok(PlanPayment {
            date,
            payment_amount,
            principal_amount: principal,
            interest_amount: interest,
            initial_outstanding_principal: opening,
            remaining_outstanding_principal: closing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2018-01-01T00:00:01Z").unwrap()
    }

    fn plan(principal: i64, months: u32, rate: f64) -> AnnuityPlan {
        compute_schedule(Money::from_cents(principal), months, rate, start()).unwrap()
    }

    fn assert_plan_invariants(plan: &AnnuityPlan, principal: i64, months: u32) {
        let payments = plan.payments();
        assert_eq!(payments.len(), months as usize);
        assert_eq!(payments[0].initial_outstanding_principal, Money::from_cents(principal));

        for p in payments {
            assert_eq!(p.payment_amount, p.principal_amount + p.interest_amount);
            assert_eq!(p.remaining_outstanding_principal, p.initial_outstanding_principal - p.principal_amount);
        }

        for pair in payments.windows(2) {
            assert_eq!(pair[1].initial_outstanding_principal, pair[0].remaining_outstanding_principal);
        }

        for p in &payments[..payments.len() - 1] {
            assert_eq!(p.payment_amount, plan.level_payment());
        }

        let last = payments.last().unwrap();
        assert_eq!(last.remaining_outstanding_principal, Money::ZERO);
        assert_eq!(last.principal_amount, last.initial_outstanding_principal);
        assert!(last.payment_amount.is_positive());
    }

    #[test]
    fn test_level_payment_reference_example() {
        let payment = level_payment(Money::from_cents(500_000), 24, 5.0);
        assert_eq!(payment, Some(Money::from_cents(21936)));

        let raw = annuity_payment(500_000.0, 24, 5.0 / 1200.0);
        assert_relative_eq!(raw, 21935.6949, epsilon = 1e-3);
    }

    #[test]
    fn test_first_month_interest() {
        assert_eq!(monthly_interest(Money::from_cents(500_000), 5.0), Some(Money::from_cents(2083)));

        let plan = plan(500_000, 24, 5.0);
        assert_eq!(plan.payments()[0].interest_amount, Money::from_cents(2083));
        assert_eq!(plan.payments()[0].principal_amount, Money::from_cents(19853));
        assert_eq!(plan.payments()[1].initial_outstanding_principal, Money::from_cents(480147));
        assert_eq!(plan.payments()[1].interest_amount, Money::from_cents(2001));
    }

    #[test]
    fn test_reference_plan() {
        let plan = plan(500_000, 24, 5.0);
        assert_plan_invariants(&plan, 500_000, 24);

        let last = plan.payments().last().unwrap();
        assert_eq!(last.initial_outstanding_principal, Money::from_cents(21837));
        assert_eq!(last.interest_amount, Money::from_cents(91));
        assert_eq!(last.payment_amount, Money::from_cents(21928));

        let summary = plan.summary();
        assert_eq!(summary.total_interest, Money::from_cents(26456));
        assert_eq!(summary.total_principal, Money::from_cents(500_000));
        assert_eq!(summary.total_paid, Money::from_cents(526_456));
        assert_eq!(summary.final_payment, Money::from_cents(21928));
    }

    #[test]
    fn test_small_loan_end_to_end() {
        let plan = plan(10_000, 5, 10.0);
        assert_plan_invariants(&plan, 10_000, 5);

        assert_eq!(plan.level_payment(), Money::from_cents(2050));
        let interest: Vec<i64> = plan.payments().iter().map(|p| p.interest_amount.cents()).collect();
        assert_eq!(interest, vec![83, 67, 50, 34, 17]);

        let last = plan.payments().last().unwrap();
        assert_eq!(last.payment_amount, Money::from_cents(2051));
        assert_eq!(last.principal_amount, Money::from_cents(2034));
    }

    #[test]
    fn test_single_payment_loan() {
        let plan = plan(100_000, 1, 6.0);
        assert_plan_invariants(&plan, 100_000, 1);

        let only = &plan.payments()[0];
        assert_eq!(only.interest_amount, Money::from_cents(500));
        assert_eq!(only.payment_amount, Money::from_cents(100_500));
    }

    #[test]
    fn test_invariants_across_terms() {
        for &(principal, months, rate) in &[
            (123_456, 12, 3.75),
            (1, 3, 1.0),
            (99_999_999, 360, 7.125),
            (2_500_000, 120, 0.01),
            (50_000, 7, 24.0),
        ] {
            let plan = plan(principal, months, rate);
            assert_plan_invariants(&plan, principal, months);
        }
    }

    #[test]
    fn test_due_dates_follow_rule() {
        let start = DateTime::parse_from_rfc3339("2024-01-31T00:00:00Z").unwrap();
        let terms = LoanTerms::new(Money::from_cents(10_000), 3, 5.0, start).unwrap();

        let clamp = AnnuityEngine::new(PlanConfig::with_rule(DueDateRule::Clamp))
            .project_loan(&terms)
            .unwrap();
        let dates: Vec<String> = clamp.payments().iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(dates, vec!["2024-01-31", "2024-02-29", "2024-03-31"]);

        let rollover = AnnuityEngine::new(PlanConfig::with_rule(DueDateRule::Rollover))
            .project_loan(&terms)
            .unwrap();
        let dates: Vec<String> = rollover.payments().iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(dates, vec!["2024-01-31", "2024-03-02", "2024-03-31"]);
    }

    #[test]
    fn test_rejects_unsupported_terms() {
        assert_eq!(
            compute_schedule(Money::from_cents(10_000), 12, 0.0, start()),
            Err(PlanError::NonPositiveRate(0.0))
        );
        assert_eq!(
            compute_schedule(Money::from_cents(10_000), 0, 5.0, start()),
            Err(PlanError::ZeroDuration)
        );
        assert_eq!(
            compute_schedule(Money::ZERO, 12, 5.0, start()),
            Err(PlanError::NonPositivePrincipal(0))
        );
    }

    #[test]
    fn test_date_out_of_range() {
        use chrono::{Datelike, NaiveDate, TimeZone};

        let last_year = NaiveDate::MAX.year();
        let naive = NaiveDate::from_ymd_opt(last_year, 11, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let start = FixedOffset::east_opt(0).unwrap().from_utc_datetime(&naive);

        let err = compute_schedule(Money::from_cents(1_000_000), 3, 5.0, start).unwrap_err();
        assert_eq!(err, PlanError::DateOutOfRange { month: 3 });
    }

    #[test]
    fn test_amount_overflow_is_error() {
        // Level payment of about 9.375e18 cents does not fit in an i64
        let principal = Money::from_cents(9_000_000_000_000_000_000);
        assert_eq!(level_payment(principal, 1, 50.0), None);
        assert_eq!(
            compute_schedule(principal, 1, 50.0, start()),
            Err(PlanError::AmountOverflow { month: 1 })
        );

        // Every row fits but the total paid over the plan does not
        let principal = Money::from_cents(6_000_000_000_000_000_000);
        assert_eq!(
            compute_schedule(principal, 120, 10.0, start()),
            Err(PlanError::AmountOverflow { month: 120 })
        );
    }

    #[test]
    fn test_plan_json_is_array_of_payments() {
        let plan = plan(500_000, 24, 5.0);
        let value = serde_json::to_value(plan.payments()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows[0]["date"], "2018-01-01T00:00:01Z");
        assert_eq!(rows[0]["borrowerPaymentAmount"], "219.36");
        assert_eq!(rows[0]["interest"], "20.83");
        assert_eq!(rows[23]["date"], "2019-12-01T00:00:01Z");
        assert_eq!(rows[23]["remainingOutstandingPrincipal"], "0.00");
    }
}
