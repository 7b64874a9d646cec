//! Running balance state while a plan is generated

use crate::loan::LoanTerms;
use crate::money::Money;

/// State of the loan at the start of the installment being computed
#[derive(Debug, Clone)]
pub struct PlanState {
    /// Current installment number (1-indexed, 0 before the first advance)
    pub payment_number: u32,

    /// Outstanding principal at the start of the current month
    pub opening_balance: Money,

    /// Outstanding principal after the current month's payment
    pub closing_balance: Money,

    /// Interest accrued so far, including the current month once recorded
    pub interest_to_date: Money,
}

impl PlanState {
    /// Initialize state from loan terms before the first installment
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            payment_number: 0,
            opening_balance: terms.principal(),
            closing_balance: terms.principal(),
            interest_to_date: Money::ZERO,
        }
    }

    /// Advance to next month; the prior closing balance becomes the opening balance
    pub fn advance_month(&mut self) {
        self.payment_number += 1;
        self.opening_balance = self.closing_balance;
    }

    /// 0-based month offset from the start date
    pub fn month_index(&self) -> u32 {
        self.payment_number.saturating_sub(1)
    }
}
