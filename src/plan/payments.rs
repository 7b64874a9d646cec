//! Payment plan output structures

use crate::money::Money;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// RFC 3339 with whole seconds and `Z` for UTC, e.g. "2018-01-01T00:00:01Z"
pub mod rfc3339 {
    use chrono::{DateTime, FixedOffset, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<FixedOffset>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn serialize<S: Serializer>(date: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)
    }
}

/// A single installment of an annuity plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPayment {
    /// Due date
    #[serde(with = "rfc3339")]
    pub date: DateTime<FixedOffset>,

    /// Total paid by the borrower this month
    #[serde(rename = "borrowerPaymentAmount")]
    pub payment_amount: Money,

    /// Portion of the payment that reduces the balance
    #[serde(rename = "principal")]
    pub principal_amount: Money,

    /// Portion of the payment that is interest
    #[serde(rename = "interest")]
    pub interest_amount: Money,

    #[serde(rename = "initialOutstandingPrincipal")]
    pub initial_outstanding_principal: Money,

    #[serde(rename = "remainingOutstandingPrincipal")]
    pub remaining_outstanding_principal: Money,
}

/// Complete repayment plan for one loan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityPlan {
    /// Loan identifier when the plan came from a loan book
    #[serde(skip_serializing_if = "Option::is_none")]
    loan_id: Option<u32>,

    /// Installment paid every month except the last
    level_payment: Money,

    /// Monthly installments in due-date order
    payments: Vec<PlanPayment>,
}

impl AnnuityPlan {
    pub(crate) fn new(loan_id: Option<u32>, level_payment: Money) -> Self {
        Self {
            loan_id,
            level_payment,
            payments: Vec::new(),
        }
    }

    pub(crate) fn add_payment(&mut self, payment: PlanPayment) {
        self.payments.push(payment);
    }

    pub fn loan_id(&self) -> Option<u32> {
        self.loan_id
    }

    pub fn level_payment(&self) -> Money {
        self.level_payment
    }

    pub fn payments(&self) -> &[PlanPayment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Get summary statistics
    pub fn summary(&self) -> PlanSummary {
        let total_paid: Money = self.payments.iter().map(|p| p.payment_amount).sum();
        let total_interest: Money = self.payments.iter().map(|p| p.interest_amount).sum();
        let total_principal: Money = self.payments.iter().map(|p| p.principal_amount).sum();

        PlanSummary {
            payment_count: self.payments.len() as u32,
            level_payment: self.level_payment,
            final_payment: self.payments.last().map(|p| p.payment_amount).unwrap_or_default(),
            total_paid,
            total_interest,
            total_principal,
            final_due_date: self.payments.last().map(|p| p.date),
        }
    }
}

/// Summary statistics for a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub payment_count: u32,
    pub level_payment: Money,
    pub final_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    #[serde(serialize_with = "serialize_optional_date")]
    pub final_due_date: Option<DateTime<FixedOffset>>,
}

fn serialize_optional_date<S: serde::Serializer>(
    date: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => rfc3339::serialize(d, serializer),
        None => serializer.serialize_none(),
    }
}
