//! Batch plan runner for loan books
//!
//! Holds one configuration and fans independent loans out over rayon's pool.

use crate::error::PlanError;
use crate::loan::LoanTerms;
use crate::plan::{AnnuityEngine, AnnuityPlan, DueDateRule, PlanConfig};
use rayon::prelude::*;

/// Runs many plans with a shared configuration
///
/// # Example
/// ```ignore
/// let loans = load_loans("loan_book.csv")?;
/// let runner = PlanRunner::new(PlanConfig::default());
/// for result in runner.run_batch(&loans) {
///     let plan = result?;
///     println!("{:?}: {}", plan.loan_id(), plan.summary().total_interest);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlanRunner {
    config: PlanConfig,
}

impl PlanRunner {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    /// Run a single plan
    pub fn run(&self, terms: &LoanTerms) -> Result<AnnuityPlan, PlanError> {
        AnnuityEngine::new(self.config.clone()).project_loan(terms)
    }

    /// Run plans for many loans in parallel; results keep the input order
    pub fn run_batch(&self, loans: &[LoanTerms]) -> Vec<Result<AnnuityPlan, PlanError>> {
        let engine = AnnuityEngine::new(self.config.clone());
        let results: Vec<_> = loans.par_iter().map(|terms| engine.project_loan(terms)).collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        log::info!("batch complete: {} loans, {} failed", loans.len(), failed);

        results
    }

    /// Run one loan under several due-date rules
    pub fn run_rules(&self, terms: &LoanTerms, rules: &[DueDateRule]) -> Vec<Result<AnnuityPlan, PlanError>> {
        rules
            .iter()
            .map(|&rule| AnnuityEngine::new(PlanConfig::with_rule(rule)).project_loan(terms))
            .collect()
    }
}
