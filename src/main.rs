//! Annuity Plan CLI
//!
//! Prints the repayment plan for one loan, or for every loan in a CSV loan book.
//! The due-date rule can also be set through the `DUE_DATE_RULE` environment variable.

use annuity_plan::{
    loan::load_loans,
    plan::{rfc3339, AnnuityPlan, DueDateRule, PlanConfig, PlanPayment},
    AnnuityEngine, LoanTerms, Money, PlanRunner,
};
use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RuleArg {
    Clamp,
    Rollover,
}

impl From<RuleArg> for DueDateRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Clamp => DueDateRule::Clamp,
            RuleArg::Rollover => DueDateRule::Rollover,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "annuity-plan", version, about = "Generate annuity loan repayment plans")]
struct Cli {
    /// Loan amount in cents
    #[arg(long, default_value_t = 500_000)]
    amount: i64,

    /// Duration in months
    #[arg(long, default_value_t = 24)]
    duration: u32,

    /// Nominal annual rate in percent
    #[arg(long, default_value_t = 5.0)]
    rate: f64,

    /// First due date (RFC 3339)
    #[arg(long, default_value = "2018-01-01T00:00:01Z")]
    start_date: String,

    /// CSV loan book (LoanID,LoanAmount,Duration,NominalRate,StartDate); overrides the single-loan flags
    #[arg(long)]
    loan_book: Option<PathBuf>,

    /// Month-end handling for due dates (default: DUE_DATE_RULE or clamp)
    #[arg(long, value_enum)]
    due_date_rule: Option<RuleArg>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print only the plan summary
    #[arg(long)]
    summary: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// One CSV line of a loan-book run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookCsvRow {
    loan_id: Option<u32>,
    date: String,
    borrower_payment_amount: Money,
    principal: Money,
    interest: Money,
    initial_outstanding_principal: Money,
    remaining_outstanding_principal: Money,
}

impl BookCsvRow {
    fn new(loan_id: Option<u32>, p: &PlanPayment) -> Self {
        Self {
            loan_id,
            date: rfc3339::format(&p.date),
            borrower_payment_amount: p.payment_amount,
            principal: p.principal_amount,
            interest: p.interest_amount,
            initial_outstanding_principal: p.initial_outstanding_principal,
            remaining_outstanding_principal: p.remaining_outstanding_principal,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = PlanConfig::from_env();
    if let Some(rule) = cli.due_date_rule {
        config.due_date_rule = rule.into();
    }

    let plans = match &cli.loan_book {
        Some(path) => {
            let loans = load_loans(path).with_context(|| format!("loading loan book {}", path.display()))?;
            PlanRunner::new(config)
                .run_batch(&loans)
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
                .context("generating loan book plans")?
        }
        None => {
            let start_date = DateTime::parse_from_rfc3339(&cli.start_date)
                .with_context(|| format!("invalid start date {:?}", cli.start_date))?;
            let terms = LoanTerms::new(Money::from_cents(cli.amount), cli.duration, cli.rate, start_date)
                .context("invalid loan terms")?;
            vec![AnnuityEngine::new(config).project_loan(&terms)?]
        }
    };

    for plan in &plans {
        let summary = plan.summary();
        log::info!(
            "loan {:?}: {} payments of {}, total interest {}",
            plan.loan_id(),
            summary.payment_count,
            summary.level_payment,
            summary.total_interest,
        );
    }

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    write_plans(writer, &plans, cli.format, cli.summary, cli.loan_book.is_some())?;

    if let Some(path) = &cli.output {
        eprintln!("Plan written to: {}", path.display());
    }

    Ok(())
}

fn write_plans<W: Write>(
    mut writer: W,
    plans: &[AnnuityPlan],
    format: OutputFormat,
    summary_only: bool,
    from_book: bool,
) -> Result<()> {
    match (format, summary_only) {
        (OutputFormat::Json, true) => {
            let summaries: Vec<_> = plans.iter().map(|p| p.summary()).collect();
            if from_book {
                serde_json::to_writer_pretty(&mut writer, &summaries)?;
            } else {
                serde_json::to_writer_pretty(&mut writer, &summaries[0])?;
            }
            writeln!(writer)?;
        }
        (OutputFormat::Json, false) => {
            if from_book {
                serde_json::to_writer_pretty(&mut writer, plans)?;
            } else {
                serde_json::to_writer_pretty(&mut writer, plans[0].payments())?;
            }
            writeln!(writer)?;
        }
        (OutputFormat::Csv, true) => {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            for plan in plans {
                csv_writer.serialize(plan.summary())?;
            }
            csv_writer.flush()?;
        }
        (OutputFormat::Csv, false) => {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            for plan in plans {
                for payment in plan.payments() {
                    if from_book {
                        csv_writer.serialize(BookCsvRow::new(plan.loan_id(), payment))?;
                    } else {
                        csv_writer.serialize(payment)?;
                    }
                }
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}
