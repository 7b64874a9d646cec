//! Due-date month arithmetic

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to move a due date forward when the start day does not exist in the
/// target month (e.g. the 31st into February)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueDateRule {
    /// Pin to the last day of the target month: Jan 31 + 1 month = Feb 28/29
    #[default]
    Clamp,
    /// Carry the surplus days into the next month: Jan 31 + 1 month = Mar 3 (Mar 2 in leap years)
    Rollover,
}

impl DueDateRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueDateRule::Clamp => "clamp",
            DueDateRule::Rollover => "rollover",
        }
    }
}

impl fmt::Display for DueDateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DueDateRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(DueDateRule::Clamp),
            "rollover" => Ok(DueDateRule::Rollover),
            other => Err(format!("Unknown due date rule: {}", other)),
        }
    }
}

/// Shift `start` forward by `months` calendar months, keeping time of day and offset.
///
/// Returns `None` if the result falls outside chrono's supported range.
pub fn add_months(
    start: DateTime<FixedOffset>,
    months: u32,
    rule: DueDateRule,
) -> Option<DateTime<FixedOffset>> {
    match rule {
        DueDateRule::Clamp => start.checked_add_months(Months::new(months)),
        DueDateRule::Rollover => {
            let local = start.naive_local();
            let total_months = i64::from(local.month0()) + i64::from(months);
            let year = i32::try_from(total_months / 12)
                .ok()?
                .checked_add(local.year())?;
            let month = (total_months % 12) as u32 + 1;

            let date = NaiveDate::from_ymd_opt(year, month, 1)?
                .checked_add_days(Days::new(u64::from(local.day() - 1)))?;
            date.and_time(local.time())
                .and_local_timezone(*start.offset())
                .single()
        }
    }
}
