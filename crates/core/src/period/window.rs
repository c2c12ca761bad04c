//! Spend period and window types.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurring accounting window for a policy limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendPeriod {
    /// Every expense is judged on its own; nothing accumulates.
    #[default]
    PerExpense,
    /// Calendar day.
    Daily,
    /// Monday through Sunday.
    Weekly,
    /// Calendar month.
    Monthly,
    /// Calendar year.
    Yearly,
}

impl SpendPeriod {
    /// Returns the string representation of the period.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerExpense => "per_expense",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses a period from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per_expense" => Some(Self::PerExpense),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Returns true if spend accumulates across expenses in this period.
    #[must_use]
    pub const fn accumulates(&self) -> bool {
        !matches!(self, Self::PerExpense)
    }
}

impl fmt::Display for SpendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive `[start, end]` window of instants.
///
/// Boundaries are computed on UTC calendar fields and carry millisecond
/// precision: a day runs from `00:00:00.000` to `23:59:59.999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendWindow {
    /// First instant in the window.
    pub start: DateTime<Utc>,
    /// Last instant in the window.
    pub end: DateTime<Utc>,
}

impl SpendWindow {
    /// Computes the window containing `anchor` for the given period.
    ///
    /// For `PerExpense` the window degenerates to the anchor itself; callers
    /// skip aggregation entirely for that period.
    #[must_use]
    pub fn compute(anchor: DateTime<Utc>, period: SpendPeriod) -> Self {
        let date = anchor.date_naive();

        match period {
            SpendPeriod::PerExpense => Self {
                start: anchor,
                end: anchor,
            },
            SpendPeriod::Daily => Self::days(date, date),
            SpendPeriod::Weekly => {
                // Monday = 0 .. Sunday = 6
                let offset = i64::from(date.weekday().num_days_from_monday());
                let monday = date - Duration::days(offset);
                Self::days(monday, monday + Duration::days(6))
            }
            SpendPeriod::Monthly => {
                let first = date - Duration::days(i64::from(date.day0()));
                let last = first + Months::new(1) - Duration::days(1);
                Self::days(first, last)
            }
            SpendPeriod::Yearly => {
                let first = date - Duration::days(i64::from(date.ordinal0()));
                let last = first + Months::new(12) - Duration::days(1);
                Self::days(first, last)
            }
        }
    }

    /// Returns true if the instant falls inside the window (inclusive).
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date + Duration::days(1)) - Duration::milliseconds(1)
}
