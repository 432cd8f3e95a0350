//! Period selection for daily, weekly and monthly reviews.

use chrono::{Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::error::AlphaTrackError;
use super::journal::JournalEntry;
use super::ledger::Ledger;
use super::metrics::{self, EquityPoint};
use super::trade::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReviewPeriod {
    /// First date inside the period ending `today`. The cutoff itself (a
    /// week or a calendar month back) falls outside the period.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        let cutoff = match self {
            ReviewPeriod::Daily => return today,
            ReviewPeriod::Weekly => today.checked_sub_days(Days::new(7)),
            ReviewPeriod::Monthly => today.checked_sub_months(Months::new(1)),
        };
        cutoff
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .unwrap_or(today)
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            ReviewPeriod::Daily => date == today,
            _ => date >= self.start(today),
        }
    }

    pub fn trades(self, trades: &[Trade], today: NaiveDate) -> Vec<Trade> {
        trades
            .iter()
            .filter(|t| self.contains(t.date, today))
            .cloned()
            .collect()
    }

    /// Daily reviews carry no journal summary.
    pub fn journal(self, journal: &[JournalEntry], today: NaiveDate) -> Option<Vec<JournalEntry>> {
        match self {
            ReviewPeriod::Daily => None,
            _ => Some(
                journal
                    .iter()
                    .filter(|e| self.contains(e.date, today))
                    .cloned()
                    .collect(),
            ),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReviewPeriod::Daily => "Daily",
            ReviewPeriod::Weekly => "Weekly",
            ReviewPeriod::Monthly => "Monthly",
        }
    }
}

/// Everything a period review report shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReview {
    pub period: ReviewPeriod,
    pub generated_on: NaiveDate,
    pub trades: Vec<Trade>,
    pub journal: Option<Vec<JournalEntry>>,
    pub total_commission: f64,
    pub net_pl: f64,
    pub equity_curve: Vec<EquityPoint>,
}

impl PeriodReview {
    pub fn build(period: ReviewPeriod, ledger: &Ledger, today: NaiveDate) -> Self {
        let trades = period.trades(&ledger.trades, today);
        PeriodReview {
            period,
            generated_on: today,
            journal: period.journal(&ledger.journal, today),
            total_commission: metrics::total_commission(&trades),
            net_pl: metrics::net_pl(&trades),
            equity_curve: metrics::equity_curve(&trades),
            trades,
        }
    }

    pub fn title(&self) -> String {
        format!("{} Trading Review", self.period.label())
    }
}

impl FromStr for ReviewPeriod {
    type Err = AlphaTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(ReviewPeriod::Daily),
            "weekly" | "week" => Ok(ReviewPeriod::Weekly),
            "monthly" | "month" => Ok(ReviewPeriod::Monthly),
            other => Err(AlphaTrackError::validation(
                "period",
                format!("expected daily, weekly or monthly, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for ReviewPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}
