//! Month calendar of daily net P/L.

use chrono::{Datelike, NaiveDate};

use super::trade::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    Profit,
    Loss,
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub net_pl: f64,
    pub trade_count: usize,
    pub outcome: DayOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Days before the 1st in a Sunday-first week row.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Per-day net P/L for one month. Returns `None` for an invalid month.
pub fn month_calendar(trades: &[Trade], year: i32, month: u32) -> Option<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let count = days_in_month(year, month)?;

    let days = (1..=count)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| {
            let day_trades: Vec<&Trade> = trades.iter().filter(|t| t.date == date).collect();
            let net_pl: f64 = day_trades.iter().map(|t| t.net_pl()).sum();
            let outcome = if net_pl > 0.0 {
                DayOutcome::Profit
            } else if net_pl < 0.0 {
                DayOutcome::Loss
            } else {
                DayOutcome::Flat
            };
            CalendarDay {
                date,
                net_pl,
                trade_count: day_trades.len(),
                outcome,
            }
        })
        .collect();

    Some(MonthCalendar {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    })
}
