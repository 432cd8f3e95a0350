//! Trade statistics: P/L totals, win/loss aggregates, drawdown and the
//! equity curve.
//!
//! Everything here is recomputed from the trade list on each call. Empty
//! inputs degrade to zero (or the infinite profit factor) instead of failing.

use chrono::{Days, NaiveDate};
use std::fmt;

use super::task::Task;
use super::trade::Trade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Gross wins over gross losses. There is no finite ratio when nothing was
/// lost, which includes the empty trade list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Ratio(f64),
    Infinite,
}

impl ProfitFactor {
    pub fn as_f64(self) -> f64 {
        match self {
            ProfitFactor::Ratio(r) => r,
            ProfitFactor::Infinite => f64::INFINITY,
        }
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Ratio(r) => write!(f, "{r:.2}"),
            ProfitFactor::Infinite => f.write_str("∞"),
        }
    }
}

pub fn gross_pl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pl).sum()
}

pub fn total_commission(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.commission).sum()
}

pub fn net_pl(trades: &[Trade]) -> f64 {
    trades.iter().map(Trade::net_pl).sum()
}

/// Fraction of trades with a strictly positive gross P/L, in `0.0..=1.0`.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.pl > 0.0).count();
    wins as f64 / trades.len() as f64
}

pub fn profit_factor(trades: &[Trade]) -> ProfitFactor {
    let total_wins: f64 = trades.iter().filter(|t| t.pl > 0.0).map(|t| t.pl).sum();
    let total_losses: f64 = trades
        .iter()
        .filter(|t| t.pl < 0.0)
        .map(|t| t.pl.abs())
        .sum();

    if total_losses > 0.0 {
        ProfitFactor::Ratio(total_wins / total_losses)
    } else {
        ProfitFactor::Infinite
    }
}

pub fn avg_win(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.pl > 0.0).map(|t| t.pl))
}

/// Mean size of the losing trades, as a positive magnitude.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.pl < 0.0).map(|t| t.pl.abs()))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Trades in ascending date order. The sort is stable: same-day trades keep
/// their ledger order.
pub fn sorted_by_date(trades: &[Trade]) -> Vec<&Trade> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.date);
    sorted
}

/// Largest fall of cumulative net P/L below its running peak. The peak
/// starts at zero, so early losses count as drawdown.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut peak = 0.0_f64;
    let mut cumulative = 0.0_f64;
    let mut max_dd = 0.0_f64;

    for trade in sorted_by_date(trades) {
        cumulative += trade.net_pl();
        if cumulative > peak {
            peak = cumulative;
        }
        let dd = peak - cumulative;
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Cumulative net P/L after each trade in date order, preceded by a zero
/// point the day before the first trade. No trades, no curve.
pub fn equity_curve(trades: &[Trade]) -> Vec<EquityPoint> {
    let sorted = sorted_by_date(trades);
    let Some(first) = sorted.first() else {
        return Vec::new();
    };

    let start = first.date.checked_sub_days(Days::new(1)).unwrap_or(first.date);
    let mut curve = Vec::with_capacity(sorted.len() + 1);
    curve.push(EquityPoint {
        date: start,
        equity: 0.0,
    });

    let mut cumulative = 0.0;
    for trade in sorted {
        cumulative += trade.net_pl();
        curve.push(EquityPoint {
            date: trade.date,
            equity: cumulative,
        });
    }

    curve
}

/// The last `n` trades recorded, newest first.
pub fn recent_trades(trades: &[Trade], n: usize) -> Vec<&Trade> {
    trades.iter().rev().take(n).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub gross_pl: f64,
    pub total_commission: f64,
    pub net_pl: f64,
    pub win_rate: f64,
    pub profit_factor: ProfitFactor,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub tasks_completed: usize,
    pub tasks_total: usize,
}

impl TradeStats {
    pub fn compute(trades: &[Trade], tasks: &[Task]) -> Self {
        TradeStats {
            total_trades: trades.len(),
            gross_pl: gross_pl(trades),
            total_commission: total_commission(trades),
            net_pl: net_pl(trades),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            max_drawdown: max_drawdown(trades),
            tasks_completed: tasks.iter().filter(|t| t.completed).count(),
            tasks_total: tasks.len(),
        }
    }
}
