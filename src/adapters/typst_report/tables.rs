//! Typst markup for the review tables and summaries.
//!
//! Every user-entered string goes through [`escape`] before it lands in a
//! content block.

use crate::domain::journal::JournalEntry;
use crate::domain::review::ReviewPeriod;
use crate::domain::trade::Trade;

/// Escape characters that Typst treats as markup inside `[...]`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '[' | ']' | '#' | '*' | '_' | '`' | '$' | '<' | '>' | '@' | '~' | '=' | '-' | '+' | '/'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn format_money(value: f64) -> String {
    if value < 0.0 {
        format!("-\\${:.2}", value.abs())
    } else {
        format!("\\${value:.2}")
    }
}

fn dash_if_empty(text: &str) -> String {
    if text.trim().is_empty() {
        "\\-".to_string()
    } else {
        escape(text)
    }
}

pub fn render_trade_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "_No trades recorded for this period._".to_string();
    }

    let mut out = String::from(
        "#table(\n  columns: 9,\n  align: (left, left, left, left, right, right, right, left, right),\n",
    );
    out.push_str(
        "  [Date], [Asset], [Side], [Type], [Entry], [Exit], [Comm.], [Reason], [P/L],\n",
    );

    for trade in trades {
        let side = trade
            .side
            .map(|s| s.to_string())
            .unwrap_or_else(|| "\\-".to_string());
        let colour = if trade.pl >= 0.0 { "green" } else { "red" };
        out.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}], [{}], [{}], [{}], text(fill: {}, [{}]),\n",
            trade.date.format("%Y-%m-%d"),
            escape(&trade.asset),
            side,
            trade.asset_type.to_string().to_uppercase(),
            trade.entry,
            trade.exit,
            format_money(trade.commission),
            dash_if_empty(&trade.reason),
            colour,
            format_money(trade.pl),
        ));
    }

    out.push(')');
    out
}

pub fn render_totals(total_commission: f64, net_pl: f64) -> String {
    format!(
        "Total Commission: {}\n\nTotal Net P/L: *{}*",
        format_money(total_commission),
        format_money(net_pl)
    )
}

/// Journal summary page for weekly and monthly reviews; empty for daily.
pub fn render_journal_summary(period: ReviewPeriod, journal: Option<&[JournalEntry]>) -> String {
    let Some(entries) = journal else {
        return String::new();
    };

    let mut out = format!("#pagebreak()\n\n== {} Journal Summary\n\n", period.label());
    if entries.is_empty() {
        out.push_str("No journal entries recorded for this period.\n");
        return out;
    }

    for entry in entries {
        out.push_str(&format!(
            "=== {}: {}\n\n",
            entry.date.format("%Y-%m-%d"),
            escape(&entry.title)
        ));
        for paragraph in entry.content.split("\n\n") {
            let paragraph = paragraph.trim();
            if !paragraph.is_empty() {
                out.push_str(&escape(paragraph));
                out.push_str("\n\n");
            }
        }
    }
    out
}
