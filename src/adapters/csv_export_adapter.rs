//! CSV export of the trade log.

use crate::domain::error::AlphaTrackError;
use crate::domain::trade::Trade;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const HEADERS: [&str; 10] = [
    "Date",
    "Asset",
    "Side",
    "Type",
    "Entry",
    "Exit",
    "Commission",
    "Reason",
    "Gross P/L",
    "Net P/L",
];

fn csv_error(e: csv::Error) -> AlphaTrackError {
    AlphaTrackError::Io(std::io::Error::other(e))
}

/// Write every trade, in ledger order, as one CSV row.
pub fn write_trades_csv<W: Write>(trades: &[Trade], writer: W) -> Result<(), AlphaTrackError> {
    if trades.is_empty() {
        return Err(AlphaTrackError::EmptyExport {
            reason: "no trades to export".into(),
        });
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS).map_err(csv_error)?;

    for trade in trades {
        let side = trade.side.map(|s| s.to_string()).unwrap_or_default();
        wtr.write_record([
            trade.date.format("%Y-%m-%d").to_string(),
            trade.asset.clone(),
            side,
            trade.asset_type.to_string(),
            trade.entry.to_string(),
            trade.exit.to_string(),
            trade.commission.to_string(),
            trade.reason.clone(),
            trade.pl.to_string(),
            format!("{:.2}", trade.net_pl()),
        ])
        .map_err(csv_error)?;
    }

    wtr.flush()?;
    tracing::info!(rows = trades.len(), "exported trades to csv");
    Ok(())
}

pub fn export_trades_csv(trades: &[Trade], path: &Path) -> Result<(), AlphaTrackError> {
    // Checked before the file is created so a refused export leaves nothing behind.
    if trades.is_empty() {
        return write_trades_csv(trades, std::io::sink());
    }
    let file = File::create(path)?;
    write_trades_csv(trades, file)
}
