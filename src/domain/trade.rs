//! Journaled trades and the raw input they are validated from.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::AlphaTrackError;
use super::lenient::{self, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Forex,
    Stock,
}

impl FromStr for AssetType {
    type Err = AlphaTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forex" | "fx" => Ok(AssetType::Forex),
            "stock" | "stocks" => Ok(AssetType::Stock),
            other => Err(AlphaTrackError::validation(
                "type",
                format!("expected forex or stock, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Forex => f.write_str("forex"),
            AssetType::Stock => f.write_str("stock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Long,
    Short,
}

impl FromStr for Side {
    type Err = AlphaTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Side::Long),
            "short" | "sell" => Ok(Side::Short),
            other => Err(AlphaTrackError::validation(
                "side",
                format!("expected long or short, got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("Long"),
            Side::Short => f.write_str("Short"),
        }
    }
}

fn optional_side<'de, D>(deserializer: D) -> Result<Option<Side>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() || s.trim() == "-" => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u64,
    pub date: NaiveDate,
    pub asset: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(
        default,
        deserialize_with = "optional_side",
        skip_serializing_if = "Option::is_none"
    )]
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub entry: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub exit: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub pl: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub commission: f64,
    #[serde(default)]
    pub reason: String,
}

impl Trade {
    pub fn net_pl(&self) -> f64 {
        self.pl - self.commission
    }
}

/// Unvalidated trade fields as a user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeDraft {
    pub date: String,
    pub asset: String,
    pub asset_type: String,
    pub side: Option<String>,
    pub entry: String,
    pub exit: String,
    pub pl: String,
    pub commission: Option<String>,
    pub reason: Option<String>,
}

impl TradeDraft {
    /// Validate every field and build the trade under the given id.
    pub fn validate(&self, id: u64) -> Result<Trade, AlphaTrackError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            AlphaTrackError::validation("date", format!("expected YYYY-MM-DD, got {:?}", self.date))
        })?;

        let asset = self.asset.trim();
        if asset.is_empty() {
            return Err(AlphaTrackError::validation("asset", "must not be empty"));
        }

        let asset_type: AssetType = self.asset_type.parse()?;

        let side = match self.side.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<Side>()?),
        };

        let entry = required_number("entry", &self.entry)?;
        let exit = required_number("exit", &self.exit)?;
        let pl = required_number("pl", &self.pl)?;

        let commission = match self.commission.as_deref().map(str::trim) {
            None | Some("") => 0.0,
            Some(raw) => required_number("commission", raw)?,
        };
        if commission < 0.0 {
            return Err(AlphaTrackError::validation(
                "commission",
                "must be non-negative",
            ));
        }

        Ok(Trade {
            id,
            date,
            asset: asset.to_string(),
            asset_type,
            side,
            entry,
            exit,
            pl,
            commission,
            reason: self.reason.as_deref().unwrap_or_default().trim().to_string(),
        })
    }
}

impl From<&Trade> for TradeDraft {
    fn from(trade: &Trade) -> Self {
        TradeDraft {
            date: trade.date.format("%Y-%m-%d").to_string(),
            asset: trade.asset.clone(),
            asset_type: trade.asset_type.to_string(),
            side: trade.side.map(|s| s.to_string()),
            entry: trade.entry.to_string(),
            exit: trade.exit.to_string(),
            pl: trade.pl.to_string(),
            commission: Some(trade.commission.to_string()),
            reason: Some(trade.reason.clone()),
        }
    }
}

fn required_number(field: &str, raw: &str) -> Result<f64, AlphaTrackError> {
    parse_number(raw)
        .ok_or_else(|| AlphaTrackError::validation(field, format!("not a number: {raw:?}")))
}
