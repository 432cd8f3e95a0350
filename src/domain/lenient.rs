//! Lenient deserializers for documents written by older clients, which store
//! prices, P/L and ids either as JSON numbers or as strings.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrText {
    Id(u64),
    Text(String),
}

/// Parse user-entered numeric text. Surrounding whitespace is ignored;
/// anything else that is not a finite float is rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numbers or numeric strings. `null`, a missing field and blank text read
/// as zero; so does text that is not a number, which is logged and dropped
/// rather than failing the whole document.
pub fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Number(v)) => Ok(v),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(NumberOrText::Text(s)) => Ok(parse_number(&s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unreadable number in stored document, using 0");
            0.0
        })),
    }
}

/// Ids may be numbers or numeric strings; `null` and blank text read as 0,
/// which marks the entry for renumbering.
pub fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdOrText>::deserialize(deserializer)? {
        None => Ok(0),
        Some(IdOrText::Id(v)) => Ok(v),
        Some(IdOrText::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(IdOrText::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("expected an id, got {s:?}"))),
    }
}
