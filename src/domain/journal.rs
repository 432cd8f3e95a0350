//! Free-form journal entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::AlphaTrackError;
use super::lenient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u64,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalDraft {
    pub title: String,
    pub date: String,
    pub content: String,
}

impl JournalDraft {
    pub fn validate(&self, id: u64) -> Result<JournalEntry, AlphaTrackError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AlphaTrackError::validation("title", "must not be empty"));
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            AlphaTrackError::validation("date", format!("expected YYYY-MM-DD, got {:?}", self.date))
        })?;
        Ok(JournalEntry {
            id,
            title: title.to_string(),
            date,
            content: self.content.clone(),
        })
    }
}

impl From<&JournalEntry> for JournalDraft {
    fn from(entry: &JournalEntry) -> Self {
        JournalDraft {
            title: entry.title.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            content: entry.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_keeps_content_verbatim() {
        let draft = JournalDraft {
            title: " Week 12 ".into(),
            date: "2024-03-22".into(),
            content: "  Patience paid off.\n".into(),
        };
        let entry = draft.validate(5).unwrap();
        assert_eq!(entry.title, "Week 12");
        assert_eq!(entry.content, "  Patience paid off.\n");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 22).unwrap());
    }

    #[test]
    fn validate_rejects_missing_title_or_bad_date() {
        let mut draft = JournalDraft {
            title: "".into(),
            date: "2024-03-22".into(),
            content: String::new(),
        };
        assert!(draft.validate(1).is_err());
        draft.title = "ok".into();
        draft.date = "yesterday".into();
        assert!(draft.validate(1).is_err());
    }

    #[test]
    fn legacy_string_id_is_accepted() {
        let entry: JournalEntry = serde_json::from_str(
            r#"{"id": "1711111111111", "title": "t", "date": "2024-03-22", "content": "c"}"#,
        )
        .unwrap();
        assert_eq!(entry.id, 1_711_111_111_111);
    }
}
