//! Domain error types.

use std::fmt;

/// Which ledger sequence an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Trade,
    Task,
    Journal,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Trade => "trade",
            EntryKind::Task => "task",
            EntryKind::Journal => "journal entry",
        };
        f.write_str(name)
    }
}

/// Top-level error type for alphatrack.
#[derive(Debug, thiserror::Error)]
pub enum AlphaTrackError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {kind} with id {id}")]
    NotFound { kind: EntryKind, id: u64 },

    #[error("remote replica unavailable: {reason}")]
    RemoteUnavailable { reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("storage query error: {reason}")]
    StorageQuery { reason: String },

    #[error("corrupt document under key {key}: {reason}")]
    CorruptDocument { key: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("nothing to export: {reason}")]
    EmptyExport { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlphaTrackError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        AlphaTrackError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&AlphaTrackError> for std::process::ExitCode {
    fn from(err: &AlphaTrackError) -> Self {
        let code: u8 = match err {
            AlphaTrackError::Io(_) | AlphaTrackError::EmptyExport { .. } => 1,
            AlphaTrackError::ConfigParse { .. }
            | AlphaTrackError::ConfigMissing { .. }
            | AlphaTrackError::ConfigInvalid { .. } => 2,
            AlphaTrackError::Storage { .. }
            | AlphaTrackError::StorageQuery { .. }
            | AlphaTrackError::CorruptDocument { .. } => 3,
            AlphaTrackError::Validation { .. } | AlphaTrackError::NotFound { .. } => 4,
            AlphaTrackError::RemoteUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
