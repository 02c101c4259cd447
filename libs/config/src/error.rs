//! Errors raised while turning configuration into runtime structures

use filter::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filter definition failed validation
    #[error("Invalid filter definition: {0}")]
    Filter(#[from] FilterError),

    /// Filter document is not valid JSON or has the wrong shape
    #[error("Malformed filter document: {0}")]
    Json(#[from] serde_json::Error),

    /// Filter line without any spec
    #[error("Filter '{label}' line {line}: at least one spec is required")]
    MissingSpecs { label: String, line: usize },

    /// Community type other than apc/coi
    #[error("Community '{id}': unknown type '{value}', expected apc or coi")]
    UnknownCommunityType { id: String, value: String },

    /// Same community id configured twice, or already in the table
    #[error("Community '{id}' is defined more than once")]
    DuplicateCommunity { id: String },

    /// Setting outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
