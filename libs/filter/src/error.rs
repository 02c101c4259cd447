//! Filter construction and validation errors.
//!
//! All of these surface at load time. A filter that produced one is never
//! handed out for matching.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter type '{0}': expected tid_inbound, trp_inbound or trp_outbound")]
    UnknownFilterType(String),

    #[error("Unknown filter action '{0}': expected accept or reject")]
    UnknownAction(String),

    #[error("Unknown constraint type '{0}': expected realm or domain")]
    UnknownConstraintType(String),

    #[error("Field '{field}' is not valid for {filter_type} filters")]
    UnknownField { filter_type: String, field: String },

    #[error("Filter spec for field '{field}' has no non-empty match patterns")]
    EmptySpec { field: String },

    #[error("Filter line has {count} specs, maximum is {max}")]
    TooManySpecs { count: usize, max: usize },

    #[error("Filter spec for field '{field}' has too many match patterns (maximum {max})")]
    TooManyMatches { field: String, max: usize },

    #[error("{constraint_type} constraint has no match patterns")]
    EmptyConstraint { constraint_type: String },

    #[error("{constraint_type} constraint has too many match patterns (maximum {max})")]
    TooManyConstraintMatches { constraint_type: String, max: usize },
}

impl FilterError {
    pub fn unknown_field(filter_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            filter_type: filter_type.into(),
            field: field.into(),
        }
    }

    pub fn empty_spec(field: impl Into<String>) -> Self {
        Self::EmptySpec {
            field: field.into(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
