//! Protocol-level errors for TRP and TID message decoding
//!
//! Every variant names the offending field so a rejected batch can be
//! diagnosed from the log line alone. `ProtocolError::kind()` collapses the
//! detail into the three outcomes callers act on.

use thiserror::Error;

/// Coarse error classes used by message handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing field, undecodable JSON, or unknown envelope
    NoParse,
    /// Field present with the wrong JSON type or an out-of-range value
    BadType,
    /// Well-formed record of a kind this router does not accept
    Unsupported,
}

/// Decoding errors with field-level context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// Required field is absent
    #[error("Missing required field '{field}' (context: {context})")]
    NoParse { field: String, context: String },

    /// Field has the wrong JSON type
    #[error("Field '{field}' has wrong type: expected {expected} (context: {context})")]
    BadType {
        field: String,
        expected: String,
        context: String,
    },

    /// Record type is recognised but not accepted inbound
    #[error("Unsupported record type '{record_type}': only route_info records are accepted")]
    Unsupported { record_type: String },

    /// Integer does not fit the field's range
    #[error("Field '{field}' out of range: {value} (allowed: {allowed})")]
    OutOfRange {
        field: String,
        value: String,
        allowed: String,
    },

    /// Envelope names a message type this router does not know
    #[error("Unknown message type '{message_type}': expected update or route_req")]
    UnknownMessageType { message_type: String },

    /// Input is not JSON at all
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    /// Request is missing fields required to process it
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ProtocolError {
    pub fn no_parse(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::NoParse {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn bad_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::BadType {
            field: field.into(),
            expected: expected.into(),
            context: context.into(),
        }
    }

    pub fn unsupported(record_type: impl Into<String>) -> Self {
        Self::Unsupported {
            record_type: record_type.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, value: impl ToString, allowed: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value: value.to_string(),
            allowed: allowed.into(),
        }
    }

    pub fn unknown_message_type(message_type: impl Into<String>) -> Self {
        Self::UnknownMessageType {
            message_type: message_type.into(),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::NoParse { .. }
            | ProtocolError::UnknownMessageType { .. }
            | ProtocolError::MalformedJson(_)
            | ProtocolError::InvalidRequest { .. } => ErrorKind::NoParse,
            ProtocolError::BadType { .. } | ProtocolError::OutOfRange { .. } => ErrorKind::BadType,
            ProtocolError::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::MalformedJson(err.to_string())
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ProtocolError::no_parse("metric", "record 1").kind(), ErrorKind::NoParse);
        assert_eq!(
            ProtocolError::bad_type("metric", "integer", "record 1").kind(),
            ErrorKind::BadType
        );
        assert_eq!(
            ProtocolError::out_of_range("metric", -1, "0..=4294967295").kind(),
            ErrorKind::BadType
        );
        assert_eq!(ProtocolError::unsupported("comm_info").kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = ProtocolError::no_parse("trust_router", "update record 2");
        assert_eq!(
            err.to_string(),
            "Missing required field 'trust_router' (context: update record 2)"
        );
    }
}
