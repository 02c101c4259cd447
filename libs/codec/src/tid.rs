//! Trust identity (TID) request model.
//!
//! Only the fields admission control reads are decoded; key-exchange data is
//! carried by the surrounding request handler and never reaches this crate.

use serde_json::{json, Value};
use types::Name;

use crate::error::{ProtocolError, ProtocolResult};
use crate::parser::{get_optional_name, get_string};

/// An inbound TID request as seen by the admission filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidRequest {
    pub rp_realm: Name,
    pub realm: Name,
    pub comm: Name,
    pub orig_coi: Option<Name>,
    pub request_id: Option<String>,
}

impl TidRequest {
    pub fn new(rp_realm: impl Into<Name>, realm: impl Into<Name>, comm: impl Into<Name>) -> Self {
        Self {
            rp_realm: rp_realm.into(),
            realm: realm.into(),
            comm: comm.into(),
            orig_coi: None,
            request_id: None,
        }
    }

    pub fn with_orig_coi(mut self, coi: impl Into<Name>) -> Self {
        self.orig_coi = Some(coi.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Decode from the request JSON. Requests lacking the RP realm, target
    /// realm or community are rejected as a bad request format.
    pub fn from_json(value: &Value) -> ProtocolResult<Self> {
        let context = "tid request";
        let required = |field: &str| -> ProtocolResult<Name> {
            match get_string(value, field, context) {
                Ok(s) => Ok(Name::from(s)),
                Err(ProtocolError::NoParse { .. }) => Err(ProtocolError::invalid_request(format!(
                    "Bad request format: missing '{}'",
                    field
                ))),
                Err(other) => Err(other),
            }
        };

        let rp_realm = required("rp_realm")?;
        let realm = required("target_realm")?;
        let comm = required("community")?;
        let orig_coi = get_optional_name(value, "orig_coi", context)?;
        let request_id = get_optional_name(value, "request_id", context)?
            .map(|id| id.to_string_lossy().into_owned());

        Ok(Self {
            rp_realm,
            realm,
            comm,
            orig_coi,
            request_id,
        })
    }

    pub fn from_slice(buf: &[u8]) -> ProtocolResult<Self> {
        let value: Value = serde_json::from_slice(buf)?;
        Self::from_json(&value)
    }

    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "rp_realm": self.rp_realm,
            "target_realm": self.realm,
            "community": self.comm,
        });
        if let Some(coi) = &self.orig_coi {
            value["orig_coi"] = json!(coi);
        }
        if let Some(id) = &self.request_id {
            value["request_id"] = json!(id);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_request() {
        let req = TidRequest::from_slice(
            br#"{"rp_realm":"rp.example.org","target_realm":"idp.example.org",
                 "community":"coi.alpha","orig_coi":"coi.origin","request_id":"abc-1"}"#,
        )
        .unwrap();
        assert!(req.rp_realm.eq_str("rp.example.org"));
        assert!(req.realm.eq_str("idp.example.org"));
        assert!(req.comm.eq_str("coi.alpha"));
        assert!(req.orig_coi.as_ref().unwrap().eq_str("coi.origin"));
        assert_eq!(req.request_id.as_deref(), Some("abc-1"));
    }

    #[test]
    fn test_missing_required_field_is_bad_format() {
        let err = TidRequest::from_slice(br#"{"rp_realm":"rp.example.org","community":"coi.alpha"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRequest { .. }));
        assert!(err.to_string().contains("Bad request format"));
    }

    #[test]
    fn test_optional_fields_absent() {
        let req = TidRequest::new("rp", "idp", "coi");
        let decoded = TidRequest::from_json(&req.to_json()).unwrap();
        assert_eq!(decoded, req);
        assert!(decoded.orig_coi.is_none());
    }
}
