//! # TRP Update Parser - All-or-Nothing Record Decoding
//!
//! ## Purpose
//!
//! Turns an already-decoded JSON update body into typed `InfoRecord`s. The
//! batch is decoded completely before anything is returned: one bad record
//! fails the whole batch, so a handler never applies half an update.
//!
//! ## Record Rules
//!
//! - `record_type` must be `"route_info"`; `"comm_info"` or any other value
//!   is `Unsupported` and aborts the batch
//! - `community`, `realm`, `trust_router` are required strings
//! - `metric`, `interval` are required non-negative integers that fit `u32`
//! - missing field ⇒ `NoParse`, wrong JSON type ⇒ `BadType`
//! - field order is irrelevant; unknown fields are ignored
//!
//! ## Troubleshooting
//!
//! **Whole update rejected**: the error names the field and the record index
//! (`context: update record N`). Enable `debug` logging on `codec::parser`
//! to see each field as it is decoded.

use serde_json::Value;
use tracing::debug;
use types::Name;

use crate::constants::{FIELD_RECORDS, RECORD_TYPE_ROUTE_INFO};
use crate::error::{ProtocolError, ProtocolResult};
use crate::inforec::{InfoRecord, InfoType, RouteInfo};

/// Read a required string field.
pub fn get_string<'a>(obj: &'a Value, field: &str, context: &str) -> ProtocolResult<&'a str> {
    match obj.get(field) {
        None => Err(ProtocolError::no_parse(field, context)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ProtocolError::bad_type(field, "string", context)),
    }
}

/// Read a required string field as a `Name`.
pub fn get_name(obj: &Value, field: &str, context: &str) -> ProtocolResult<Name> {
    get_string(obj, field, context).map(Name::from)
}

/// Read an optional string field; present-but-not-a-string is still an error.
pub fn get_optional_name(obj: &Value, field: &str, context: &str) -> ProtocolResult<Option<Name>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(Name::from(s.as_str()))),
        Some(_) => Err(ProtocolError::bad_type(field, "string", context)),
    }
}

/// Read a required integer field that must fit in `u32`.
pub fn get_u32(obj: &Value, field: &str, context: &str) -> ProtocolResult<u32> {
    let value = obj
        .get(field)
        .ok_or_else(|| ProtocolError::no_parse(field, context))?;

    if let Some(n) = value.as_u64() {
        return u32::try_from(n)
            .map_err(|_| ProtocolError::out_of_range(field, n, format!("0..={}", u32::MAX)));
    }
    if let Some(n) = value.as_i64() {
        return Err(ProtocolError::out_of_range(field, n, format!("0..={}", u32::MAX)));
    }
    Err(ProtocolError::bad_type(field, "integer", context))
}

/// Decode a single update record.
pub fn parse_update_record(record: &Value, index: usize) -> ProtocolResult<InfoRecord> {
    let context = format!("update record {}", index);

    let record_type = get_string(record, "record_type", &context)?;
    match InfoType::from_label(record_type) {
        Some(InfoType::RouteInfo) => {}
        _ => {
            debug!("Record {} has unsupported type '{}'", index, record_type);
            return Err(ProtocolError::unsupported(record_type));
        }
    }
    debug!("Record {}: '{}' record found", index, RECORD_TYPE_ROUTE_INFO);

    let community = get_name(record, "community", &context)?;
    let realm = get_name(record, "realm", &context)?;
    let trust_router = get_name(record, "trust_router", &context)?;
    let metric = get_u32(record, "metric", &context)?;
    let interval = get_u32(record, "interval", &context)?;

    debug!(
        "Record {}: community={} realm={} trust_router={} metric={} interval={}",
        index, community, realm, trust_router, metric, interval
    );

    Ok(InfoRecord::Route(RouteInfo {
        community,
        realm,
        trust_router,
        metric,
        interval,
    }))
}

/// Decode every record of an update body, failing on the first bad one.
pub fn parse_update(body: &Value) -> ProtocolResult<Vec<InfoRecord>> {
    let records = match body.get(FIELD_RECORDS) {
        None => return Err(ProtocolError::no_parse(FIELD_RECORDS, "update body")),
        Some(Value::Array(records)) => records,
        Some(_) => return Err(ProtocolError::bad_type(FIELD_RECORDS, "array", "update body")),
    };

    debug!("Update body has {} records", records.len());
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_update_record(record, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn route(metric: Value) -> Value {
        json!({
            "record_type": "route_info",
            "community": "coi.alpha",
            "realm": "idp.example.org",
            "trust_router": "tr1.example.org",
            "metric": metric,
            "interval": 60
        })
    }

    #[test]
    fn test_parse_valid_record() {
        let record = parse_update_record(&route(json!(2)), 0).unwrap();
        match record {
            InfoRecord::Route(r) => {
                assert!(r.community.eq_str("coi.alpha"));
                assert!(r.realm.eq_str("idp.example.org"));
                assert!(r.trust_router.eq_str("tr1.example.org"));
                assert_eq!(r.metric, 2);
                assert_eq!(r.interval, 60);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_no_parse() {
        let mut record = route(json!(1));
        record.as_object_mut().unwrap().remove("trust_router");
        let err = parse_update_record(&record, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoParse);
        assert_eq!(err, ProtocolError::no_parse("trust_router", "update record 3"));
    }

    #[test]
    fn test_wrong_type_is_bad_type() {
        let err = parse_update_record(&route(json!("one")), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);

        let err = parse_update_record(&route(json!(1.5)), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);

        let mut record = route(json!(1));
        record["realm"] = json!(42);
        assert_eq!(parse_update_record(&record, 0).unwrap_err().kind(), ErrorKind::BadType);
    }

    #[test]
    fn test_negative_and_oversized_integers_rejected() {
        assert!(matches!(
            parse_update_record(&route(json!(-1)), 0),
            Err(ProtocolError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_update_record(&route(json!(u64::from(u32::MAX) + 1)), 0),
            Err(ProtocolError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_comm_info_is_unsupported() {
        let mut record = route(json!(1));
        record["record_type"] = json!("comm_info");
        let err = parse_update_record(&record, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut record = route(json!(1));
        record["extra"] = json!({"nested": true});
        assert!(parse_update_record(&record, 0).is_ok());
    }

    #[test]
    fn test_records_must_be_array() {
        assert_eq!(
            parse_update(&json!({})).unwrap_err().kind(),
            ErrorKind::NoParse
        );
        assert_eq!(
            parse_update(&json!({"records": {}})).unwrap_err().kind(),
            ErrorKind::BadType
        );
        assert!(parse_update(&json!({"records": []})).unwrap().is_empty());
    }
}
