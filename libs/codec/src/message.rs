//! TRP message envelope: `{"message_type": ..., "body": {...}}`

use serde_json::{json, Value};
use tracing::debug;
use types::Name;

use crate::constants::{FIELD_BODY, FIELD_MESSAGE_TYPE, MESSAGE_TYPE_ROUTE_REQ, MESSAGE_TYPE_UPDATE};
use crate::error::{ProtocolError, ProtocolResult};
use crate::inforec::InfoRecord;
use crate::parser::{get_name, parse_update};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateBody {
    pub records: Vec<InfoRecord>,
}

/// Request for routes to `realm` within `community`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub community: Name,
    pub realm: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrpMessage {
    Update(UpdateBody),
    RouteRequest(RouteRequest),
}

impl TrpMessage {
    pub fn update(records: Vec<InfoRecord>) -> Self {
        TrpMessage::Update(UpdateBody { records })
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            TrpMessage::Update(_) => MESSAGE_TYPE_UPDATE,
            TrpMessage::RouteRequest(_) => MESSAGE_TYPE_ROUTE_REQ,
        }
    }

    pub fn to_json(&self) -> Value {
        let body = match self {
            TrpMessage::Update(update) => json!({
                "records": update.records.iter().map(InfoRecord::to_json).collect::<Vec<_>>(),
            }),
            TrpMessage::RouteRequest(req) => json!({
                "community": req.community,
                "realm": req.realm,
            }),
        };
        json!({
            "message_type": self.message_type(),
            "body": body,
        })
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

/// Decode a complete TRP message from wire bytes.
pub fn parse_message(buf: &[u8]) -> ProtocolResult<TrpMessage> {
    debug!("Parsing TRP message of {} bytes", buf.len());
    let value: Value = serde_json::from_slice(buf)?;
    parse_message_value(&value)
}

/// Decode a TRP message from an already-parsed JSON tree.
pub fn parse_message_value(value: &Value) -> ProtocolResult<TrpMessage> {
    let message_type = match value.get(FIELD_MESSAGE_TYPE) {
        None => return Err(ProtocolError::no_parse(FIELD_MESSAGE_TYPE, "message envelope")),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(ProtocolError::no_parse(FIELD_MESSAGE_TYPE, "message envelope (not a string)")),
    };

    if message_type != MESSAGE_TYPE_UPDATE && message_type != MESSAGE_TYPE_ROUTE_REQ {
        return Err(ProtocolError::unknown_message_type(message_type));
    }

    let body = value
        .get(FIELD_BODY)
        .ok_or_else(|| ProtocolError::no_parse(FIELD_BODY, "message envelope"))?;

    if message_type == MESSAGE_TYPE_UPDATE {
        let records = parse_update(body)?;
        Ok(TrpMessage::Update(UpdateBody { records }))
    } else {
        Ok(TrpMessage::RouteRequest(RouteRequest {
            community: get_name(body, "community", "route_req body")?,
            realm: get_name(body, "realm", "route_req body")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::inforec::RouteInfo;

    #[test]
    fn test_update_envelope() {
        let buf = br#"{"message_type":"update","body":{"records":[
            {"record_type":"route_info","community":"coi.alpha","realm":"idp.example.org",
             "trust_router":"tr1","metric":1,"interval":30}]}}"#;
        match parse_message(buf).unwrap() {
            TrpMessage::Update(update) => assert_eq!(update.records.len(), 1),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_route_req_envelope() {
        let buf = br#"{"message_type":"route_req","body":{"community":"coi.alpha","realm":"idp.example.org"}}"#;
        let msg = parse_message(buf).unwrap();
        assert_eq!(
            msg,
            TrpMessage::RouteRequest(RouteRequest {
                community: Name::from("coi.alpha"),
                realm: Name::from("idp.example.org"),
            })
        );
    }

    #[test]
    fn test_envelope_errors() {
        assert!(matches!(parse_message(b"not json"), Err(ProtocolError::MalformedJson(_))));
        assert_eq!(
            parse_message(br#"{"body":{}}"#).unwrap_err().kind(),
            ErrorKind::NoParse
        );
        assert_eq!(
            parse_message(br#"{"message_type":7,"body":{}}"#).unwrap_err().kind(),
            ErrorKind::NoParse
        );
        assert!(matches!(
            parse_message(br#"{"message_type":"hello","body":{}}"#),
            Err(ProtocolError::UnknownMessageType { .. })
        ));
        assert_eq!(
            parse_message(br#"{"message_type":"update"}"#).unwrap_err(),
            ProtocolError::no_parse("body", "message envelope")
        );
    }

    #[test]
    fn test_encoded_update_parses_back() {
        let msg = TrpMessage::update(vec![RouteInfo::new("coi.alpha", "idp.example.org", "tr1", 3, 45).into()]);
        assert_eq!(parse_message(&msg.encode()).unwrap(), msg);
    }
}
