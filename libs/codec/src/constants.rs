//! TRP wire constants

/// Metric value meaning "unreachable"; a route carrying it is a withdrawal.
pub const TRP_METRIC_INFINITY: u32 = 0xFFFF;

/// Envelope field naming the message kind
pub const FIELD_MESSAGE_TYPE: &str = "message_type";
/// Envelope field holding the message body
pub const FIELD_BODY: &str = "body";
/// Update body field holding the record array
pub const FIELD_RECORDS: &str = "records";

pub const MESSAGE_TYPE_UPDATE: &str = "update";
pub const MESSAGE_TYPE_ROUTE_REQ: &str = "route_req";

pub const RECORD_TYPE_ROUTE_INFO: &str = "route_info";
pub const RECORD_TYPE_COMM_INFO: &str = "comm_info";
