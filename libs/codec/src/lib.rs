//! # Trust Router Protocol Codec - TRP and TID Message Decoding
//!
//! ## Purpose
//!
//! The "rules" layer between the wire and the routing core:
//! - TRP message envelope decoding and encoding (`update`, `route_req`)
//! - Update record decoding with all-or-nothing batch semantics
//! - Typed information records (`RouteInfo`, `CommunityInfo`)
//! - TID request decoding for admission control
//!
//! ## Architecture Role
//!
//! ```text
//! transport → [codec] → filter engine → community table
//!   bytes     typed      accept/reject   add-if-shorter
//!             records
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Connection handling or authentication (belongs to the daemon)
//! - Policy decisions (belongs in filter)
//! - Table mutation (belongs in community)
//!
//! ## Error Model
//!
//! Every decoding failure is a `ProtocolError`; `ProtocolError::kind()` groups
//! them into `NoParse`, `BadType` and `Unsupported`. A failed batch leaves no
//! partial result behind: `parse_update` either returns every record or none.

pub mod constants;
pub mod error;
pub mod inforec;
pub mod message;
pub mod parser;
pub mod tid;

pub use constants::TRP_METRIC_INFINITY;
pub use error::{ErrorKind, ProtocolError, ProtocolResult};
pub use inforec::{CommunityInfo, InfoRecord, InfoType, RouteInfo};
pub use message::{parse_message, parse_message_value, RouteRequest, TrpMessage, UpdateBody};
pub use parser::{parse_update, parse_update_record};
pub use tid::TidRequest;
