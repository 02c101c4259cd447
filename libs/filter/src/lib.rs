//! # Trust Router Filter Engine - Policy Rules for Updates and Requests
//!
//! ## Purpose
//!
//! Decides accept/reject for inbound TID requests and inbound/outbound TRP
//! records, and harvests realm/domain constraints from the rule that decided.
//! Used for routing-policy enforcement and request admission control.
//!
//! ## Architecture Role
//!
//! ```mermaid
//! graph LR
//!     Codec[codec: InfoRecord / TidRequest] -->|FilterTarget| Filter{Filter::apply}
//!     Registry[fields: per-type registry] --> Filter
//!     Filter -->|Matched accept| Table[community table / TID handler]
//!     Filter -->|Matched reject / NoMatch| Drop[drop + log]
//!     Filter -->|line constraints| Set[ConstraintSet]
//! ```
//!
//! ## Filter Types
//!
//! - **tid_inbound**: applied to TID requests before they are served
//! - **trp_inbound**: applied to each record of a received update
//! - **trp_outbound**: applied to each record before it is advertised
//!
//! ## Failure Model
//!
//! Definitions are validated when built (`Filter::new`); a bad definition is a
//! `FilterError` at load time, never a runtime surprise. Applying a filter
//! cannot fail.

pub mod constraint;
pub mod error;
pub mod fields;
pub mod filter;
pub mod policy;
pub mod target;

pub use constraint::{Constraint, ConstraintSet, ConstraintType};
pub use error::{FilterError, FilterResult};
pub use fields::{field_handler, fields_for, is_valid_field, FieldHandler};
pub use filter::{Filter, FilterLine, FilterSet, FilterSpec};
pub use policy::{
    FilterAction, FilterMatch, FilterType, MAX_CONSTRAINT_MATCHES, MAX_FILTER_SPECS,
    MAX_FILTER_SPEC_MATCHES,
};
pub use target::FilterTarget;
