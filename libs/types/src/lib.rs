//! # Trust Router Types - Shared Identifiers and Handles
//!
//! ## Purpose
//!
//! Leaf crate holding the value types every other trust router crate keys on:
//! opaque `Name` identifiers with prefix-wildcard matching, `Timestamp` for
//! expiry, realm roles and community kinds, and the counted handles through
//! which memberships hold realms and communities.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/filter
//!      ↓            ↓            ↓
//!      └──→ libs/community ←─────┘
//!                   ↓
//!        services/trust_router
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Wire parsing (belongs in codec)
//! - Membership bookkeeping (belongs in community)
//! - Any clock reads outside `Timestamp::now()`

pub mod name;
pub mod realm;
pub mod refcount;
pub mod roles;
pub mod time;

pub use name::{Name, WILDCARD};
pub use realm::{IdpRealm, RealmHandle, RpRealm};
pub use refcount::{Counted, RefCount, Refcounted};
pub use roles::{CommType, RealmRole};
pub use time::Timestamp;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Unknown realm role '{0}': expected 'idp' or 'rp'")]
    UnknownRole(String),
}

pub type TypesResult<T> = Result<T, TypesError>;
