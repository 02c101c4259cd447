//! # Community Membership Table - Who Belongs Where, and by Which Path
//!
//! ## Purpose
//!
//! Tracks communities, the IDP and RP realms that belong to them, and the
//! provenance path each membership was learned over. When the same
//! membership arrives by several paths from one origin, only the shortest
//! path is kept.
//!
//! ## Architecture Role
//!
//! ```text
//! router-config ──(static memberships)──┐
//!                                       ▼
//! trust-router update handler ──► CommunityTable ◄── expiry sweeper
//!                                       │
//!                  ┌────────────────────┼────────────────────┐
//!                  ▼                    ▼                    ▼
//!         outbound advertise      TID admission         monitoring
//! ```
//!
//! ## Ownership
//!
//! - `RealmRegistry` owns realm handles; memberships hold them counted
//! - `CommunityTable` owns communities and memberships
//! - Removal returns the detached membership; dropping it releases its holds

pub mod community;
pub mod membership;
pub mod registry;
pub mod table;

pub use community::Community;
pub use membership::{CommunityMembership, MemberRealm, MembershipKey};
pub use registry::RealmRegistry;
pub use table::{CommunityTable, MembershipUpdate};
