//! # Community Membership - One Realm in One Community via One Origin
//!
//! ## Purpose
//!
//! A membership asserts that a realm belongs to a community, as advertised
//! along a provenance path. The first provenance hop is the origin; it is
//! never stored separately, so origin and provenance cannot disagree.
//!
//! Realm and community are held through `Counted` handles: building a
//! membership increments both refcounts and dropping it decrements them.

use serde_json::{json, Value};
use std::sync::Arc;
use types::{Counted, IdpRealm, Name, RealmHandle, RealmRole, RpRealm, Timestamp};

use crate::community::Community;

/// Counted realm reference, tagged by role.
#[derive(Debug, Clone)]
pub enum MemberRealm {
    Idp(Counted<IdpRealm>),
    Rp(Counted<RpRealm>),
}

impl MemberRealm {
    pub fn role(&self) -> RealmRole {
        match self {
            MemberRealm::Idp(_) => RealmRole::Idp,
            MemberRealm::Rp(_) => RealmRole::Rp,
        }
    }

    pub fn id(&self) -> &Name {
        match self {
            MemberRealm::Idp(realm) => realm.id(),
            MemberRealm::Rp(realm) => realm.id(),
        }
    }

    pub fn idp(&self) -> Option<&Arc<IdpRealm>> {
        match self {
            MemberRealm::Idp(realm) => Some(realm.shared()),
            MemberRealm::Rp(_) => None,
        }
    }

    pub fn rp(&self) -> Option<&Arc<RpRealm>> {
        match self {
            MemberRealm::Rp(realm) => Some(realm.shared()),
            MemberRealm::Idp(_) => None,
        }
    }

    /// Uncounted handle to the same realm.
    pub fn handle(&self) -> RealmHandle {
        match self {
            MemberRealm::Idp(realm) => RealmHandle::Idp(Arc::clone(realm.shared())),
            MemberRealm::Rp(realm) => RealmHandle::Rp(Arc::clone(realm.shared())),
        }
    }
}

impl From<&RealmHandle> for MemberRealm {
    fn from(handle: &RealmHandle) -> Self {
        match handle {
            RealmHandle::Idp(realm) => MemberRealm::Idp(Counted::new(Arc::clone(realm))),
            RealmHandle::Rp(realm) => MemberRealm::Rp(Counted::new(Arc::clone(realm))),
        }
    }
}

/// Identity of a membership inside the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub role: RealmRole,
    pub realm: Name,
    pub comm: Name,
    pub origin: Option<Name>,
}

#[derive(Debug, Clone)]
pub struct CommunityMembership {
    realm: MemberRealm,
    comm: Counted<Community>,
    provenance: Vec<Name>,
    interval: u32,
    expiry: Option<Timestamp>,
}

impl CommunityMembership {
    pub fn new(realm: &RealmHandle, comm: &Arc<Community>) -> Self {
        Self {
            realm: MemberRealm::from(realm),
            comm: Counted::new(Arc::clone(comm)),
            provenance: Vec::new(),
            interval: 0,
            expiry: None,
        }
    }

    pub fn with_provenance(mut self, provenance: Vec<Name>) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_expiry(mut self, expiry: Option<Timestamp>) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn realm(&self) -> &MemberRealm {
        &self.realm
    }

    pub fn realm_id(&self) -> &Name {
        self.realm.id()
    }

    pub fn role(&self) -> RealmRole {
        self.realm.role()
    }

    pub fn community(&self) -> &Arc<Community> {
        self.comm.shared()
    }

    pub fn comm_id(&self) -> &Name {
        self.comm.id()
    }

    /// First provenance hop, or `None` for locally configured memberships.
    pub fn origin(&self) -> Option<&Name> {
        self.provenance.first()
    }

    pub fn provenance(&self) -> &[Name] {
        &self.provenance
    }

    pub fn provenance_len(&self) -> usize {
        self.provenance.len()
    }

    /// Append a hop; on an empty provenance this also sets the origin.
    pub fn add_to_provenance(&mut self, hop: impl Into<Name>) {
        self.provenance.push(hop.into());
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: u32) {
        self.interval = interval;
    }

    pub fn expiry(&self) -> Option<Timestamp> {
        self.expiry
    }

    pub fn set_expiry(&mut self, expiry: Option<Timestamp>) {
        self.expiry = expiry;
    }

    /// Expired iff `now` is at or after the expiry; no expiry never expires.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    pub fn key(&self) -> MembershipKey {
        MembershipKey {
            role: self.role(),
            realm: self.realm_id().clone(),
            comm: self.comm_id().clone(),
            origin: self.origin().cloned(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "realm": self.realm_id(),
            "role": self.role().as_str(),
            "provenance": self.provenance,
            "interval": self.interval,
        });
        if let Some(origin) = self.origin() {
            value["origin"] = json!(origin);
        }
        if let Some(expiry) = self.expiry {
            value["expires"] = json!(expiry.to_rfc3339());
        }
        value
    }
}
