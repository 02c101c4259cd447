//! Community entity.

use serde_json::{json, Value};
use types::{CommType, Name, RefCount, Refcounted};

/// A named trust community.
///
/// Shared through `Arc`; memberships count themselves as holders via
/// `Counted<Community>`, so `refcount()` is the number of memberships that
/// currently reference it.
#[derive(Debug)]
pub struct Community {
    id: Name,
    comm_type: CommType,
    apcs: Vec<Name>,
    owner_realm: Option<Name>,
    owner_contact: Option<Name>,
    expiration_interval: u32,
    learned: bool,
    refcount: RefCount,
}

impl Community {
    pub fn new(id: impl Into<Name>, comm_type: CommType) -> Self {
        Self {
            id: id.into(),
            comm_type,
            apcs: Vec::new(),
            owner_realm: None,
            owner_contact: None,
            expiration_interval: 0,
            learned: false,
            refcount: RefCount::new(),
        }
    }

    pub fn with_apcs(mut self, apcs: Vec<Name>) -> Self {
        self.apcs = apcs;
        self
    }

    pub fn with_owner_realm(mut self, realm: impl Into<Name>) -> Self {
        self.owner_realm = Some(realm.into());
        self
    }

    pub fn with_owner_contact(mut self, contact: impl Into<Name>) -> Self {
        self.owner_contact = Some(contact.into());
        self
    }

    /// Minutes a membership in this community stays valid without refresh.
    pub fn with_expiration_interval(mut self, interval: u32) -> Self {
        self.expiration_interval = interval;
        self
    }

    /// Mark as learned from a peer rather than configured. Learned
    /// communities are dropped once no membership refers to them.
    pub fn learned(mut self) -> Self {
        self.learned = true;
        self
    }

    pub fn id(&self) -> &Name {
        &self.id
    }

    pub fn comm_type(&self) -> CommType {
        self.comm_type
    }

    pub fn apcs(&self) -> &[Name] {
        &self.apcs
    }

    pub fn owner_realm(&self) -> Option<&Name> {
        self.owner_realm.as_ref()
    }

    pub fn owner_contact(&self) -> Option<&Name> {
        self.owner_contact.as_ref()
    }

    pub fn expiration_interval(&self) -> u32 {
        self.expiration_interval
    }

    pub fn is_learned(&self) -> bool {
        self.learned
    }

    /// Summary without memberships; the table adds those.
    pub fn to_json(&self) -> Value {
        let mut value = json!({
            "name": self.id,
            "type": self.comm_type.as_str(),
            "expiration_interval": self.expiration_interval,
            "learned": self.learned,
            "refcount": self.refcount(),
        });
        if !self.apcs.is_empty() {
            value["apcs"] = json!(self.apcs);
        }
        if let Some(owner) = &self.owner_realm {
            value["owner_realm"] = json!(owner);
        }
        if let Some(contact) = &self.owner_contact {
            value["owner_contact"] = json!(contact);
        }
        value
    }
}

impl Refcounted for Community {
    fn refcount_cell(&self) -> &RefCount {
        &self.refcount
    }
}
