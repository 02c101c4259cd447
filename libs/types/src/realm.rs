//! Realm handles.
//!
//! Only the parts of a realm the membership table needs: its id, for IDPs the
//! APCs it belongs to, and a holder count. Full realm metadata lives with
//! the surrounding daemon.

use std::sync::Arc;

use crate::{Name, RealmRole, RefCount, Refcounted};

/// Identity provider realm.
#[derive(Debug)]
pub struct IdpRealm {
    id: Name,
    apcs: Vec<Name>,
    refcount: RefCount,
}

impl IdpRealm {
    pub fn new(id: impl Into<Name>) -> Self {
        Self {
            id: id.into(),
            apcs: Vec::new(),
            refcount: RefCount::new(),
        }
    }

    pub fn with_apcs(mut self, apcs: Vec<Name>) -> Self {
        self.apcs = apcs;
        self
    }

    pub fn id(&self) -> &Name {
        &self.id
    }

    pub fn apcs(&self) -> &[Name] {
        &self.apcs
    }
}

impl Refcounted for IdpRealm {
    fn refcount_cell(&self) -> &RefCount {
        &self.refcount
    }
}

/// Relying party realm.
#[derive(Debug)]
pub struct RpRealm {
    id: Name,
    refcount: RefCount,
}

impl RpRealm {
    pub fn new(id: impl Into<Name>) -> Self {
        Self {
            id: id.into(),
            refcount: RefCount::new(),
        }
    }

    pub fn id(&self) -> &Name {
        &self.id
    }
}

impl Refcounted for RpRealm {
    fn refcount_cell(&self) -> &RefCount {
        &self.refcount
    }
}

/// Uncounted handle to a realm of either role.
#[derive(Debug, Clone)]
pub enum RealmHandle {
    Idp(Arc<IdpRealm>),
    Rp(Arc<RpRealm>),
}

impl RealmHandle {
    pub fn role(&self) -> RealmRole {
        match self {
            RealmHandle::Idp(_) => RealmRole::Idp,
            RealmHandle::Rp(_) => RealmRole::Rp,
        }
    }

    pub fn id(&self) -> &Name {
        match self {
            RealmHandle::Idp(realm) => realm.id(),
            RealmHandle::Rp(realm) => realm.id(),
        }
    }

    pub fn refcount(&self) -> u32 {
        match self {
            RealmHandle::Idp(realm) => realm.refcount(),
            RealmHandle::Rp(realm) => realm.refcount(),
        }
    }
}

impl From<Arc<IdpRealm>> for RealmHandle {
    fn from(realm: Arc<IdpRealm>) -> Self {
        RealmHandle::Idp(realm)
    }
}

impl From<Arc<RpRealm>> for RealmHandle {
    fn from(realm: Arc<RpRealm>) -> Self {
        RealmHandle::Rp(realm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_role_and_id() {
        let idp: RealmHandle = Arc::new(IdpRealm::new("idp.example.org")).into();
        let rp: RealmHandle = Arc::new(RpRealm::new("rp.example.org")).into();

        assert_eq!(idp.role(), RealmRole::Idp);
        assert_eq!(rp.role(), RealmRole::Rp);
        assert!(idp.id().eq_str("idp.example.org"));
        assert_eq!(rp.refcount(), 0);
    }
}
