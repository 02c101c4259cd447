//! Realm registry: the owning collection for IDP and RP realm handles.
//!
//! Memberships only count themselves as holders; whether a realm with no
//! holders is dropped is decided here, by `prune_unreferenced`.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use types::{IdpRealm, Name, RealmHandle, RealmRole, Refcounted, RpRealm};

#[derive(Debug, Default)]
pub struct RealmRegistry {
    idps: BTreeMap<Name, Arc<IdpRealm>>,
    rps: BTreeMap<Name, Arc<RpRealm>>,
}

impl RealmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing IDP realm with this id, or a new one carrying `apcs`.
    pub fn get_or_insert_idp(&mut self, id: &Name, apcs: &[Name]) -> Arc<IdpRealm> {
        let realm = self.idps.entry(id.clone()).or_insert_with(|| {
            debug!("Registering IdP realm {}", id);
            Arc::new(IdpRealm::new(id.clone()).with_apcs(apcs.to_vec()))
        });
        Arc::clone(realm)
    }

    pub fn get_or_insert_rp(&mut self, id: &Name) -> Arc<RpRealm> {
        let realm = self.rps.entry(id.clone()).or_insert_with(|| {
            debug!("Registering RP realm {}", id);
            Arc::new(RpRealm::new(id.clone()))
        });
        Arc::clone(realm)
    }

    pub fn find_idp(&self, id: &Name) -> Option<&Arc<IdpRealm>> {
        self.idps.get(id)
    }

    pub fn find_rp(&self, id: &Name) -> Option<&Arc<RpRealm>> {
        self.rps.get(id)
    }

    pub fn find(&self, role: RealmRole, id: &Name) -> Option<RealmHandle> {
        match role {
            RealmRole::Idp => self.find_idp(id).cloned().map(RealmHandle::Idp),
            RealmRole::Rp => self.find_rp(id).cloned().map(RealmHandle::Rp),
        }
    }

    /// Drop realms no membership refers to. Returns how many were removed.
    pub fn prune_unreferenced(&mut self) -> usize {
        let before = self.len();
        self.idps.retain(|_, realm| realm.refcount() > 0);
        self.rps.retain(|_, realm| realm.refcount() > 0);
        let removed = before - self.len();
        if removed > 0 {
            debug!("Pruned {} unreferenced realms", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.idps.len() + self.rps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idps.is_empty() && self.rps.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let idps: Vec<Value> = self
            .idps
            .values()
            .map(|realm| {
                json!({
                    "realm": realm.id(),
                    "apcs": realm.apcs(),
                    "refcount": realm.refcount(),
                })
            })
            .collect();
        let rps: Vec<Value> = self
            .rps
            .values()
            .map(|realm| json!({"realm": realm.id(), "refcount": realm.refcount()}))
            .collect();
        json!({"idp_realms": idps, "rp_realms": rps})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Counted;

    #[test]
    fn test_get_or_insert_reuses_existing() {
        let mut registry = RealmRegistry::new();
        let id = Name::from("idp.example.org");
        let first = registry.get_or_insert_idp(&id, &[Name::from("apc.main")]);
        let second = registry.get_or_insert_idp(&id, &[]);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.apcs().len(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find(RealmRole::Idp, &id).map(|h| h.role()), Some(RealmRole::Idp));
        assert!(registry.find(RealmRole::Rp, &id).is_none());
    }

    #[test]
    fn test_prune_keeps_referenced_realms() {
        let mut registry = RealmRegistry::new();
        let held = registry.get_or_insert_rp(&Name::from("rp.held.org"));
        let _unheld = registry.get_or_insert_rp(&Name::from("rp.idle.org"));
        let holder = Counted::new(Arc::clone(&held));

        assert_eq!(registry.prune_unreferenced(), 1);
        assert!(registry.find_rp(&Name::from("rp.held.org")).is_some());
        assert!(registry.find_rp(&Name::from("rp.idle.org")).is_none());

        drop(holder);
        assert_eq!(registry.prune_unreferenced(), 1);
        assert!(registry.is_empty());
    }
}
