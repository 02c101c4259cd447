//! # Community Membership Table - Shortest-Provenance Index
//!
//! ## Purpose
//!
//! Authoritative view of which realms belong to which communities, via which
//! origin, with which provenance, and for how long. Populated from static
//! config and from accepted TRP updates; read for re-advertisement, request
//! admission and monitoring.
//!
//! ## Architecture Role
//!
//! ```mermaid
//! graph TD
//!     Config[static config] -->|add_membership| Table
//!     Updates[accepted TRP records] -->|add / remove| Table
//!     Sweeper[expiry timer] -->|sweep_expired| Table
//!     Table -->|iterators| Advertise[outbound advertisement]
//!     Table -->|find_*| Tid[TID admission]
//!     Table -->|to_json| Monitor[monitoring]
//!
//!     subgraph Table[CommunityTable]
//!         Comms[comms: Vec of Arc Community]
//!         Slots["memberships: BTreeMap (realm, comm, role) → origin chain"]
//!         Realms[realms: RealmRegistry]
//!     end
//! ```
//!
//! ## Layout
//!
//! Memberships are keyed by `(realm id, community id, role)`. Each key maps
//! to a short origin chain: one entry per distinct origin, including at most
//! one entry with no origin. Element 0 of a chain is its head and is what
//! the per-key iterators return. A key never maps to an empty chain.
//! The role is part of the key, so an IdP and an RP with the same id form
//! two separate chains.
//!
//! ## Replacement Policy
//!
//! `add_membership` with an origin already present for the key keeps
//! whichever membership has the shorter provenance. Replacement requires a
//! strictly shorter path, so among equal lengths the first one submitted
//! stays. A replacement takes the old entry's position in the chain.
//!
//! ## Concurrency
//!
//! All operations are synchronous and in-memory. The table is `Send` and is
//! meant to sit behind one coarse lock; removal and sweeping are single
//! calls, so a timer-driven sweep can interleave safely with inserts.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use types::{CommType, IdpRealm, Name, RealmHandle, RealmRole, Refcounted, RpRealm, Timestamp};

use crate::community::Community;
use crate::membership::{CommunityMembership, MemberRealm, MembershipKey};
use crate::registry::RealmRegistry;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SlotKey {
    realm: Name,
    comm: Name,
    role: RealmRole,
}

impl SlotKey {
    fn new(role: RealmRole, realm: &Name, comm: &Name) -> Self {
        Self {
            realm: realm.clone(),
            comm: comm.clone(),
            role,
        }
    }

    fn of(memb: &CommunityMembership) -> Self {
        Self::new(memb.role(), memb.realm_id(), memb.comm_id())
    }

    /// Smallest key for `realm`; `Name::default()` and `Idp` sort first.
    fn first_for_realm(realm: &Name) -> Self {
        Self::new(RealmRole::Idp, realm, &Name::default())
    }
}

/// What `add_membership` did with the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipUpdate {
    /// No membership existed for the key and origin
    Inserted,
    /// Candidate had strictly shorter provenance and took the old entry's place
    Replaced,
    /// Existing membership was at least as short; candidate dropped
    Discarded,
}

#[derive(Debug, Default)]
pub struct CommunityTable {
    comms: Vec<Arc<Community>>,
    memberships: BTreeMap<SlotKey, Vec<CommunityMembership>>,
    realms: RealmRegistry,
}

impl CommunityTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- communities ----

    /// Append a community. Adding an id that is already present is the
    /// caller's mistake; use `get_or_insert_comm` when unsure.
    pub fn add_comm(&mut self, comm: Arc<Community>) {
        debug!("Adding community {} ({})", comm.id(), comm.comm_type());
        self.comms.push(comm);
    }

    pub fn remove_comm(&mut self, comm_id: &Name) -> Option<Arc<Community>> {
        let index = self.comms.iter().position(|c| c.id() == comm_id)?;
        debug!("Removing community {}", comm_id);
        Some(self.comms.remove(index))
    }

    pub fn find_comm(&self, comm_id: &Name) -> Option<&Arc<Community>> {
        self.comms.iter().find(|c| c.id() == comm_id)
    }

    /// Existing community `comm_id`, or a new learned one. Learned
    /// communities go away in `prune_unreferenced_comms` once empty.
    pub fn get_or_insert_comm(&mut self, comm_id: &Name, comm_type: CommType) -> Arc<Community> {
        if let Some(existing) = self.find_comm(comm_id) {
            return Arc::clone(existing);
        }
        let comm = Arc::new(Community::new(comm_id.clone(), comm_type).learned());
        self.add_comm(Arc::clone(&comm));
        comm
    }

    /// Number of communities.
    pub fn size(&self) -> usize {
        self.comms.len()
    }

    /// All communities in insertion order.
    pub fn communities(&self) -> impl Iterator<Item = &Arc<Community>> {
        self.comms.iter()
    }

    // ---- realms ----

    pub fn realms(&self) -> &RealmRegistry {
        &self.realms
    }

    pub fn realms_mut(&mut self) -> &mut RealmRegistry {
        &mut self.realms
    }

    // ---- memberships ----

    /// Build a membership and insert it under the shortest-provenance policy.
    pub fn add_membership(
        &mut self,
        realm: &RealmHandle,
        comm: &Arc<Community>,
        provenance: Vec<Name>,
        expiry: Option<Timestamp>,
    ) -> MembershipUpdate {
        let candidate = CommunityMembership::new(realm, comm)
            .with_provenance(provenance)
            .with_expiry(expiry);
        self.insert_membership(candidate)
    }

    /// Insert a fully built membership under the shortest-provenance policy.
    pub fn insert_membership(&mut self, candidate: CommunityMembership) -> MembershipUpdate {
        let chain = self.memberships.entry(SlotKey::of(&candidate)).or_default();

        match chain.iter().position(|m| m.origin() == candidate.origin()) {
            None => {
                debug!(
                    "Inserting {} membership of {} in {} (origin {:?}, provenance length {})",
                    candidate.role(),
                    candidate.realm_id(),
                    candidate.comm_id(),
                    candidate.origin(),
                    candidate.provenance_len()
                );
                chain.push(candidate);
                MembershipUpdate::Inserted
            }
            Some(index) if candidate.provenance_len() < chain[index].provenance_len() => {
                debug!(
                    "Replacing membership of {} in {}: provenance {} -> {}",
                    candidate.realm_id(),
                    candidate.comm_id(),
                    chain[index].provenance_len(),
                    candidate.provenance_len()
                );
                chain[index] = candidate;
                MembershipUpdate::Replaced
            }
            Some(index) => {
                debug!(
                    "Discarding membership of {} in {}: provenance {} not shorter than {}",
                    candidate.realm_id(),
                    candidate.comm_id(),
                    candidate.provenance_len(),
                    chain[index].provenance_len()
                );
                MembershipUpdate::Discarded
            }
        }
    }

    fn chain(&self, role: RealmRole, realm: &Name, comm: &Name) -> Option<&[CommunityMembership]> {
        self.memberships
            .get(&SlotKey::new(role, realm, comm))
            .map(Vec::as_slice)
    }

    fn find_in_chain<'a>(
        chain: Option<&'a [CommunityMembership]>,
        origin: Option<&Name>,
    ) -> Option<&'a CommunityMembership> {
        chain?.iter().find(|m| m.origin() == origin)
    }

    /// Exact lookup. `origin = None` finds only a membership without origin.
    pub fn find_membership(
        &self,
        realm: &Name,
        comm: &Name,
        origin: Option<&Name>,
    ) -> Option<&CommunityMembership> {
        self.find_idp_membership(realm, comm, origin)
            .or_else(|| self.find_rp_membership(realm, comm, origin))
    }

    /// Head of the origin chain for the pair, whatever its origin.
    pub fn find_membership_any_origin(&self, realm: &Name, comm: &Name) -> Option<&CommunityMembership> {
        self.find_idp_membership_any_origin(realm, comm)
            .or_else(|| self.find_rp_membership_any_origin(realm, comm))
    }

    pub fn find_idp_membership(
        &self,
        realm: &Name,
        comm: &Name,
        origin: Option<&Name>,
    ) -> Option<&CommunityMembership> {
        Self::find_in_chain(self.chain(RealmRole::Idp, realm, comm), origin)
    }

    pub fn find_idp_membership_any_origin(&self, realm: &Name, comm: &Name) -> Option<&CommunityMembership> {
        self.chain(RealmRole::Idp, realm, comm)?.first()
    }

    pub fn find_rp_membership(
        &self,
        realm: &Name,
        comm: &Name,
        origin: Option<&Name>,
    ) -> Option<&CommunityMembership> {
        Self::find_in_chain(self.chain(RealmRole::Rp, realm, comm), origin)
    }

    pub fn find_rp_membership_any_origin(&self, realm: &Name, comm: &Name) -> Option<&CommunityMembership> {
        self.chain(RealmRole::Rp, realm, comm)?.first()
    }

    /// Extend the lifetime of the membership at `key` if it was learned over
    /// exactly `provenance`. Returns whether one was refreshed.
    pub fn refresh_membership(
        &mut self,
        key: &MembershipKey,
        provenance: &[Name],
        interval: u32,
        expiry: Option<Timestamp>,
    ) -> bool {
        let Some(chain) = self
            .memberships
            .get_mut(&SlotKey::new(key.role, &key.realm, &key.comm))
        else {
            return false;
        };
        match chain
            .iter_mut()
            .find(|m| m.origin() == key.origin.as_ref() && m.provenance() == provenance)
        {
            Some(memb) => {
                memb.set_interval(interval);
                memb.set_expiry(expiry);
                true
            }
            None => false,
        }
    }

    /// Detach one membership and hand it back. If it was the chain head, the
    /// next origin becomes head; an emptied key disappears.
    pub fn remove_membership(&mut self, key: &MembershipKey) -> Option<CommunityMembership> {
        let slot = SlotKey::new(key.role, &key.realm, &key.comm);
        let chain = self.memberships.get_mut(&slot)?;
        let index = chain.iter().position(|m| m.origin() == key.origin.as_ref())?;
        let removed = chain.remove(index);
        if chain.is_empty() {
            self.memberships.remove(&slot);
        }
        debug!(
            "Removed {} membership of {} in {} (origin {:?})",
            key.role, key.realm, key.comm, key.origin
        );
        Some(removed)
    }

    /// Detach every membership expired at `now` and hand them back.
    pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<CommunityMembership> {
        let mut expired = Vec::new();
        self.memberships.retain(|_, chain| {
            let (gone, kept): (Vec<_>, Vec<_>) =
                std::mem::take(chain).into_iter().partition(|m| m.is_expired(now));
            *chain = kept;
            expired.extend(gone);
            !chain.is_empty()
        });
        if !expired.is_empty() {
            debug!("Swept {} expired memberships", expired.len());
        }
        expired
    }

    pub fn membership_count(&self) -> usize {
        self.memberships.values().map(Vec::len).sum()
    }

    /// Every membership, key order then chain order.
    pub fn memberships(&self) -> impl Iterator<Item = &CommunityMembership> {
        self.memberships.values().flatten()
    }

    // ---- iteration ----

    /// Communities `realm` belongs to, optionally restricted to one role.
    /// Each community is yielded once.
    pub fn communities_for_realm<'a>(
        &'a self,
        realm: &'a Name,
        role: Option<RealmRole>,
    ) -> impl Iterator<Item = &'a Arc<Community>> + 'a {
        let mut last: Option<&'a Name> = None;
        self.memberships
            .range(SlotKey::first_for_realm(realm)..)
            .take_while(move |(key, _)| &key.realm == realm)
            .filter(move |(key, _)| role.map_or(true, |r| key.role == r))
            .filter_map(move |(key, chain)| {
                // IDP and RP keys for the same community are adjacent
                if last == Some(&key.comm) {
                    return None;
                }
                last = Some(&key.comm);
                chain.first().map(CommunityMembership::community)
            })
    }

    pub fn rp_communities<'a>(&'a self, realm: &'a Name) -> impl Iterator<Item = &'a Arc<Community>> + 'a {
        self.communities_for_realm(realm, Some(RealmRole::Rp))
    }

    pub fn idp_communities<'a>(&'a self, realm: &'a Name) -> impl Iterator<Item = &'a Arc<Community>> + 'a {
        self.communities_for_realm(realm, Some(RealmRole::Idp))
    }

    /// Realms in `comm`, optionally restricted to one role, one per (realm, role).
    pub fn realms_in_community<'a>(
        &'a self,
        comm: &'a Name,
        role: Option<RealmRole>,
    ) -> impl Iterator<Item = &'a MemberRealm> + 'a {
        self.memberships
            .iter()
            .filter(move |(key, _)| &key.comm == comm && role.map_or(true, |r| key.role == r))
            .filter_map(|(_, chain)| chain.first().map(CommunityMembership::realm))
    }

    pub fn rp_realms_in_community<'a>(&'a self, comm: &'a Name) -> impl Iterator<Item = &'a Arc<RpRealm>> + 'a {
        self.realms_in_community(comm, Some(RealmRole::Rp))
            .filter_map(MemberRealm::rp)
    }

    pub fn idp_realms_in_community<'a>(&'a self, comm: &'a Name) -> impl Iterator<Item = &'a Arc<IdpRealm>> + 'a {
        self.realms_in_community(comm, Some(RealmRole::Idp))
            .filter_map(MemberRealm::idp)
    }

    /// IDP realm `realm` if it is a member of `comm`.
    pub fn find_idp(&self, comm: &Name, realm: &Name) -> Option<&Arc<IdpRealm>> {
        let found = self
            .find_idp_membership_any_origin(realm, comm)
            .and_then(|m| m.realm().idp());
        debug!("IdP {} in community {}: {}", realm, comm, found.is_some());
        found
    }

    /// RP realm `realm` if it is a member of `comm`.
    pub fn find_rp(&self, comm: &Name, realm: &Name) -> Option<&Arc<RpRealm>> {
        let found = self
            .find_rp_membership_any_origin(realm, comm)
            .and_then(|m| m.realm().rp());
        debug!("RP {} in community {}: {}", realm, comm, found.is_some());
        found
    }

    /// The origin chain starting at the membership identified by `key`.
    pub fn origin_chain<'a>(&'a self, key: &MembershipKey) -> impl Iterator<Item = &'a CommunityMembership> + 'a {
        self.chain(key.role, &key.realm, &key.comm)
            .and_then(|chain| {
                chain
                    .iter()
                    .position(|m| m.origin() == key.origin.as_ref())
                    .map(|start| &chain[start..])
            })
            .unwrap_or(&[])
            .iter()
    }

    // ---- housekeeping ----

    /// Drop registered realms no membership refers to.
    pub fn prune_unreferenced_realms(&mut self) -> usize {
        self.realms.prune_unreferenced()
    }

    /// Drop learned communities no membership refers to. Configured
    /// communities stay even when empty.
    pub fn prune_unreferenced_comms(&mut self) -> usize {
        let before = self.comms.len();
        self.comms
            .retain(|comm| !comm.is_learned() || comm.refcount() > 0);
        let removed = before - self.comms.len();
        if removed > 0 {
            debug!("Pruned {} unreferenced learned communities", removed);
        }
        removed
    }

    /// Monitoring projection: every community with its memberships.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.comms
                .iter()
                .map(|comm| {
                    let mut value = comm.to_json();
                    value["memberships"] = Value::Array(
                        self.memberships
                            .iter()
                            .filter(|(key, _)| &key.comm == comm.id())
                            .flat_map(|(_, chain)| chain.iter())
                            .map(CommunityMembership::to_json)
                            .collect(),
                    );
                    value
                })
                .collect(),
        )
    }
}
