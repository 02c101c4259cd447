//! # TRP Update Handling - Parse, Filter, Apply
//!
//! ## Purpose
//!
//! Turns a received TRP update into community table changes. Work happens
//! in two phases so a bad batch never leaves partial state behind:
//!
//! 1. Parse the whole message and run every record through the
//!    `trp_inbound` filter. Nothing is mutated; any parse error drops the
//!    batch.
//! 2. Take the table lock once and apply the accepted records.
//!
//! ## Record Semantics
//!
//! A route record says `realm` is reachable as an IdP in `community` via
//! `trust_router`. It becomes an IdP membership whose provenance is
//! `[trust_router]`, plus the sending peer when that differs, expiring
//! `interval × expiry_factor` seconds after receipt. An infinite metric
//! withdraws the membership learned from that trust router instead.
//!
//! ## Troubleshooting
//!
//! **Every record is filtered**
//! - No `trp_inbound` filter is configured; with no filter, nothing is accepted
//!
//! **Memberships expire despite regular updates**
//! - Refresh only extends an entry learned over the identical path; a
//!   longer alternative path is discarded, not refreshed

use codec::{parse_message, InfoRecord, RouteInfo, TrpMessage};
use community::{CommunityMembership, CommunityTable, MembershipKey, MembershipUpdate};
use filter::{FilterTarget, FilterType};
use tracing::{debug, warn};
use types::{CommType, Name, RealmHandle, RealmRole, Timestamp};

use crate::error::{Result, RouterError};
use crate::state::RouterState;

/// What one update did to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub received: usize,
    pub filtered: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub refreshed: usize,
    pub discarded: usize,
    pub withdrawn: usize,
}

impl UpdateSummary {
    pub fn accepted(&self) -> usize {
        self.received - self.filtered
    }
}

/// Handle one TRP message received from `peer`.
pub fn handle_update(state: &RouterState, peer: &Name, bytes: &[u8], now: Timestamp) -> Result<UpdateSummary> {
    let message = parse_message(bytes).map_err(|e| {
        warn!("Dropping update from {}: {}", peer, e);
        e
    })?;
    let records = match message {
        TrpMessage::Update(body) => body.records,
        other => {
            return Err(RouterError::NotAnUpdate {
                message_type: other.message_type().to_string(),
            })
        }
    };

    let mut summary = UpdateSummary {
        received: records.len(),
        ..UpdateSummary::default()
    };

    let accepted: Vec<RouteInfo> = {
        let filters = state.filters();
        let inbound = filters.get(FilterType::TrpInbound);
        if inbound.is_none() {
            warn!("No trp_inbound filter configured; rejecting {} records from {}", records.len(), peer);
        }
        records
            .into_iter()
            .filter(|rec| {
                inbound.is_some_and(|f| f.apply(&FilterTarget::from(rec), None).accepted())
            })
            // inbound parsing only yields route records
            .filter_map(|rec| {
                let InfoRecord::Route(route) = rec else {
                    return None;
                };
                Some(route)
            })
            .collect()
    };
    summary.filtered = summary.received - accepted.len();

    let mut table = state.table();
    for route in &accepted {
        apply_route(&mut table, route, peer, state.expiry_factor(), now, &mut summary);
    }
    drop(table);

    debug!("Update from {}: {:?}", peer, summary);
    Ok(summary)
}

fn apply_route(
    table: &mut CommunityTable,
    route: &RouteInfo,
    peer: &Name,
    expiry_factor: u32,
    now: Timestamp,
    summary: &mut UpdateSummary,
) {
    let key = MembershipKey {
        role: RealmRole::Idp,
        realm: route.realm.clone(),
        comm: route.community.clone(),
        origin: Some(route.trust_router.clone()),
    };

    if route.is_infinite() {
        if table.remove_membership(&key).is_some() {
            debug!("Withdrew {} from {} via {}", route.realm, route.community, route.trust_router);
            summary.withdrawn += 1;
        }
        return;
    }

    let mut provenance = vec![route.trust_router.clone()];
    if &route.trust_router != peer {
        provenance.push(peer.clone());
    }
    let expiry = Some(now.after_secs(u64::from(route.interval) * u64::from(expiry_factor)));

    let comm = table.get_or_insert_comm(&route.community, CommType::Unknown);
    let idp = table.realms_mut().get_or_insert_idp(&route.realm, comm.apcs());
    let candidate = CommunityMembership::new(&RealmHandle::Idp(idp), &comm)
        .with_provenance(provenance.clone())
        .with_interval(route.interval)
        .with_expiry(expiry);

    match table.insert_membership(candidate) {
        MembershipUpdate::Inserted => summary.inserted += 1,
        MembershipUpdate::Replaced => summary.replaced += 1,
        MembershipUpdate::Discarded => {
            if table.refresh_membership(&key, &provenance, route.interval, expiry) {
                summary.refreshed += 1;
            } else {
                summary.discarded += 1;
            }
        }
    }
}
