//! Outbound advertisement
//!
//! Every membership becomes a community record whose provenance is the
//! stored path plus this router. Records are not sent back to a peer that
//! already appears in their provenance, and only records the `trp_outbound`
//! filter accepts are advertised.

use codec::{CommunityInfo, InfoRecord, TrpMessage};
use community::{CommunityMembership, MemberRealm};
use filter::{FilterTarget, FilterType};
use tracing::{debug, warn};
use types::Name;

use crate::state::RouterState;

fn community_info(memb: &CommunityMembership, hostname: &Name) -> CommunityInfo {
    let comm = memb.community();
    let apcs = match memb.realm() {
        MemberRealm::Idp(idp) if !idp.apcs().is_empty() => idp.apcs().to_vec(),
        _ => comm.apcs().to_vec(),
    };
    let mut provenance = memb.provenance().to_vec();
    provenance.push(hostname.clone());

    CommunityInfo {
        community: comm.id().clone(),
        comm_type: comm.comm_type(),
        realm: memb.realm_id().clone(),
        role: memb.role(),
        apcs,
        owner_realm: comm.owner_realm().cloned(),
        owner_contact: comm.owner_contact().cloned(),
        provenance,
        interval: memb.interval(),
    }
}

/// Records to advertise to `peer`, in table order.
pub fn outbound_records(state: &RouterState, peer: &Name) -> Vec<InfoRecord> {
    let candidates: Vec<CommunityInfo> = {
        let table = state.table();
        table
            .memberships()
            .filter(|memb| !memb.provenance().contains(peer))
            .map(|memb| community_info(memb, state.hostname()))
            .collect()
    };

    let filters = state.filters();
    let Some(outbound) = filters.get(FilterType::TrpOutbound) else {
        warn!("No trp_outbound filter configured; advertising nothing to {}", peer);
        return Vec::new();
    };

    let records: Vec<InfoRecord> = candidates
        .into_iter()
        .map(InfoRecord::from)
        .filter(|rec| outbound.apply(&FilterTarget::from(rec), None).accepted())
        .collect();
    debug!("Advertising {} records to {}", records.len(), peer);
    records
}

/// Complete update message for `peer`, or `None` when there is nothing to send.
pub fn outbound_update(state: &RouterState, peer: &Name) -> Option<TrpMessage> {
    let records = outbound_records(state, peer);
    (!records.is_empty()).then(|| TrpMessage::update(records))
}
