//! TID request admission
//!
//! A request is served only when the `tid_inbound` filter accepts it and the
//! table confirms both ends: the requesting realm is an RP member and the
//! target realm an IdP member of the requested community. Constraints come
//! from the filter line that accepted.

use codec::TidRequest;
use filter::{ConstraintSet, FilterAction, FilterMatch, FilterTarget, FilterType};
use tracing::{debug, info};

use crate::state::RouterState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TidDecision {
    Accept { constraints: ConstraintSet },
    Reject { reason: String },
}

impl TidDecision {
    fn reject(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        info!("TID request rejected: {}", reason);
        TidDecision::Reject { reason }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, TidDecision::Accept { .. })
    }
}

pub fn admit_tid_request(state: &RouterState, req: &TidRequest) -> TidDecision {
    let mut constraints = ConstraintSet::new();
    let verdict = {
        let filters = state.filters();
        match filters.get(FilterType::TidInbound) {
            Some(filter) => filter.apply(&FilterTarget::from(req), Some(&mut constraints)),
            None => return TidDecision::reject("no tid_inbound filter configured"),
        }
    };
    match verdict {
        FilterMatch::NoMatch => return TidDecision::reject("request did not match any filter line"),
        FilterMatch::Matched(FilterAction::Reject) => {
            return TidDecision::reject("request rejected by filter");
        }
        FilterMatch::Matched(FilterAction::Accept) => {}
    }

    let table = state.table();
    if table.find_comm(&req.comm).is_none() {
        return TidDecision::reject(format!("unknown community {}", req.comm));
    }
    if table.find_rp(&req.comm, &req.rp_realm).is_none() {
        return TidDecision::reject(format!("{} is not an RP in {}", req.rp_realm, req.comm));
    }
    if table.find_idp(&req.comm, &req.realm).is_none() {
        return TidDecision::reject(format!("{} is not an IdP in {}", req.realm, req.comm));
    }

    debug!(
        "TID request from {} for {} in {} accepted with {} constraints",
        req.rp_realm,
        req.realm,
        req.comm,
        constraints.len()
    );
    TidDecision::Accept { constraints }
}
