//! # Information Records - Typed TRP Update Content
//!
//! ## Purpose
//!
//! An update message carries a batch of information records. Two kinds exist:
//!
//! - **`RouteInfo`** (`route_info`): "realm R in community C is reachable
//!   through trust router T at metric M, refreshed every I seconds". This is
//!   the only kind accepted from peers.
//! - **`CommunityInfo`** (`comm_info`): a full membership advertisement
//!   (community kind, realm role, APCs, owner, provenance). Built locally for
//!   outbound advertisement and encoded for peers; inbound decoding rejects
//!   it as unsupported.
//!
//! `InfoRecord` unifies both so the filter engine can extract fields without
//! caring which kind it holds. Accessors return `None` when a kind does not
//! carry a field, and the filter engine treats that as "no match".

use serde_json::{json, Value};
use types::{CommType, Name, RealmRole};

use crate::constants::{RECORD_TYPE_COMM_INFO, RECORD_TYPE_ROUTE_INFO, TRP_METRIC_INFINITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoType {
    RouteInfo,
    CommInfo,
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::RouteInfo => RECORD_TYPE_ROUTE_INFO,
            InfoType::CommInfo => RECORD_TYPE_COMM_INFO,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            RECORD_TYPE_ROUTE_INFO => Some(InfoType::RouteInfo),
            RECORD_TYPE_COMM_INFO => Some(InfoType::CommInfo),
            _ => None,
        }
    }
}

/// Route advertisement for one (community, realm) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub community: Name,
    pub realm: Name,
    pub trust_router: Name,
    pub metric: u32,
    pub interval: u32,
}

impl RouteInfo {
    pub fn new(
        community: impl Into<Name>,
        realm: impl Into<Name>,
        trust_router: impl Into<Name>,
        metric: u32,
        interval: u32,
    ) -> Self {
        Self {
            community: community.into(),
            realm: realm.into(),
            trust_router: trust_router.into(),
            metric,
            interval,
        }
    }

    /// Unreachable route, i.e. a withdrawal.
    pub fn is_infinite(&self) -> bool {
        self.metric >= TRP_METRIC_INFINITY
    }

    pub fn to_json(&self) -> Value {
        json!({
            "record_type": RECORD_TYPE_ROUTE_INFO,
            "community": self.community,
            "realm": self.realm,
            "trust_router": self.trust_router,
            "metric": self.metric,
            "interval": self.interval,
        })
    }
}

/// Community membership advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityInfo {
    pub community: Name,
    pub comm_type: CommType,
    pub realm: Name,
    pub role: RealmRole,
    pub apcs: Vec<Name>,
    pub owner_realm: Option<Name>,
    pub owner_contact: Option<Name>,
    pub provenance: Vec<Name>,
    pub interval: u32,
}

impl CommunityInfo {
    pub fn to_json(&self) -> Value {
        let mut record = json!({
            "record_type": RECORD_TYPE_COMM_INFO,
            "community": self.community,
            "type": self.comm_type.as_str(),
            "realm": self.realm,
            "role": self.role.as_str(),
            "provenance": self.provenance,
            "interval": self.interval,
        });
        if !self.apcs.is_empty() {
            record["apcs"] = json!(self.apcs);
        }
        if let Some(owner) = &self.owner_realm {
            record["owner_realm"] = json!(owner);
        }
        if let Some(contact) = &self.owner_contact {
            record["owner_contact"] = json!(contact);
        }
        record
    }
}

/// One record of an update batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoRecord {
    Route(RouteInfo),
    Community(CommunityInfo),
}

impl InfoRecord {
    pub fn info_type(&self) -> InfoType {
        match self {
            InfoRecord::Route(_) => InfoType::RouteInfo,
            InfoRecord::Community(_) => InfoType::CommInfo,
        }
    }

    pub fn community(&self) -> &Name {
        match self {
            InfoRecord::Route(route) => &route.community,
            InfoRecord::Community(comm) => &comm.community,
        }
    }

    pub fn realm(&self) -> &Name {
        match self {
            InfoRecord::Route(route) => &route.realm,
            InfoRecord::Community(comm) => &comm.realm,
        }
    }

    /// Advertising router. Community records name it as the first provenance hop.
    pub fn trust_router(&self) -> Option<&Name> {
        match self {
            InfoRecord::Route(route) => Some(&route.trust_router),
            InfoRecord::Community(comm) => comm.provenance.first(),
        }
    }

    pub fn comm_type(&self) -> Option<CommType> {
        match self {
            InfoRecord::Route(_) => None,
            InfoRecord::Community(comm) => Some(comm.comm_type),
        }
    }

    pub fn role(&self) -> Option<RealmRole> {
        match self {
            InfoRecord::Route(_) => None,
            InfoRecord::Community(comm) => Some(comm.role),
        }
    }

    pub fn apcs(&self) -> &[Name] {
        match self {
            InfoRecord::Route(_) => &[],
            InfoRecord::Community(comm) => &comm.apcs,
        }
    }

    pub fn owner_realm(&self) -> Option<&Name> {
        match self {
            InfoRecord::Route(_) => None,
            InfoRecord::Community(comm) => comm.owner_realm.as_ref(),
        }
    }

    pub fn owner_contact(&self) -> Option<&Name> {
        match self {
            InfoRecord::Route(_) => None,
            InfoRecord::Community(comm) => comm.owner_contact.as_ref(),
        }
    }

    pub fn interval(&self) -> u32 {
        match self {
            InfoRecord::Route(route) => route.interval,
            InfoRecord::Community(comm) => comm.interval,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            InfoRecord::Route(route) => route.to_json(),
            InfoRecord::Community(comm) => comm.to_json(),
        }
    }
}

impl From<RouteInfo> for InfoRecord {
    fn from(route: RouteInfo) -> Self {
        InfoRecord::Route(route)
    }
}

impl From<CommunityInfo> for InfoRecord {
    fn from(comm: CommunityInfo) -> Self {
        InfoRecord::Community(comm)
    }
}
