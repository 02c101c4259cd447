//! # Filter Field Registry - Named Extractors per Filter Type
//!
//! ## Purpose
//!
//! Maps `(filter type, field name)` to the handler that reads that field from
//! a target. Supporting a new field means adding an entry here; the
//! matching algorithm in `filter.rs` never changes.
//!
//! ## Registered Fields
//!
//! | Field | tid_inbound | trp_inbound | trp_outbound |
//! |---|---|---|---|
//! | `realm` | ✓ | ✓ | ✓ |
//! | `comm` | ✓ | ✓ | ✓ |
//! | `rp_realm` | ✓ | | |
//! | `original_coi` | ✓ | | |
//! | `comm_type` | | ✓ | ✓ |
//! | `realm_role` | | ✓ | ✓ |
//! | `apc` | | ✓ | ✓ |
//! | `trust_router` | | ✓ | ✓ |
//! | `owner_realm` | | ✓ | ✓ |
//! | `owner_contact` | | ✓ | ✓ |
//! | `info_type` | | ✓ | ✓ |
//!
//! An extractor returning `None` means the target has no value for the field
//! (e.g. `comm_type` on a route record, or an unknown community kind). Such a
//! spec never matches.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use types::{CommType, Name};

use crate::target::FilterTarget;
use crate::policy::FilterType;

pub type Extractor = fn(&FilterTarget<'_>) -> Option<Name>;
pub type Matcher = fn(&Name, &Name) -> bool;

/// Extractor and comparator pair for one field.
#[derive(Clone, Copy)]
pub struct FieldHandler {
    name: &'static str,
    extract: Extractor,
    matcher: Matcher,
}

impl FieldHandler {
    const fn wildcard(name: &'static str, extract: Extractor) -> Self {
        Self {
            name,
            extract,
            matcher: wildcard_match,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn extract(&self, target: &FilterTarget<'_>) -> Option<Name> {
        (self.extract)(target)
    }

    pub fn matches(&self, value: &Name, pattern: &Name) -> bool {
        (self.matcher)(value, pattern)
    }
}

impl std::fmt::Debug for FieldHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldHandler").field("name", &self.name).finish()
    }
}

fn wildcard_match(value: &Name, pattern: &Name) -> bool {
    value.prefix_wildcard_match(pattern)
}

// TID request fields

fn tid_realm(target: &FilterTarget<'_>) -> Option<Name> {
    target.tid().map(|req| req.realm.clone())
}

fn tid_comm(target: &FilterTarget<'_>) -> Option<Name> {
    target.tid().map(|req| req.comm.clone())
}

fn tid_rp_realm(target: &FilterTarget<'_>) -> Option<Name> {
    target.tid().map(|req| req.rp_realm.clone())
}

fn tid_orig_coi(target: &FilterTarget<'_>) -> Option<Name> {
    target.tid().and_then(|req| req.orig_coi.clone())
}

// TRP record fields

fn trp_realm(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec().map(|rec| rec.realm().clone())
}

fn trp_comm(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec().map(|rec| rec.community().clone())
}

fn trp_comm_type(target: &FilterTarget<'_>) -> Option<Name> {
    match target.inforec()?.comm_type()? {
        CommType::Unknown => None,
        known => Some(Name::from(known.as_str())),
    }
}

fn trp_realm_role(target: &FilterTarget<'_>) -> Option<Name> {
    target
        .inforec()?
        .role()
        .map(|role| Name::from(role.as_str()))
}

// only the first APC is considered
fn trp_apc(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec()?.apcs().first().cloned()
}

fn trp_trust_router(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec()?.trust_router().cloned()
}

fn trp_owner_realm(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec()?.owner_realm().cloned()
}

fn trp_owner_contact(target: &FilterTarget<'_>) -> Option<Name> {
    target.inforec()?.owner_contact().cloned()
}

fn trp_info_type(target: &FilterTarget<'_>) -> Option<Name> {
    target
        .inforec()
        .map(|rec| Name::from(rec.info_type().as_str()))
}

const TID_FIELDS: &[FieldHandler] = &[
    FieldHandler::wildcard("realm", tid_realm),
    FieldHandler::wildcard("comm", tid_comm),
    FieldHandler::wildcard("rp_realm", tid_rp_realm),
    FieldHandler::wildcard("original_coi", tid_orig_coi),
];

const TRP_FIELDS: &[FieldHandler] = &[
    FieldHandler::wildcard("realm", trp_realm),
    FieldHandler::wildcard("comm", trp_comm),
    FieldHandler::wildcard("comm_type", trp_comm_type),
    FieldHandler::wildcard("realm_role", trp_realm_role),
    FieldHandler::wildcard("apc", trp_apc),
    FieldHandler::wildcard("trust_router", trp_trust_router),
    FieldHandler::wildcard("owner_realm", trp_owner_realm),
    FieldHandler::wildcard("owner_contact", trp_owner_contact),
    FieldHandler::wildcard("info_type", trp_info_type),
];

static FIELD_REGISTRY: Lazy<HashMap<FilterType, HashMap<&'static str, FieldHandler>>> =
    Lazy::new(|| {
        let index = |handlers: &[FieldHandler]| {
            handlers
                .iter()
                .map(|h| (h.name, *h))
                .collect::<HashMap<_, _>>()
        };
        let mut registry = HashMap::new();
        registry.insert(FilterType::TidInbound, index(TID_FIELDS));
        registry.insert(FilterType::TrpInbound, index(TRP_FIELDS));
        registry.insert(FilterType::TrpOutbound, index(TRP_FIELDS));
        registry
    });

/// Handler for `field` under `filter_type`, if registered.
pub fn field_handler(filter_type: FilterType, field: &Name) -> Option<&'static FieldHandler> {
    let field = std::str::from_utf8(field.as_bytes()).ok()?;
    FIELD_REGISTRY.get(&filter_type)?.get(field)
}

pub fn is_valid_field(filter_type: FilterType, field: &Name) -> bool {
    field_handler(filter_type, field).is_some()
}

/// Registered field names for a filter type, sorted.
pub fn fields_for(filter_type: FilterType) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = FIELD_REGISTRY
        .get(&filter_type)
        .map(|fields| fields.keys().copied().collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{CommunityInfo, InfoRecord, RouteInfo, TidRequest};
    use types::RealmRole;

    #[test]
    fn test_registry_membership() {
        assert!(is_valid_field(FilterType::TidInbound, &Name::from("rp_realm")));
        assert!(!is_valid_field(FilterType::TrpInbound, &Name::from("rp_realm")));
        assert!(is_valid_field(FilterType::TrpOutbound, &Name::from("info_type")));
        assert!(!is_valid_field(FilterType::TidInbound, &Name::from("trust_router")));
        assert!(!is_valid_field(FilterType::TrpInbound, &Name::from("metric")));
        assert_eq!(
            fields_for(FilterType::TidInbound),
            vec!["comm", "original_coi", "realm", "rp_realm"]
        );
        assert_eq!(fields_for(FilterType::TrpInbound).len(), 9);
    }

    #[test]
    fn test_tid_extraction() {
        let req = TidRequest::new("rp.example.org", "idp.example.org", "coi.alpha");
        let target = FilterTarget::from(&req);
        let get = |field: &str| {
            field_handler(FilterType::TidInbound, &Name::from(field))
                .unwrap()
                .extract(&target)
        };
        assert_eq!(get("rp_realm"), Some(Name::from("rp.example.org")));
        assert_eq!(get("realm"), Some(Name::from("idp.example.org")));
        assert_eq!(get("comm"), Some(Name::from("coi.alpha")));
        assert_eq!(get("original_coi"), None);
    }

    #[test]
    fn test_route_record_lacks_community_fields() {
        let rec = InfoRecord::from(RouteInfo::new("coi.alpha", "idp.example.org", "tr1", 1, 30));
        let target = FilterTarget::from(&rec);
        let get = |field: &str| {
            field_handler(FilterType::TrpInbound, &Name::from(field))
                .unwrap()
                .extract(&target)
        };
        assert_eq!(get("trust_router"), Some(Name::from("tr1")));
        assert_eq!(get("info_type"), Some(Name::from("route_info")));
        assert_eq!(get("comm_type"), None);
        assert_eq!(get("realm_role"), None);
        assert_eq!(get("apc"), None);
    }

    #[test]
    fn test_community_record_fields() {
        let rec = InfoRecord::from(CommunityInfo {
            community: Name::from("coi.alpha"),
            comm_type: CommType::Unknown,
            realm: Name::from("rp.example.org"),
            role: RealmRole::Rp,
            apcs: vec![Name::from("apc.one"), Name::from("apc.two")],
            owner_realm: None,
            owner_contact: Some(Name::from("admin@example.org")),
            provenance: vec![Name::from("tr1")],
            interval: 60,
        });
        let target = FilterTarget::from(&rec);
        let get = |field: &str| {
            field_handler(FilterType::TrpOutbound, &Name::from(field))
                .unwrap()
                .extract(&target)
        };
        assert_eq!(get("comm_type"), None);
        assert_eq!(get("realm_role"), Some(Name::from("rp")));
        assert_eq!(get("apc"), Some(Name::from("apc.one")));
        assert_eq!(get("owner_contact"), Some(Name::from("admin@example.org")));
        assert_eq!(get("owner_realm"), None);
    }

    #[test]
    fn test_wrong_target_kind_extracts_nothing() {
        let req = TidRequest::new("rp", "idp", "coi");
        let target = FilterTarget::from(&req);
        let handler = field_handler(FilterType::TrpInbound, &Name::from("realm")).unwrap();
        assert_eq!(handler.extract(&target), None);
    }
}
