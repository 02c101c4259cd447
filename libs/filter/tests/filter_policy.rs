//! Filter policy behaviour through the public API

use codec::{InfoRecord, RouteInfo, TidRequest};
use filter::{
    Constraint, ConstraintSet, ConstraintType, Filter, FilterAction, FilterLine, FilterMatch,
    FilterSpec, FilterTarget, FilterType,
};
use proptest::prelude::*;
use types::Name;

fn spec(field: &str, patterns: &[&str]) -> FilterSpec {
    FilterSpec::with_matches(field, patterns.iter().map(|p| Name::from(*p)).collect()).unwrap()
}

fn tid_filter() -> Filter {
    let realm = Constraint::new(ConstraintType::Realm, vec![Name::from("*.example.org")]).unwrap();
    let domain = Constraint::new(ConstraintType::Domain, vec![Name::from("example.org")]).unwrap();
    Filter::new(
        FilterType::TidInbound,
        vec![
            FilterLine::reject().with_spec(spec("rp_realm", &["blocked.*"])).unwrap(),
            FilterLine::accept()
                .with_spec(spec("comm", &["coi.*"]))
                .unwrap()
                .with_realm_constraint(realm)
                .with_domain_constraint(domain),
        ],
    )
    .unwrap()
}

#[test]
fn test_wildcard_patterns_select_realms() {
    let filter = Filter::new(
        FilterType::TrpInbound,
        vec![FilterLine::accept().with_spec(spec("realm", &["example.*"])).unwrap()],
    )
    .unwrap();

    let check = |realm: &str| {
        let rec: InfoRecord = RouteInfo::new("coi.alpha", realm, "tr1", 1, 60).into();
        filter.apply(&FilterTarget::from(&rec), None)
    };

    assert!(check("example.org").accepted());
    assert!(check("example.net").accepted());
    assert_eq!(check("other.org"), FilterMatch::NoMatch);
}

#[test]
fn test_exact_pattern_matches_only_literal() {
    let filter = Filter::new(
        FilterType::TrpInbound,
        vec![FilterLine::accept().with_spec(spec("realm", &["example.org"])).unwrap()],
    )
    .unwrap();
    let hit: InfoRecord = RouteInfo::new("c", "example.org", "tr", 1, 1).into();
    let miss: InfoRecord = RouteInfo::new("c", "example.org.evil", "tr", 1, 1).into();
    assert!(filter.apply(&FilterTarget::from(&hit), None).accepted());
    assert!(!filter.apply(&FilterTarget::from(&miss), None).is_match());
}

#[test]
fn test_reject_line_keeps_constraints_out() {
    let req = TidRequest::new("blocked.example.org", "idp.example.org", "coi.alpha");
    let mut set = ConstraintSet::new();
    let result = tid_filter().apply(&FilterTarget::from(&req), Some(&mut set));
    assert_eq!(result, FilterMatch::Matched(FilterAction::Reject));
    assert!(set.is_empty());
}

#[test]
fn test_no_match_leaves_constraints_unchanged() {
    let req = TidRequest::new("rp.example.org", "idp.example.org", "apc.main");
    let mut set = ConstraintSet::new();
    assert_eq!(
        tid_filter().apply(&FilterTarget::from(&req), Some(&mut set)),
        FilterMatch::NoMatch
    );
    assert!(set.is_empty());
}

proptest! {
    #[test]
    fn prop_apply_is_deterministic(rp in "[a-z]{1,8}\\.(example|blocked)\\.org", comm in "(coi|apc)\\.[a-z]{1,6}") {
        let filter = tid_filter();
        let before = filter.clone();
        let req = TidRequest::new(rp.as_str(), "idp.example.org", comm.as_str());

        let mut first = ConstraintSet::new();
        let mut second = ConstraintSet::new();
        let a = filter.apply(&FilterTarget::from(&req), Some(&mut first));
        let b = filter.apply(&FilterTarget::from(&req), Some(&mut second));

        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
        prop_assert_eq!(filter, before);
    }
}
