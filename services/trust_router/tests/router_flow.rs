//! End-to-end router behaviour from a configuration file

use codec::{ErrorKind, TidRequest};
use router_config::RouterConfig;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use trust_router::{
    admit_tid_request, handle_update, outbound_records, sweep_once, RouterError, RouterState,
};
use types::{Name, Timestamp};

const CONFIG: &str = r#"
[router]
hostname = "tr.local.org"

[trp]
expiry_factor = 2

[[communities]]
id = "coi.alpha"
type = "coi"
apcs = ["apc.main"]
idp_realms = ["idp.local.org"]
rp_realms = ["rp.local.org"]

[[filters.trp_inbound]]
action = "reject"
specs = [{ field = "realm", match = "blocked.*" }]

[[filters.trp_inbound]]
action = "accept"
specs = [{ field = "comm", match = "coi.*" }]

[[filters.trp_outbound]]
action = "accept"
specs = [{ field = "realm", match = "*" }]

[[filters.tid_inbound]]
action = "accept"
specs = [{ field = "comm", match = "coi.*" }, { field = "rp_realm", match = "rp.*" }]
realm_constraints = ["idp.*"]
"#;

fn router() -> Arc<RouterState> {
    let dir = tempdir().unwrap();
    let path = dir.path().join("router.toml");
    fs::write(&path, CONFIG).unwrap();
    let config = RouterConfig::load(&path).unwrap();
    RouterState::from_config(&config).unwrap()
}

fn route(realm: &str, metric: &str) -> String {
    format!(
        r#"{{"record_type": "route_info", "community": "coi.alpha", "realm": "{realm}",
            "trust_router": "tr.origin.org", "metric": {metric}, "interval": 30}}"#
    )
}

fn update(records: &[String]) -> Vec<u8> {
    format!(
        r#"{{"message_type": "update", "body": {{"records": [{}]}}}}"#,
        records.join(",")
    )
    .into_bytes()
}

#[test]
fn test_batch_with_bad_record_applies_nothing() {
    let state = router();
    let before = state.table().membership_count();
    let bad = r#"{"record_type": "route_info", "community": "coi.alpha", "realm": "idp.two.org",
                  "trust_router": "tr.origin.org", "interval": 30}"#
        .to_string();
    let batch = update(&[route("idp.one.org", "1"), bad, route("idp.three.org", "1")]);

    let err = handle_update(&state, &Name::from("tr.peer.org"), &batch, Timestamp::from_secs(0)).unwrap_err();
    match err {
        RouterError::Protocol(e) => assert_eq!(e.kind(), ErrorKind::NoParse),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(state.table().membership_count(), before);
}

#[test]
fn test_learned_route_flows_through_admission_advertisement_and_expiry() {
    let state = router();
    let peer = Name::from("tr.peer.org");

    // the learned IdP realm joins the community, the RP is static
    let summary = handle_update(
        &state,
        &peer,
        &update(&[route("idp.remote.org", "1"), route("blocked.example.org", "1")]),
        Timestamp::from_secs(1_000),
    )
    .unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.filtered, 1);

    let req = TidRequest::new("rp.local.org", "idp.remote.org", "coi.alpha");
    assert!(admit_tid_request(&state, &req).is_accept());

    let advertised = outbound_records(&state, &Name::from("tr.elsewhere.org"));
    let remote = advertised
        .iter()
        .find(|rec| rec.realm().eq_str("idp.remote.org"))
        .unwrap();
    assert_eq!(remote.trust_router(), Some(&Name::from("tr.origin.org")));
    assert!(outbound_records(&state, &peer)
        .iter()
        .all(|rec| !rec.realm().eq_str("idp.remote.org")));

    // interval 30 × expiry_factor 2
    assert_eq!(sweep_once(&state, Timestamp::from_secs(1_059)).expired, 0);
    let stats = sweep_once(&state, Timestamp::from_secs(1_060));
    assert_eq!(stats.expired, 1);
    assert!(!admit_tid_request(&state, &req).is_accept());

    // static memberships never expire
    let local = TidRequest::new("rp.local.org", "idp.local.org", "coi.alpha");
    assert!(admit_tid_request(&state, &local).is_accept());
}

#[test]
fn test_withdrawal_removes_only_that_origin() {
    let state = router();
    let peer = Name::from("tr.peer.org");
    handle_update(&state, &peer, &update(&[route("idp.remote.org", "1")]), Timestamp::from_secs(0)).unwrap();
    let with_remote = state.table().membership_count();

    let summary = handle_update(&state, &peer, &update(&[route("idp.remote.org", "65535")]), Timestamp::from_secs(1)).unwrap();
    assert_eq!(summary.withdrawn, 1);
    assert_eq!(state.table().membership_count(), with_remote - 1);
}
