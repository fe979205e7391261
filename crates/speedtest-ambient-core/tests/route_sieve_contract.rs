//! Contract Test: Route Sieve
//!
//! Constraints verified:
//! - No route lookup is made for a family without candidates
//! - Exactly one route lookup per non-empty family, to its probe destination
//! - Only candidates appearing as whole words in the routing decision survive
//! - IPv4 survivors always precede IPv6 survivors, each in discovery order
//! - A failing route lookup fails discovery (no "assume routable" fallback)

mod common;

use common::*;
use speedtest_ambient_core::discovery::{
    AddressFamilyGroup, PROBE_DESTINATION_V4, PROBE_DESTINATION_V6, discover, sieve,
};
use speedtest_ambient_core::error::Error;

const ROUTE_V4: &str = "192.0.2.0 via 203.0.113.1 dev eth0 src 203.0.113.5 uid 1000 \n    cache \n";
const ROUTE_V6: &str =
    "2001:db8:: from :: via fe80::1 dev eth0 proto ra src 2001:db8:1::7 metric 100 pref medium\n";

#[tokio::test]
async fn empty_candidates_make_no_route_lookups() {
    let log = call_log();
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), Some(ROUTE_V6), &log);

    let routable = sieve(&AddressFamilyGroup::default(), &routes).await.unwrap();

    assert!(routable.is_empty());
    assert!(routes.queries().is_empty());
}

#[tokio::test]
async fn only_non_empty_family_is_looked_up() {
    let log = call_log();
    // The v6 lookup would fail if it were made
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), None, &log);
    let groups = AddressFamilyGroup {
        v4: vec!["203.0.113.5".into()],
        v6: vec![],
    };

    let routable = sieve(&groups, &routes).await.unwrap();

    assert_eq!(routable, vec![v4("203.0.113.5")]);
    assert_eq!(routes.queries(), vec![PROBE_DESTINATION_V4]);
}

#[tokio::test]
async fn one_lookup_per_family_regardless_of_candidate_count() {
    let log = call_log();
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), Some(ROUTE_V6), &log);
    let groups = AddressFamilyGroup {
        v4: vec!["203.0.113.5".into(), "203.0.113.6".into(), "203.0.113.7".into()],
        v6: vec!["2001:db8:1::7".into(), "2001:db8:1::8".into()],
    };

    sieve(&groups, &routes).await.unwrap();

    assert_eq!(routes.queries(), vec![PROBE_DESTINATION_V4, PROBE_DESTINATION_V6]);
}

#[tokio::test]
async fn only_the_selected_source_survives() {
    let log = call_log();
    let routes = ScriptedRouteLookup::new(
        Some("192.0.2.0 via 10.0.0.1 dev eth0 src 10.0.0.5 uid 0"),
        None,
        &log,
    );
    let groups = AddressFamilyGroup {
        v4: vec!["10.0.0.5".into(), "10.0.0.6".into()],
        v6: vec![],
    };

    let routable = sieve(&groups, &routes).await.unwrap();

    assert_eq!(routable, vec![v4("10.0.0.5")]);
}

#[tokio::test]
async fn longer_address_is_not_a_false_positive() {
    let log = call_log();
    let routes = ScriptedRouteLookup::new(
        Some("192.0.2.0 via 10.0.0.1 dev eth0 src 10.0.0.5 uid 0"),
        None,
        &log,
    );
    let groups = AddressFamilyGroup {
        v4: vec!["10.0.0.50".into()],
        v6: vec![],
    };

    let routable = sieve(&groups, &routes).await.unwrap();

    assert!(routable.is_empty());
}

#[tokio::test]
async fn ipv4_survivors_precede_ipv6_survivors() {
    let log = call_log();
    let routes = ScriptedRouteLookup::new(
        Some("192.0.2.0 dev ppp0 src 198.51.100.2 src 198.51.100.1"),
        Some("2001:db8:: dev ppp0 src 2001:db8:2::1 src 2001:db8:1::1"),
        &log,
    );
    // Discovered interleaved and IPv6-first
    let source = ScriptedInterfaceSource::with_addresses(
        &[
            ("inet6", "2001:db8:1::1"),
            ("inet", "198.51.100.1"),
            ("inet6", "2001:db8:2::1"),
            ("inet", "198.51.100.2"),
        ],
        &log,
    );

    let routable = discover(&source, &routes).await.unwrap();

    assert_eq!(
        routable,
        vec![
            v4("198.51.100.1"),
            v4("198.51.100.2"),
            v6("2001:db8:1::1"),
            v6("2001:db8:2::1"),
        ]
    );
}

#[tokio::test]
async fn end_to_end_only_routable_v4_survives() {
    let log = call_log();
    let source = ScriptedInterfaceSource::with_addresses(
        &[("inet", "203.0.113.5"), ("inet6", "2001:db8:1::5")],
        &log,
    );
    // The v6 route uses a different source address
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), Some(ROUTE_V6), &log);

    let routable = discover(&source, &routes).await.unwrap();

    assert_eq!(routable, vec![v4("203.0.113.5")]);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["list", "route 192.0.2.0", "route 2001:db8::"]
    );
}

#[tokio::test]
async fn failing_route_lookup_fails_discovery() {
    let log = call_log();
    let source = ScriptedInterfaceSource::with_addresses(
        &[("inet", "203.0.113.5"), ("inet6", "2001:db8:1::7")],
        &log,
    );
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), None, &log);

    let err = discover(&source, &routes).await.unwrap_err();

    assert!(matches!(err, Error::RouteLookup(_)));
}

#[tokio::test]
async fn failing_listing_makes_no_route_lookups() {
    let log = call_log();
    let source = ScriptedInterfaceSource::failing(&log);
    let routes = ScriptedRouteLookup::new(Some(ROUTE_V4), Some(ROUTE_V6), &log);

    let err = discover(&source, &routes).await.unwrap_err();

    assert!(matches!(err, Error::Discovery(_)));
    assert!(routes.queries().is_empty());
}
