//! End-to-end resolution over in-memory ports: the reference scenarios plus
//! the metadata engines, nodegroups and the missing-ID report.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use fleet_cli::application::services::resolver::{check_minions, resolve, validate_target};
use fleet_cli::domain::error::ParseError;
use fleet_cli::domain::nodegroup::{NodegroupDef, Nodegroups};
use fleet_common::TargetType;
use serde_json::json;

use crate::mocks::{BrokenCache, MemoryCache, StaticKeys, config, sorted};
use fleet_cli::application::services::resolver::ResolverConfig;

fn alpha_pillar() -> MemoryCache {
    MemoryCache::new().with("alpha", json!({}), json!({"alpha": "bar:baz"}))
}

// ── Reference scenarios ──────────────────────────────────────────────────────

#[test]
fn pillar_exact_matches_the_keyed_minion() {
    let cfg = config(&["alpha"], alpha_pillar());
    assert_eq!(sorted(&resolve(&cfg, "I@alpha:bar:baz", false).unwrap()), vec!["alpha"]);
}

#[test]
fn pillar_exact_never_globs() {
    let cfg = config(&["alpha"], alpha_pillar());
    assert!(resolve(&cfg, "I@alpha:bar:*", false).unwrap().is_empty());
}

#[test]
fn pillar_exact_or_glob() {
    let cfg = config(&["alpha", "beta", "gamma", "iota"], alpha_pillar());
    assert_eq!(
        sorted(&resolve(&cfg, "I@alpha:bar:baz or *ta", false).unwrap()),
        vec!["alpha", "beta", "iota"]
    );
}

#[test]
fn regex_not_pillar_exact_is_a_difference() {
    let cfg = config(&["alpha", "beta", "gamma", "iota"], alpha_pillar());
    assert_eq!(
        sorted(&resolve(&cfg, "E@.* not I@alpha:bar:baz", false).unwrap()),
        vec!["beta", "gamma", "iota"]
    );
}

#[test]
fn disjoint_and_is_empty() {
    let cfg = config(&["alpha", "beta", "gamma"], alpha_pillar());
    assert!(
        resolve(&cfg, "I@alpha:bar:baz and L@beta,gamma", false)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn trailing_operator_is_a_parse_error_not_an_empty_set() {
    let cfg = config(&["alpha"], alpha_pillar());
    let err = resolve(&cfg, "I@alpha:bar:baz and", false).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::DanglingOperator { .. })
        ),
        "got: {err:#}"
    );
}

#[test]
fn nested_pillar_path_matches_too() {
    let cache = MemoryCache::new().with("alpha", json!({}), json!({"alpha": {"bar": "baz"}}));
    let cfg = config(&["alpha"], cache);
    assert_eq!(sorted(&resolve(&cfg, "I@alpha:bar:baz", false).unwrap()), vec!["alpha"]);
}

// ── Data edge cases ──────────────────────────────────────────────────────────

#[test]
fn minion_without_cache_entry_is_excluded_without_error() {
    let cfg = config(&["alpha", "fresh"], alpha_pillar());
    assert_eq!(
        sorted(&resolve(&cfg, "I@alpha:bar:baz or not I@alpha:bar:baz", false).unwrap()),
        vec!["alpha", "fresh"]
    );
    assert!(resolve(&cfg, "I@alpha:bar:baz and fresh", false).unwrap().is_empty());
}

#[test]
fn unreadable_cache_behaves_like_absent_data() {
    let cfg = ResolverConfig::new(Box::new(StaticKeys::of(&["alpha"])), Box::new(BrokenCache));
    assert!(resolve(&cfg, "G@os:*", false).unwrap().is_empty());
    // Greedy widening falls back to the accepted keys.
    assert_eq!(sorted(&resolve(&cfg, "*", true).unwrap()), vec!["alpha"]);
}

#[test]
fn greedy_includes_cached_minions_without_keys() {
    let cache = alpha_pillar().with("revoked", json!({}), json!({"alpha": "bar:baz"}));
    let cfg = config(&["alpha"], cache);
    assert_eq!(sorted(&resolve(&cfg, "I@alpha:bar:baz", false).unwrap()), vec!["alpha"]);
    assert_eq!(
        sorted(&resolve(&cfg, "I@alpha:bar:baz", true).unwrap()),
        vec!["alpha", "revoked"]
    );
}

#[test]
fn same_snapshot_resolves_identically() {
    let cfg = config(&["alpha", "beta", "gamma", "iota"], alpha_pillar());
    let first = resolve(&cfg, "( *a or L@iota ) not I@alpha:bar:baz", false).unwrap();
    let second = resolve(&cfg, "( *a or L@iota ) not I@alpha:bar:baz", false).unwrap();
    assert_eq!(first, second);
    assert_eq!(sorted(&first), vec!["beta", "gamma", "iota"]);
}

// ── Metadata engines ─────────────────────────────────────────────────────────

fn hosts() -> MemoryCache {
    MemoryCache::new()
        .with(
            "web1",
            json!({"os": "Debian", "ipv4": ["10.0.0.5", "127.0.0.1"], "roles": ["web", "cache"]}),
            json!({"env": "prod", "apps": [{"name": "nginx"}]}),
        )
        .with(
            "web2",
            json!({"os": "Ubuntu", "ipv4": ["10.0.1.9"], "roles": ["web"]}),
            json!({"env": "staging"}),
        )
        .with(
            "db1",
            json!({"os": "Debian", "ipv4": ["192.168.1.20"], "ipv6": ["fd00::20"]}),
            json!({"env": "Prod"}),
        )
}

fn fleet() -> ResolverConfig {
    config(&["web1", "web2", "db1"], hosts())
}

#[test]
fn grain_glob_is_case_insensitive() {
    assert_eq!(
        sorted(&resolve(&fleet(), "G@os:debian", false).unwrap()),
        vec!["db1", "web1"]
    );
}

#[test]
fn grain_list_member_matches() {
    assert_eq!(
        sorted(&resolve(&fleet(), "G@roles:cache", false).unwrap()),
        vec!["web1"]
    );
}

#[test]
fn grain_pcre_and_pillar_pcre() {
    assert_eq!(
        sorted(&resolve(&fleet(), "P@os:(Deb|Ubu)", false).unwrap()),
        vec!["db1", "web1", "web2"]
    );
    assert_eq!(
        sorted(&resolve(&fleet(), "J@env:prod", false).unwrap()),
        vec!["db1", "web1"]
    );
}

#[test]
fn pillar_exact_is_case_sensitive() {
    assert_eq!(
        sorted(&resolve(&fleet(), "I@env:prod", false).unwrap()),
        vec!["web1"]
    );
}

#[test]
fn pillar_list_of_dicts_is_searched() {
    assert_eq!(
        sorted(&resolve(&fleet(), "I@apps:name:nginx", false).unwrap()),
        vec!["web1"]
    );
}

#[test]
fn ipcidr_matches_network_and_address() {
    assert_eq!(
        sorted(&resolve(&fleet(), "S@10.0.0.0/16", false).unwrap()),
        vec!["web1", "web2"]
    );
    assert_eq!(
        sorted(&resolve(&fleet(), "S@192.168.1.20", false).unwrap()),
        vec!["db1"]
    );
    assert_eq!(
        sorted(&resolve(&fleet(), "S@fd00::/8", false).unwrap()),
        vec!["db1"]
    );
}

#[test]
fn custom_delimiter_in_compound_term() {
    let cache = MemoryCache::new().with("web1", json!({"url": "http://web1:80"}), json!({}));
    let cfg = config(&["web1"], cache);
    assert_eq!(
        sorted(&resolve(&cfg, "G;@url;http://web1:*", false).unwrap()),
        vec!["web1"]
    );
}

#[test]
fn invalid_regex_is_rejected_at_parse_time() {
    let err = resolve(&fleet(), "E@web(", false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::InvalidPattern { matcher: "pcre", .. })
    ));
}

#[test]
fn unknown_engine_is_rejected_at_parse_time() {
    let err = resolve(&fleet(), "web* or X@foo", false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::UnknownMatcher { sigil: 'X', .. })
    ));
}

// ── Single-type targets, nodegroups, missing report ──────────────────────────

#[test]
fn single_type_glob_pattern_is_not_parsed_as_compound() {
    let ev = check_minions(&fleet(), "web*", TargetType::Glob, None, false).unwrap();
    assert_eq!(sorted(&ev.minions), vec!["web1", "web2"]);

    let ev = check_minions(&fleet(), "env:prod", TargetType::PillarExact, None, false).unwrap();
    assert_eq!(sorted(&ev.minions), vec!["web1"]);
}

#[test]
fn pillar_glob_is_reachable_by_target_type() {
    let ev = check_minions(&fleet(), "env:p*", TargetType::Pillar, None, false).unwrap();
    assert_eq!(sorted(&ev.minions), vec!["db1", "web1"]);
}

#[test]
fn listed_but_unknown_ids_are_reported_missing() {
    let ev = check_minions(&fleet(), "L@web1,ghost or L@phantom", TargetType::Compound, None, false)
        .unwrap();
    assert_eq!(sorted(&ev.minions), vec!["web1"]);
    assert_eq!(sorted(&ev.missing), vec!["ghost", "phantom"]);

    let ev = check_minions(&fleet(), "* not L@ghost", TargetType::Compound, None, false).unwrap();
    assert!(ev.missing.is_empty());
}

fn grouped() -> ResolverConfig {
    let mut groups = Nodegroups::new();
    groups.insert("debian".to_string(), NodegroupDef::Expr("G@os:Debian".to_string()));
    groups.insert(
        "frontends".to_string(),
        NodegroupDef::Words(vec!["web1".to_string(), "web2".to_string()]),
    );
    groups.insert(
        "debian_fronts".to_string(),
        NodegroupDef::Expr("N@debian and N@frontends".to_string()),
    );
    groups.insert("loop".to_string(), NodegroupDef::Expr("N@loop or db1".to_string()));
    fleet().with_nodegroups(groups)
}

#[test]
fn nodegroups_expand_recursively() {
    let cfg = grouped();
    assert_eq!(
        sorted(&resolve(&cfg, "N@debian_fronts", false).unwrap()),
        vec!["web1"]
    );
    let ev = check_minions(&cfg, "frontends", TargetType::Nodegroup, None, false).unwrap();
    assert_eq!(sorted(&ev.minions), vec!["web1", "web2"]);
}

#[test]
fn nodegroup_binds_as_a_group() {
    // Without the implicit parentheses this would read `db1 and web1 or web2`.
    let mut groups = Nodegroups::new();
    groups.insert("either".to_string(), NodegroupDef::Expr("web1 or web2".to_string()));
    let cfg = fleet().with_nodegroups(groups);
    assert!(resolve(&cfg, "db1 and N@either", false).unwrap().is_empty());
}

#[test]
fn nodegroup_errors_are_parse_errors() {
    let cfg = grouped();
    let err = resolve(&cfg, "N@loop", false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::NodegroupCycle(name)) if name == "loop"
    ));
    let err = resolve(&cfg, "N@nope", false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParseError>(),
        Some(ParseError::UnknownNodegroup(name)) if name == "nope"
    ));
}

#[test]
fn validate_target_against_scope() {
    let cfg = fleet();
    assert!(validate_target(&cfg, "G@os:Debian", "web1", TargetType::Glob, false).unwrap());
    assert!(!validate_target(&cfg, "G@os:Debian", "web*", TargetType::Glob, false).unwrap());
}
