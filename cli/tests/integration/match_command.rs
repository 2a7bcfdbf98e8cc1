//! Integration tests for `fleet match` and `fleet parse`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;
use serde_json::json;

use crate::fixture::{Fleet, greek, json_stdout};

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_match_pillar_exact_prints_matching_id() {
    greek()
        .cmd()
        .args(["match", "I@alpha:bar:baz"])
        .assert()
        .success()
        .stdout("alpha\n");
}

#[test]
fn test_match_pillar_exact_does_not_glob() {
    greek()
        .cmd()
        .args(["match", "I@alpha:bar:*"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_match_or_prints_sorted_union() {
    greek()
        .cmd()
        .args(["match", "I@alpha:bar:baz or *ta"])
        .assert()
        .success()
        .stdout("alpha\nbeta\niota\n");
}

#[test]
fn test_match_not_is_relative_complement() {
    greek()
        .cmd()
        .args(["match", "E@.* not I@alpha:bar:baz"])
        .assert()
        .success()
        .stdout("beta\ngamma\niota\n");
}

#[test]
fn test_match_disjoint_and_is_empty() {
    greek()
        .cmd()
        .args(["match", "I@alpha:bar:baz and L@beta,gamma"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_match_trailing_operator_exits_two() {
    greek()
        .cmd()
        .args(["match", "I@alpha:bar:baz and"])
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("expression ends after operator 'and'"));
}

// ---------------------------------------------------------------------------
// Exit codes and JSON
// ---------------------------------------------------------------------------

#[test]
fn test_match_parse_error_json_has_invalid_target_code() {
    let output = greek()
        .cmd()
        .args(["--json", "match", "(web* or db*"])
        .output()
        .expect("run fleet");
    assert_eq!(output.status.code(), Some(2));
    let body = json_stdout(&output);
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["code"], json!("invalid_target"));
    assert!(body["message"].as_str().unwrap().contains("unmatched '('"));
}

#[test]
fn test_match_fail_empty_exits_one_only_when_empty() {
    greek()
        .cmd()
        .args(["match", "--fail-empty", "nobody*"])
        .assert()
        .code(1);
    greek()
        .cmd()
        .args(["match", "--fail-empty", "alpha"])
        .assert()
        .success()
        .stdout("alpha\n");
}

#[test]
fn test_match_json_reports_minions_and_missing() {
    let output = greek()
        .cmd()
        .args(["match", "--json", "L@alpha,ghost or beta"])
        .output()
        .expect("run fleet");
    assert!(output.status.success());
    let body = json_stdout(&output);
    assert_eq!(body["minions"], json!(["alpha", "beta"]));
    assert_eq!(body["missing"], json!(["ghost"]));
    assert_eq!(body["tgt_type"], json!("compound"));
    assert_eq!(body["greedy"], json!(false));
}

#[test]
fn test_match_missing_ids_go_to_stderr() {
    greek()
        .cmd()
        .args(["match", "L@alpha,ghost"])
        .assert()
        .success()
        .stdout("alpha\n")
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_match_range_without_service_fails() {
    greek()
        .cmd()
        .args(["match", "R@%cluster"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("range matcher unavailable"));
}

// ---------------------------------------------------------------------------
// Target types, delimiter, greedy
// ---------------------------------------------------------------------------

#[test]
fn test_match_single_type_list() {
    greek()
        .cmd()
        .args(["match", "-t", "list", "gamma,alpha"])
        .assert()
        .success()
        .stdout("alpha\ngamma\n");
}

#[test]
fn test_match_grain_with_custom_delimiter() {
    Fleet::new()
        .keys(&["web1"])
        .cached("web1", &json!({"url": "http://web1:80"}), &json!({}))
        .cmd()
        .args(["match", "-t", "grain", "--delimiter", ";", "url;http://web1:*"])
        .assert()
        .success()
        .stdout("web1\n");
}

#[test]
fn test_match_compound_with_custom_delimiter() {
    Fleet::new()
        .keys(&["web1", "db1"])
        .cached("web1", &json!({"os": "Debian"}), &json!({}))
        .cached("db1", &json!({"os": "Ubuntu"}), &json!({}))
        .cmd()
        .args(["match", "--delimiter", ";", "G@os;Debian"])
        .assert()
        .success()
        .stdout("web1\n");
}

#[test]
fn test_match_pcre_lookahead() {
    Fleet::new()
        .keys(&["web1", "db1"])
        .cmd()
        .args(["match", "E@(?!db).*"])
        .assert()
        .success()
        .stdout("web1\n");
}

#[test]
fn test_match_pillar_pcre_lookahead() {
    Fleet::new()
        .keys(&["web1", "db1"])
        .cached("web1", &json!({}), &json!({"os": "Debian"}))
        .cached("db1", &json!({}), &json!({"os": "Debian"}))
        .cmd()
        .args(["match", "J@os:(?!ubu).*"])
        .assert()
        .success()
        .stdout("db1\nweb1\n");
}

#[test]
fn test_match_uncompilable_pillar_pcre_exits_two() {
    greek()
        .cmd()
        .args(["match", "J@os:(deb"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pillar_pcre"));
}

#[test]
fn test_match_ipcidr() {
    Fleet::new()
        .keys(&["web1", "db1"])
        .cached("web1", &json!({"ipv4": ["10.0.0.5"]}), &json!({}))
        .cached("db1", &json!({"ipv4": ["192.168.0.5"]}), &json!({}))
        .cmd()
        .args(["match", "S@10.0.0.0/8"])
        .assert()
        .success()
        .stdout("web1\n");
}

#[test]
fn test_match_greedy_includes_cache_only_minions() {
    let fleet = greek().cached("stale", &json!({"os": "Debian"}), &json!({}));
    fleet
        .cmd()
        .args(["match", "G@os:Debian"])
        .assert()
        .success()
        .stdout("alpha\n");
    fleet
        .cmd()
        .args(["match", "--greedy", "G@os:Debian"])
        .assert()
        .success()
        .stdout("alpha\nstale\n");
}

#[test]
fn test_match_corrupt_cache_entry_is_skipped() {
    greek()
        .cached_raw("beta", "{\"facts\":")
        .cmd()
        .args(["match", "G@os:*"])
        .assert()
        .success()
        .stdout("alpha\n");
}

#[test]
fn test_match_disabled_data_cache_ignores_metadata() {
    greek()
        .config_line("minion_data_cache: false")
        .cmd()
        .args(["match", "I@alpha:bar:baz"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_match_key_cache_file_replaces_listing() {
    let fleet = greek().config_line("key_cache: true");
    std::fs::write(
        fleet.pki_dir().join("minions").join(".key_cache"),
        r#"["alpha","cached-only"]"#,
    )
    .unwrap();
    fleet
        .cmd()
        .args(["match", "*"])
        .assert()
        .success()
        .stdout("alpha\ncached-only\n");
}

#[test]
fn test_match_nodegroup() {
    greek()
        .nodegroup("tails", "'*ta'")
        .nodegroup("firsts", "[alpha, beta]")
        .cmd()
        .args(["match", "N@tails and N@firsts"])
        .assert()
        .success()
        .stdout("beta\n");
}

#[test]
fn test_match_nodegroup_with_numeric_ids() {
    Fleet::new()
        .keys(&["1001", "1002", "web1"])
        .nodegroup("racked", "[1001, web1]")
        .cmd()
        .args(["match", "N@racked"])
        .assert()
        .success()
        .stdout("1001\nweb1\n");
}

#[test]
fn test_match_nodegroup_target_type() {
    greek()
        .nodegroup("firsts", "[alpha, beta]")
        .cmd()
        .args(["match", "-t", "nodegroup", "firsts"])
        .assert()
        .success()
        .stdout("alpha\nbeta\n");
}

#[test]
fn test_match_unknown_nodegroup_exits_two() {
    greek()
        .cmd()
        .args(["match", "N@nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown nodegroup 'nope'"));
}

// ---------------------------------------------------------------------------
// `fleet parse`
// ---------------------------------------------------------------------------

#[test]
fn test_parse_prints_indented_tree() {
    greek()
        .cmd()
        .args(["parse", "E@.* not I@alpha:bar:baz"])
        .assert()
        .success()
        .stdout("and-not\n  pcre \".*\"\n  pillar_exact \"alpha:bar:baz\"\n");
}

#[test]
fn test_parse_json_tree() {
    let output = greek()
        .cmd()
        .args(["parse", "--json", "not beta"])
        .output()
        .expect("run fleet");
    assert!(output.status.success());
    let body = json_stdout(&output);
    assert_eq!(body["tree"]["op"], json!("and_not"));
    assert_eq!(body["tree"]["left"]["matcher"], json!("all"));
    assert_eq!(body["tree"]["right"]["pattern"], json!("beta"));
}

#[test]
fn test_parse_does_not_read_keys() {
    // No key directory or cache exists; parsing still works.
    Fleet::new()
        .cmd()
        .args(["parse", "web* and G@os:Debian"])
        .assert()
        .success()
        .stdout(predicate::str::contains("and"));
}

#[test]
fn test_parse_unknown_engine_exits_two() {
    Fleet::new()
        .cmd()
        .args(["parse", "web* or X@foo"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown target engine 'X@'"));
}
