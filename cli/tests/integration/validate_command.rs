//! Integration tests for `fleet validate`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;
use serde_json::json;

use crate::fixture::{greek, json_stdout};

#[test]
fn test_validate_in_scope_exits_zero() {
    greek()
        .cmd()
        .args(["validate", "*ta or alpha", "beta"])
        .assert()
        .success();
}

#[test]
fn test_validate_out_of_scope_exits_one_and_lists_minions() {
    greek()
        .cmd()
        .args(["validate", "*ta", "*a"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("alpha"))
        .stderr(predicate::str::contains("gamma"));
}

#[test]
fn test_validate_json_report() {
    let output = greek()
        .cmd()
        .args(["--json", "validate", "not I@alpha:bar:baz", "-t", "list", "alpha,beta"])
        .output()
        .expect("run fleet");
    assert_eq!(output.status.code(), Some(1));
    let body = json_stdout(&output);
    assert_eq!(body["in_scope"], json!(false));
    assert_eq!(body["outside"], json!(["alpha"]));
    assert_eq!(body["tgt_type"], json!("list"));
}

#[test]
fn test_validate_malformed_scope_exits_two() {
    greek()
        .cmd()
        .args(["validate", "(*ta", "beta"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unmatched '('"));
}
