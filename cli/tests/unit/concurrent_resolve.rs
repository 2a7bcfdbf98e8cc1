//! One `ResolverConfig` shared by several threads resolving at once.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::thread;

use fleet_cli::application::services::resolver::{ResolverConfig, resolve};
use serde_json::json;

use crate::mocks::{MemoryCache, config};

#[test]
fn resolver_config_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResolverConfig>();
}

#[test]
fn parallel_resolves_on_a_shared_config_agree() {
    let cache = MemoryCache::new()
        .with("alpha", json!({"os": "Debian"}), json!({"alpha": "bar:baz"}))
        .with("beta", json!({"os": "Ubuntu"}), json!({}));
    let cfg = config(&["alpha", "beta", "gamma"], cache);
    let expected = resolve(&cfg, "I@alpha:bar:baz or *ta", false).unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| resolve(&cfg, "I@alpha:bar:baz or *ta", false)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("resolver thread panicked"))
            .collect()
    });

    assert_eq!(results.len(), 4);
    for result in results {
        assert_eq!(result.unwrap(), expected);
    }
    assert_eq!(expected.iter().map(String::as_str).collect::<Vec<_>>(), vec!["alpha", "beta"]);
}

#[test]
fn parallel_resolves_of_different_targets_stay_independent() {
    let cache = MemoryCache::new()
        .with("web1", json!({"os": "Debian"}), json!({}))
        .with("db1", json!({"os": "Ubuntu"}), json!({}));
    let cfg = config(&["web1", "db1"], cache);
    let targets = ["G@os:Debian", "G@os:Ubuntu", "E@(?!db).*", "not web1"];

    thread::scope(|scope| {
        for target in targets {
            let cfg = &cfg;
            scope.spawn(move || {
                for _ in 0..16 {
                    let ids = resolve(cfg, target, false).unwrap();
                    let expected = match target {
                        "G@os:Ubuntu" | "not web1" => "db1",
                        _ => "web1",
                    };
                    assert_eq!(ids.iter().map(String::as_str).collect::<Vec<_>>(), vec![expected]);
                }
            });
        }
    });
}
