//! `S@` targets: an IP address or CIDR network checked against the
//! `ipv4` / `ipv6` facts.

use std::net::IpAddr;

use ipnet::IpNet;
use serde_json::{Map, Value};

/// Parse `10.0.0.0/8` or a bare address, which becomes a host network.
///
/// # Errors
///
/// Returns a human-readable reason when the pattern is neither.
pub fn parse_target(pattern: &str) -> Result<IpNet, String> {
    if pattern.contains('/') {
        pattern
            .parse::<IpNet>()
            .map_err(|_| format!("'{pattern}' is not a CIDR network"))
    } else {
        pattern
            .parse::<IpAddr>()
            .map(IpNet::from)
            .map_err(|_| format!("'{pattern}' is not an IP address"))
    }
}

/// True when any address in the fact list for the network's family is
/// inside `net`.
#[must_use]
pub fn matches(net: &IpNet, facts: &Map<String, Value>) -> bool {
    let key = match net {
        IpNet::V4(_) => "ipv4",
        IpNet::V6(_) => "ipv6",
    };
    match facts.get(key) {
        Some(Value::String(addr)) => contains(net, addr),
        Some(Value::Array(addrs)) => addrs
            .iter()
            .filter_map(Value::as_str)
            .any(|addr| contains(net, addr)),
        _ => false,
    }
}

fn contains(net: &IpNet, addr: &str) -> bool {
    addr.parse::<IpAddr>().is_ok_and(|ip| net.contains(&ip))
}
