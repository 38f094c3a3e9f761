use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

/// Errors from IP validation and admin-list mutation.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[display(fmt = "invalid IPv4 address: {}", _0)]
    Validation(String),
    #[display(fmt = "IP address already in the admin list: {}", _0)]
    Duplicate(String),
}

impl std::error::Error for NetworkError {}

/// Strict dotted-quad parse: four octets 0-255, no leading zeros.
/// `std::net::Ipv4Addr` enforces exactly that, so "999.1.1.1" and
/// "192.168.01.1" are both rejected rather than coerced.
pub fn parse_ipv4(raw: &str) -> Result<Ipv4Addr, NetworkError> {
    Ipv4Addr::from_str(raw.trim()).map_err(|_| NetworkError::Validation(raw.to_string()))
}

/// The /24 network an address belongs to: its first three octets.
/// Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange([u8; 3]);

impl NetworkRange {
    pub fn of(ip: Ipv4Addr) -> Self {
        let [a, b, c, _] = ip.octets();
        NetworkRange([a, b, c])
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.x", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Authorization {
    #[schema(example = true)]
    pub authorized: bool,
    #[schema(example = "Same network as admin IP: 192.168.1.100")]
    pub reason: String,
}

impl Authorization {
    fn granted(reason: impl Into<String>) -> Self {
        Authorization {
            authorized: true,
            reason: reason.into(),
        }
    }

    fn denied(reason: impl Into<String>) -> Self {
        Authorization {
            authorized: false,
            reason: reason.into(),
        }
    }
}

/// Decide whether a device may use the system, by the coarse "same /24 as
/// an admin IP" heuristic.
///
/// Advisory only: the candidate address is client-reported or NAT-shared
/// and carries no cryptographic binding. Callers layer this under real
/// credential authentication, never use it as the sole gate.
///
/// An empty admin set fails open ("no restrictions configured") so that an
/// unconfigured deployment cannot lock out the only admin. Unparseable
/// entries inside the admin set are skipped. A malformed candidate is
/// denied, never a panic.
pub fn authorize(candidate_ip: &str, admin_ips: &[String]) -> Authorization {
    if admin_ips.is_empty() {
        return Authorization::granted("No restrictions configured");
    }

    let candidate = match parse_ipv4(candidate_ip) {
        Ok(ip) => ip,
        Err(_) => return Authorization::denied("Network validation error"),
    };
    let candidate_range = NetworkRange::of(candidate);

    // first-seen order, deduplicated
    let mut allowed: Vec<NetworkRange> = Vec::new();
    for entry in admin_ips {
        let Ok(admin_ip) = parse_ipv4(entry) else {
            continue;
        };
        let range = NetworkRange::of(admin_ip);
        if range == candidate_range {
            return Authorization::granted(format!("Same network as admin IP: {}", entry.trim()));
        }
        if !allowed.contains(&range) {
            allowed.push(range);
        }
    }

    let ranges = allowed
        .iter()
        .map(NetworkRange::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Authorization::denied(format!(
        "Device not on authorized network. Allowed: {}",
        ranges
    ))
}

/// Ordered, de-duplicated admin IP allowlist. Empty means open access.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdminIpSet {
    ips: Vec<String>,
}

impl AdminIpSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from already-validated entries, e.g. rows read back from
    /// the persistence layer. Order is preserved as given.
    pub fn from_ips(ips: Vec<String>) -> Self {
        AdminIpSet { ips }
    }

    /// Append a new admin IP, preserving insertion order. Duplicate means
    /// exact string duplicate only; two distinct addresses on the same /24
    /// are both kept.
    pub fn add(&mut self, raw: &str) -> Result<(), NetworkError> {
        let ip = parse_ipv4(raw)?.to_string();
        if self.ips.iter().any(|existing| *existing == ip) {
            return Err(NetworkError::Duplicate(ip));
        }
        self.ips.push(ip);
        Ok(())
    }

    /// Remove an exact match; absent entries are a no-op, not an error.
    pub fn remove(&mut self, ip: &str) {
        self.ips.retain(|existing| existing != ip.trim());
    }

    pub fn clear(&mut self) {
        self.ips.clear();
    }

    pub fn ips(&self) -> &[String] {
        &self.ips
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_admin_set_is_open_access() {
        let decision = authorize("10.20.30.40", &[]);
        assert!(decision.authorized);
        assert_eq!(decision.reason, "No restrictions configured");
    }

    #[test]
    fn same_slash24_is_authorized() {
        let admins = vec!["192.168.1.100".to_string()];
        let decision = authorize("192.168.1.7", &admins);
        assert!(decision.authorized);
        assert_eq!(decision.reason, "Same network as admin IP: 192.168.1.100");
    }

    #[test]
    fn different_slash24_is_denied_with_allowed_ranges() {
        let admins = vec![
            "192.168.1.100".to_string(),
            "192.168.1.101".to_string(),
            "10.0.0.5".to_string(),
        ];
        let decision = authorize("172.16.0.9", &admins);
        assert!(!decision.authorized);
        // ranges deduplicated, first-seen order
        assert_eq!(
            decision.reason,
            "Device not on authorized network. Allowed: 192.168.1.x, 10.0.0.x"
        );
    }

    #[test]
    fn malformed_candidate_is_denied_not_panicked() {
        let admins = vec!["192.168.1.100".to_string()];
        for bad in ["999.1.1.1", "192.168.1", "abc", "", "192.168.01.1"] {
            let decision = authorize(bad, &admins);
            assert!(!decision.authorized, "{bad:?} should be denied");
            assert_eq!(decision.reason, "Network validation error");
        }
    }

    #[test]
    fn malformed_admin_entries_are_skipped() {
        let admins = vec!["not-an-ip".to_string(), "10.1.2.3".to_string()];
        let decision = authorize("10.1.2.200", &admins);
        assert!(decision.authorized);

        let decision = authorize("10.9.9.9", &admins);
        assert_eq!(
            decision.reason,
            "Device not on authorized network. Allowed: 10.1.2.x"
        );
    }

    #[test]
    fn authorize_is_idempotent() {
        let admins = vec!["192.168.1.100".to_string()];
        let first = authorize("192.168.2.1", &admins);
        let second = authorize("192.168.2.1", &admins);
        assert_eq!(first.authorized, second.authorized);
        assert_eq!(first.reason, second.reason);
    }

    #[test]
    fn parse_rejects_out_of_range_and_padded_octets() {
        assert!(parse_ipv4("192.168.1.100").is_ok());
        assert!(parse_ipv4("0.0.0.0").is_ok());
        assert!(parse_ipv4("255.255.255.255").is_ok());
        assert_eq!(
            parse_ipv4("256.1.1.1"),
            Err(NetworkError::Validation("256.1.1.1".into()))
        );
        assert!(parse_ipv4("1.2.3.04").is_err());
        assert!(parse_ipv4("1.2.3.4.5").is_err());
    }

    #[test]
    fn add_validates_and_rejects_exact_duplicates() {
        let mut set = AdminIpSet::new();
        set.add("192.168.1.100").unwrap();
        assert_eq!(
            set.add("192.168.1.100"),
            Err(NetworkError::Duplicate("192.168.1.100".into()))
        );
        // subnet sibling is not a duplicate
        set.add("192.168.1.101").unwrap();
        assert_eq!(
            set.add("no.such.ip.here"),
            Err(NetworkError::Validation("no.such.ip.here".into()))
        );
        assert_eq!(set.ips(), ["192.168.1.100", "192.168.1.101"]);
    }

    #[test]
    fn remove_is_exact_match_and_noop_when_absent() {
        let mut set = AdminIpSet::new();
        set.add("10.0.0.1").unwrap();
        set.add("10.0.0.2").unwrap();
        set.remove("10.0.0.9");
        assert_eq!(set.len(), 2);
        set.remove("10.0.0.1");
        assert_eq!(set.ips(), ["10.0.0.2"]);
    }

    #[test]
    fn clear_empties_the_set() {
        let mut set = AdminIpSet::new();
        set.add("10.0.0.1").unwrap();
        set.clear();
        assert!(set.is_empty());
        assert!(authorize("1.2.3.4", set.ips()).authorized);
    }

    #[test]
    fn network_range_display() {
        let range = NetworkRange::of(parse_ipv4("192.168.1.77").unwrap());
        assert_eq!(range.to_string(), "192.168.1.x");
    }
}
