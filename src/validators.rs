use std::net::IpAddr;
use std::sync::LazyLock;

use ipnet::IpNet;
use regex::Regex;

/// Address families accepted by [`is_ip_address`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
    Any,
}

impl IpVersion {
    fn includes_v4(self) -> bool {
        matches!(self, Self::V4 | Self::Any)
    }

    fn includes_v6(self) -> bool {
        matches!(self, Self::V6 | Self::Any)
    }
}

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4]\d|[01]?\d?\d)(\.(25[0-5]|2[0-4]\d|[01]?\d?\d)){3}$").unwrap()
});

// Four alternative shapes: full 8-group, compressed with `::`, trailing
// dotted quad, compressed with trailing dotted quad.
static IPV6_GRAMMARS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    const OCTET: &str = r"(?:25[0-5]|2[0-4]\d|[01]?\d?\d)";
    const GROUP: &str = "[0-9A-Fa-f]{1,4}";

    [
        Regex::new(&format!("^(?:{GROUP}:){{7}}{GROUP}$")).unwrap(),
        Regex::new(&format!("^(?:{GROUP}(?::{GROUP})*)?::(?:{GROUP}(?::{GROUP})*)?$")).unwrap(),
        Regex::new(&format!(r"^(?:{GROUP}:){{6}}{OCTET}(?:\.{OCTET}){{3}}$")).unwrap(),
        Regex::new(&format!(
            r"^(?:{GROUP}(?::{GROUP})*)?::(?:{GROUP}:)*{OCTET}(?:\.{OCTET}){{3}}$"
        ))
        .unwrap(),
    ]
});

/// Check if a string is a textual IP address of one of the requested families
pub fn is_ip_address(value: &str, version: IpVersion) -> bool {
    if value.is_empty() {
        return false;
    }

    if version.includes_v4() && value.contains('.') && IPV4.is_match(value) {
        return true;
    }

    version.includes_v6() && is_ipv6(value)
}

fn is_ipv6(value: &str) -> bool {
    if value.len() > 40 || !value.contains(':') {
        return false;
    }

    // at most one zero-compression marker, and never three colons in a row
    if value.matches("::").count() > 1 || value.contains(":::") {
        return false;
    }

    IPV6_GRAMMARS.iter().any(|grammar| grammar.is_match(value))
}

static USER_AGENT_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9/\\.(); \-_*?+@=:,]*").unwrap());

/// Check if a string is a plausible user agent token stream
///
/// The pattern is an unanchored prefix match and may match an empty prefix,
/// so any non-empty value passes. Known leniency, kept on purpose.
pub fn is_user_agent(value: &str) -> bool {
    !value.is_empty() && USER_AGENT_CHARSET.is_match(value)
}

static HOSTNAME_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").unwrap());

/// Check if a string is a valid hostname per RFC 1035 label rules
///
/// A single trailing root dot is accepted and stripped before validation.
pub fn is_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > 255 {
        return false;
    }

    let value = value.strip_suffix('.').unwrap_or(value);

    value.split('.').all(|label| HOSTNAME_LABEL.is_match(label))
}

static RESERVED_NETS: LazyLock<Vec<IpNet>> = LazyLock::new(|| {
    vec![
        // IPV4 Loopback
        "127.0.0.0/8".parse().unwrap(),
        // IPV4 Private Networks
        "10.0.0.0/8".parse().unwrap(),
        "172.16.0.0/12".parse().unwrap(),
        "192.168.0.0/16".parse().unwrap(),
        // IPV4 Link Local / Carrier Grade NAT
        "169.254.0.0/16".parse().unwrap(),
        "100.64.0.0/10".parse().unwrap(),
        // IPV6 Loopback
        "::1/128".parse().unwrap(),
        // IPV6 Unique Local / Link Local
        "fc00::/7".parse().unwrap(),
        "fe80::/10".parse().unwrap(),
    ]
});

/// Check if an address belongs to a reserved, non globally routable range
pub fn is_private_address(addr: &IpAddr) -> bool {
    RESERVED_NETS.iter().any(|net| net.contains(addr))
}
