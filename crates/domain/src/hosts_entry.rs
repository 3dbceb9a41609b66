use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// Loopback address every new redirect entry points at.
pub const REDIRECT_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

/// Null-route address written by older tooling. Recognized when scanning, never written.
pub const NULL_ROUTE_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// True for the addresses that mark a hostname as blocked.
pub fn is_block_address(address: &IpAddr) -> bool {
    *address == REDIRECT_ADDRESS || *address == NULL_ROUTE_ADDRESS
}

/// A single `<address> <hostname>` override line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostsEntry {
    pub address: IpAddr,
    pub hostname: String,
}

impl HostsEntry {
    pub fn new(address: IpAddr, hostname: impl Into<String>) -> Self {
        Self {
            address,
            hostname: hostname.into(),
        }
    }

    pub fn redirect(hostname: impl Into<String>) -> Self {
        Self::new(REDIRECT_ADDRESS, hostname)
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HostsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.hostname)
    }
}

/// Parsed view of one physical line of the hosts file.
///
/// Anything that is not `<ip> <hostname> [hostname...] [# comment]` is `Other`
/// and is carried through edits untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsLine {
    Entry {
        address: IpAddr,
        hostnames: Vec<String>,
    },
    Other,
}

impl HostsLine {
    pub fn parse(line: &str) -> Self {
        let content = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };

        let mut fields = content.split_whitespace();
        let address = match fields.next().and_then(|f| f.parse::<IpAddr>().ok()) {
            Some(address) => address,
            None => return Self::Other,
        };

        let hostnames: Vec<String> = fields.map(str::to_string).collect();
        if hostnames.is_empty() {
            return Self::Other;
        }

        Self::Entry { address, hostnames }
    }

    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Self::Entry { address, .. } => Some(*address),
            Self::Other => None,
        }
    }

    pub fn hostnames(&self) -> &[String] {
        match self {
            Self::Entry { hostnames, .. } => hostnames,
            Self::Other => &[],
        }
    }

    pub fn has_hostname(&self, hostname: &str) -> bool {
        self.hostnames()
            .iter()
            .any(|h| h.eq_ignore_ascii_case(hostname))
    }

    /// True when this line already maps `entry.hostname` to `entry.address`.
    pub fn covers(&self, entry: &HostsEntry) -> bool {
        self.address() == Some(entry.address) && self.has_hostname(&entry.hostname)
    }

    /// True when this line redirects `hostname` to the redirect or null-route address.
    pub fn blocks(&self, hostname: &str) -> bool {
        self.address().is_some_and(|a| is_block_address(&a)) && self.has_hostname(hostname)
    }
}

/// Entries from `entries` that no line in `lines` already covers, without repeats.
pub fn missing_entries<'a, S: AsRef<str>>(
    lines: &[S],
    entries: &'a [HostsEntry],
) -> Vec<&'a HostsEntry> {
    let parsed: Vec<HostsLine> = lines.iter().map(|l| HostsLine::parse(l.as_ref())).collect();
    let mut missing: Vec<&HostsEntry> = Vec::new();
    for entry in entries {
        let present = parsed.iter().any(|line| line.covers(entry));
        if !present && !missing.contains(&entry) {
            missing.push(entry);
        }
    }
    missing
}
