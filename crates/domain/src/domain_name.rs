use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::DomainError;
use crate::hosts_entry::HostsEntry;

/// Subdomain prefixes blocked together with the bare domain, in write order.
pub const VARIANT_PREFIXES: [&str; 6] = ["", "www.", "m.", "mobile.", "app.", "api."];

const SCHEMES: [&str; 2] = ["http://", "https://"];
const MAX_DOMAIN_LEN: usize = 253;

/// A normalized hostname: lower-case, no scheme, no leading `www.`, no path or query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(Arc<str>);

impl DomainName {
    /// Normalizes `input` and validates the result.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized = Self::normalize(input);
        Self::validate(&normalized).map_err(|reason| {
            DomainError::InvalidDomain(format!("{:?}: {}", input.trim(), reason))
        })?;
        Ok(Self(Arc::from(normalized)))
    }

    /// Applies the normalization rules until nothing changes, so the result is stable
    /// under repeated application. Performs no validation.
    pub fn normalize(input: &str) -> String {
        let mut current = normalize_once(input);
        loop {
            let next = normalize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    pub fn validate(domain: &str) -> Result<(), String> {
        if domain.is_empty() {
            return Err("domain is empty".to_string());
        }
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(format!("domain exceeds {} characters", MAX_DOMAIN_LEN));
        }
        let is_allowed =
            |c: &char| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_');
        if let Some(c) = domain.chars().find(|c| !is_allowed(c)) {
            return Err(format!("invalid character {:?}", c));
        }
        for label in domain.split('.') {
            if label.is_empty() {
                return Err("empty label".to_string());
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(format!("label {:?} starts or ends with a hyphen", label));
            }
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn variants(&self) -> DomainVariantSet {
        DomainVariantSet::new(self)
    }

    /// The two hostnames a status query looks at: the bare domain and its `www.` form.
    pub fn status_hostnames(&self) -> [String; 2] {
        [self.0.to_string(), format!("www.{}", self.0)]
    }
}

fn normalize_once(input: &str) -> String {
    let mut s = input.trim().to_lowercase();

    while let Some(len) = SCHEMES
        .iter()
        .find(|scheme| s.starts_with(**scheme))
        .map(|scheme| scheme.len())
    {
        s.drain(..len);
    }

    if let Some(idx) = s.find(|c: char| matches!(c, '/' | '?' | '#')) {
        s.truncate(idx);
    }
    if let Some(idx) = s.find(':') {
        s.truncate(idx);
    }

    let mut s = s.trim();
    while let Some(rest) = s.strip_prefix("www.") {
        s = rest;
    }
    s.trim_end_matches('.').to_string()
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0.to_string()
    }
}

/// The fixed expansion of a domain into the hostnames that get redirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainVariantSet {
    hostnames: Vec<String>,
}

impl DomainVariantSet {
    pub fn new(domain: &DomainName) -> Self {
        let hostnames = VARIANT_PREFIXES
            .iter()
            .map(|prefix| format!("{}{}", prefix, domain))
            .collect();
        Self { hostnames }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hostnames.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hostnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hostnames.is_empty()
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.hostnames
            .iter()
            .any(|h| h.eq_ignore_ascii_case(hostname))
    }

    /// One entry per variant, all pointing at `address`.
    pub fn entries(&self, address: IpAddr) -> Vec<HostsEntry> {
        self.hostnames
            .iter()
            .map(|hostname| HostsEntry::new(address, hostname.clone()))
            .collect()
    }
}
