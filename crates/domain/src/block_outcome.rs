use crate::{DomainError, DomainName};

/// Result of a successful block or unblock: how many hosts lines were written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsEdit {
    pub domain: DomainName,
    pub lines_changed: usize,
}

impl HostsEdit {
    pub fn new(domain: DomainName, lines_changed: usize) -> Self {
        Self {
            domain,
            lines_changed,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.lines_changed == 0
    }
}

/// Per-domain result of a batch operation.
///
/// `input` is the string the caller supplied, so invalid domains can still be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOutcome {
    pub input: String,
    pub result: Result<HostsEdit, DomainError>,
}

impl DomainOutcome {
    pub fn new(input: impl Into<String>, result: Result<HostsEdit, DomainError>) -> Self {
        Self {
            input: input.into(),
            result,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.result.as_ref().err()
    }
}
