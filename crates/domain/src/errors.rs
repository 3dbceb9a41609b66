use std::io;
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Access denied to {0} (run with administrator/root privileges)")]
    AccessDenied(String),

    #[error("I/O error: {0}")]
    IoFailure(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Failed to bind {listener} listener on {addr}: {reason}")]
    BindFailure {
        listener: &'static str,
        addr: String,
        reason: String,
    },

    #[error("Invalid TLS certificate or key: {0}")]
    InvalidCertificate(String),

    #[error("Resolver cache flush failed: {0}")]
    ResolverCache(String),
}

impl DomainError {
    /// Classifies an I/O error on `path`, separating permission problems from the rest.
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied(path.display().to_string()),
            _ => Self::IoFailure(format!("{}: {}", path.display(), err)),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied(_))
    }
}
