use hostblock_domain::DomainError;

/// Invalidates the OS name-resolution cache after a hosts edit.
pub trait ResolverCache: Send + Sync {
    fn invalidate(&self) -> Result<(), DomainError>;
}
