use hostblock_domain::{DomainError, HostsEntry};

/// Line-oriented access to the hosts override file.
///
/// Every call works on fresh file contents; implementations hold no cached view.
pub trait HostsTable: Send + Sync {
    /// All lines in file order, without line terminators.
    fn read(&self) -> Result<Vec<String>, DomainError>;

    /// Appends the entries no existing line already covers, in one write.
    /// Returns the number of lines appended.
    fn append_entries(&self, entries: &[HostsEntry]) -> Result<usize, DomainError>;

    /// Rewrites the file without the lines `predicate` matches, keeping the order
    /// of the rest. Returns the number of lines removed.
    fn remove_matching(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, DomainError>;

    fn contains(&self, predicate: &dyn Fn(&str) -> bool) -> Result<bool, DomainError> {
        Ok(self.read()?.iter().any(|line| predicate(line)))
    }
}
