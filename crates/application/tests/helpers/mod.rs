#![allow(dead_code)]

use hostblock_application::ports::{BlockSetStore, HostsTable, ResolverCache};
use hostblock_domain::{missing_entries, DomainError, HostsEntry};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Hosts table kept in memory; can be switched into a failing mode.
pub struct InMemoryHostsTable {
    lines: Mutex<Vec<String>>,
    failure: Mutex<Option<DomainError>>,
    writes: AtomicUsize,
}

impl InMemoryHostsTable {
    pub fn new() -> Self {
        Self::with_lines(&[])
    }

    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            failure: Mutex::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn fail_with(&self, error: DomainError) {
        *self.failure.lock() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), DomainError> {
        match self.failure.lock().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryHostsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HostsTable for InMemoryHostsTable {
    fn read(&self) -> Result<Vec<String>, DomainError> {
        self.check_failure()?;
        Ok(self.lines.lock().clone())
    }

    fn append_entries(&self, entries: &[HostsEntry]) -> Result<usize, DomainError> {
        self.check_failure()?;
        let mut lines = self.lines.lock();
        let missing: Vec<String> = missing_entries(&lines[..], entries)
            .into_iter()
            .map(HostsEntry::to_line)
            .collect();
        if !missing.is_empty() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        let count = missing.len();
        lines.extend(missing);
        Ok(count)
    }

    fn remove_matching(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, DomainError> {
        self.check_failure()?;
        let mut lines = self.lines.lock();
        let before = lines.len();
        lines.retain(|line| !predicate(line));
        let removed = before - lines.len();
        if removed > 0 {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}

pub struct MockResolverCache {
    calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockResolverCache {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let cache = Self::new();
        cache.should_fail.store(true, Ordering::SeqCst);
        cache
    }

    pub fn invalidate_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockResolverCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCache for MockResolverCache {
    fn invalidate(&self) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::ResolverCache("flush command missing".to_string()));
        }
        Ok(())
    }
}

/// Records every saved site list.
pub struct MockBlockSetStore {
    saved: Mutex<Vec<Vec<String>>>,
    should_fail: AtomicBool,
}

impl MockBlockSetStore {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let store = Self::new();
        store.should_fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn saves(&self) -> Vec<Vec<String>> {
        self.saved.lock().clone()
    }
}

impl Default for MockBlockSetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSetStore for MockBlockSetStore {
    fn save_sites(&self, sites: &[String]) -> Result<(), String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("read-only file system".to_string());
        }
        self.saved.lock().push(sites.to_vec());
        Ok(())
    }
}
