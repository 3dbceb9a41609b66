use hostblock_domain::{
    DomainError, DomainName, DomainOutcome, HostsEdit, HostsLine, REDIRECT_ADDRESS,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::ports::{HostsTable, ResolverCache};

/// Blocks and unblocks domains by editing the hosts table.
///
/// All calls are synchronous. Table access is serialized through one mutex so two
/// concurrent edits never each write back a view missing the other's lines.
pub struct DomainBlockEngine {
    table: Arc<dyn HostsTable>,
    resolver_cache: Arc<dyn ResolverCache>,
    table_lock: Mutex<()>,
}

impl DomainBlockEngine {
    pub fn new(table: Arc<dyn HostsTable>, resolver_cache: Arc<dyn ResolverCache>) -> Self {
        Self {
            table,
            resolver_cache,
            table_lock: Mutex::new(()),
        }
    }

    /// Redirects every variant of `domain` to the redirect address.
    ///
    /// Variants already present are not written again, so repeated calls leave the
    /// table unchanged.
    #[instrument(skip(self))]
    pub fn block(&self, domain: &str) -> Result<HostsEdit, DomainError> {
        let domain = DomainName::parse(domain)?;
        let entries = domain.variants().entries(REDIRECT_ADDRESS);

        let appended = {
            let _guard = self.table_lock.lock();
            self.table.append_entries(&entries)?
        };

        info!(domain = %domain, appended, "Domain blocked");
        self.invalidate_resolver_cache();

        Ok(HostsEdit::new(domain, appended))
    }

    /// Removes every redirect or null-route line for a variant of `domain`.
    #[instrument(skip(self))]
    pub fn unblock(&self, domain: &str) -> Result<HostsEdit, DomainError> {
        let domain = DomainName::parse(domain)?;
        let variants = domain.variants();

        let removed = {
            let _guard = self.table_lock.lock();
            self.table.remove_matching(&|line: &str| {
                let parsed = HostsLine::parse(line);
                variants.iter().any(|hostname| parsed.blocks(hostname))
            })?
        };

        info!(domain = %domain, removed, "Domain unblocked");
        self.invalidate_resolver_cache();

        Ok(HostsEdit::new(domain, removed))
    }

    /// True when the bare domain or its `www.` form is redirected.
    #[instrument(skip(self))]
    pub fn is_blocked(&self, domain: &str) -> Result<bool, DomainError> {
        let domain = DomainName::parse(domain)?;
        let [bare, www] = domain.status_hostnames();

        let _guard = self.table_lock.lock();
        self.table.contains(&|line: &str| {
            let parsed = HostsLine::parse(line);
            parsed.blocks(&bare) || parsed.blocks(&www)
        })
    }

    pub fn block_batch<S: AsRef<str>>(&self, domains: &[S]) -> Vec<DomainOutcome> {
        let outcomes: Vec<DomainOutcome> = domains
            .iter()
            .map(|d| DomainOutcome::new(d.as_ref(), self.block(d.as_ref())))
            .collect();
        log_batch("block", &outcomes);
        outcomes
    }

    pub fn unblock_batch<S: AsRef<str>>(&self, domains: &[S]) -> Vec<DomainOutcome> {
        let outcomes: Vec<DomainOutcome> = domains
            .iter()
            .map(|d| DomainOutcome::new(d.as_ref(), self.unblock(d.as_ref())))
            .collect();
        log_batch("unblock", &outcomes);
        outcomes
    }

    /// Blocks only the domains that are not blocked yet; the others report a
    /// zero-line edit without touching the table.
    pub fn block_missing<S: AsRef<str>>(&self, domains: &[S]) -> Vec<DomainOutcome> {
        let outcomes: Vec<DomainOutcome> = domains
            .iter()
            .map(|d| {
                let input = d.as_ref();
                let result = match self.is_blocked(input) {
                    Ok(true) => DomainName::parse(input).map(|domain| {
                        debug!(domain = %domain, "Already blocked, skipping");
                        HostsEdit::new(domain, 0)
                    }),
                    Ok(false) => self.block(input),
                    Err(e) => Err(e),
                };
                DomainOutcome::new(input, result)
            })
            .collect();
        log_batch("block_missing", &outcomes);
        outcomes
    }

    fn invalidate_resolver_cache(&self) {
        if let Err(e) = self.resolver_cache.invalidate() {
            warn!(
                error = %e,
                "Failed to flush resolver cache; change applies once cached entries expire"
            );
        }
    }
}

fn log_batch(operation: &str, outcomes: &[DomainOutcome]) {
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        warn!(
            operation,
            total = outcomes.len(),
            failed,
            "Batch completed with failures"
        );
    } else {
        info!(operation, total = outcomes.len(), "Batch completed");
    }
}
