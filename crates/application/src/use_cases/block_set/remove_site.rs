use hostblock_domain::{DomainError, DomainName, HostsEdit};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::ports::BlockSetStore;
use crate::services::DomainBlockEngine;

pub struct RemoveSiteUseCase {
    engine: Arc<DomainBlockEngine>,
    store: Arc<dyn BlockSetStore>,
}

impl RemoveSiteUseCase {
    pub fn new(engine: Arc<DomainBlockEngine>, store: Arc<dyn BlockSetStore>) -> Self {
        Self { engine, store }
    }

    /// Drops the domain from `sites`, persists the list, then unblocks it.
    /// `sites` is left unchanged when saving fails.
    #[instrument(skip(self, sites))]
    pub fn execute(&self, sites: &mut Vec<String>, input: &str) -> Result<HostsEdit, DomainError> {
        let domain = DomainName::parse(input)?;

        let updated: Vec<String> = sites
            .iter()
            .filter(|s| DomainName::normalize(s) != domain.as_str())
            .cloned()
            .collect();
        if updated.len() != sites.len() {
            self.store
                .save_sites(&updated)
                .map_err(|e| DomainError::IoFailure(format!("Failed to save block set: {}", e)))?;
            *sites = updated;
            info!(domain = %domain, total = sites.len(), "Site removed from block set");
        }

        self.engine.unblock(domain.as_str())
    }
}
