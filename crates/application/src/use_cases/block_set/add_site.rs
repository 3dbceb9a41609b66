use hostblock_domain::{DomainError, DomainName, HostsEdit};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::ports::BlockSetStore;
use crate::services::DomainBlockEngine;

pub struct AddSiteUseCase {
    engine: Arc<DomainBlockEngine>,
    store: Arc<dyn BlockSetStore>,
}

impl AddSiteUseCase {
    pub fn new(engine: Arc<DomainBlockEngine>, store: Arc<dyn BlockSetStore>) -> Self {
        Self { engine, store }
    }

    /// Adds the normalized domain to `sites`, persists the list, then blocks it.
    /// `sites` is left unchanged when saving fails.
    #[instrument(skip(self, sites))]
    pub fn execute(&self, sites: &mut Vec<String>, input: &str) -> Result<HostsEdit, DomainError> {
        let domain = DomainName::parse(input)?;

        if sites.iter().any(|s| DomainName::normalize(s) == domain.as_str()) {
            info!(domain = %domain, "Site already in block set");
        } else {
            let mut updated = sites.clone();
            updated.push(domain.to_string());
            self.store
                .save_sites(&updated)
                .map_err(|e| DomainError::IoFailure(format!("Failed to save block set: {}", e)))?;
            *sites = updated;
            info!(domain = %domain, total = sites.len(), "Site added to block set");
        }

        self.engine.block(domain.as_str())
    }
}
