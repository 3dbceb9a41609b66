use hostblock_application::ports::{BlockSetStore, ResolverCache};
use hostblock_application::services::DomainBlockEngine;
use hostblock_application::use_cases::{AddSiteUseCase, RemoveSiteUseCase};
use hostblock_domain::Config;
use hostblock_infrastructure::hosts::FileHostsTable;
use hostblock_infrastructure::repositories::TomlBlockSetStore;
use hostblock_infrastructure::system::{NoopResolverCache, SystemResolverCache};
use std::sync::Arc;
use tracing::info;

pub struct Services {
    pub engine: Arc<DomainBlockEngine>,
    pub add_site: Arc<AddSiteUseCase>,
    pub remove_site: Arc<RemoveSiteUseCase>,
}

impl Services {
    pub fn new(config: &Config, config_path: &str) -> Self {
        let table = Arc::new(FileHostsTable::new(&config.hosts.path));
        let resolver_cache: Arc<dyn ResolverCache> = if config.hosts.flush_resolver_cache {
            Arc::new(SystemResolverCache::new())
        } else {
            Arc::new(NoopResolverCache)
        };
        let store: Arc<dyn BlockSetStore> = Arc::new(TomlBlockSetStore::new(config_path));

        info!(
            hosts_file = %config.hosts.path,
            flush_resolver_cache = config.hosts.flush_resolver_cache,
            "Hosts table ready"
        );

        let engine = Arc::new(DomainBlockEngine::new(table, resolver_cache));

        Self {
            add_site: Arc::new(AddSiteUseCase::new(engine.clone(), store.clone())),
            remove_site: Arc::new(RemoveSiteUseCase::new(engine.clone(), store)),
            engine,
        }
    }
}
