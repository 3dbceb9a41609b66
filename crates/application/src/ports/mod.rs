mod block_set_store;
mod hosts_table;
mod resolver_cache;

pub use block_set_store::BlockSetStore;
pub use hosts_table::HostsTable;
pub use resolver_cache::ResolverCache;
