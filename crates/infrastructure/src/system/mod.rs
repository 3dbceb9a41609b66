pub mod resolver_cache;

pub use resolver_cache::{FlushCommand, FlushPlan, NoopResolverCache, SystemResolverCache};
