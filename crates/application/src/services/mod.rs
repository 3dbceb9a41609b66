mod domain_block_engine;

pub use domain_block_engine::DomainBlockEngine;
