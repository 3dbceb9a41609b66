//! hostblock domain layer
pub mod block_outcome;
pub mod config;
pub mod domain_name;
pub mod errors;
pub mod hosts_entry;

pub use block_outcome::{DomainOutcome, HostsEdit};
pub use config::{CliOverrides, Config};
pub use domain_name::{DomainName, DomainVariantSet, VARIANT_PREFIXES};
pub use errors::DomainError;
pub use hosts_entry::{
    is_block_address, missing_entries, HostsEntry, HostsLine, NULL_ROUTE_ADDRESS, REDIRECT_ADDRESS,
};
