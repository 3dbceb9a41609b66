pub mod config_persistence;

pub use config_persistence::{save_block_set, TomlBlockSetStore};
