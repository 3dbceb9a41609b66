pub mod block_set;

pub use block_set::{AddSiteUseCase, RemoveSiteUseCase};
