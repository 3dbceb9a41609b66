pub mod page;
pub mod router;
pub mod server;
pub mod tls;

pub use page::{BlockPage, FALLBACK_PAGE};
pub use router::block_page_router;
pub use server::{bind_listener, serve_plain, serve_tls, BlockResponder, RunningResponder};
pub use tls::{generate_self_signed, load_server_config, write_self_signed, SelfSignedCertificate};
