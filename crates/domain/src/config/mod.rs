pub mod blocking;
pub mod errors;
pub mod hosts;
pub mod logging;
pub mod responder;
pub mod root;

pub use blocking::BlockingConfig;
pub use errors::ConfigError;
pub use hosts::{default_hosts_path, HostsConfig};
pub use logging::LoggingConfig;
pub use responder::{ResponderConfig, HTTPS_PORT, HTTP_PORT};
pub use root::{CliOverrides, Config};
