use anyhow::Context;
use hostblock_domain::{CliOverrides, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub fn load_config(path: Option<&str>, cli_overrides: CliOverrides) -> anyhow::Result<Config> {
    Config::load(path, cli_overrides).context("Failed to load configuration")
}

/// File the managed site list is written back to.
pub fn config_file_path(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(Config::get_config_path)
        .unwrap_or_else(|| Config::default_config_path().to_string())
}

/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(unix)]
pub fn warn_if_not_elevated() {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        warn!(
            euid,
            "Not running as root: editing the hosts file and binding ports 80/443 will likely fail"
        );
    } else {
        info!("Running with root privileges");
    }
}

#[cfg(not(unix))]
pub fn warn_if_not_elevated() {
    info!("Privilege check skipped on this platform; run as Administrator if edits fail");
}
