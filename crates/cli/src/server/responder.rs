use hostblock_domain::config::ResponderConfig;
use hostblock_infrastructure::responder::{
    load_server_config, BlockPage, BlockResponder, RunningResponder,
};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Starts the block page listeners described by `config`.
///
/// Returns `None` when the responder is disabled. A certificate that is missing
/// or unusable disables only the HTTPS listener.
pub async fn start_responder(
    config: &ResponderConfig,
    shutdown: CancellationToken,
) -> Option<RunningResponder> {
    if !config.enabled {
        info!("Block page responder disabled");
        return None;
    }

    let page = BlockPage::load(config.block_page.as_deref().map(Path::new));
    let mut responder = BlockResponder::new(page);

    if let Some(cert_path) = config.cert_path.as_deref().map(Path::new) {
        if !cert_path.exists() {
            warn!(cert = %cert_path.display(), "Certificate not found, HTTPS listener disabled");
        } else {
            match load_server_config(cert_path, config.key_path.as_deref().map(Path::new)) {
                Ok(tls) => responder = responder.with_tls(tls),
                Err(e) => error!(error = %e, "HTTPS listener disabled"),
            }
        }
    }

    let running = responder.start(shutdown).await;
    if running.listener_count() == 0 {
        warn!("No block page listener could start");
    }
    Some(running)
}
