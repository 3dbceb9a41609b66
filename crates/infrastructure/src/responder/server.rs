use axum::Router;
use hostblock_domain::config::{HTTPS_PORT, HTTP_PORT};
use hostblock_domain::DomainError;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use rustls::ServerConfig;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::page::BlockPage;
use super::router::block_page_router;

const LISTEN_BACKLOG: i32 = 1024;

/// Serves the block page on a plain HTTP listener and, when a certificate is
/// configured, a TLS listener.
pub struct BlockResponder {
    page: Arc<BlockPage>,
    tls: Option<Arc<ServerConfig>>,
    http_addr: SocketAddr,
    https_addr: SocketAddr,
}

impl BlockResponder {
    pub fn new(page: BlockPage) -> Self {
        Self {
            page: Arc::new(page),
            tls: None,
            http_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, HTTP_PORT)),
            https_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, HTTPS_PORT)),
        }
    }

    pub fn with_tls(mut self, config: Arc<ServerConfig>) -> Self {
        self.tls = Some(config);
        self
    }

    pub fn with_http_addr(mut self, addr: SocketAddr) -> Self {
        self.http_addr = addr;
        self
    }

    pub fn with_https_addr(mut self, addr: SocketAddr) -> Self {
        self.https_addr = addr;
        self
    }

    pub fn page(&self) -> &Arc<BlockPage> {
        &self.page
    }

    /// Binds both listeners and spawns their accept loops.
    ///
    /// A listener that fails to bind is logged and skipped; the other still runs.
    pub async fn start(self, shutdown: CancellationToken) -> RunningResponder {
        let router = block_page_router(self.page.clone());
        let mut running = RunningResponder::default();

        match bind_listener("http", self.http_addr) {
            Ok(listener) => {
                running.http_addr = listener.local_addr().ok();
                info!(bind_address = ?running.http_addr, "Block page HTTP listener started");
                running.handles.push(tokio::spawn(serve_plain(
                    listener,
                    router.clone(),
                    shutdown.clone(),
                )));
            }
            Err(e) => error!(error = %e, "HTTP listener disabled"),
        }

        match self.tls {
            Some(tls) => match bind_listener("https", self.https_addr) {
                Ok(listener) => {
                    running.https_addr = listener.local_addr().ok();
                    info!(bind_address = ?running.https_addr, "Block page HTTPS listener started");
                    running.handles.push(tokio::spawn(serve_tls(
                        listener,
                        TlsAcceptor::from(tls),
                        router,
                        shutdown,
                    )));
                }
                Err(e) => error!(error = %e, "HTTPS listener disabled"),
            },
            None => info!("No TLS certificate configured, HTTPS listener not started"),
        }

        running
    }
}

/// Handles to the listeners that actually started.
#[derive(Default)]
pub struct RunningResponder {
    pub http_addr: Option<SocketAddr>,
    pub https_addr: Option<SocketAddr>,
    handles: Vec<JoinHandle<()>>,
}

impl RunningResponder {
    pub fn listener_count(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every listener to stop.
    pub async fn wait(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Block page listener task failed");
            }
        }
    }
}

/// Creates a reusable TCP listener on `addr`. Must be called inside a tokio runtime.
pub fn bind_listener(name: &'static str, addr: SocketAddr) -> Result<TcpListener, DomainError> {
    let bind_failure = |e: std::io::Error| DomainError::BindFailure {
        listener: name,
        addr: addr.to_string(),
        reason: e.to_string(),
    };

    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(bind_failure)?;
    if addr.is_ipv6() {
        socket.set_only_v6(false).map_err(bind_failure)?;
    }
    socket.set_reuse_address(true).map_err(bind_failure)?;
    socket.bind(&addr.into()).map_err(bind_failure)?;
    socket.listen(LISTEN_BACKLOG).map_err(bind_failure)?;
    socket.set_nonblocking(true).map_err(bind_failure)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).map_err(bind_failure)
}

pub async fn serve_plain(listener: TcpListener, router: Router, shutdown: CancellationToken) {
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

    match result {
        Ok(()) => info!("HTTP listener stopped"),
        Err(e) => error!(error = %e, "HTTP listener failed"),
    }
}

pub async fn serve_tls(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    router: Router,
    shutdown: CancellationToken,
) {
    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    debug!(error = %e, "TLS accept failed");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(router.clone());
        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(tls_stream) => tls_stream,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                debug!(peer = %peer, error = %e, "TLS connection ended with error");
            }
        });
    }

    info!("HTTPS listener stopped");
}
