use hostblock_domain::DomainError;
use rustls::crypto::aws_lc_rs;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const CERT_FILE_NAME: &str = "cert.pem";
pub const KEY_FILE_NAME: &str = "key.pem";

/// Builds the TLS server configuration from PEM files.
///
/// When `key_path` is `None` the private key is read from the certificate file.
pub fn load_server_config(
    cert_path: &Path,
    key_path: Option<&Path>,
) -> Result<Arc<ServerConfig>, DomainError> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path.unwrap_or(cert_path))?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| DomainError::InvalidCertificate(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| {
            DomainError::InvalidCertificate(format!("{}: {}", cert_path.display(), e))
        })?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    info!(cert = %cert_path.display(), "Loaded TLS certificate");
    Ok(Arc::new(config))
}

fn open_pem(path: &Path) -> Result<BufReader<File>, DomainError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| DomainError::from_io(path, &e))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, DomainError> {
    let mut reader = open_pem(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::InvalidCertificate(format!("{}: {}", path.display(), e)))?;

    if certs.is_empty() {
        return Err(DomainError::InvalidCertificate(format!(
            "{}: no certificates found",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, DomainError> {
    let mut reader = open_pem(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| DomainError::InvalidCertificate(format!("{}: {}", path.display(), e)))?
        .ok_or_else(|| {
            DomainError::InvalidCertificate(format!("{}: no private key found", path.display()))
        })
}

/// PEM-encoded self-signed certificate and its private key.
#[derive(Debug, Clone)]
pub struct SelfSignedCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

pub fn generate_self_signed(hosts: &[String]) -> Result<SelfSignedCertificate, DomainError> {
    let names = if hosts.is_empty() {
        vec!["localhost".to_string()]
    } else {
        hosts.to_vec()
    };

    let certified = rcgen::generate_simple_self_signed(names)
        .map_err(|e| DomainError::InvalidCertificate(e.to_string()))?;

    Ok(SelfSignedCertificate {
        cert_pem: certified.cert.pem(),
        key_pem: certified.key_pair.serialize_pem(),
    })
}

/// Writes a fresh self-signed certificate and key into `dir`; returns their paths.
pub fn write_self_signed(dir: &Path, hosts: &[String]) -> Result<(PathBuf, PathBuf), DomainError> {
    let generated = generate_self_signed(hosts)?;

    std::fs::create_dir_all(dir).map_err(|e| DomainError::from_io(dir, &e))?;
    let cert_path = dir.join(CERT_FILE_NAME);
    let key_path = dir.join(KEY_FILE_NAME);
    std::fs::write(&cert_path, &generated.cert_pem)
        .map_err(|e| DomainError::from_io(&cert_path, &e))?;
    std::fs::write(&key_path, &generated.key_pem)
        .map_err(|e| DomainError::from_io(&key_path, &e))?;

    info!(cert = %cert_path.display(), key = %key_path.display(), "Wrote self-signed certificate");
    Ok((cert_path, key_path))
}
