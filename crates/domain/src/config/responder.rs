use serde::{Deserialize, Serialize};

pub const HTTP_PORT: u16 = 80;
pub const HTTPS_PORT: u16 = 443;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponderConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// HTML document served for every redirected request
    #[serde(default)]
    pub block_page: Option<String>,

    /// PEM certificate chain for the HTTPS listener; HTTPS stays off without it
    #[serde(default)]
    pub cert_path: Option<String>,

    /// PEM private key; read from `cert_path` when omitted
    #[serde(default)]
    pub key_path: Option<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            block_page: None,
            cert_path: None,
            key_path: None,
        }
    }
}

impl ResponderConfig {
    pub fn tls_enabled(&self) -> bool {
        self.cert_path.is_some()
    }
}

fn default_enabled() -> bool {
    true
}
