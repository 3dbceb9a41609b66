use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostsConfig {
    /// Path of the hosts file to edit
    #[serde(default = "default_hosts_path")]
    pub path: String,

    /// Flush the OS resolver cache after every edit
    #[serde(default = "default_flush_resolver_cache")]
    pub flush_resolver_cache: bool,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            path: default_hosts_path(),
            flush_resolver_cache: default_flush_resolver_cache(),
        }
    }
}

#[cfg(windows)]
pub fn default_hosts_path() -> String {
    r"C:\Windows\System32\drivers\etc\hosts".to_string()
}

#[cfg(not(windows))]
pub fn default_hosts_path() -> String {
    "/etc/hosts".to_string()
}

fn default_flush_resolver_cache() -> bool {
    true
}
