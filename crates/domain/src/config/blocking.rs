use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Managed sites, in the order they were added
    #[serde(default)]
    pub sites: Vec<String>,
}
