use hostblock_application::ports::BlockSetStore;
use hostblock_domain::config::ConfigError;
use std::path::Path;

/// Persists the managed site list into the TOML configuration file.
pub struct TomlBlockSetStore {
    path: String,
}

impl TomlBlockSetStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl BlockSetStore for TomlBlockSetStore {
    fn save_sites(&self, sites: &[String]) -> Result<(), String> {
        save_block_set(sites, &self.path).map_err(|e| e.to_string())
    }
}

/// Rewrites `[blocking] sites` in `path`, keeping the rest of the document,
/// its comments and formatting. A missing file is created.
pub fn save_block_set(sites: &[String], path: &str) -> Result<(), ConfigError> {
    let existing = if Path::new(path).exists() {
        std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?
    } else {
        String::new()
    };

    let mut doc = existing
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ConfigError::Parse(format!("Failed to parse config file: {}", e)))?;

    let mut arr = toml_edit::Array::new();
    for site in sites {
        arr.push(site.as_str());
    }

    if !doc.contains_key("blocking") {
        doc.insert("blocking", toml_edit::Item::Table(toml_edit::Table::new()));
    }
    let table = doc
        .get_mut("blocking")
        .and_then(|item| item.as_table_mut())
        .ok_or_else(|| ConfigError::Validation("[blocking] must be a table".to_string()))?;

    match table.get_mut("sites") {
        Some(item @ toml_edit::Item::Value(_)) => {
            let suffix = item.as_value().and_then(|v| v.decor().suffix()).cloned();
            *item = toml_edit::Item::Value(toml_edit::Value::Array(arr));
            if let (Some(s), Some(v)) = (suffix, item.as_value_mut()) {
                v.decor_mut().set_suffix(s);
            }
        }
        Some(item) => *item = toml_edit::Item::Value(toml_edit::Value::Array(arr)),
        None => {
            table.insert("sites", toml_edit::Item::Value(toml_edit::Value::Array(arr)));
        }
    }

    std::fs::write(path, doc.to_string())
        .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;

    Ok(())
}
