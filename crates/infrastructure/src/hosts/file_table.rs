use hostblock_application::ports::HostsTable;
use hostblock_domain::{missing_entries, DomainError, HostsEntry};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Hosts table backed by the system hosts file.
///
/// Every call reads the file from disk; nothing is cached between calls. The
/// file is not locked against other processes.
pub struct FileHostsTable {
    path: PathBuf,
}

impl FileHostsTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_content(&self) -> Result<String, DomainError> {
        fs::read_to_string(&self.path).map_err(|e| DomainError::from_io(&self.path, &e))
    }

    /// Replaces the file with `content` through a sibling temp file and a rename,
    /// so a failed write leaves the original untouched.
    fn replace_content(&self, content: &str) -> Result<(), DomainError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_err = |e: std::io::Error| DomainError::from_io(&self.path, &e);

        // the replaced file must itself be writable, as it is for appends
        let target = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(io_err)?;
        let permissions = target.metadata().map_err(io_err)?.permissions();
        drop(target);

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.as_file().set_permissions(permissions).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

impl HostsTable for FileHostsTable {
    fn read(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.read_content()?.lines().map(str::to_string).collect())
    }

    fn append_entries(&self, entries: &[HostsEntry]) -> Result<usize, DomainError> {
        let content = self.read_content()?;
        let lines: Vec<&str> = content.lines().collect();
        let missing = missing_entries(&lines, entries);
        if missing.is_empty() {
            debug!(path = %self.path.display(), "All entries already present");
            return Ok(0);
        }

        let newline = line_ending(&content);
        let mut buffer = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            buffer.push_str(newline);
        }
        for entry in &missing {
            buffer.push_str(&entry.to_line());
            buffer.push_str(newline);
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| DomainError::from_io(&self.path, &e))?;
        file.write_all(buffer.as_bytes())
            .map_err(|e| DomainError::from_io(&self.path, &e))?;

        debug!(path = %self.path.display(), appended = missing.len(), "Appended hosts entries");
        Ok(missing.len())
    }

    fn remove_matching(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, DomainError> {
        let content = self.read_content()?;

        let mut kept = String::with_capacity(content.len());
        let mut removed = 0;
        for raw in content.split_inclusive('\n') {
            let line = raw.trim_end_matches(|c: char| c == '\r' || c == '\n');
            if predicate(line) {
                removed += 1;
            } else {
                kept.push_str(raw);
            }
        }

        if removed == 0 {
            return Ok(0);
        }

        self.replace_content(&kept)?;
        debug!(path = %self.path.display(), removed, "Rewrote hosts file");
        Ok(removed)
    }
}
