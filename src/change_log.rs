//! Append-only change log.
//!
//! Every confirmed change appends one entry with a timestamp, the target
//! identity and the normalized text observed. The file is never rotated or
//! truncated by this system.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Appender for the durable change log file
#[derive(Debug, Clone)]
pub struct ChangeLog {
    path: PathBuf,
}

impl ChangeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry: `\n==== <timestamp> | <url> ====\n<text>\n`
    pub fn append(&self, url: &str, normalized_text: &str) -> io::Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        self.append_entry(&timestamp.to_string(), url, normalized_text)
    }

    fn append_entry(&self, timestamp: &str, url: &str, text: &str) -> io::Result<()> {
        let entry = format!("\n==== {} | {} ====\n{}\n", timestamp, url, text);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())
    }
}
