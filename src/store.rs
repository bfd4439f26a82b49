// src/store.rs
//! Append-only record of tender numbers that were already notified on.
//!
//! One identifier per line, UTF-8, no header. Entries are never rewritten,
//! reordered or removed; duplicates collapse on load.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TenderStore {
    path: PathBuf,
}

impl TenderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every processed id. A missing file is created empty.
    pub fn load(&self) -> Result<HashSet<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.ensure_parent()?;
                fs::File::create(&self.path)
                    .with_context(|| format!("creating state file {}", self.path.display()))?;
                tracing::debug!(path = %self.path.display(), "created empty state file");
                Ok(HashSet::new())
            }
            Err(e) => Err(e)
                .with_context(|| format!("reading state file {}", self.path.display())),
        }
    }

    /// Persist one id at the end of the file.
    pub fn append(&self, tender_no: &str) -> Result<()> {
        self.ensure_parent()?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening state file {}", self.path.display()))?;
        writeln!(f, "{tender_no}")
            .with_context(|| format!("appending to state file {}", self.path.display()))?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating state dir {}", parent.display()))?;
        }
        Ok(())
    }
}
