//! Persistent log of evaluated expressions, one entry per line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

const HISTORY_FILE: &str = "history.log";

pub struct History {
    path: PathBuf,
    entries: Vec<String>,
    limit: usize,
}

impl History {
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> Self {
        History {
            path: path.into(),
            entries: Vec::new(),
            limit,
        }
    }

    pub fn default_path() -> PathBuf {
        crate::config::app_dir().join(HISTORY_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory entries with the file contents. A missing file
    /// is an empty history.
    pub fn load(&mut self) -> Result<()> {
        self.entries.clear();

        if !self.path.exists() {
            ensure_parent(&self.path)?;
            debug!("no history at {}", self.path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading history {}", self.path.display()))?;
        self.entries = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        self.truncate();

        debug!(
            "loaded {} history entries from {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        ensure_parent(&self.path)?;
        fs::write(&self.path, self.entries.join("\n"))
            .with_context(|| format!("writing history {}", self.path.display()))?;
        debug!(
            "saved {} history entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if entry.is_empty() {
            return;
        }
        self.entries.push(entry);
        self.truncate();
    }

    /// Records `input` with the outcome of evaluating it.
    pub fn record(&mut self, input: &str, outcome: &Result<String, String>) {
        let line = match outcome {
            Ok(value) => format!("{} = {}", input, value),
            Err(e) => format!("{} = Error: {}", input, e),
        };
        self.push(line);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn truncate(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}
