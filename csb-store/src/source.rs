//! Where series files come from.

use anyhow::Context;
use log::debug;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a named series file.
pub trait SeriesSource {
    fn read(&self, file_name: &str) -> anyhow::Result<String>;
}

impl<T: SeriesSource + ?Sized> SeriesSource for Box<T> {
    fn read(&self, file_name: &str) -> anyhow::Result<String> {
        (**self).read(file_name)
    }
}

/// Files under a data directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> DirectorySource {
        DirectorySource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SeriesSource for DirectorySource {
    fn read(&self, file_name: &str) -> anyhow::Result<String> {
        let path = self.root.join(file_name);
        debug!("reading {}", path.display());
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// In-memory file bodies keyed by file name. Counts reads.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
    reads: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    /// The bundled fixture files.
    pub fn embedded() -> MemorySource {
        MemorySource::new()
            .with_file(
                "anzaborrego.csv",
                include_str!("../../fixtures/data/anzaborrego.csv"),
            )
            .with_file(
                "anzaborrego_forecast.csv",
                include_str!("../../fixtures/data/anzaborrego_forecast.csv"),
            )
            .with_file(
                "carrizoplain.csv",
                include_str!("../../fixtures/data/carrizoplain.csv"),
            )
    }

    pub fn with_file(mut self, file_name: impl Into<String>, body: impl Into<String>) -> MemorySource {
        self.insert(file_name, body);
        self
    }

    pub fn insert(&mut self, file_name: impl Into<String>, body: impl Into<String>) {
        self.files.insert(file_name.into(), body.into());
    }

    /// Number of `read` calls so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl SeriesSource for MemorySource {
    fn read(&self, file_name: &str) -> anyhow::Result<String> {
        self.reads.set(self.reads.get() + 1);
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", file_name))
    }
}
