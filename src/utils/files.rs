use crate::traits::FileSaver;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves exports as files in one directory.
#[derive(Debug, Clone)]
pub struct DiskSaver {
    dir: PathBuf,
}

impl DiskSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskSaver { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DiskSaver {
    fn save(&mut self, file_name: &str, mime_type: &str, contents: &[u8]) -> anyhow::Result<()> {
        let path = self.dir.join(file_name);
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("saved {} ({}, {} bytes)", path.display(), mime_type, contents.len());
        Ok(())
    }
}
