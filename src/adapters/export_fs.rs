//! File-system export adapter.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::utils::is_plain_file_name;
use crate::app::ports::{ExportError, ExportPort};

/// Writes exports into a fixed directory.
pub struct FsExporter {
    dir: PathBuf,
}

impl FsExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportPort for FsExporter {
    fn write_export(&mut self, file_name: &str, contents: &str) -> Result<(), ExportError> {
        if !is_plain_file_name(file_name) {
            return Err(ExportError::Io(format!("refusing file name {file_name:?}")));
        }
        let path = self.dir.join(file_name);
        fs::write(&path, contents).map_err(|e| ExportError::Io(e.to_string()))?;
        info!("Export written to {}", path.display());
        Ok(())
    }
}
