//! Persists an encoded [`Bundle`] into a directory.
//!
//! Every target is checked before the first write, and each file is
//! written to a temp file in the destination directory and then renamed
//! over its final name.

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;
use tracing::debug;

use crate::bundle::Bundle;
use crate::error::IsaTabError;
use crate::model::Investigation;

#[derive(Debug, Clone)]
pub struct BundleWriter {
    root: Utf8PathBuf,
    overwrite: bool,
}

impl BundleWriter {
    pub fn new(root: Utf8PathBuf, overwrite: bool) -> Self {
        Self { root, overwrite }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub fn ensure_root(&self) -> Result<(), IsaTabError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| IsaTabError::Filesystem(err.to_string()))
    }

    /// Writes every file of `bundle`, returning the paths in bundle order.
    pub fn write(&self, bundle: &Bundle) -> Result<Vec<Utf8PathBuf>, IsaTabError> {
        let targets: Vec<Utf8PathBuf> = bundle.file_names().map(|name| self.path_for(name)).collect();
        if !self.overwrite {
            if let Some(existing) = targets.iter().find(|path| path.as_std_path().exists()) {
                return Err(IsaTabError::OutputExists(existing.to_string()));
            }
        }

        self.ensure_root()?;
        for (path, file) in targets.iter().zip(bundle.files()) {
            Self::write_text_atomic(path, &file.content)?;
            debug!(path = %path, bytes = file.content.len(), "wrote ISA-Tab file");
        }
        Ok(targets)
    }

    pub fn write_text_atomic(path: &Utf8Path, content: &str) -> Result<(), IsaTabError> {
        let parent = path
            .parent()
            .ok_or_else(|| IsaTabError::Filesystem("invalid destination path".to_string()))?;
        let mut temp = Builder::new()
            .prefix("kira-isa-file")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| IsaTabError::Filesystem(err.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|err| IsaTabError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| IsaTabError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

/// Reads an investigation graph from its JSON form.
pub fn read_investigation(path: &Utf8Path) -> Result<Investigation, IsaTabError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|_| IsaTabError::InputRead(path.as_std_path().to_path_buf()))?;
    serde_json::from_str(&content).map_err(|err| IsaTabError::InputParse(err.to_string()))
}
