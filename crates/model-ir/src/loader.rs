// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory-mapped descriptor files for the hosted path.
//!
//! On a device the descriptor is linked into the binary and handed to the
//! engine as a byte slice. On a host it lives in a file; [`ModelFile`]
//! maps that file so the engine can borrow constants from it exactly as
//! it would from static storage.

use crate::{ModelDescriptor, ModelError};
use std::path::{Path, PathBuf};

/// A descriptor file mapped into memory.
pub struct ModelFile {
    path: PathBuf,
    mmap: memmap2::Mmap,
}

impl ModelFile {
    /// Opens and maps a descriptor file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source: std::io::Error| ModelError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = std::fs::File::open(&path).map_err(io_err)?;
        // The mapping is read-only; descriptors are not rewritten while a
        // runtime is using them.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;

        tracing::debug!("mapped descriptor '{}' ({} bytes)", path.display(), mmap.len());
        Ok(Self { path, mmap })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw descriptor bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Parses the mapped bytes as a descriptor.
    pub fn descriptor(&self) -> Result<ModelDescriptor<'_>, ModelError> {
        ModelDescriptor::from_bytes(self.bytes())
    }
}

impl std::fmt::Debug for ModelFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFile")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sine_model, SCHEMA_VERSION};

    #[test]
    fn test_open_written_descriptor() {
        let path = std::env::temp_dir().join(format!("model_ir_sine_{}.st", std::process::id()));
        std::fs::write(&path, sine_model().unwrap()).unwrap();

        let file = ModelFile::open(&path).unwrap();
        assert_eq!(file.path(), path.as_path());
        let d = file.descriptor().unwrap();
        assert_eq!(d.format_version(), SCHEMA_VERSION);
        assert_eq!(d.name(), "sine");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = ModelFile::open("/nonexistent/model.st").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/model.st"));
    }
}
