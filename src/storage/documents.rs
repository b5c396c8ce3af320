// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-per-document JSON storage.
//!
//! Every record lives in its own `{id}.json` file under a collection
//! directory. Writes go to a sibling temp file first and are renamed into
//! place, so a reader never observes a half-written document and a
//! concurrent writer of the same record wins as a whole (last write wins).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::StoragePaths;

/// Error type for document storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Entity collides with a unique key of an existing entity
    #[error("Already exists: {0}")]
    Duplicate(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
    /// Data read back does not match what was written
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl DocumentStorage {
    /// Create a new DocumentStorage instance.
    ///
    /// Does NOT initialize the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Initialize the collection directories.
    ///
    /// Safe to call multiple times (idempotent).
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [
            self.paths.users_dir(),
            self.paths.leads_dir(),
            self.paths.tasks_dir(),
            self.paths.tickets_dir(),
            self.paths.audit_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Write, read back and delete a scratch file. Used by the readiness endpoint.
    pub fn health_check(&self) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        // Unique per call; concurrent checks never share a path
        let scratch = self
            .paths
            .root()
            .join(format!(".health_check.{}", uuid::Uuid::new_v4().simple()));
        let expected = b"health_check_data";

        fs::write(&scratch, expected)?;
        let read_back = fs::read(&scratch);
        fs::remove_file(&scratch)?;
        let read_back = read_back?;

        if read_back != expected {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON document and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            _ => StorageError::Io(e),
        })?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        Ok(value)
    }

    /// Write a JSON document (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Unique temp name so two writers of the same document never share one
        let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        let written = write_pretty(&temp_path, value)
            .and_then(|()| fs::rename(&temp_path, path).map_err(StorageError::from));
        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written
    }

    /// Read every `*.json` document in a collection directory.
    ///
    /// Documents that fail to parse are skipped with a warning rather than
    /// failing the whole listing.
    pub fn read_all_json<T: DeserializeOwned>(
        &self,
        dir: impl AsRef<Path>,
    ) -> StorageResult<Vec<T>> {
        let dir = dir.as_ref();
        let ids = self.list_files(dir, "json")?;

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            let path = dir.join(format!("{id}.json"));
            match self.read_json(&path) {
                Ok(doc) => documents.push(doc),
                // Deleted between listing and reading
                Err(StorageError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable document");
                }
            }
        }
        Ok(documents)
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Delete a file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            _ => StorageError::Io(e),
        })
    }

    /// List the stems of all files in a directory with the given extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    // ========== Raw File Operations (audit JSONL) ==========

    /// Append raw bytes to a file, creating it and its parents if needed.
    pub fn append_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Read raw bytes from a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }

        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
            _ => StorageError::Io(e),
        })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
