use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ArtifactRef;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Turns downloaded bytes into something the timeline can reference.
pub trait ArtifactStore: Send + Sync {
    fn store(&self, bytes: Bytes) -> Result<ArtifactRef, PersistError>;
}

/// Keeps artifacts in memory under `blob:` references.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<ArtifactRef, Bytes>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &ArtifactRef) -> Option<Bytes> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.get(reference).cloned()
    }

    /// Drops a blob once nothing references it any more.
    pub fn revoke(&self, reference: &ArtifactRef) -> bool {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.remove(reference).is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn store(&self, bytes: Bytes) -> Result<ArtifactRef, PersistError> {
        let reference = ArtifactRef::new(format!("blob:studio/{}", content_hash(&bytes)));
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(reference.clone(), bytes);
        Ok(reference)
    }
}

/// Writes artifacts atomically into a directory, named by content hash.
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    dir: PathBuf,
    extension: String,
}

impl DirectoryArtifactStore {
    pub fn new(dir: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            dir,
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn store(&self, bytes: Bytes) -> Result<ArtifactRef, PersistError> {
        ensure_output_dir(&self.dir)?;

        let filename = format!("{}.{}", content_hash(&bytes), self.extension);
        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Same content hashes to the same name; replace so reruns are deterministic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(ArtifactRef::new(target.display().to_string()))
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
