//! World-map store: the persisted spatial-map blob at a fixed path
//!
//! The engine's serialized spatial map is opaque to us; the store wraps
//! it in a small versioned header so a corrupt, truncated, or
//! incompatible file is detected before it reaches the engine. Layout:
//!
//! ```text
//! bytes  0..4   magic "PKWM"
//! bytes  4..6   format version (big-endian u16)
//! bytes  6..8   reserved, zero
//! bytes  8..16  saved-at unix timestamp (big-endian i64, seconds)
//! bytes 16..24  blob length (big-endian u64)
//! bytes 24..56  SHA-256 of the blob
//! bytes 56..    opaque spatial-map blob
//! ```
//!
//! Writes go through a temp file in the same directory followed by a
//! rename, so a crash mid-write never leaves a corrupt file at the
//! well-known path.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const MAGIC: [u8; 4] = *b"PKWM";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 56;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("no persisted scene at {}", .0.display())]
    Missing(PathBuf),
    #[error("not a Placekit world-map file (bad magic)")]
    BadMagic,
    #[error("unsupported world-map format version {0}")]
    UnsupportedVersion(u16),
    #[error("world-map file truncated: header claims {expected} blob bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("world-map checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("invalid world-map header field: {0}")]
    InvalidHeader(&'static str),
}

/// A decoded persisted record
#[derive(Debug, Clone, PartialEq)]
pub struct MapRecord {
    /// When the map was saved
    pub saved_at: DateTime<Utc>,
    /// The engine's opaque serialized spatial map
    pub blob: Vec<u8>,
}

/// Fixed-path persistence for the engine's spatial map
#[derive(Debug, Clone)]
pub struct MapStore {
    path: PathBuf,
}

impl MapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a previous save exists and has not been deleted
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the map blob atomically to the fixed path
    pub fn save(&self, blob: &[u8]) -> Result<(), StoreError> {
        let saved_at = Utc::now();
        let mut data = Vec::with_capacity(HEADER_LEN + blob.len());
        data.extend_from_slice(&MAGIC);
        data.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        data.extend_from_slice(&[0u8, 0u8]);
        data.extend_from_slice(&saved_at.timestamp().to_be_bytes());
        data.extend_from_slice(&(blob.len() as u64).to_be_bytes());
        data.extend_from_slice(&sha256(blob));
        data.extend_from_slice(blob);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-replace: never expose a partially written file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(
            path = %self.path.display(),
            bytes = blob.len(),
            "Saved world map"
        );
        Ok(())
    }

    /// Read and validate the persisted record
    pub fn load(&self) -> Result<MapRecord, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Missing(self.path.clone()));
        }
        let data = std::fs::read(&self.path)?;
        let record = decode(&data)?;
        debug!(
            path = %self.path.display(),
            bytes = record.blob.len(),
            saved_at = %record.saved_at,
            "Loaded world map"
        );
        Ok(record)
    }

    /// Delete the persisted record, if present
    pub fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode(data: &[u8]) -> Result<MapRecord, StoreError> {
    if data.len() < HEADER_LEN {
        return Err(StoreError::Truncated {
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }
    if data[0..4] != MAGIC {
        return Err(StoreError::BadMagic);
    }

    let version = u16::from_be_bytes([data[4], data[5]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let secs = i64::from_be_bytes([
        data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
    ]);
    let saved_at = DateTime::from_timestamp(secs, 0)
        .ok_or(StoreError::InvalidHeader("saved-at timestamp"))?;

    let blob_len = u64::from_be_bytes([
        data[16], data[17], data[18], data[19], data[20], data[21], data[22], data[23],
    ]) as usize;
    let body = &data[HEADER_LEN..];
    if body.len() != blob_len {
        return Err(StoreError::Truncated {
            expected: blob_len,
            actual: body.len(),
        });
    }

    let expected = &data[24..56];
    let actual = sha256(body);
    if expected != actual.as_slice() {
        return Err(StoreError::ChecksumMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }

    Ok(MapRecord {
        saved_at,
        blob: body.to_vec(),
    })
}

/// SHA-256 digest of the blob
fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        assert!(!store.exists());

        store.save(b"fake spatial map").unwrap();
        assert!(store.exists());

        let record = store.load().unwrap();
        assert_eq!(record.blob, b"fake spatial map");
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        store.save(b"first").unwrap();
        store.save(b"second").unwrap();
        assert_eq!(store.load().unwrap().blob, b"second");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        assert!(matches!(store.load(), Err(StoreError::Missing(_))));
    }

    #[test]
    fn test_load_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arcade.worldmap");
        std::fs::write(&path, vec![0u8; 100]).unwrap();
        let store = MapStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::BadMagic)));
    }

    #[test]
    fn test_load_truncated_file() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        store.save(b"some map bytes").unwrap();

        let data = std::fs::read(store.path()).unwrap();
        std::fs::write(store.path(), &data[..data.len() - 3]).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Truncated { .. })));
    }

    #[test]
    fn test_load_corrupt_blob() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        store.save(b"some map bytes").unwrap();

        let mut data = std::fs::read(store.path()).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0xff;
        std::fs::write(store.path(), &data).unwrap();
        assert!(matches!(store.load(), Err(StoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_load_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        store.save(b"map").unwrap();

        let mut data = std::fs::read(store.path()).unwrap();
        data[4] = 0xff;
        data[5] = 0xfe;
        std::fs::write(store.path(), &data).unwrap();
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion(0xfffe))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = MapStore::new(dir.path().join("arcade.worldmap"));
        store.remove().unwrap();
        store.save(b"map").unwrap();
        store.remove().unwrap();
        assert!(!store.exists());
    }
}
