//! CBOR serialization for ledger snapshots.
//!
//! - `ciborium` for the persisted ledger state (JSON is only used for CLI output)
//! - Deterministic: ordered maps everywhere, so equal states encode equally
//! - Snapshot files are replaced atomically (write to a sibling, then rename)

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),

    /// Snapshot file could not be read or written.
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Deserialize from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}

/// Read a CBOR snapshot file. A missing file yields `None`.
pub async fn read_snapshot<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, SerializationError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => from_cbor(&bytes).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write a CBOR snapshot file, creating parent directories as needed.
pub async fn write_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<(), SerializationError> {
    let bytes = to_cbor(value)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
