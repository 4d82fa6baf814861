use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{self, ConsultationRecord};

pub const DEFAULT_DATA_FILE: &str = "./data.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read data file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode data file: {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode records: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write data file: {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory copy of the last successfully loaded record collection.
///
/// The only mutation is a wholesale [`replace`](Self::replace); everything
/// else hands out borrows so derived views can never alter the cache.
#[derive(Clone, Debug, Default)]
pub struct ConsultationStore {
    records: Vec<ConsultationRecord>,
}

impl ConsultationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ConsultationRecord] {
        &self.records
    }

    pub fn replace(&mut self, records: Vec<ConsultationRecord>) {
        self.records = records;
    }

    pub fn find(&self, id: &str) -> Option<&ConsultationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub async fn read_data_file(path: &Path) -> Result<Vec<ConsultationRecord>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    model::parse_records(&bytes).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `records` as pretty JSON (two-space indent, UTF-8, non-ASCII kept
/// as-is). The file is written to a sibling temp path and renamed into place
/// so readers never see a half-written collection.
pub async fn write_data_file(path: &Path, records: &[ConsultationRecord]) -> Result<(), StoreError> {
    let mut encoded =
        serde_json::to_vec_pretty(records).map_err(|source| StoreError::Encode { source })?;
    encoded.push(b'\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, &encoded)
        .await
        .map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
}
