use crate::core::error::{RateError, Result};
use crate::core::rate::ExchangeRateSnapshot;
use crate::core::store::RateStore;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::debug;

const STORE_DIR: &str = "currency";
const STORE_FILE: &str = "rates.json";

/// Persists the current snapshot as one pretty-printed JSON document.
///
/// Each save writes its own uniquely named temp file in the same directory and
/// renames it over the canonical file, so a reader sees either the previous or
/// the new document, and concurrent saves never share a temp file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join(STORE_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(STORE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Blocking write of `contents` to a fresh temp file in `dir`, persisted over
/// `path`. The temp file is deleted if any step fails.
fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut temp = Builder::new()
        .prefix(".rates-")
        .suffix(".json.tmp")
        .tempfile_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl RateStore for JsonFileStore {
    async fn load(&self) -> Result<Option<ExchangeRateSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot stored at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: ExchangeRateSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            RateError::DataFormat(format!(
                "malformed snapshot document {}: {e}",
                self.path.display()
            ))
        })?;
        snapshot.validate().map_err(|e| {
            RateError::DataFormat(format!(
                "invalid snapshot document {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(
            "Loaded {} rates from {}",
            snapshot.rates().len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &ExchangeRateSnapshot) -> Result<()> {
        // serde_json leaves non-ASCII text unescaped
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| RateError::DataFormat(format!("failed to serialize snapshot: {e}")))?;

        let dir = self.dir().to_path_buf();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &json))
            .await
            .map_err(std::io::Error::other)??;

        debug!(
            "Saved {} rates to {}",
            snapshot.rates().len(),
            self.path.display()
        );
        Ok(())
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn last_modified(&self) -> Option<DateTime<Local>> {
        let metadata = tokio::fs::metadata(&self.path).await.ok()?;
        metadata.modified().ok().map(DateTime::<Local>::from)
    }
}
