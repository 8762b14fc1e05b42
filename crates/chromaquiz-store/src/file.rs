//! JSON file key-value store.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use chromaquiz_core::config::config_dir;
use chromaquiz_core::error::StoreError;
use chromaquiz_core::stats::KvStatsStore;
use chromaquiz_core::traits::KeyValueStore;

/// A key-value store kept as one JSON object of strings in a file.
///
/// A missing file reads as empty. Every write rewrites the whole file through
/// a sibling temp file that is renamed into place, so readers never see a
/// partial file. Writes through one instance are serialized.
#[derive(Debug)]
pub struct JsonFileKv {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), keys = entries.len(), "stats file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stats.json".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value.to_string())]).await
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.save(&map).await
    }
}

/// `~/.config/chromaquiz/stats.json`, if `HOME` is set.
pub fn default_stats_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("stats.json"))
}

/// Open the stats file at `path`, or at [`default_stats_path`].
pub fn open_stats_store(path: Option<&Path>) -> Result<KvStatsStore<JsonFileKv>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_stats_path()
            .ok_or_else(|| anyhow::anyhow!("HOME is not set; pass --stats-file"))?,
    };
    tracing::debug!(path = %path.display(), "opening stats store");
    Ok(KvStatsStore::new(JsonFileKv::new(path)))
}
