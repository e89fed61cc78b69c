//! File-backed persistence for the pipeline's JSON documents. The pipeline
//! itself is stateless between runs; these documents are the only hand-off
//! between stages and toward the site renderer.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::types::{Digest, ItemsDocument, Result, SourcesReport};

pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }

    pub fn digest_path(&self) -> PathBuf {
        self.data_dir.join("digest.json")
    }

    pub fn sources_path(&self) -> PathBuf {
        self.data_dir.join("sources.json")
    }

    /// Load the items document; a missing file is an empty document, not an
    /// error.
    pub async fn load_items(&self) -> Result<ItemsDocument> {
        let path = self.items_path();
        if !path.exists() {
            debug!(path = %path.display(), "no items document yet");
            return Ok(ItemsDocument::default());
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn save_items(&self, document: &ItemsDocument) -> Result<()> {
        self.write_json(&self.items_path(), document).await?;
        info!(count = document.items.len(), path = %self.items_path().display(), "items saved");
        Ok(())
    }

    pub async fn load_digest(&self) -> Result<Digest> {
        let path = self.digest_path();
        if !path.exists() {
            debug!(path = %path.display(), "no digest document yet");
            return Ok(Digest::default());
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn save_digest(&self, digest: &Digest) -> Result<()> {
        self.write_json(&self.digest_path(), digest).await?;
        info!(path = %self.digest_path().display(), "digest saved");
        Ok(())
    }

    pub async fn save_sources(&self, report: &SourcesReport) -> Result<()> {
        self.write_json(&self.sources_path(), report).await?;
        info!(count = report.sources.len(), path = %self.sources_path().display(), "sources report saved");
        Ok(())
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let rendered = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, rendered).await?;
        Ok(())
    }
}
