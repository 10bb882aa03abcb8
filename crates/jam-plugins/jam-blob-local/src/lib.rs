//! # jam-blob-local
//!
//! Local filesystem implementation of `BlobStore`. Files land under a root
//! directory mirroring their relative path, and the public URL is the same
//! path under a configurable prefix (the binary serves the root statically
//! under that prefix).

use std::path::{Component, Path, PathBuf};

use anyhow::bail;
use async_trait::async_trait;
use tokio::fs;

use jam_core::traits::{BlobStore, StoredBlob};

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/media")
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }
}

/// Only plain relative components are allowed; anything that could escape
/// the root (`..`, absolute paths, drive prefixes) is rejected.
fn checked_relative(path: &str) -> anyhow::Result<&Path> {
    let rel = Path::new(path);
    if path.is_empty()
        || !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
    {
        bail!("invalid blob path: {path:?}");
    }
    Ok(rel)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<StoredBlob> {
        let rel = checked_relative(path)?;
        let target = self.root_path.join(rel);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &data).await?;
        log::debug!("stored {} bytes at {}", data.len(), target.display());

        Ok(StoredBlob {
            file_path: path.to_string(),
            url: format!("{}/{}", self.url_prefix, path),
        })
    }
}
