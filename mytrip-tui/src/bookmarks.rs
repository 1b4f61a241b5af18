use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use mytrip_core::{Bookmark, BookmarkPort, ContentId, PortError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Bookmark store persisted as a JSON array on disk.
///
/// The file is read on first use and rewritten after every change.
pub(crate) struct FileBookmarkStore {
    path: PathBuf,
    entries: Mutex<Option<Vec<Bookmark>>>,
}

impl FileBookmarkStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    async fn read_file(&self) -> Result<Vec<Bookmark>, PortError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(storage_error("read", &err)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<Bookmark> = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), count = entries.len(), "loaded bookmarks");
        Ok(entries)
    }

    async fn write_file(&self, entries: &[Bookmark]) -> Result<(), PortError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| storage_error("create directory for", &err))?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await.map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to save bookmarks");
            storage_error("write", &err)
        })
    }

    /// Run `change` on the loaded entries and persist them if it reports a change.
    async fn update<F>(&self, change: F) -> Result<(), PortError>
    where
        F: FnOnce(&mut Vec<Bookmark>) -> bool + Send,
    {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await?);
        }
        let Some(entries) = guard.as_mut() else {
            return Err(PortError::Internal("bookmarks not loaded".to_owned()));
        };
        if change(entries) {
            self.write_file(entries).await?;
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<Bookmark>, PortError> {
        let mut guard = self.entries.lock().await;
        if let Some(entries) = guard.as_ref() {
            return Ok(entries.clone());
        }
        let entries = self.read_file().await?;
        *guard = Some(entries.clone());
        Ok(entries)
    }
}

fn storage_error(action: &str, err: &std::io::Error) -> PortError {
    PortError::Storage(format!("failed to {action} bookmark file: {err}"))
}

#[async_trait]
impl BookmarkPort for FileBookmarkStore {
    async fn add(&self, content_id: &ContentId) -> Result<(), PortError> {
        self.update(|entries| {
            if entries.iter().any(|entry| &entry.content_id == content_id) {
                return false;
            }
            entries.push(Bookmark {
                content_id: content_id.clone(),
                created_at: Utc::now(),
            });
            true
        })
        .await
    }

    async fn remove(&self, content_id: &ContentId) -> Result<(), PortError> {
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|entry| &entry.content_id != content_id);
            entries.len() != before
        })
        .await
    }

    async fn contains(&self, content_id: &ContentId) -> Result<bool, PortError> {
        Ok(self
            .snapshot()
            .await?
            .iter()
            .any(|entry| &entry.content_id == content_id))
    }

    async fn list(&self) -> Result<Vec<Bookmark>, PortError> {
        let mut entries = self.snapshot().await?;
        entries.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(entries)
    }
}
