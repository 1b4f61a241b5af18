//! High-level service facade combining the backend and the bookmark store.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::backend::{BackendMeta, TourBackend};
use crate::model::{
    AreaCode, AreaInfo, Bookmark, ContentId, ContentTypeId, PetTourInfo, TourDetail, TourImage,
    TourIntro,
};
use crate::ports::{BookmarkPort, PortError, TourListPort};

/// Public entry point for listing, detail lookups, and bookmarks.
pub struct TourService {
    backend: Arc<TourBackend>,
    bookmarks: Option<Arc<dyn BookmarkPort>>,
}

impl TourService {
    /// Create a new service bound to the provided backend.
    #[must_use]
    pub fn new(backend: Arc<TourBackend>) -> Self {
        Self {
            backend,
            bookmarks: None,
        }
    }

    /// Attach a bookmark store.
    #[must_use]
    pub fn with_bookmarks(mut self, store: Arc<dyn BookmarkPort>) -> Self {
        self.bookmarks = Some(store);
        self
    }

    /// Metadata of the backend in use.
    #[must_use]
    pub fn backend(&self) -> &BackendMeta {
        &self.backend.meta
    }

    /// List port handle for driving a session.
    #[must_use]
    pub fn list_port(&self) -> Arc<dyn TourListPort> {
        self.backend.list_port()
    }

    /// Load the common detail record.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::NotFound`] when the provider knows no such item,
    /// or another [`PortError`] if the provider call fails.
    #[instrument(skip_all, fields(content_id = %content_id))]
    pub async fn detail(&self, content_id: &ContentId) -> Result<TourDetail, PortError> {
        self.backend
            .detail_port
            .detail(content_id)
            .await?
            .ok_or(PortError::NotFound)
    }

    /// Load operating information.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the provider call fails.
    pub async fn intro(
        &self,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<Option<TourIntro>, PortError> {
        self.backend
            .detail_port
            .intro(content_id, content_type)
            .await
    }

    /// Load gallery images.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the provider call fails.
    pub async fn images(&self, content_id: &ContentId) -> Result<Vec<TourImage>, PortError> {
        self.backend.detail_port.images(content_id).await
    }

    /// Load pet companion information.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the provider call fails.
    pub async fn pet_info(&self, content_id: &ContentId) -> Result<Option<PetTourInfo>, PortError> {
        self.backend.detail_port.pet_info(content_id).await
    }

    /// Look up area or district codes.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the provider call fails.
    pub async fn areas(&self, parent: Option<&AreaCode>) -> Result<Vec<AreaInfo>, PortError> {
        self.backend.detail_port.areas(parent).await
    }

    /// Toggle a bookmark and report whether the item is bookmarked afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Internal`] when no store is attached, or the store's error.
    pub async fn toggle_bookmark(&self, content_id: &ContentId) -> Result<bool, PortError> {
        let store = self.bookmark_store()?;
        if store.contains(content_id).await? {
            store.remove(content_id).await?;
            debug!(content_id = %content_id, "bookmark removed");
            Ok(false)
        } else {
            store.add(content_id).await?;
            debug!(content_id = %content_id, "bookmark added");
            Ok(true)
        }
    }

    /// Remove a bookmark.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Internal`] when no store is attached, or the store's error.
    pub async fn remove_bookmark(&self, content_id: &ContentId) -> Result<(), PortError> {
        self.bookmark_store()?.remove(content_id).await
    }

    /// All bookmarks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Internal`] when no store is attached, or the store's error.
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, PortError> {
        self.bookmark_store()?.list().await
    }

    fn bookmark_store(&self) -> Result<&Arc<dyn BookmarkPort>, PortError> {
        self.bookmarks
            .as_ref()
            .ok_or_else(|| PortError::Internal("no bookmark store configured".to_owned()))
    }
}
