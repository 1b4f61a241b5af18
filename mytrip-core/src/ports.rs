//! Traits describing provider capabilities and shared query types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{
    AreaCode, AreaInfo, Bookmark, ContentId, ContentTypeId, PetTourInfo, TourDetail, TourImage,
    TourIntro, TourItem,
};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to tour data backends and stores.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The upstream service answered with a non-success result code.
    #[error("Upstream error {code}: {message}")]
    Upstream {
        /// Result code reported by the service.
        code: String,
        /// Result message reported by the service.
        message: String,
    },
    /// A payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// Requested record does not exist.
    #[error("Not found")]
    NotFound,
    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Filters that define a search session.
pub struct SearchFilters {
    /// Restrict to one area.
    pub area_code: Option<AreaCode>,
    /// Restrict to one content type.
    pub content_type: Option<ContentTypeId>,
    /// Free-text keyword; blank means no keyword search.
    pub keyword: String,
}

impl SearchFilters {
    /// Trimmed keyword, or `None` when it is blank.
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        let keyword = self.keyword.trim();
        (!keyword.is_empty()).then_some(keyword)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page request against the list port.
pub struct TourQuery {
    /// Session filters.
    pub filters: SearchFilters,
    /// Items per page.
    pub page_size: u32,
    /// One-based page number.
    pub page: u32,
}

impl TourQuery {
    /// Construct a query for the given page.
    #[must_use]
    pub fn new(filters: SearchFilters, page_size: u32, page: u32) -> Self {
        Self {
            filters,
            page_size,
            page,
        }
    }

    /// Whether this query should hit keyword search rather than the area list.
    #[must_use]
    pub fn is_keyword_search(&self) -> bool {
        self.filters.keyword().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A page of list results.
pub struct TourPage {
    /// Items on this page.
    pub items: Vec<TourItem>,
    /// Total number of matches across all pages.
    pub total_count: usize,
}

#[async_trait]
/// Paginated list and keyword search backend.
pub trait TourListPort: Send + Sync {
    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the service rejects it.
    async fn list(&self, query: &TourQuery) -> Result<TourPage, PortError>;
}

#[async_trait]
/// Detail lookups for a single point of interest.
pub trait TourDetailPort: Send + Sync {
    /// Common detail record.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn detail(&self, content_id: &ContentId) -> Result<Option<TourDetail>, PortError>;

    /// Operating information for the given content type.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn intro(
        &self,
        content_id: &ContentId,
        content_type: &ContentTypeId,
    ) -> Result<Option<TourIntro>, PortError>;

    /// Gallery images.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn images(&self, content_id: &ContentId) -> Result<Vec<TourImage>, PortError>;

    /// Pet companion information.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn pet_info(&self, content_id: &ContentId) -> Result<Option<PetTourInfo>, PortError>;

    /// Area codes, or district codes below `parent` when given.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails.
    async fn areas(&self, parent: Option<&AreaCode>) -> Result<Vec<AreaInfo>, PortError>;
}

#[async_trait]
/// Persistent store of bookmarked content ids.
pub trait BookmarkPort: Send + Sync {
    /// Bookmark an item. Adding an existing bookmark succeeds without changes.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the store cannot be written.
    async fn add(&self, content_id: &ContentId) -> Result<(), PortError>;

    /// Remove a bookmark. Removing a missing bookmark succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the store cannot be written.
    async fn remove(&self, content_id: &ContentId) -> Result<(), PortError>;

    /// Whether the item is bookmarked.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the store cannot be read.
    async fn contains(&self, content_id: &ContentId) -> Result<bool, PortError>;

    /// All bookmarks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Storage`] when the store cannot be read.
    async fn list(&self) -> Result<Vec<Bookmark>, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keyword_is_not_a_search() {
        let mut filters = SearchFilters {
            keyword: "   ".to_owned(),
            ..SearchFilters::default()
        };
        assert!(!TourQuery::new(filters.clone(), 20, 1).is_keyword_search(), "blank keyword searched");

        filters.keyword = " 해운대 ".to_owned();
        assert_eq!(filters.keyword(), Some("해운대"));
        assert!(TourQuery::new(filters, 20, 1).is_keyword_search(), "keyword ignored");
    }
}
