//! In-memory port doubles for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::model::{
    AreaCode, AreaInfo, Bookmark, ContentId, ContentTypeId, PetTourInfo, TourDetail, TourImage,
    TourIntro, TourItem,
};
use crate::ports::{BookmarkPort, PortError, TourDetailPort, TourListPort, TourPage, TourQuery};

type PageResult = Result<TourPage, PortError>;

pub(crate) fn tour(id: &str, title: &str, modified: Option<&str>) -> TourItem {
    let mut item = TourItem::new(id, title);
    item.modified_time = modified.map(str::to_owned);
    item
}

pub(crate) fn page_of(items: Vec<TourItem>, total_count: usize) -> TourPage {
    TourPage { items, total_count }
}

/// List port whose responses are released by the test, keyed by search keyword.
#[derive(Default)]
pub(crate) struct GatedListPort {
    gates: Mutex<HashMap<String, oneshot::Receiver<PageResult>>>,
    ready: Mutex<HashMap<String, TourPage>>,
}

impl GatedListPort {
    pub(crate) fn gate(&self, keyword: &str) -> oneshot::Sender<PageResult> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("gate lock")
            .insert(keyword.to_owned(), receiver);
        sender
    }

    pub(crate) fn respond_immediately(&self, keyword: &str, page: TourPage) {
        self.ready
            .lock()
            .expect("ready lock")
            .insert(keyword.to_owned(), page);
    }
}

#[async_trait]
impl TourListPort for GatedListPort {
    async fn list(&self, query: &TourQuery) -> Result<TourPage, PortError> {
        let key = query.filters.keyword().unwrap_or_default().to_owned();
        let ready = self.ready.lock().expect("ready lock").get(&key).cloned();
        if let Some(page) = ready {
            return Ok(page);
        }
        let gate = self.gates.lock().expect("gate lock").remove(&key);
        match gate {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(PortError::Internal("gate dropped".to_owned()))),
            None => Err(PortError::NotFound),
        }
    }
}

/// Detail port serving fixed records.
#[derive(Default)]
pub(crate) struct StaticDetailPort {
    pub(crate) details: HashMap<ContentId, TourDetail>,
    pub(crate) areas: Vec<AreaInfo>,
}

#[async_trait]
impl TourDetailPort for StaticDetailPort {
    async fn detail(&self, content_id: &ContentId) -> Result<Option<TourDetail>, PortError> {
        Ok(self.details.get(content_id).cloned())
    }

    async fn intro(
        &self,
        _content_id: &ContentId,
        _content_type: &ContentTypeId,
    ) -> Result<Option<TourIntro>, PortError> {
        Ok(None)
    }

    async fn images(&self, _content_id: &ContentId) -> Result<Vec<TourImage>, PortError> {
        Ok(Vec::new())
    }

    async fn pet_info(&self, _content_id: &ContentId) -> Result<Option<PetTourInfo>, PortError> {
        Ok(None)
    }

    async fn areas(&self, _parent: Option<&AreaCode>) -> Result<Vec<AreaInfo>, PortError> {
        Ok(self.areas.clone())
    }
}

/// Bookmark store kept in memory.
#[derive(Default)]
pub(crate) struct MemoryBookmarks {
    entries: Mutex<Vec<Bookmark>>,
}

#[async_trait]
impl BookmarkPort for MemoryBookmarks {
    async fn add(&self, content_id: &ContentId) -> Result<(), PortError> {
        let mut entries = self.entries.lock().expect("bookmark lock");
        if !entries.iter().any(|entry| &entry.content_id == content_id) {
            entries.push(Bookmark {
                content_id: content_id.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove(&self, content_id: &ContentId) -> Result<(), PortError> {
        self.entries
            .lock()
            .expect("bookmark lock")
            .retain(|entry| &entry.content_id != content_id);
        Ok(())
    }

    async fn contains(&self, content_id: &ContentId) -> Result<bool, PortError> {
        Ok(self
            .entries
            .lock()
            .expect("bookmark lock")
            .iter()
            .any(|entry| &entry.content_id == content_id))
    }

    async fn list(&self) -> Result<Vec<Bookmark>, PortError> {
        let mut entries = self.entries.lock().expect("bookmark lock").clone();
        entries.reverse();
        Ok(entries)
    }
}
