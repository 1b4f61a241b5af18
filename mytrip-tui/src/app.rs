use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use mytrip_core::{
    AREAS, AreaCode, AreaInfo, Bookmark, ContentId, ContentType, ContentTypeId, Outcome, PetTourInfo,
    Session, SessionDriver, SessionEvent, TourDetail, TourIntro, service::TourService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Browse,
    Detail,
    Bookmarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Keyword,
}

/// Everything shown on the detail screen for one item.
#[derive(Debug, Clone)]
pub(crate) struct DetailView {
    pub content_id: ContentId,
    pub detail: Option<TourDetail>,
    pub intro: Option<TourIntro>,
    pub pet_info: Option<PetTourInfo>,
    pub image_count: usize,
    pub errors: Vec<String>,
}

pub(crate) struct App {
    pub service: Arc<TourService>,
    pub driver: SessionDriver,

    pub screen: Screen,
    pub detail_return: Screen,
    pub input_mode: InputMode,
    pub keyword_input: String,

    /// Index into [`AREAS`], `None` for all areas.
    pub area_index: Option<usize>,
    /// Area names reported by the provider, keyed by code.
    pub area_names: HashMap<AreaCode, String>,
    /// Index into [`ContentType::KNOWN`], `None` for all types.
    pub type_index: Option<usize>,
    pub show_map: bool,

    pub bookmarked: HashSet<ContentId>,
    pub bookmarks: Vec<Bookmark>,
    pub bookmark_index: usize,
    pub titles: HashMap<ContentId, String>,

    pub detail: Option<DetailView>,
    pub is_loading_detail: bool,
    pub message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<TourService>, session: Session) -> Self {
        let driver = SessionDriver::new(session, service.list_port());
        Self {
            service,
            driver,
            screen: Screen::Browse,
            detail_return: Screen::Browse,
            input_mode: InputMode::Normal,
            keyword_input: String::new(),
            area_index: None,
            area_names: HashMap::new(),
            type_index: None,
            show_map: true,
            bookmarked: HashSet::new(),
            bookmarks: Vec::new(),
            bookmark_index: 0,
            titles: HashMap::new(),
            detail: None,
            is_loading_detail: false,
            message: None,
        }
    }

    pub(crate) fn session(&self) -> &Session {
        self.driver.session()
    }

    /// Feed an event to the session. Returns whether anything visible changed.
    pub(crate) fn dispatch(&mut self, event: SessionEvent) -> bool {
        let changed = self.driver.dispatch(event) != Outcome::Unchanged;
        self.remember_titles();
        changed
    }

    /// Apply responses that arrived since the last frame.
    pub(crate) fn poll_responses(&mut self) -> bool {
        let changed = self.driver.drain();
        if changed {
            self.remember_titles();
        }
        changed
    }

    fn remember_titles(&mut self) {
        for tour in self.driver.session().tours() {
            if !self.titles.contains_key(&tour.content_id) {
                self.titles
                    .insert(tour.content_id.clone(), tour.title.clone());
            }
        }
    }

    pub(crate) fn area_code(&self) -> Option<AreaCode> {
        self.area_index
            .and_then(|idx| AREAS.get(idx))
            .map(|area| AreaCode::from(area.code))
    }

    /// Label of the selected area, preferring the provider's name over the built-in one.
    pub(crate) fn area_label(&self) -> Option<String> {
        let code = self.area_code()?;
        self.area_names
            .get(&code)
            .cloned()
            .or_else(|| code.label().map(str::to_owned))
    }

    pub(crate) fn set_area_names(&mut self, areas: Vec<AreaInfo>) {
        self.area_names = areas
            .into_iter()
            .map(|area| (area.code, area.name))
            .collect();
    }

    pub(crate) fn content_type(&self) -> Option<ContentType> {
        self.type_index
            .and_then(|idx| ContentType::KNOWN.get(idx))
            .cloned()
    }

    fn filters_event(&self) -> SessionEvent {
        SessionEvent::FiltersChanged {
            area_code: self.area_code(),
            content_type: self.content_type().map(ContentTypeId::from),
        }
    }

    pub(crate) fn cycle_area(&mut self, forward: bool) -> SessionEvent {
        self.area_index = cycle(self.area_index, AREAS.len(), forward);
        self.filters_event()
    }

    pub(crate) fn cycle_type(&mut self, forward: bool) -> SessionEvent {
        self.type_index = cycle(self.type_index, ContentType::KNOWN.len(), forward);
        self.filters_event()
    }

    pub(crate) fn clear_filters(&mut self) -> SessionEvent {
        self.area_index = None;
        self.type_index = None;
        self.filters_event()
    }

    pub(crate) fn start_keyword_edit(&mut self) {
        self.keyword_input = self.session().filters().keyword.clone();
        self.input_mode = InputMode::Keyword;
    }

    pub(crate) fn cancel_keyword_edit(&mut self) {
        self.keyword_input = self.session().filters().keyword.clone();
        self.input_mode = InputMode::Normal;
    }

    pub(crate) fn selected_bookmark(&self) -> Option<&Bookmark> {
        self.bookmarks.get(self.bookmark_index)
    }

    pub(crate) fn set_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        self.bookmarked = bookmarks
            .iter()
            .map(|bookmark| bookmark.content_id.clone())
            .collect();
        self.bookmarks = bookmarks;
        self.bookmark_index = self
            .bookmark_index
            .min(self.bookmarks.len().saturating_sub(1));
    }

    pub(crate) fn open_detail_screen(&mut self, view: DetailView) {
        if let Some(detail) = view.detail.as_ref() {
            self.titles
                .insert(detail.content_id.clone(), detail.title.clone());
        }
        self.detail = Some(view);
        if self.screen != Screen::Detail {
            self.detail_return = self.screen;
        }
        self.screen = Screen::Detail;
    }

    pub(crate) fn close_detail_screen(&mut self) {
        self.screen = self.detail_return;
        self.detail = None;
    }
}

/// Step through `None, 0, 1, .., len - 1` and wrap around.
fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    match (current, forward) {
        (None, true) => Some(0),
        (None, false) => Some(last),
        (Some(idx), true) if idx >= last => None,
        (Some(idx), true) => Some(idx + 1),
        (Some(0), false) => None,
        (Some(idx), false) => Some(idx.min(len) - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_visits_every_entry_and_the_unset_state() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = cycle(current, 3, true);
            seen.push(current);
        }
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), None]);

        assert_eq!(cycle(None, 3, false), Some(2));
        assert_eq!(cycle(Some(0), 3, false), None);
        assert_eq!(cycle(Some(2), 3, false), Some(1));
        assert_eq!(cycle(None, 0, true), None);
    }
}
