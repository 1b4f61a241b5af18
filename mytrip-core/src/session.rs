//! Paginated fetch and selection orchestration for one search session.
//!
//! [`Session`] is a plain state record with a reducer, [`Session::apply`].
//! Every request it issues carries a [`RequestId`]; responses for anything
//! but the most recent request are discarded, so network reordering can never
//! overwrite newer state. [`SessionDriver`] executes the issued requests on
//! the tokio runtime and feeds their results back through a channel.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::{AreaCode, ContentId, ContentTypeId, SortOrder, TourItem};
use crate::ports::{SearchFilters, TourListPort, TourPage, TourQuery};
use crate::sort::{is_same_order, merge_and_sort_tours, next_selected_tour_id, sort_tours};

/// Items requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identity of an issued page request.
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Load state of the session.
pub enum LoadPhase {
    /// Nothing in flight.
    Idle,
    /// Waiting for page one of a fresh session.
    LoadingFirstPage,
    /// Waiting for a follow-up page.
    LoadingMore,
    /// The last request failed.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A page fetch the host must execute.
pub struct PageRequest {
    /// Identity to echo back with the result.
    pub id: RequestId,
    /// Query to run against the list port.
    pub query: TourQuery,
}

#[derive(Debug, Clone)]
/// Inputs to the session reducer.
pub enum SessionEvent {
    /// Area or content type filter changed.
    FiltersChanged {
        /// New area filter.
        area_code: Option<AreaCode>,
        /// New content type filter.
        content_type: Option<ContentTypeId>,
    },
    /// Search keyword changed.
    KeywordChanged(String),
    /// Start over with the current filters.
    Refresh,
    /// Fetch the next page.
    LoadMore,
    /// Re-issue the request that failed.
    Retry,
    /// Re-order the accumulated list.
    SortChanged(SortOrder),
    /// User picked an item.
    Select(ContentId),
    /// A page request succeeded.
    PageLoaded {
        /// Request the page answers.
        request: RequestId,
        /// Returned page.
        page: TourPage,
    },
    /// A page request failed.
    PageFailed {
        /// Request that failed.
        request: RequestId,
        /// Human-readable failure.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
/// Result of applying an event.
pub enum Outcome {
    /// List and selection are untouched; no redraw needed.
    Unchanged,
    /// Visible state changed.
    Updated,
    /// Visible state changed and the request must be executed.
    Fetch(PageRequest),
}

#[derive(Debug, Clone)]
/// State of one search session.
pub struct Session {
    filters: SearchFilters,
    order: SortOrder,
    page_size: u32,
    tours: Vec<TourItem>,
    total_count: usize,
    page: u32,
    phase: LoadPhase,
    error: Option<String>,
    selected: Option<ContentId>,
    latest: Option<PageRequest>,
    issued: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, SortOrder::default())
    }
}

impl Session {
    /// Empty session; send [`SessionEvent::Refresh`] to start loading.
    #[must_use]
    pub fn new(page_size: u32, order: SortOrder) -> Self {
        Self {
            filters: SearchFilters::default(),
            order,
            page_size: page_size.max(1),
            tours: Vec::new(),
            total_count: 0,
            page: 1,
            phase: LoadPhase::Idle,
            error: None,
            selected: None,
            latest: None,
            issued: 0,
        }
    }

    /// Apply one event and report what the host has to do.
    pub fn apply(&mut self, event: SessionEvent) -> Outcome {
        match event {
            SessionEvent::FiltersChanged {
                area_code,
                content_type,
            } => {
                if self.filters.area_code == area_code && self.filters.content_type == content_type
                {
                    return Outcome::Unchanged;
                }
                self.filters.area_code = area_code;
                self.filters.content_type = content_type;
                self.begin()
            }
            SessionEvent::KeywordChanged(keyword) => {
                let keyword = keyword.trim();
                if self.filters.keyword == keyword {
                    return Outcome::Unchanged;
                }
                keyword.clone_into(&mut self.filters.keyword);
                self.begin()
            }
            SessionEvent::Refresh => self.begin(),
            SessionEvent::LoadMore => self.load_more(),
            SessionEvent::Retry => self.retry(),
            SessionEvent::SortChanged(order) => self.resort(order),
            SessionEvent::Select(content_id) => self.select(content_id),
            SessionEvent::PageLoaded { request, page } => self.page_loaded(request, page),
            SessionEvent::PageFailed { request, message } => self.page_failed(request, message),
        }
    }

    fn begin(&mut self) -> Outcome {
        self.tours.clear();
        self.total_count = 0;
        self.page = 1;
        self.error = None;
        self.selected = None;
        self.phase = LoadPhase::LoadingFirstPage;
        debug!(filters = ?self.filters, "starting search session");
        self.issue(1)
    }

    fn load_more(&mut self) -> Outcome {
        if self.phase != LoadPhase::Idle || !self.has_more() {
            return Outcome::Unchanged;
        }
        self.phase = LoadPhase::LoadingMore;
        self.issue(self.page.saturating_add(1))
    }

    fn retry(&mut self) -> Outcome {
        if self.phase != LoadPhase::Error {
            return Outcome::Unchanged;
        }
        let Some(failed) = self.latest.as_ref() else {
            return self.begin();
        };
        let page = failed.query.page;
        self.phase = if page <= 1 {
            LoadPhase::LoadingFirstPage
        } else {
            LoadPhase::LoadingMore
        };
        self.error = None;
        debug!(page, "retrying failed page");
        self.issue(page)
    }

    fn issue(&mut self, page: u32) -> Outcome {
        self.issued += 1;
        let request = PageRequest {
            id: RequestId(self.issued),
            query: TourQuery::new(self.filters.clone(), self.page_size, page),
        };
        debug!(request = %request.id, page, "issuing page request");
        self.latest = Some(request.clone());
        Outcome::Fetch(request)
    }

    fn is_current(&self, request: RequestId) -> bool {
        matches!(
            self.phase,
            LoadPhase::LoadingFirstPage | LoadPhase::LoadingMore
        ) && self.latest.as_ref().is_some_and(|latest| latest.id == request)
    }

    fn page_loaded(&mut self, request: RequestId, page: TourPage) -> Outcome {
        if !self.is_current(request) {
            debug!(request = %request, "discarding stale page response");
            return Outcome::Unchanged;
        }
        let requested_page = self.latest.as_ref().map_or(1, |latest| latest.query.page);

        let appending = self.phase == LoadPhase::LoadingMore;
        let existing: &[TourItem] = if appending { &self.tours } else { &[] };
        let tours = merge_and_sort_tours(existing, &page.items, self.order);
        let previous = if appending { self.selected.as_ref() } else { None };
        self.selected = next_selected_tour_id(&tours, previous);
        self.tours = tours;
        self.total_count = page.total_count;
        self.page = requested_page;
        self.phase = LoadPhase::Idle;
        debug!(
            request = %request,
            page = requested_page,
            received = page.items.len(),
            accumulated = self.tours.len(),
            total = self.total_count,
            "page applied"
        );
        Outcome::Updated
    }

    fn page_failed(&mut self, request: RequestId, message: String) -> Outcome {
        if !self.is_current(request) {
            debug!(request = %request, "discarding stale page failure");
            return Outcome::Unchanged;
        }
        warn!(request = %request, error = %message, "page request failed");
        self.phase = LoadPhase::Error;
        self.error = Some(message);
        Outcome::Updated
    }

    fn resort(&mut self, order: SortOrder) -> Outcome {
        self.order = order;
        let sorted = sort_tours(&self.tours, order);
        if is_same_order(&sorted, &self.tours) {
            return Outcome::Unchanged;
        }
        self.selected = next_selected_tour_id(&sorted, self.selected.as_ref());
        self.tours = sorted;
        Outcome::Updated
    }

    fn select(&mut self, content_id: ContentId) -> Outcome {
        if self.selected.as_ref() == Some(&content_id)
            || !self.tours.iter().any(|tour| tour.content_id == content_id)
        {
            return Outcome::Unchanged;
        }
        self.selected = Some(content_id);
        Outcome::Updated
    }

    /// Accumulated, sorted items.
    #[must_use]
    pub fn tours(&self) -> &[TourItem] {
        &self.tours
    }

    /// Current filters.
    #[must_use]
    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Active sort order.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Current load phase.
    #[must_use]
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Message of the last failure while in [`LoadPhase::Error`].
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Total matches reported by the backend.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Last page requested successfully, or the page being loaded first.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages the total spans, at least one.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let per_page = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        let pages = self.total_count.div_ceil(per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether more pages can be requested.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.tours.len() < self.total_count && self.page < self.total_pages()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            LoadPhase::LoadingFirstPage | LoadPhase::LoadingMore
        )
    }

    /// Whether the session loaded successfully but matched nothing.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        self.phase == LoadPhase::Idle && self.latest.is_some() && self.tours.is_empty()
    }

    /// Selected content id.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ContentId> {
        self.selected.as_ref()
    }

    /// Position of the selected item within [`Session::tours`].
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.tours
            .iter()
            .position(|tour| &tour.content_id == selected)
    }

    /// Selected item.
    #[must_use]
    pub fn selected_tour(&self) -> Option<&TourItem> {
        self.tours.get(self.selected_index()?)
    }

    /// Id of the item `offset` positions away from the selection, clamped to the list.
    #[must_use]
    pub fn neighbor_id(&self, offset: isize) -> Option<&ContentId> {
        let last = self.tours.len().checked_sub(1)?;
        let current = self.selected_index().unwrap_or(0);
        let target = current.saturating_add_signed(offset).min(last);
        self.tours.get(target).map(|tour| &tour.content_id)
    }
}

/// Run `request` against `port` and report the result on `events`.
pub fn spawn_fetch(
    port: Arc<dyn TourListPort>,
    request: PageRequest,
    events: UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let PageRequest { id, query } = request;
        let event = match port.list(&query).await {
            Ok(page) => SessionEvent::PageLoaded { request: id, page },
            Err(err) => {
                warn!(request = %id, error = %err, "tour list request failed");
                SessionEvent::PageFailed {
                    request: id,
                    message: err.to_string(),
                }
            }
        };
        if events.send(event).is_err() {
            debug!(request = %id, "session closed before response arrived");
        }
    })
}

/// Owns a [`Session`] and executes the requests it issues.
pub struct SessionDriver {
    session: Session,
    port: Arc<dyn TourListPort>,
    sender: UnboundedSender<SessionEvent>,
    receiver: UnboundedReceiver<SessionEvent>,
    in_flight: Option<JoinHandle<()>>,
    abort_superseded: bool,
}

impl SessionDriver {
    /// Wrap `session`, fetching pages from `port`.
    #[must_use]
    pub fn new(session: Session, port: Arc<dyn TourListPort>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            session,
            port,
            sender,
            receiver,
            in_flight: None,
            abort_superseded: true,
        }
    }

    /// Whether to abort a request's task once a newer request replaces it.
    #[must_use]
    pub fn with_abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply a user event, launching a fetch when one is issued.
    pub fn dispatch(&mut self, event: SessionEvent) -> Outcome {
        let outcome = self.session.apply(event);
        if let Outcome::Fetch(request) = &outcome {
            self.launch(request.clone());
        }
        outcome
    }

    fn launch(&mut self, request: PageRequest) {
        if let Some(previous) = self.in_flight.take()
            && self.abort_superseded
            && !previous.is_finished()
        {
            debug!(superseded_by = %request.id, "aborting superseded page request");
            previous.abort();
        }
        let handle = spawn_fetch(Arc::clone(&self.port), request, self.sender.clone());
        self.in_flight = Some(handle);
    }

    /// Apply every response that has already arrived. Returns whether anything changed.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.receiver.try_recv() {
            changed |= self.dispatch(event) != Outcome::Unchanged;
        }
        changed
    }

    /// Wait for the next response and apply it.
    pub async fn next_response(&mut self) -> Outcome {
        match self.receiver.recv().await {
            Some(event) => self.dispatch(event),
            None => Outcome::Unchanged,
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GatedListPort, page_of, tour};

    fn fetch(outcome: Outcome) -> PageRequest {
        match outcome {
            Outcome::Fetch(request) => request,
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    fn loaded(request: &PageRequest, page: TourPage) -> SessionEvent {
        SessionEvent::PageLoaded {
            request: request.id,
            page,
        }
    }

    fn ids(session: &Session) -> Vec<&str> {
        session
            .tours()
            .iter()
            .map(|item| item.content_id.as_str())
            .collect()
    }

    fn started(total: usize) -> (Session, PageRequest) {
        let mut session = Session::new(2, SortOrder::Latest);
        let first = fetch(session.apply(SessionEvent::Refresh));
        let page = page_of(
            vec![
                tour("A", "가", Some("20240101000000")),
                tour("B", "나", Some("20230101000000")),
            ],
            total,
        );
        assert_eq!(session.apply(loaded(&first, page)), Outcome::Updated);
        (session, first)
    }

    #[test]
    fn first_page_selects_first_item() {
        let (session, first) = started(4);
        assert_eq!(first.query.page, 1);
        assert_eq!(session.phase(), LoadPhase::Idle);
        assert_eq!(ids(&session), vec!["A", "B"]);
        assert_eq!(session.selected_id(), Some(&ContentId::from("A")));
        assert_eq!(session.total_count(), 4);
        assert_eq!(session.total_pages(), 2);
        assert!(session.has_more(), "second page should be available");
    }

    #[test]
    fn filter_change_resets_session() {
        let (mut session, _) = started(4);
        let request = fetch(session.apply(SessionEvent::FiltersChanged {
            area_code: Some(AreaCode::from("6")),
            content_type: None,
        }));
        assert_eq!(request.query.page, 1);
        assert_eq!(request.query.filters.area_code, Some(AreaCode::from("6")));
        assert_eq!(session.phase(), LoadPhase::LoadingFirstPage);
        assert!(session.tours().is_empty(), "list should be cleared");
        assert_eq!(session.selected_id(), None);
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn unchanged_filters_do_not_refetch() {
        let (mut session, _) = started(4);
        let outcome = session.apply(SessionEvent::FiltersChanged {
            area_code: None,
            content_type: None,
        });
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(session.apply(SessionEvent::KeywordChanged("  ".to_owned())), Outcome::Unchanged);
    }

    #[test]
    fn keyword_change_starts_keyword_search() {
        let (mut session, _) = started(4);
        let request = fetch(session.apply(SessionEvent::KeywordChanged(" 해운대 ".to_owned())));
        assert!(request.query.is_keyword_search(), "keyword not forwarded");
        assert_eq!(session.filters().keyword, "해운대");
    }

    #[test]
    fn load_more_merges_and_preserves_selection() {
        let (mut session, _) = started(4);
        assert_eq!(
            session.apply(SessionEvent::Select(ContentId::from("B"))),
            Outcome::Updated
        );
        let more = fetch(session.apply(SessionEvent::LoadMore));
        assert_eq!(more.query.page, 2);
        assert_eq!(session.phase(), LoadPhase::LoadingMore);

        let page = page_of(
            vec![
                tour("C", "다", Some("20250101000000")),
                tour("B", "나", Some("20230601000000")),
            ],
            4,
        );
        assert_eq!(session.apply(loaded(&more, page)), Outcome::Updated);
        assert_eq!(ids(&session), vec!["C", "A", "B"]);
        assert_eq!(session.selected_id(), Some(&ContentId::from("B")));
        assert_eq!(session.page(), 2);
        assert!(!session.has_more(), "all pages consumed");
        assert_eq!(session.apply(SessionEvent::LoadMore), Outcome::Unchanged);
    }

    #[test]
    fn load_more_is_gated_on_total_and_phase() {
        let (mut session, _) = started(2);
        assert_eq!(session.apply(SessionEvent::LoadMore), Outcome::Unchanged);

        let mut loading = Session::new(2, SortOrder::Latest);
        let _first = fetch(loading.apply(SessionEvent::Refresh));
        assert_eq!(loading.apply(SessionEvent::LoadMore), Outcome::Unchanged);
    }

    #[test]
    fn failure_keeps_list_and_retry_reissues_same_page() {
        let (mut session, _) = started(4);
        let more = fetch(session.apply(SessionEvent::LoadMore));
        let outcome = session.apply(SessionEvent::PageFailed {
            request: more.id,
            message: "Network error: timeout".to_owned(),
        });
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(session.phase(), LoadPhase::Error);
        assert_eq!(session.error(), Some("Network error: timeout"));
        assert_eq!(ids(&session), vec!["A", "B"]);

        let retried = fetch(session.apply(SessionEvent::Retry));
        assert_ne!(retried.id, more.id);
        assert_eq!(retried.query, more.query);
        assert_eq!(session.phase(), LoadPhase::LoadingMore);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn retry_outside_error_is_ignored() {
        let (mut session, _) = started(4);
        assert_eq!(session.apply(SessionEvent::Retry), Outcome::Unchanged);
    }

    #[test]
    fn filter_change_recovers_from_error() {
        let mut session = Session::new(2, SortOrder::Latest);
        let first = fetch(session.apply(SessionEvent::Refresh));
        let _failed = session.apply(SessionEvent::PageFailed {
            request: first.id,
            message: "down".to_owned(),
        });
        let request = fetch(session.apply(SessionEvent::KeywordChanged("경복궁".to_owned())));
        assert_eq!(session.phase(), LoadPhase::LoadingFirstPage);
        assert_eq!(session.error(), None);
        assert_eq!(request.query.page, 1);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let mut session = Session::default();
        assert!(!session.is_empty_result(), "nothing loaded yet");
        let first = fetch(session.apply(SessionEvent::Refresh));
        let _applied = session.apply(loaded(&first, TourPage::default()));
        assert!(session.is_empty_result(), "empty page should be reported");
        assert_eq!(session.phase(), LoadPhase::Idle);
        assert_eq!(session.selected_id(), None);
    }

    #[test]
    fn sort_change_reorders_and_keeps_selection() {
        let (mut session, _) = started(4);
        let _selected = session.apply(SessionEvent::Select(ContentId::from("B")));
        assert_eq!(
            session.apply(SessionEvent::SortChanged(SortOrder::Name)),
            Outcome::Unchanged,
            "가/나 already ordered by name"
        );
        assert_eq!(session.order(), SortOrder::Name);

        let mut reordered = Session::new(10, SortOrder::Latest);
        let first = fetch(reordered.apply(SessionEvent::Refresh));
        let page = page_of(
            vec![
                tour("S", "서울숲", Some("20241101093000")),
                tour("N", "남산타워", Some("20241015091500")),
            ],
            2,
        );
        let _applied = reordered.apply(loaded(&first, page));
        let _selected = reordered.apply(SessionEvent::Select(ContentId::from("N")));
        assert_eq!(
            reordered.apply(SessionEvent::SortChanged(SortOrder::Name)),
            Outcome::Updated
        );
        assert_eq!(ids(&reordered), vec!["N", "S"]);
        assert_eq!(reordered.selected_id(), Some(&ContentId::from("N")));
    }

    #[test]
    fn selecting_unknown_item_is_ignored() {
        let (mut session, _) = started(4);
        assert_eq!(
            session.apply(SessionEvent::Select(ContentId::from("Z"))),
            Outcome::Unchanged
        );
        assert_eq!(session.selected_id(), Some(&ContentId::from("A")));
    }

    #[test]
    fn stale_first_page_after_second_page_is_discarded() {
        let mut session = Session::new(2, SortOrder::Latest);
        let stale = fetch(session.apply(SessionEvent::Refresh));
        let fresh = fetch(session.apply(SessionEvent::KeywordChanged("부산".to_owned())));
        let _applied = session.apply(loaded(
            &fresh,
            page_of(
                vec![tour("P1", "가", Some("20240101000000")), tour("P2", "나", Some("20230101000000"))],
                4,
            ),
        ));
        let more = fetch(session.apply(SessionEvent::LoadMore));
        let _applied = session.apply(loaded(
            &more,
            page_of(
                vec![tour("P3", "다", Some("20220101000000")), tour("P4", "라", Some("20210101000000"))],
                4,
            ),
        ));
        assert_eq!(ids(&session), vec!["P1", "P2", "P3", "P4"]);

        let outcome = session.apply(loaded(
            &stale,
            page_of(vec![tour("OLD", "오래된", Some("20990101000000"))], 1),
        ));
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(ids(&session), vec!["P1", "P2", "P3", "P4"]);
        assert_eq!(session.total_count(), 4);
        assert_eq!(session.page(), 2);

        let failure = session.apply(SessionEvent::PageFailed {
            request: stale.id,
            message: "late".to_owned(),
        });
        assert_eq!(failure, Outcome::Unchanged);
        assert_eq!(session.phase(), LoadPhase::Idle);
    }

    #[test]
    fn neighbor_navigation_clamps_to_list() {
        let (session, _) = started(4);
        assert_eq!(session.neighbor_id(1), Some(&ContentId::from("B")));
        assert_eq!(session.neighbor_id(5), Some(&ContentId::from("B")));
        assert_eq!(session.neighbor_id(-3), Some(&ContentId::from("A")));
        assert_eq!(Session::default().neighbor_id(1), None);
    }

    #[tokio::test]
    async fn driver_applies_fetched_pages() {
        let port = Arc::new(GatedListPort::default());
        port.respond_immediately(
            "",
            page_of(vec![tour("A", "가", Some("20240101000000"))], 1),
        );
        let mut driver = SessionDriver::new(Session::default(), port);

        let outcome = driver.dispatch(SessionEvent::Refresh);
        assert!(matches!(outcome, Outcome::Fetch(_)), "refresh should fetch");
        assert_eq!(driver.next_response().await, Outcome::Updated);
        assert_eq!(driver.session().selected_id(), Some(&ContentId::from("A")));
    }

    #[tokio::test]
    async fn driver_discards_out_of_order_responses() {
        let port = Arc::new(GatedListPort::default());
        let release_stale = port.gate("");
        let release_fresh = port.gate("제주");
        let mut driver = SessionDriver::new(Session::default(), Arc::clone(&port) as Arc<dyn TourListPort>)
            .with_abort_superseded(false);

        let _stale = driver.dispatch(SessionEvent::Refresh);
        let _fresh = driver.dispatch(SessionEvent::KeywordChanged("제주".to_owned()));

        release_fresh
            .send(Ok(page_of(vec![tour("J", "제주 올레", Some("20240101000000"))], 1)))
            .expect("fresh request waiting");
        assert_eq!(driver.next_response().await, Outcome::Updated);

        release_stale
            .send(Ok(page_of(vec![tour("X", "서울", Some("20990101000000"))], 1)))
            .expect("stale request waiting");
        assert_eq!(driver.next_response().await, Outcome::Unchanged);

        let ids: Vec<&str> = driver
            .session()
            .tours()
            .iter()
            .map(|item| item.content_id.as_str())
            .collect();
        assert_eq!(ids, vec!["J"]);
    }

    #[tokio::test]
    async fn driver_surfaces_failures() {
        let port = Arc::new(GatedListPort::default());
        let release = port.gate("");
        let mut driver = SessionDriver::new(Session::default(), port);

        let _fetch = driver.dispatch(SessionEvent::Refresh);
        release
            .send(Err(crate::ports::PortError::Internal("boom".to_owned())))
            .expect("request waiting");
        assert_eq!(driver.next_response().await, Outcome::Updated);
        assert_eq!(driver.session().phase(), LoadPhase::Error);
        assert_eq!(driver.session().error(), Some("Internal error: boom"));
    }
}
