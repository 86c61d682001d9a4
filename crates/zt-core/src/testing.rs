//! Test doubles shared by the unit tests in this crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::debounce::TimerHost;
use crate::dom::{PageDom, RegionElement, VideoElement};
use crate::message::{Request, Response};
use crate::panel::{ActiveTab, MessagingError, TabMessenger, ToggleView};
use crate::store::{MemoryStore, PreferenceStore, StoreError};
use crate::types::{Flag, StoredEntries};

// =============================================================================
// DOM
// =============================================================================

#[derive(Debug, Default)]
pub struct FakeRegion {
    hidden: Cell<bool>,
    hides: Cell<u32>,
    layouts: Cell<u32>,
}

impl FakeRegion {
    pub fn hidden(&self) -> bool {
        self.hidden.get()
    }

    pub fn hides(&self) -> u32 {
        self.hides.get()
    }

    pub fn layouts(&self) -> u32 {
        self.layouts.get()
    }
}

impl RegionElement for Rc<FakeRegion> {
    fn hide(&self) {
        self.hidden.set(true);
        self.hides.set(self.hides.get() + 1);
    }

    fn unhide(&self) {
        self.hidden.set(false);
    }

    fn force_layout(&self) {
        self.layouts.set(self.layouts.get() + 1);
    }
}

#[derive(Debug)]
pub struct FakeVideo {
    playing: Cell<bool>,
    pauses: Cell<u32>,
}

impl FakeVideo {
    pub fn playing(&self) -> bool {
        self.playing.get()
    }

    pub fn pauses(&self) -> u32 {
        self.pauses.get()
    }
}

impl VideoElement for Rc<FakeVideo> {
    fn is_playing(&self) -> bool {
        self.playing.get()
    }

    fn pause(&self) {
        self.playing.set(false);
        self.pauses.set(self.pauses.get() + 1);
    }
}

#[derive(Debug, Default)]
pub struct FakeDom {
    regions: RefCell<HashMap<String, Vec<Rc<FakeRegion>>>>,
    videos: RefCell<HashMap<String, Rc<FakeVideo>>>,
    markers: RefCell<Vec<String>>,
    hidden: Cell<bool>,
    selects: Cell<u32>,
}

impl FakeDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region matched by `selector`, as if the host page streamed it in.
    pub fn add_region(&self, selector: &str) -> Rc<FakeRegion> {
        let region = Rc::new(FakeRegion::default());
        self.regions
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .push(Rc::clone(&region));
        region
    }

    pub fn add_video(&self, selector: &str, playing: bool) -> Rc<FakeVideo> {
        let video = Rc::new(FakeVideo {
            playing: Cell::new(playing),
            pauses: Cell::new(0),
        });
        self.videos.borrow_mut().insert(selector.to_string(), Rc::clone(&video));
        video
    }

    /// Make `selector` match for [`PageDom::exists`] without adding a region.
    pub fn add_marker(&self, selector: &str) {
        self.markers.borrow_mut().push(selector.to_string());
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.set(hidden);
    }

    /// True when every region under `selector` is hidden (and there is at least one).
    pub fn is_suppressed(&self, selector: &str) -> bool {
        self.regions
            .borrow()
            .get(selector)
            .map(|regions| !regions.is_empty() && regions.iter().all(|r| r.hidden()))
            .unwrap_or(false)
    }

    pub fn suppressed_count(&self, selector: &str) -> usize {
        self.regions
            .borrow()
            .get(selector)
            .map(|regions| regions.iter().filter(|r| r.hidden()).count())
            .unwrap_or(0)
    }

    /// Number of `select_all` calls so far; one suppression pass makes one
    /// call per active rule.
    pub fn selects(&self) -> u32 {
        self.selects.get()
    }
}

impl PageDom for FakeDom {
    type Region = Rc<FakeRegion>;
    type Video = Rc<FakeVideo>;

    fn select_all(&self, selector: &str) -> Vec<Self::Region> {
        self.selects.set(self.selects.get() + 1);
        self.regions.borrow().get(selector).cloned().unwrap_or_default()
    }

    fn select_video(&self, selector: &str) -> Option<Self::Video> {
        self.videos.borrow().get(selector).cloned()
    }

    fn exists(&self, selector: &str) -> bool {
        self.regions.borrow().get(selector).is_some_and(|r| !r.is_empty())
            || self.videos.borrow().contains_key(selector)
            || self.markers.borrow().iter().any(|m| m == selector)
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Memory store with switchable failures and call counters.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    reads: Cell<u32>,
    writes: RefCell<Vec<StoredEntries>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(flags: &[Flag]) -> Self {
        let entries = flags.iter().map(|f| (f.storage_key().to_string(), true)).collect();
        Self {
            inner: MemoryStore::with_entries(entries),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    pub fn writes(&self) -> Vec<StoredEntries> {
        self.writes.borrow().clone()
    }

    /// Change the stored value behind the caller's back, as another context would.
    pub fn put(&self, flag: Flag, on: bool) {
        self.inner.insert(flag.storage_key(), on);
    }
}

impl PreferenceStore for FlakyStore {
    async fn get(&self, keys: &[&str]) -> Result<StoredEntries, StoreError> {
        self.reads.set(self.reads.get() + 1);
        if self.fail_reads.get() {
            return Err(StoreError::Backend("quota exceeded".to_string()));
        }
        self.inner.get(keys).await
    }

    async fn set(&self, entries: StoredEntries) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        self.writes.borrow_mut().push(entries.clone());
        self.inner.set(entries).await
    }
}

// =============================================================================
// Timer
// =============================================================================

/// Timer host driven by an explicit clock.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Cell<Duration>,
    next_id: Cell<u32>,
    scheduled: RefCell<Vec<(u32, Duration)>>,
    cancelled: Cell<u32>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn live_count(&self) -> usize {
        self.scheduled.borrow().len()
    }

    pub fn cancelled(&self) -> u32 {
        self.cancelled.get()
    }

    /// Move the clock forward and return the ids of timeouts that came due,
    /// in deadline order.
    pub fn advance(&self, by: Duration) -> Vec<u32> {
        let now = self.now.get() + by;
        self.now.set(now);

        let mut scheduled = self.scheduled.borrow_mut();
        let mut due: Vec<(u32, Duration)> = scheduled.iter().copied().filter(|(_, at)| *at <= now).collect();
        scheduled.retain(|(_, at)| *at > now);
        due.sort_by_key(|(_, at)| *at);
        due.into_iter().map(|(id, _)| id).collect()
    }
}

impl TimerHost for ManualTimer {
    type Handle = u32;

    fn set_timeout(&self, delay: Duration) -> Option<u32> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.scheduled.borrow_mut().push((id, self.now.get() + delay));
        Some(id)
    }

    fn clear_timeout(&self, handle: u32) {
        let mut scheduled = self.scheduled.borrow_mut();
        let before = scheduled.len();
        scheduled.retain(|(id, _)| *id != handle);
        if scheduled.len() < before {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}

// =============================================================================
// Settings panel collaborators
// =============================================================================

#[derive(Debug, Default)]
pub struct RecordingView {
    toggles: RefCell<HashMap<Flag, bool>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, flag: Flag) -> Option<bool> {
        self.toggles.borrow().get(&flag).copied()
    }
}

impl ToggleView for RecordingView {
    fn set_toggle(&self, flag: Flag, on: bool) {
        self.toggles.borrow_mut().insert(flag, on);
    }
}

/// Messenger with a scripted active tab and reply.
#[derive(Debug)]
pub struct FakeMessenger {
    tab: RefCell<Option<ActiveTab>>,
    reply: RefCell<Result<Response, MessagingError>>,
    sent: RefCell<Vec<(i32, Request)>>,
}

impl FakeMessenger {
    pub fn on_tab(url: &str) -> Self {
        Self {
            tab: RefCell::new(Some(ActiveTab { id: 7, url: Some(url.to_string()) })),
            reply: RefCell::new(Ok(Response::ok())),
            sent: RefCell::new(Vec::new()),
        }
    }

    pub fn without_tab() -> Self {
        let messenger = Self::on_tab("");
        *messenger.tab.borrow_mut() = None;
        messenger
    }

    pub fn reply_with(&self, reply: Result<Response, MessagingError>) {
        *self.reply.borrow_mut() = reply;
    }

    pub fn sent(&self) -> Vec<(i32, Request)> {
        self.sent.borrow().clone()
    }
}

impl TabMessenger for FakeMessenger {
    async fn active_tab(&self) -> Result<Option<ActiveTab>, MessagingError> {
        Ok(self.tab.borrow().clone())
    }

    async fn send_request(&self, tab_id: i32, request: &Request) -> Result<Response, MessagingError> {
        self.sent.borrow_mut().push((tab_id, request.clone()));
        self.reply.borrow().clone()
    }
}
