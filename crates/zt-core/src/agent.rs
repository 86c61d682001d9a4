//! Page agent
//!
//! Runs inside the target page. Keeps the page's visible regions in line with
//! the cached preference set and pauses playback when the tab is hidden.
//!
//! Three independent entry points drive it:
//!
//! - DOM mutations, coalesced by the [`Debouncer`] and answered with a
//!   suppression pass over the *cached* set (no store read).
//! - Refresh requests from the settings panel: reveal everything, re-read the
//!   store, suppress again. This is the only path that resynchronizes with
//!   the store after [`PageAgent::initialize`].
//! - Visibility changes, which may pause the video.
//!
//! A refresh and a debounced pass may interleave; whichever finishes last
//! wins, and both converge once the preference set stops changing.

use std::cell::Cell;

use crate::config::AgentConfig;
use crate::debounce::{Debouncer, TimerHost};
use crate::dom::{find_video, reveal_rule, suppress_rule, ObservedRoot, PageDom, VideoElement};
use crate::message::{Request, Response, Status};
use crate::rules::{active_rules, SUPPRESSION_RULES};
use crate::store::{load_preferences, PreferenceStore, StoreError};
use crate::types::{Flag, PreferenceSet};

/// The agent's copy of the preference set.
///
/// Written only by the agent's initialize and refresh paths; every other
/// handler reads a copy.
#[derive(Debug, Default)]
pub struct PreferenceCache {
    current: Cell<PreferenceSet>,
}

impl PreferenceCache {
    pub fn get(&self) -> PreferenceSet {
        self.current.get()
    }

    fn replace(&self, prefs: PreferenceSet) -> PreferenceSet {
        self.current.replace(prefs)
    }
}

pub struct PageAgent<D, S, T>
where
    D: PageDom,
    S: PreferenceStore,
    T: TimerHost,
{
    dom: D,
    store: S,
    debouncer: Debouncer<T>,
    cache: PreferenceCache,
    root: ObservedRoot,
    config: AgentConfig,
    initialized: Cell<bool>,
}

impl<D, S, T> PageAgent<D, S, T>
where
    D: PageDom,
    S: PreferenceStore,
    T: TimerHost,
{
    /// Create an agent and fix its observed root for the page lifetime.
    pub fn new(dom: D, store: S, timer: T, config: AgentConfig) -> Self {
        let root = ObservedRoot::choose(&dom, config.observed_root);
        let debouncer = Debouncer::new(timer, config.debounce);
        Self {
            dom,
            store,
            debouncer,
            cache: PreferenceCache::default(),
            root,
            config,
            initialized: Cell::new(false),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timer(&self) -> &T {
        self.debouncer.host()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn observed_root(&self) -> ObservedRoot {
        self.root
    }

    pub fn preferences(&self) -> PreferenceSet {
        self.cache.get()
    }

    /// Has the initial store read completed (successfully or not)?
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Load the preference set and run one suppression pass.
    ///
    /// On a store error the agent stays at the all-off default and suppresses
    /// nothing. The error is logged here; callers may ignore it.
    pub async fn initialize(&self) -> Result<PreferenceSet, StoreError> {
        let result = load_preferences(&self.store).await;
        self.initialized.set(true);

        match result {
            Ok(prefs) => {
                log::info!("Loaded preferences on startup: {:?}", prefs);
                self.cache.replace(prefs);
                self.apply_suppression();
                Ok(prefs)
            }
            Err(e) => {
                log::error!("Storage error on initial load: {}", e);
                self.cache.replace(PreferenceSet::empty());
                Err(e)
            }
        }
    }

    /// Hide the regions of every enabled flag in the cached set. Returns the
    /// number of elements touched.
    pub fn apply_suppression(&self) -> usize {
        active_rules(self.cache.get())
            .map(|rule| suppress_rule(&self.dom, rule))
            .sum()
    }

    /// Reveal the regions of all four rules, whatever the cached set says.
    pub fn reveal_all(&self) -> usize {
        SUPPRESSION_RULES
            .iter()
            .map(|rule| reveal_rule(&self.dom, rule))
            .sum()
    }

    /// A mutation was observed under the root. Restarts the debounce window.
    pub fn on_mutation(&self) {
        self.debouncer.trigger();
    }

    /// The debounce timeout fired. Runs a suppression pass from the cache.
    pub fn on_debounce_elapsed(&self) {
        if self.debouncer.take_elapsed() {
            let touched = self.apply_suppression();
            log::trace!("Debounced suppression pass touched {} elements", touched);
        }
    }

    pub async fn handle_request(&self, request: &Request) -> Response {
        log::debug!("Message received in page agent: {:?}", request);
        match request {
            Request::RefreshPreferences => self.refresh().await.into(),
        }
    }

    /// Reveal everything, re-read the store, suppress again.
    ///
    /// A failed read leaves the page fully revealed and the cache all-off, so
    /// later mutation passes do not re-hide with a stale set.
    pub async fn refresh(&self) -> Status {
        log::info!("Refreshing preferences");
        self.reveal_all();

        match load_preferences(&self.store).await {
            Ok(prefs) => {
                log::info!("Updated preferences: {:?}", prefs);
                self.cache.replace(prefs);
                self.apply_suppression();
                Status::Ok
            }
            Err(e) => {
                log::error!("Storage error on refresh: {}", e);
                self.cache.replace(PreferenceSet::empty());
                Status::Failed
            }
        }
    }

    /// The document's visibility changed. Pauses a playing video when the
    /// page became hidden and pause-on-leave is enabled. Never resumes.
    /// Returns `true` if a video was paused.
    pub fn on_visibility_change(&self) -> bool {
        if !self.dom.is_hidden() || !self.cache.get().is_enabled(Flag::PauseOnTabLeave) {
            return false;
        }

        match find_video(&self.dom, &self.config.video_selectors) {
            Some(video) if video.is_playing() => {
                video.pause();
                log::info!("Tab hidden, paused playback");
                true
            }
            Some(_) => false,
            None => {
                log::debug!("Tab hidden but no video element found");
                false
            }
        }
    }
}
