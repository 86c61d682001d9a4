//! Settings panel
//!
//! Loads the stored flags into the popup's toggles on open, and on every
//! toggle persists that single flag and asks the active page's agent to
//! refresh. Each toggle is an independent write plus notify; there is no
//! reentrancy to guard against.

use std::cell::Cell;

use crate::config::PanelConfig;
use crate::message::{Request, Response, Status};
use crate::store::{load_preferences, save_flag, PreferenceStore};
use crate::types::{Flag, PreferenceSet};
use crate::url::matches_origin;

/// Error type for tab lookup and message delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagingError {
    /// No listener in the tab, e.g. the page agent was never injected.
    #[error("No receiving end in tab {0}")]
    NoReceiver(i32),
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
    #[error("Messaging failed: {0}")]
    Send(String),
}

/// The tab the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTab {
    pub id: i32,
    /// Missing when the extension lacks permission to read it.
    pub url: Option<String>,
}

/// Tab lookup and one-shot messaging.
#[allow(async_fn_in_trait)]
pub trait TabMessenger {
    async fn active_tab(&self) -> Result<Option<ActiveTab>, MessagingError>;
    async fn send_request(&self, tab_id: i32, request: &Request) -> Result<Response, MessagingError>;
}

/// The popup's toggle controls.
pub trait ToggleView {
    fn set_toggle(&self, flag: Flag, on: bool);
}

/// What happened to a single toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The store write failed; the page was not notified.
    PersistFailed,
    /// Saved, but there is no active tab to notify.
    NoActiveTab,
    /// Saved; the active tab is not on the target site.
    NotTargetPage,
    /// Saved and the agent replied.
    Notified(Status),
    /// Saved, but the message did not get through.
    NotifyFailed(MessagingError),
}

pub struct SettingsPanel<S, M>
where
    S: PreferenceStore,
    M: TabMessenger,
{
    store: S,
    messenger: M,
    config: PanelConfig,
    shown: Cell<PreferenceSet>,
}

impl<S, M> SettingsPanel<S, M>
where
    S: PreferenceStore,
    M: TabMessenger,
{
    pub fn new(store: S, messenger: M, config: PanelConfig) -> Self {
        Self {
            store,
            messenger,
            config,
            shown: Cell::new(PreferenceSet::empty()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Preference set as currently rendered.
    pub fn shown(&self) -> PreferenceSet {
        self.shown.get()
    }

    /// Read the stored flags and render every toggle. On a store error every
    /// toggle renders off.
    pub async fn load<V: ToggleView>(&self, view: &V) -> PreferenceSet {
        let prefs = match load_preferences(&self.store).await {
            Ok(prefs) => {
                log::info!("Loaded preferences: {:?}", prefs);
                prefs
            }
            Err(e) => {
                log::error!("Storage error on load: {}", e);
                PreferenceSet::empty()
            }
        };

        for flag in Flag::ALL {
            view.set_toggle(flag, prefs.is_enabled(flag));
        }
        self.shown.set(prefs);
        prefs
    }

    /// Persist `flag` and notify the active page if it is on the target site.
    pub async fn handle_toggle(&self, flag: Flag, on: bool) -> ToggleOutcome {
        log::debug!("{} is now {}", flag, on);
        self.shown.set(self.shown.get().with(flag, on));

        if let Err(e) = save_flag(&self.store, flag, on).await {
            log::error!("Storage error on save: {}", e);
            return ToggleOutcome::PersistFailed;
        }
        log::info!("Preference saved: {} = {}", flag.storage_key(), on);

        self.notify_active_tab().await
    }

    async fn notify_active_tab(&self) -> ToggleOutcome {
        let tab = match self.messenger.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => {
                log::error!("No active tab found");
                return ToggleOutcome::NoActiveTab;
            }
            Err(e) => {
                log::error!("Failed to query active tab: {}", e);
                return ToggleOutcome::NotifyFailed(e);
            }
        };

        let on_target = tab
            .url
            .as_deref()
            .is_some_and(|url| matches_origin(url, &self.config.target_origins));
        if !on_target {
            log::debug!("Active tab is not a target page, not sending message: {:?}", tab.url);
            return ToggleOutcome::NotTargetPage;
        }

        match self.messenger.send_request(tab.id, &Request::RefreshPreferences).await {
            Ok(response) => {
                log::info!("Refresh sent to tab {}, response: {:?}", tab.id, response.status);
                ToggleOutcome::Notified(response.status)
            }
            Err(e) => {
                log::error!("Failed to send message to tab {}: {}", tab.id, e);
                ToggleOutcome::NotifyFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMessenger, FlakyStore, RecordingView};
    use crate::types::StoredEntries;

    fn panel(store: FlakyStore, messenger: FakeMessenger) -> SettingsPanel<FlakyStore, FakeMessenger> {
        SettingsPanel::new(store, messenger, PanelConfig::default())
    }

    #[tokio::test]
    async fn test_load_renders_stored_values() {
        let panel = panel(
            FlakyStore::with(&[Flag::SuppressComments, Flag::PauseOnTabLeave]),
            FakeMessenger::without_tab(),
        );
        let view = RecordingView::new();
        panel.load(&view).await;

        assert_eq!(view.state(Flag::SuppressComments), Some(true));
        assert_eq!(view.state(Flag::PauseOnTabLeave), Some(true));
        assert_eq!(view.state(Flag::SuppressHomeFeed), Some(false));
        assert_eq!(view.state(Flag::SuppressRecommended), Some(false));
        assert_eq!(view.state(Flag::SuppressAutoplayToggle), Some(false));
    }

    #[tokio::test]
    async fn test_load_failure_renders_everything_off() {
        let store = FlakyStore::with(&[Flag::SuppressComments]);
        store.fail_reads(true);
        let panel = panel(store, FakeMessenger::without_tab());
        let view = RecordingView::new();

        assert!(panel.load(&view).await.is_empty());
        for flag in Flag::ALL {
            assert_eq!(view.state(flag), Some(false), "{flag}");
        }
    }

    #[tokio::test]
    async fn test_toggle_writes_single_flag_and_notifies() {
        let panel = panel(FlakyStore::new(), FakeMessenger::on_tab("https://www.youtube.com/watch?v=x"));

        let outcome = panel.handle_toggle(Flag::SuppressRecommended, true).await;
        assert_eq!(outcome, ToggleOutcome::Notified(Status::Ok));

        let mut expected = StoredEntries::new();
        expected.insert("hideRecommendedVideos".to_string(), true);
        assert_eq!(panel.store().writes(), vec![expected]);
        assert_eq!(panel.messenger().sent(), vec![(7, Request::RefreshPreferences)]);
        assert!(panel.shown().is_enabled(Flag::SuppressRecommended));
    }

    #[tokio::test]
    async fn test_toggle_on_insecure_origin_notifies() {
        let panel = panel(FlakyStore::new(), FakeMessenger::on_tab("http://www.youtube.com/"));
        let outcome = panel.handle_toggle(Flag::SuppressComments, false).await;
        assert_eq!(outcome, ToggleOutcome::Notified(Status::Ok));
    }

    #[tokio::test]
    async fn test_toggle_on_other_site_skips_notify() {
        let panel = panel(FlakyStore::new(), FakeMessenger::on_tab("https://example.com/"));

        let outcome = panel.handle_toggle(Flag::SuppressComments, true).await;
        assert_eq!(outcome, ToggleOutcome::NotTargetPage);
        assert_eq!(panel.store().writes().len(), 1);
        assert!(panel.messenger().sent().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_without_tab_url_skips_notify() {
        let messenger = FakeMessenger::without_tab();
        let panel = panel(FlakyStore::new(), messenger);
        assert_eq!(panel.handle_toggle(Flag::SuppressComments, true).await, ToggleOutcome::NoActiveTab);
        assert!(panel.messenger().sent().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_skips_notify() {
        let store = FlakyStore::new();
        store.fail_writes(true);
        let panel = panel(store, FakeMessenger::on_tab("https://www.youtube.com/"));

        let outcome = panel.handle_toggle(Flag::SuppressHomeFeed, true).await;
        assert_eq!(outcome, ToggleOutcome::PersistFailed);
        assert!(panel.messenger().sent().is_empty());
    }

    #[tokio::test]
    async fn test_messaging_failure_is_reported() {
        let messenger = FakeMessenger::on_tab("https://www.youtube.com/");
        messenger.reply_with(Err(MessagingError::NoReceiver(7)));
        let panel = panel(FlakyStore::new(), messenger);

        let outcome = panel.handle_toggle(Flag::SuppressHomeFeed, true).await;
        assert_eq!(outcome, ToggleOutcome::NotifyFailed(MessagingError::NoReceiver(7)));
        assert_eq!(panel.store().writes().len(), 1);
    }

    #[tokio::test]
    async fn test_agent_failure_status_is_passed_through() {
        let messenger = FakeMessenger::on_tab("https://www.youtube.com/");
        messenger.reply_with(Ok(Response::failed()));
        let panel = panel(FlakyStore::new(), messenger);

        let outcome = panel.handle_toggle(Flag::SuppressHomeFeed, true).await;
        assert_eq!(outcome, ToggleOutcome::Notified(Status::Failed));
    }
}
