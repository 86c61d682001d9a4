//! ZenTube Core Library
//!
//! This crate provides the preference synchronization and page suppression
//! protocol for the ZenTube extension. It has no browser dependencies: the
//! storage area, the tab messaging API, the DOM and the timers are reached
//! through traits implemented in `zt-wasm`.
//!
//! # Architecture
//!
//! The settings panel and the page agent each keep their own copy of the
//! preference set. They never share memory. The panel writes one flag per
//! toggle and sends a refresh request; the agent answers by re-reading the
//! whole set from the store.
//!
//! # Modules
//!
//! - `types`: flags and the preference set
//! - `rules`: the fixed flag to selector table
//! - `store`: preference store trait and in-memory store
//! - `dom`: page DOM traits and the suppress/reveal passes
//! - `debounce`: cancellable delayed task
//! - `message`: popup to agent wire messages
//! - `url`: target page check
//! - `agent`: page agent
//! - `panel`: settings panel
//! - `config`: runtime knobs

pub mod agent;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod message;
pub mod panel;
pub mod rules;
pub mod store;
pub mod types;
pub mod url;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::PageAgent;
pub use config::{AgentConfig, PanelConfig};
pub use debounce::{Debouncer, TimerHost};
pub use dom::{ObservedRoot, PageDom, RegionElement, VideoElement};
pub use message::{Request, Response, Status};
pub use panel::{ActiveTab, MessagingError, SettingsPanel, TabMessenger, ToggleOutcome, ToggleView};
pub use rules::{SuppressionRule, SUPPRESSION_RULES};
pub use store::{MemoryStore, PreferenceStore, StoreError};
pub use types::{Flag, PreferenceSet, StoredEntries};
