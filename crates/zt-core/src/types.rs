//! Core type definitions for ZenTube
//!
//! Flags map one-to-one onto keys in the synced preference store. The
//! in-memory form of a full preference set is a bit set so it can be cached
//! and replaced by value.

use std::collections::BTreeMap;

// =============================================================================
// Flags
// =============================================================================

/// A named boolean user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Flag {
    /// Hide the home page feed grid
    SuppressHomeFeed = 0,
    /// Hide the recommended videos column on watch pages
    SuppressRecommended = 1,
    /// Hide the comments section
    SuppressComments = 2,
    /// Hide the autoplay toggle on the player
    SuppressAutoplayToggle = 3,
    /// Pause playback when the tab becomes hidden
    PauseOnTabLeave = 4,
}

impl Flag {
    /// Every flag, in storage order.
    pub const ALL: [Flag; 5] = [
        Flag::SuppressHomeFeed,
        Flag::SuppressRecommended,
        Flag::SuppressComments,
        Flag::SuppressAutoplayToggle,
        Flag::PauseOnTabLeave,
    ];

    /// Key used in the preference store. Popup control ids use the same string.
    pub const fn storage_key(self) -> &'static str {
        match self {
            Flag::SuppressHomeFeed => "hideHomepageFeed",
            Flag::SuppressRecommended => "hideRecommendedVideos",
            Flag::SuppressComments => "hideComments",
            Flag::SuppressAutoplayToggle => "hideAutoplayToggle",
            Flag::PauseOnTabLeave => "pauseOnTabLeave",
        }
    }

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Flag::SuppressHomeFeed => "suppress-home-feed",
            Flag::SuppressRecommended => "suppress-recommended",
            Flag::SuppressComments => "suppress-comments",
            Flag::SuppressAutoplayToggle => "suppress-autoplay-toggle",
            Flag::PauseOnTabLeave => "pause-on-tab-leave",
        }
    }

    /// Look up a flag by its storage key.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.storage_key() == key)
    }

    /// Storage keys for every flag, suitable for a full store read.
    pub fn all_keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|flag| flag.storage_key()).collect()
    }

    #[inline]
    const fn bit(self) -> PreferenceSet {
        PreferenceSet::from_bits_truncate(1 << self as u8)
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Preference Set
// =============================================================================

bitflags::bitflags! {
    /// Full set of enabled flags. A missing bit means the flag is off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PreferenceSet: u8 {
        const SUPPRESS_HOME_FEED = 1 << 0;
        const SUPPRESS_RECOMMENDED = 1 << 1;
        const SUPPRESS_COMMENTS = 1 << 2;
        const SUPPRESS_AUTOPLAY_TOGGLE = 1 << 3;
        const PAUSE_ON_TAB_LEAVE = 1 << 4;
    }
}

/// Raw store contents: storage key to boolean value.
pub type StoredEntries = BTreeMap<String, bool>;

impl PreferenceSet {
    /// Is `flag` enabled?
    #[inline]
    pub fn is_enabled(self, flag: Flag) -> bool {
        self.contains(flag.bit())
    }

    /// Return a copy with `flag` set to `on`.
    pub fn with(mut self, flag: Flag, on: bool) -> Self {
        self.set(flag.bit(), on);
        self
    }

    /// Enabled flags, in storage order.
    pub fn enabled(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |flag| self.is_enabled(*flag))
    }

    /// Build from raw store entries. Unknown keys are ignored, absent keys are off.
    pub fn from_entries(entries: &StoredEntries) -> Self {
        entries
            .iter()
            .filter_map(|(key, &value)| Flag::from_storage_key(key).map(|flag| (flag, value)))
            .fold(Self::empty(), |set, (flag, value)| set.with(flag, value))
    }

    /// Every flag as an explicit store entry.
    pub fn to_entries(self) -> StoredEntries {
        Flag::ALL
            .iter()
            .map(|flag| (flag.storage_key().to_string(), self.is_enabled(*flag)))
            .collect()
    }
}
