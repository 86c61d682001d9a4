//! Suppression rule table
//!
//! Selectors are owned by the host page's markup and will break when it
//! changes. They are kept in one place so a markup change is a one-line fix.

use crate::types::{Flag, PreferenceSet};

/// Pairing of a flag with the region it hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionRule {
    pub flag: Flag,
    pub selector: &'static str,
}

/// Home feed grid on the landing page.
pub const HOME_FEED_SELECTOR: &str = "#primary ytd-rich-grid-renderer";
/// Recommended videos column on watch pages.
pub const RECOMMENDED_SELECTOR: &str = ".ytd-watch-next-secondary-results-renderer";
/// Comments section.
pub const COMMENTS_SELECTOR: &str = "#comments";
/// Autoplay toggle button inside the player chrome.
pub const AUTOPLAY_TOGGLE_SELECTOR: &str = ".ytp-autonav-toggle-button";

/// Preferred mutation observer root.
pub const PRIMARY_CONTAINER_SELECTOR: &str = "#primary";
/// Fallback mutation observer root.
pub const BODY_SELECTOR: &str = "body";

/// Main player video, then any video on the page.
pub const VIDEO_SELECTORS: [&str; 2] = ["#movie_player video", "video"];

/// The fixed rule table. Used by both the reveal and the suppress pass.
pub const SUPPRESSION_RULES: [SuppressionRule; 4] = [
    SuppressionRule { flag: Flag::SuppressHomeFeed, selector: HOME_FEED_SELECTOR },
    SuppressionRule { flag: Flag::SuppressRecommended, selector: RECOMMENDED_SELECTOR },
    SuppressionRule { flag: Flag::SuppressComments, selector: COMMENTS_SELECTOR },
    SuppressionRule { flag: Flag::SuppressAutoplayToggle, selector: AUTOPLAY_TOGGLE_SELECTOR },
];

/// Rule for `flag`, if it controls a region.
pub fn rule_for(flag: Flag) -> Option<&'static SuppressionRule> {
    SUPPRESSION_RULES.iter().find(|rule| rule.flag == flag)
}

/// Rules whose flag is enabled in `prefs`.
pub fn active_rules(prefs: PreferenceSet) -> impl Iterator<Item = &'static SuppressionRule> {
    SUPPRESSION_RULES.iter().filter(move |rule| prefs.is_enabled(rule.flag))
}
