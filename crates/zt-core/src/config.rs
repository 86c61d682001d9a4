//! Runtime knobs for the page agent and the settings panel.

use std::time::Duration;

use crate::rules::{PRIMARY_CONTAINER_SELECTOR, VIDEO_SELECTORS};
use crate::url::TARGET_ORIGINS;

/// Debounce delay for mutation-driven suppression passes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Quiet period after the last DOM mutation before re-applying suppression.
    pub debounce: Duration,
    /// Preferred mutation observer root; the body is used when it is missing.
    pub observed_root: &'static str,
    /// Candidate selectors for the video to pause, tried in order.
    pub video_selectors: Vec<&'static str>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            observed_root: PRIMARY_CONTAINER_SELECTOR,
            video_selectors: VIDEO_SELECTORS.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Address prefixes of pages that run a page agent.
    pub target_origins: Vec<&'static str>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            target_origins: TARGET_ORIGINS.to_vec(),
        }
    }
}
