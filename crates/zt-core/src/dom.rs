//! Page DOM abstraction
//!
//! The agent only needs a handful of operations on the host page: select
//! regions, toggle their inline `display`, force a layout, and find and pause
//! a video. The browser implementation lives in `zt-wasm`.

use crate::rules::SuppressionRule;

/// A region of the host page that can be hidden.
pub trait RegionElement {
    /// Set the inline style to non-displayed.
    fn hide(&self);
    /// Remove the inline `display` set by [`RegionElement::hide`].
    fn unhide(&self);
    /// Force a synchronous layout so the next style change is not coalesced
    /// with this one.
    fn force_layout(&self);
}

/// A media element the agent may pause.
pub trait VideoElement {
    fn is_playing(&self) -> bool;
    fn pause(&self);
}

/// The host document.
pub trait PageDom {
    type Region: RegionElement;
    type Video: VideoElement;

    /// All elements matching `selector`. Zero matches is not an error.
    fn select_all(&self, selector: &str) -> Vec<Self::Region>;
    /// First video element matching `selector`.
    fn select_video(&self, selector: &str) -> Option<Self::Video>;
    /// Does any element match `selector`?
    fn exists(&self, selector: &str) -> bool;
    /// Is the document currently hidden (background tab, minimized window)?
    fn is_hidden(&self) -> bool;
}

/// Root node watched for mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedRoot {
    /// The primary content container was present at initialize time.
    PrimaryContainer,
    /// Fallback: the whole body.
    Body,
}

impl ObservedRoot {
    /// Pick the root once. The choice is not revisited if the container
    /// appears later.
    pub fn choose<D: PageDom>(dom: &D, primary_selector: &str) -> Self {
        if dom.exists(primary_selector) {
            Self::PrimaryContainer
        } else {
            Self::Body
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryContainer => "primary",
            Self::Body => "body",
        }
    }
}

/// Hide every element matching the rule. Returns the match count.
pub fn suppress_rule<D: PageDom>(dom: &D, rule: &SuppressionRule) -> usize {
    let regions = dom.select_all(rule.selector);
    log::debug!("Hiding {}: {} elements found", rule.selector, regions.len());
    for region in &regions {
        region.hide();
    }
    regions.len()
}

/// Clear suppression on every element matching the rule and force a layout
/// on each. Returns the match count.
pub fn reveal_rule<D: PageDom>(dom: &D, rule: &SuppressionRule) -> usize {
    let regions = dom.select_all(rule.selector);
    log::debug!("Showing {}: {} elements found", rule.selector, regions.len());
    for region in &regions {
        region.unhide();
        region.force_layout();
    }
    regions.len()
}

/// First video matching any of `selectors`, in order.
pub fn find_video<D: PageDom>(dom: &D, selectors: &[&str]) -> Option<D::Video> {
    selectors.iter().find_map(|selector| dom.select_video(selector))
}
