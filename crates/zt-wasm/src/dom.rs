//! web-sys implementations of the page DOM and timer traits.

use std::cell::RefCell;
use std::time::Duration;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlVideoElement, Window};

use zt_core::{PageDom, RegionElement, TimerHost, VideoElement};

/// A page element the agent can hide.
#[derive(Debug, Clone)]
pub struct WebRegion(pub HtmlElement);

impl RegionElement for WebRegion {
    fn hide(&self) {
        let _ = self.0.style().set_property("display", "none");
    }

    fn unhide(&self) {
        let _ = self.0.style().remove_property("display");
    }

    fn force_layout(&self) {
        // Reading a layout property flushes pending style changes.
        let _ = self.0.offset_height();
    }
}

#[derive(Debug, Clone)]
pub struct WebVideo(pub HtmlVideoElement);

impl VideoElement for WebVideo {
    fn is_playing(&self) -> bool {
        !self.0.paused() && !self.0.ended()
    }

    fn pause(&self) {
        if let Err(e) = self.0.pause() {
            log::warn!("Failed to pause video: {:?}", e);
        }
    }
}

/// The live document.
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl PageDom for WebDom {
    type Region = WebRegion;
    type Video = WebVideo;

    fn select_all(&self, selector: &str) -> Vec<WebRegion> {
        let nodes = match self.document.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("Invalid selector {}: {:?}", selector, e);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(WebRegion)
            .collect()
    }

    fn select_video(&self, selector: &str) -> Option<WebVideo> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlVideoElement>().ok())
            .map(WebVideo)
    }

    fn exists(&self, selector: &str) -> bool {
        matches!(self.document.query_selector(selector), Ok(Some(_)))
    }

    fn is_hidden(&self) -> bool {
        self.document.hidden()
    }
}

/// `window.setTimeout` with a callback bound once after construction.
///
/// The callback has to reach the agent that owns this timer, so it cannot be
/// supplied to the constructor.
pub struct WindowTimer {
    window: Window,
    callback: RefCell<Option<js_sys::Function>>,
}

impl WindowTimer {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: RefCell::new(None),
        }
    }

    pub fn bind(&self, callback: js_sys::Function) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

impl TimerHost for WindowTimer {
    type Handle = i32;

    fn set_timeout(&self, delay: Duration) -> Option<i32> {
        let callback = self.callback.borrow();
        let callback = callback.as_ref()?;
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback, millis)
            .ok()
    }

    fn clear_timeout(&self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}
