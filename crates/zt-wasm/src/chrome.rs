//! Extension API adapters
//!
//! `chrome.storage.sync` backs [`PreferenceStore`]; `chrome.tabs` backs
//! [`TabMessenger`]. Both are reached through `js_sys::Reflect` and use the
//! promise-returning forms of the APIs.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use zt_core::{
    ActiveTab, MessagingError, PreferenceStore, Request, Response, StoreError, StoredEntries,
    TabMessenger,
};

/// Walk `chrome.<path...>` from the global object.
pub(crate) fn chrome_api(path: &[&str]) -> Result<JsValue, JsValue> {
    let mut value = Reflect::get(&js_sys::global(), &"chrome".into())?;
    for key in path {
        if value.is_undefined() || value.is_null() {
            return Err(JsValue::from_str(&format!("chrome.{} is not available", path.join("."))));
        }
        value = Reflect::get(&value, &JsValue::from_str(key))?;
    }
    if value.is_undefined() {
        return Err(JsValue::from_str(&format!("chrome.{} is not available", path.join("."))));
    }
    Ok(value)
}

fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    method.apply(target, args)
}

async fn call_async(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let promise: Promise = call_method(target, name, args)?.dyn_into()?;
    JsFuture::from(promise).await
}

/// Best-effort text for a JS error value.
pub(crate) fn describe_js_error(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

// =============================================================================
// Storage
// =============================================================================

/// `chrome.storage.<area>`.
#[derive(Debug, Clone, Copy)]
pub struct ChromeStorage {
    area: &'static str,
}

impl ChromeStorage {
    /// The synced storage area.
    pub fn sync() -> Self {
        Self { area: "sync" }
    }

    fn area(&self) -> Result<JsValue, StoreError> {
        chrome_api(&["storage", self.area]).map_err(|e| StoreError::Backend(describe_js_error(&e)))
    }
}

impl PreferenceStore for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<StoredEntries, StoreError> {
        let area = self.area()?;
        let key_array: Array = keys.iter().map(|key| JsValue::from_str(key)).collect();

        let reply = call_async(&area, "get", &Array::of1(&key_array))
            .await
            .map_err(|e| StoreError::Backend(describe_js_error(&e)))?;
        if !reply.is_object() {
            return Err(StoreError::MalformedReply(format!("{:?}", reply)));
        }

        let mut entries = StoredEntries::new();
        for key in keys {
            let value = Reflect::get(&reply, &JsValue::from_str(key))
                .map_err(|e| StoreError::MalformedReply(describe_js_error(&e)))?;
            // Absent keys come back undefined; anything non-boolean counts as absent.
            if let Some(on) = value.as_bool() {
                entries.insert(key.to_string(), on);
            }
        }
        Ok(entries)
    }

    async fn set(&self, entries: StoredEntries) -> Result<(), StoreError> {
        let area = self.area()?;
        let items = Object::new();
        for (key, on) in &entries {
            Reflect::set(&items, &JsValue::from_str(key), &JsValue::from_bool(*on))
                .map_err(|e| StoreError::Backend(describe_js_error(&e)))?;
        }

        call_async(&area, "set", &Array::of1(&items))
            .await
            .map_err(|e| StoreError::Backend(describe_js_error(&e)))?;
        Ok(())
    }
}

// =============================================================================
// Tabs
// =============================================================================

/// `chrome.tabs`, used from the popup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

const NO_RECEIVER: &str = "Receiving end does not exist";

impl TabMessenger for ChromeTabs {
    async fn active_tab(&self) -> Result<Option<ActiveTab>, MessagingError> {
        let tabs = chrome_api(&["tabs"]).map_err(|e| MessagingError::Send(describe_js_error(&e)))?;

        let query = Object::new();
        let _ = Reflect::set(&query, &"active".into(), &JsValue::TRUE);
        let _ = Reflect::set(&query, &"currentWindow".into(), &JsValue::TRUE);

        let reply = call_async(&tabs, "query", &Array::of1(&query))
            .await
            .map_err(|e| MessagingError::Send(describe_js_error(&e)))?;
        let first = Array::from(&reply).get(0);
        if first.is_undefined() {
            return Ok(None);
        }

        let id = Reflect::get(&first, &"id".into())
            .ok()
            .and_then(|id| id.as_f64())
            .ok_or_else(|| MessagingError::MalformedReply("tab without id".to_string()))?;
        let url = Reflect::get(&first, &"url".into()).ok().and_then(|url| url.as_string());

        Ok(Some(ActiveTab { id: id as i32, url }))
    }

    async fn send_request(&self, tab_id: i32, request: &Request) -> Result<Response, MessagingError> {
        let tabs = chrome_api(&["tabs"]).map_err(|e| MessagingError::Send(describe_js_error(&e)))?;

        let json = serde_json::to_string(request).map_err(|e| MessagingError::Send(e.to_string()))?;
        let message = js_sys::JSON::parse(&json).map_err(|e| MessagingError::Send(describe_js_error(&e)))?;

        let reply = call_async(&tabs, "sendMessage", &Array::of2(&JsValue::from(tab_id), &message))
            .await
            .map_err(|e| {
                let text = describe_js_error(&e);
                if text.contains(NO_RECEIVER) {
                    MessagingError::NoReceiver(tab_id)
                } else {
                    MessagingError::Send(text)
                }
            })?;
        if reply.is_undefined() {
            return Err(MessagingError::NoReceiver(tab_id));
        }

        let reply_json: String = js_sys::JSON::stringify(&reply)
            .map_err(|e| MessagingError::MalformedReply(describe_js_error(&e)))?
            .into();
        serde_json::from_str(&reply_json).map_err(|e| MessagingError::MalformedReply(e.to_string()))
    }
}
