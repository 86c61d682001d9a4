//! WebAssembly bindings for ZenTube

pub mod agent;
pub mod chrome;
pub mod dom;
pub mod popup;

use std::sync::Once;

use wasm_bindgen::prelude::*;
use zt_core::url::is_target_page;

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::default());
    });
}

fn document() -> Result<(web_sys::Window, web_sys::Document), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;
    Ok((window, document))
}

/// Content script entry point.
#[wasm_bindgen]
pub fn start_page_agent() -> Result<(), JsValue> {
    init_logging();
    let (window, document) = document()?;
    agent::start(window, document)
}

/// Popup entry point. Call once the popup document has loaded.
#[wasm_bindgen]
pub fn start_settings_panel() -> Result<(), JsValue> {
    init_logging();
    let (_, document) = document()?;
    popup::start(document);
    Ok(())
}

#[wasm_bindgen]
pub fn page_agent_state() -> JsValue {
    let result = js_sys::Object::new();
    match agent::current() {
        Some(agent) => {
            let flags = js_sys::Array::new();
            for flag in agent.preferences().enabled() {
                flags.push(&JsValue::from_str(flag.name()));
            }
            let _ = js_sys::Reflect::set(&result, &"running".into(), &JsValue::from(true));
            let _ = js_sys::Reflect::set(&result, &"initialized".into(), &JsValue::from(agent.is_initialized()));
            let _ = js_sys::Reflect::set(&result, &"root".into(), &JsValue::from_str(agent.observed_root().as_str()));
            let _ = js_sys::Reflect::set(&result, &"flags".into(), &flags);
        }
        None => {
            let _ = js_sys::Reflect::set(&result, &"running".into(), &JsValue::from(false));
            let _ = js_sys::Reflect::set(&result, &"initialized".into(), &JsValue::from(false));
        }
    }
    result.into()
}

#[wasm_bindgen]
pub fn is_target_page_js(url: &str) -> bool {
    is_target_page(url)
}
