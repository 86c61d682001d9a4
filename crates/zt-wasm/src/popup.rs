//! Popup wiring for the settings panel.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlInputElement};

use zt_core::{Flag, PanelConfig, SettingsPanel, ToggleView};

use crate::chrome::{ChromeStorage, ChromeTabs};

pub type WebPanel = SettingsPanel<ChromeStorage, ChromeTabs>;

/// Checkbox inputs whose ids are the flags' storage keys.
#[derive(Debug, Clone)]
pub struct CheckboxView {
    document: Document,
}

impl CheckboxView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn input(&self, flag: Flag) -> Option<HtmlInputElement> {
        self.document
            .get_element_by_id(flag.storage_key())
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }
}

impl ToggleView for CheckboxView {
    fn set_toggle(&self, flag: Flag, on: bool) {
        match self.input(flag) {
            Some(input) => input.set_checked(on),
            None => log::warn!("No toggle control for {}", flag),
        }
    }
}

pub fn start(document: Document) {
    let view = CheckboxView::new(document);
    let panel: Rc<WebPanel> = Rc::new(SettingsPanel::new(
        ChromeStorage::sync(),
        ChromeTabs,
        PanelConfig::default(),
    ));

    spawn_local(async move {
        panel.load(&view).await;
        // Listeners go in after the first render so a stored value cannot
        // overwrite a click made while loading.
        for flag in Flag::ALL {
            if let Err(e) = listen_toggle(&panel, &view, flag) {
                log::error!("Failed to bind toggle {}: {:?}", flag, e);
            }
        }
    });
}

fn listen_toggle(panel: &Rc<WebPanel>, view: &CheckboxView, flag: Flag) -> Result<(), JsValue> {
    let Some(input) = view.input(flag) else {
        return Ok(());
    };

    let panel = Rc::clone(panel);
    let target = input.clone();
    let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        let panel = Rc::clone(&panel);
        let on = target.checked();
        spawn_local(async move {
            let outcome = panel.handle_toggle(flag, on).await;
            log::debug!("Toggle {} -> {:?}", flag, outcome);
        });
    }) as Box<dyn FnMut(web_sys::Event)>);

    input.add_event_listener_with_callback("change", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}
