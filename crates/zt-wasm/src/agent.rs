//! Content script wiring for the page agent.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, MutationObserver, MutationObserverInit, Node};

use zt_core::{message::parse_request, AgentConfig, ObservedRoot, PageAgent};

use crate::chrome::{chrome_api, ChromeStorage};
use crate::dom::{WebDom, WindowTimer};

pub type WebAgent = PageAgent<WebDom, ChromeStorage, WindowTimer>;

thread_local! {
    static AGENT: RefCell<Option<Rc<WebAgent>>> = const { RefCell::new(None) };
}

/// The running agent, if the content script has started.
pub fn current() -> Option<Rc<WebAgent>> {
    AGENT.with(|slot| slot.borrow().clone())
}

pub fn start(window: web_sys::Window, document: Document) -> Result<(), JsValue> {
    if current().is_some() {
        return Err(JsValue::from_str("Page agent already running"));
    }

    log::info!(
        "ZenTube page agent injected on: {}",
        window.location().href().unwrap_or_default()
    );
    if let Some(root) = document.document_element() {
        let _ = root.set_attribute("data-zt-injected", "1");
    }

    let agent = Rc::new(PageAgent::new(
        WebDom::new(document.clone()),
        ChromeStorage::sync(),
        WindowTimer::new(window),
        AgentConfig::default(),
    ));

    bind_debounce_timer(&agent);
    observe_mutations(&agent, &document)?;
    listen_visibility(&agent, &document)?;
    listen_messages(&agent)?;

    let initializing = Rc::clone(&agent);
    spawn_local(async move {
        // Failures are logged by the agent, which falls back to all-off.
        let _ = initializing.initialize().await;
    });

    AGENT.with(|slot| *slot.borrow_mut() = Some(agent));
    Ok(())
}

fn bind_debounce_timer(agent: &Rc<WebAgent>) {
    let weak: Weak<WebAgent> = Rc::downgrade(agent);
    let callback = Closure::wrap(Box::new(move || {
        if let Some(agent) = weak.upgrade() {
            agent.on_debounce_elapsed();
        }
    }) as Box<dyn FnMut()>);

    agent.timer().bind(callback.as_ref().unchecked_ref::<js_sys::Function>().clone());
    callback.forget();
}

fn observed_node(agent: &WebAgent, document: &Document) -> Option<Node> {
    let primary = match agent.observed_root() {
        ObservedRoot::PrimaryContainer => document
            .query_selector(agent.config().observed_root)
            .ok()
            .flatten()
            .map(Node::from),
        ObservedRoot::Body => None,
    };
    primary.or_else(|| document.body().map(Node::from))
}

fn observe_mutations(agent: &Rc<WebAgent>, document: &Document) -> Result<(), JsValue> {
    let root = observed_node(agent, document).ok_or_else(|| JsValue::from_str("No node to observe"))?;
    log::debug!("Observing mutations under {}", agent.observed_root().as_str());

    let weak = Rc::downgrade(agent);
    let callback = Closure::wrap(Box::new(move |_records: js_sys::Array, _observer: MutationObserver| {
        if let Some(agent) = weak.upgrade() {
            agent.on_mutation();
        }
    }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&root, &init)?;

    callback.forget();
    Ok(())
}

fn listen_visibility(agent: &Rc<WebAgent>, document: &Document) -> Result<(), JsValue> {
    let weak = Rc::downgrade(agent);
    let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        if let Some(agent) = weak.upgrade() {
            agent.on_visibility_change();
        }
    }) as Box<dyn FnMut(web_sys::Event)>);

    document.add_event_listener_with_callback("visibilitychange", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

fn listen_messages(agent: &Rc<WebAgent>) -> Result<(), JsValue> {
    let weak = Rc::downgrade(agent);

    // chrome.runtime.onMessage.addListener((message, sender, sendResponse) => ...)
    // Returning true keeps sendResponse alive for the async reply.
    let callback = Closure::wrap(Box::new(
        move |message: JsValue, _sender: JsValue, send_response: js_sys::Function| -> JsValue {
            let request = match js_sys::JSON::stringify(&message) {
                Ok(json) => parse_request(&String::from(json)),
                Err(_) => None,
            };
            let (Some(request), Some(agent)) = (request, weak.upgrade()) else {
                return JsValue::FALSE;
            };

            spawn_local(async move {
                let response = agent.handle_request(&request).await;
                let reply = serde_json::to_string(&response)
                    .map_err(|e| JsValue::from_str(&e.to_string()))
                    .and_then(|json| js_sys::JSON::parse(&json));
                match reply {
                    Ok(reply) => {
                        let _ = send_response.call1(&JsValue::UNDEFINED, &reply);
                    }
                    Err(e) => log::error!("Failed to encode response: {:?}", e),
                }
            });

            JsValue::TRUE
        },
    ) as Box<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>);

    let on_message = chrome_api(&["runtime", "onMessage"])?;
    let add_listener: js_sys::Function = Reflect::get(&on_message, &"addListener".into())?.dyn_into()?;
    add_listener.call1(&on_message, callback.as_ref())?;

    callback.forget();
    Ok(())
}
