#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use pagekit_core::host::{EventHandler, IntersectionHandler, ScrollHandler};
use pagekit_core::{
    DomEvent, EventKind, Host, IntersectionEntry, KeyValueStore, LoadKind, Markup, Page, PageLoad,
    Selector, SessionRecord, SiteConfig, StoreError, StoreResult,
};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    Storage, Window,
};

type EventClosure = Closure<dyn FnMut(Event)>;
type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

thread_local! {
    static PAGE: RefCell<Option<Page<WebHost, SessionStore>>> = const { RefCell::new(None) };
    static READY_HANDLER: RefCell<Option<EventClosure>> = const { RefCell::new(None) };
}

/// Best-effort text for a thrown JS value.
fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error_name(value: &JsValue) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
}

fn log_failure(op: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        debug!(op, error = %js_message(&err), "dom operation failed");
    }
}

/// Event wrapper handed to core handlers.
struct WebEvent(Event);

impl DomEvent for WebEvent {
    fn prevent_default(&self) {
        self.0.prevent_default();
    }
}

/// [`Host`] over the live document.
///
/// Closures registered with the browser are owned here for the life of the
/// page; dropping the host would detach every listener.
pub struct WebHost {
    window: Window,
    document: Document,
    listeners: RefCell<Vec<EventClosure>>,
    observer_callbacks: RefCell<Vec<ObserverClosure>>,
    observers: RefCell<Vec<IntersectionObserver>>,
}

impl std::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHost")
            .field("listeners", &self.listeners.borrow().len())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl WebHost {
    /// Bind to the window's document. `None` outside a document context
    /// (workers).
    pub fn new(window: Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self {
            window,
            document,
            listeners: RefCell::new(Vec::new()),
            observer_callbacks: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
        })
    }

    /// Read the navigation type and path of the current document.
    pub fn current_load(&self) -> PageLoad {
        let path = self.window.location().pathname().unwrap_or_default();
        let entry_type = self.window.performance().and_then(|perf| {
            let first = perf.get_entries_by_type("navigation").get(0);
            js_sys::Reflect::get(&first, &JsValue::from_str("type"))
                .ok()?
                .as_string()
        });
        PageLoad::new(LoadKind::from_entry_type(entry_type.as_deref()), path)
    }

    fn build(&self, markup: &Markup) -> Option<Element> {
        let el = self.document.create_element(&markup.tag).ok()?;
        if let Some(id) = &markup.id {
            el.set_id(id);
        }
        if !markup.classes.is_empty() {
            el.set_class_name(&markup.classes.join(" "));
        }
        for (name, value) in &markup.attrs {
            log_failure("set_attribute", el.set_attribute(name, value));
        }
        if let Some(text) = &markup.text {
            el.set_text_content(Some(text));
        }
        for child in &markup.children {
            let node = self.build(child)?;
            el.append_child(&node).ok()?;
        }
        Some(el)
    }

    fn first_match(&self, scope: Option<&Element>, css: &str) -> Option<Element> {
        let found = match scope {
            Some(el) => el.query_selector(css),
            None => self.document.query_selector(css),
        };
        match found {
            Ok(el) => el,
            Err(err) => {
                warn!(selector = css, error = %js_message(&err), "invalid selector");
                None
            }
        }
    }
}

impl Host for WebHost {
    type Node = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query(&self, scope: Option<&Element>, selector: &Selector) -> Option<Element> {
        self.first_match(scope, &selector.to_css())
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        let css = selector.to_css();
        let Ok(list) = self.document.query_selector_all(&css) else {
            warn!(selector = %css, "invalid selector");
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn append(&self, parent: &Element, markup: &Markup) -> Option<Element> {
        let el = self.build(markup)?;
        parent.append_child(&el).ok()?;
        Some(el)
    }

    fn replace_with(&self, node: &Element, markup: &Markup) -> Option<Element> {
        node.parent_node()?;
        let el = self.build(markup)?;
        node.replace_with_with_node_1(&el).ok()?;
        Some(el)
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn add_class(&self, node: &Element, class: &str) {
        log_failure("classList.add", node.class_list().add_1(class));
    }

    fn remove_class(&self, node: &Element, class: &str) {
        log_failure("classList.remove", node.class_list().remove_1(class));
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_scroll_locked(&self, locked: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let overflow = if locked { "hidden" } else { "auto" };
        log_failure(
            "style.overflow",
            body.style().set_property("overflow", overflow),
        );
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn listen(&self, node: &Element, kind: EventKind, handler: EventHandler) {
        let mut handler = handler;
        let callback = EventClosure::wrap(Box::new(move |event: Event| {
            handler(&WebEvent(event));
        }));
        log_failure(
            "addEventListener",
            node.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref()),
        );
        self.listeners.borrow_mut().push(callback);
    }

    fn on_scroll(&self, handler: ScrollHandler) {
        let mut handler = handler;
        let window = self.window.clone();
        let callback = EventClosure::wrap(Box::new(move |_event: Event| {
            handler(window.scroll_y().unwrap_or(0.0));
        }));
        log_failure(
            "addEventListener",
            self.window
                .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref()),
        );
        self.listeners.borrow_mut().push(callback);
    }

    fn observe_intersections(
        &self,
        targets: &[Element],
        threshold: f64,
        handler: IntersectionHandler<Element>,
    ) {
        let mut handler = handler;
        let callback = ObserverClosure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let batch: Vec<IntersectionEntry<Element>> = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                handler(&batch);
            },
        ));

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(err) => {
                    warn!(error = %js_message(&err), "IntersectionObserver unavailable");
                    return;
                }
            };
        for target in targets {
            observer.observe(target);
        }
        self.observers.borrow_mut().push(observer);
        self.observer_callbacks.borrow_mut().push(callback);
    }

    fn reload(&self) {
        log_failure("location.reload", self.window.location().reload());
    }
}

/// [`KeyValueStore`] over the tab's `sessionStorage`.
#[derive(Debug)]
pub struct SessionStore {
    storage: Option<Storage>,
}

impl SessionStore {
    /// Bind to `window.sessionStorage`. Storage that throws on access (sandboxed
    /// frames, disabled storage) yields a store that reports `Unavailable`.
    pub fn new(window: &Window) -> Self {
        let storage = match window.session_storage() {
            Ok(storage) => storage,
            Err(err) => {
                warn!(error = %js_message(&err), "sessionStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> StoreResult<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("no sessionStorage".into()))
    }
}

impl KeyValueStore for SessionStore {
    fn name(&self) -> &str {
        "sessionStorage"
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|err| StoreError::Access(js_message(&err)))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.storage()?.set_item(key, value).map_err(|err| {
            if js_error_name(&err).as_deref() == Some("QuotaExceededError") {
                StoreError::Quota { key: key.to_owned() }
            } else {
                StoreError::Access(js_message(&err))
            }
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| StoreError::Access(js_message(&err)))
    }

    fn clear(&self) -> StoreResult<()> {
        self.storage()?
            .clear()
            .map_err(|err| StoreError::Access(js_message(&err)))
    }
}

fn start(config: SiteConfig) {
    let already = PAGE.with(|slot| slot.borrow().is_some());
    if already {
        debug!("pagekit already booted");
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let store = Rc::new(SessionStore::new(&window));
    let Some(host) = WebHost::new(window) else {
        return;
    };
    let load = host.current_load();
    let page = Page::boot(Rc::new(host), store, load, config);
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
}

/// Wire the page. Boots now if the document has finished parsing, otherwise
/// on `DOMContentLoaded`.
///
/// Returns `false` when a page was already booted (or scheduled) and this
/// call changed nothing. Fails only on an invalid config document.
#[wasm_bindgen]
pub fn boot(config: Option<String>) -> Result<bool, JsValue> {
    let config = crate::parse_config(config.as_deref())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let booted = PAGE.with(|slot| slot.borrow().is_some());
    let scheduled = READY_HANDLER.with(|slot| slot.borrow().is_some());
    if booted || scheduled {
        debug!(booted, scheduled, "boot ignored");
        return Ok(false);
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let mut pending = Some(config);
        let callback = EventClosure::wrap(Box::new(move |_event: Event| {
            if let Some(config) = pending.take() {
                start(config);
            }
        }));
        document
            .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())?;
        READY_HANDLER.with(|slot| *slot.borrow_mut() = Some(callback));
        info!("boot deferred to DOMContentLoaded");
    } else {
        start(config);
    }
    Ok(true)
}

/// Show a notification through the page's overlay. Returns `false` before
/// the page has booted.
#[wasm_bindgen(js_name = showNotification)]
pub fn show_notification(title: &str, message: &str) -> bool {
    PAGE.with(|slot| match slot.borrow().as_ref() {
        Some(page) => {
            page.notify(title, message);
            true
        }
        None => {
            debug!("notification before boot dropped");
            false
        }
    })
}

/// Record `identifier` as signed in for this tab. Takes effect on the next
/// page load.
#[wasm_bindgen(js_name = signIn)]
pub fn sign_in(identifier: &str) {
    let written = PAGE.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|page| page.sign_in(identifier))
            .is_some()
    });
    if written {
        return;
    }
    if let Some(window) = web_sys::window() {
        let store = Rc::new(SessionStore::new(&window));
        SessionRecord::new(store, SiteConfig::default().session.storage_key).store(identifier);
    }
}
