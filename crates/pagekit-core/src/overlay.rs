//! Singleton notification overlay.
//!
//! One modal per document: a title, a message and a single acknowledge
//! control. [`OverlayController::show`] replaces whatever is on screen
//! (last writer wins) and holds at most one pending dismiss callback. The
//! controller is the only component that touches the background scroll lock.
//!
//! # Invariants
//!
//! 1. **Idempotent install**: [`OverlayController::ensure_installed`] inserts
//!    the overlay element at most once per document, looked up by id.
//! 2. **Single slot**: each `show` overwrites the pending callback; a
//!    superseded callback is dropped without running.
//! 3. **Take then run**: dismiss empties the slot before invoking the
//!    callback, so a callback that calls `show` keeps its new registration.
//! 4. **Lock follows visibility**: scrolling is locked exactly while the
//!    overlay is visible.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::OverlayConfig;
use crate::host::{EventKind, Host};
use crate::markup::Markup;

/// Callback run once when the overlay is acknowledged.
pub type DismissCallback = Box<dyn FnOnce()>;

/// Observable overlay state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub visible: bool,
    pub title: String,
    pub message: String,
    /// Whether a dismiss callback is waiting.
    pub pending_callback: bool,
}

#[derive(Debug)]
struct Handles<N> {
    root: N,
    title: Option<N>,
    message: Option<N>,
}

/// The page's single modal notification.
pub struct OverlayController<H: Host> {
    host: Rc<H>,
    config: OverlayConfig,
    this: Weak<Self>,
    handles: RefCell<Option<Handles<H::Node>>>,
    close_bound: Cell<bool>,
    visible: Cell<bool>,
    title: RefCell<String>,
    message: RefCell<String>,
    on_dismiss: RefCell<Option<DismissCallback>>,
}

impl<H: Host> std::fmt::Debug for OverlayController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("state", &self.state())
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl<H: Host> OverlayController<H> {
    /// Create the controller and install the overlay into the document.
    pub fn install(host: Rc<H>, config: OverlayConfig) -> Rc<Self> {
        let controller = Rc::new_cyclic(|this| Self {
            host,
            title: RefCell::new(config.initial_title.clone()),
            message: RefCell::new(config.initial_message.clone()),
            config,
            this: this.clone(),
            handles: RefCell::new(None),
            close_bound: Cell::new(false),
            visible: Cell::new(false),
            on_dismiss: RefCell::new(None),
        });
        controller.ensure_installed();
        controller
    }

    fn markup(&self) -> Markup {
        let c = &self.config;
        Markup::element("div")
            .id(&c.overlay_id)
            .class(&c.overlay_class)
            .child(
                Markup::element("div")
                    .class(&c.content_class)
                    .child(
                        Markup::element("h2")
                            .id(&c.title_id)
                            .text(&c.initial_title),
                    )
                    .child(
                        Markup::element("p")
                            .id(&c.message_id)
                            .text(&c.initial_message),
                    )
                    .child(
                        Markup::element("button")
                            .id(&c.close_id)
                            .class(&c.close_class)
                            .text(&c.close_label),
                    ),
            )
    }

    /// Make sure the overlay exists in the document, inserting it if no
    /// element with the overlay id is present. Returns `true` when this call
    /// inserted it.
    pub fn ensure_installed(&self) -> bool {
        let host = &self.host;
        let mut inserted = false;
        let root = match host.element_by_id(&self.config.overlay_id) {
            Some(existing) => existing,
            None => {
                let Some(body) = host.body() else {
                    crate::debug!("overlay install skipped: no body");
                    return false;
                };
                let Some(root) = host.append(&body, &self.markup()) else {
                    return false;
                };
                inserted = true;
                root
            }
        };

        *self.handles.borrow_mut() = Some(Handles {
            root,
            title: host.element_by_id(&self.config.title_id),
            message: host.element_by_id(&self.config.message_id),
        });

        if !self.close_bound.get() {
            if let Some(close) = host.element_by_id(&self.config.close_id) {
                let this = self.this.clone();
                host.listen(
                    &close,
                    EventKind::Click,
                    Box::new(move |_event| {
                        if let Some(overlay) = this.upgrade() {
                            overlay.dismiss();
                        }
                    }),
                );
                self.close_bound.set(true);
            }
        }

        crate::debug!(inserted, "overlay installed");
        inserted
    }

    /// Whether the overlay element has been located or inserted.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.handles.borrow().is_some()
    }

    /// Show `title` and `message`, replacing any current notification and
    /// any pending callback.
    pub fn show(&self, title: &str, message: &str, on_dismiss: Option<DismissCallback>) {
        let span = crate::debug_span!("overlay.show");
        let _guard = span.enter();

        title.clone_into(&mut self.title.borrow_mut());
        message.clone_into(&mut self.message.borrow_mut());
        self.visible.set(true);

        if let Some(handles) = self.handles.borrow().as_ref() {
            if let Some(node) = &handles.title {
                self.host.set_text(node, title);
            }
            if let Some(node) = &handles.message {
                self.host.set_text(node, message);
            }
            self.host.add_class(&handles.root, &self.config.active_class);
            // Only lock while a dismiss control exists to release it.
            self.host.set_scroll_locked(true);
        }

        let _replaced = self.on_dismiss.replace(on_dismiss).is_some();
        crate::debug!(title, replaced = _replaced, "overlay shown");
    }

    /// Show a notification with no dismiss callback.
    pub fn notify(&self, title: &str, message: &str) {
        self.show(title, message, None);
    }

    /// Acknowledge the overlay: hide it, release the scroll lock and run the
    /// pending callback, if any. Returns whether a callback ran.
    pub fn dismiss(&self) -> bool {
        self.visible.set(false);
        if let Some(handles) = self.handles.borrow().as_ref() {
            self.host
                .remove_class(&handles.root, &self.config.active_class);
        }
        self.host.set_scroll_locked(false);

        let callback = self.on_dismiss.borrow_mut().take();
        crate::debug!(callback = callback.is_some(), "overlay dismissed");
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        OverlayState {
            visible: self.visible.get(),
            title: self.title.borrow().clone(),
            message: self.message.borrow().clone(),
            pending_callback: self.on_dismiss.borrow().is_some(),
        }
    }

    /// The overlay root element, once installed.
    #[must_use]
    pub fn root(&self) -> Option<H::Node> {
        self.handles.borrow().as_ref().map(|h| h.root.clone())
    }
}
