//! Ephemeral sign-in indicator.
//!
//! The signed-in identifier lives in per-tab storage for one continuous
//! visit: it is dropped on reload and on confirmed sign-out. On each page
//! load [`SessionStateSync::run`] decides which navigation affordance is
//! shown.
//!
//! ```text
//! Init ─(reload?)─> clear ─> Read ─┬─> Anonymous            (terminal for this load)
//!                                  └─> Authenticated ─ sign-out confirmed ─> clear ─> reload ─> Init
//! ```
//!
//! Rendering is idempotent: the status widget replaces the sign-in link in
//! place, and is only appended when neither representation is present.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::host::{EventKind, Host};
use crate::markup::{Markup, Selector};
use crate::navigation::PageLoad;
use crate::overlay::OverlayController;
use crate::store::KeyValueStore;

/// Typed access to the single session entry.
pub struct SessionRecord<S: KeyValueStore> {
    store: Rc<S>,
    key: String,
}

impl<S: KeyValueStore> Clone for SessionRecord<S> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            key: self.key.clone(),
        }
    }
}

impl<S: KeyValueStore> std::fmt::Debug for SessionRecord<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("store", &self.store.name())
            .field("key", &self.key)
            .finish()
    }
}

impl<S: KeyValueStore> SessionRecord<S> {
    #[must_use]
    pub fn new(store: Rc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored identifier. Storage failures and empty strings read as
    /// signed out.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        match self.store.get(&self.key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(_err) => {
                crate::warn!(store = self.store.name(), error = %_err, "session read failed");
                None
            }
        }
    }

    /// Record `identifier` as signed in.
    pub fn store(&self, identifier: &str) {
        if let Err(_err) = self.store.set(&self.key, identifier) {
            crate::warn!(store = self.store.name(), error = %_err, "session write failed");
        }
    }

    /// Forget the identifier.
    pub fn clear(&self) {
        if let Err(_err) = self.store.remove(&self.key) {
            crate::warn!(store = self.store.name(), error = %_err, "session clear failed");
        }
    }
}

/// Name shown in the status widget for `identifier`.
///
/// Takes the part before the first `@`, which may be empty. An identifier
/// with no `@` is used whole.
#[must_use]
pub fn display_name(identifier: &str) -> &str {
    identifier
        .split_once('@')
        .map_or(identifier, |(local, _)| local)
}

/// Who is on the page after sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated {
        identifier: String,
        display_name: String,
    },
}

/// What sync did to the navigation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderChange {
    /// Nothing rendered: anonymous, auth page, or no container.
    Unchanged,
    /// The sign-in link was swapped for the status widget.
    ReplacedSignIn,
    /// No sign-in link and no widget; the widget was appended.
    Appended,
    /// A widget was already there.
    AlreadyPresent,
}

/// Outcome of one [`SessionStateSync::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub phase: SessionPhase,
    pub render: RenderChange,
    /// Whether a sign-out control was found and wired.
    pub sign_out_bound: bool,
}

impl SyncReport {
    fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            render: RenderChange::Unchanged,
            sign_out_bound: false,
        }
    }
}

/// Reads the session record and renders the navigation affordance.
pub struct SessionStateSync<H: Host, S: KeyValueStore> {
    host: Rc<H>,
    overlay: Rc<OverlayController<H>>,
    record: SessionRecord<S>,
    load: PageLoad,
    config: SessionConfig,
    /// Sign-out control that already carries our listener.
    bound_control: RefCell<Option<H::Node>>,
}

impl<H: Host, S: KeyValueStore> SessionStateSync<H, S> {
    #[must_use]
    pub fn new(
        host: Rc<H>,
        overlay: Rc<OverlayController<H>>,
        store: Rc<S>,
        load: PageLoad,
        config: SessionConfig,
    ) -> Self {
        let record = SessionRecord::new(store, config.storage_key.clone());
        Self {
            host,
            overlay,
            record,
            load,
            config,
            bound_control: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn record(&self) -> &SessionRecord<S> {
        &self.record
    }

    /// Whether the current page is an authentication page.
    #[must_use]
    pub fn is_auth_page(&self) -> bool {
        self.load.matches_any(&self.config.auth_routes)
    }

    /// Run one sync pass. Safe to call repeatedly.
    pub fn run(&self) -> SyncReport {
        let span = crate::debug_span!("session.sync", load = self.load.kind.as_str());
        let _guard = span.enter();

        if self.load.kind.is_reload() {
            crate::debug!("reload detected, clearing session");
            self.record.clear();
        }

        let Some(identifier) = self.record.read() else {
            crate::debug!("no session");
            return SyncReport::anonymous();
        };
        let name = display_name(&identifier).to_owned();
        let phase = SessionPhase::Authenticated {
            identifier: identifier.clone(),
            display_name: name.clone(),
        };

        if self.is_auth_page() {
            crate::debug!(path = %self.load.path, "auth page, navigation untouched");
            return SyncReport {
                phase,
                render: RenderChange::Unchanged,
                sign_out_bound: false,
            };
        }

        let container_selector = Selector::class(&self.config.nav_container_class);
        let Some(container) = self.host.query(None, &container_selector) else {
            crate::debug!("no navigation container");
            return SyncReport {
                phase,
                render: RenderChange::Unchanged,
                sign_out_bound: false,
            };
        };

        let render = self.render(&container, &name);
        let sign_out_bound = self.bind_sign_out();
        crate::debug!(?render, sign_out_bound, "session rendered");

        SyncReport {
            phase,
            render,
            sign_out_bound,
        }
    }

    fn status_markup(&self, name: &str) -> Markup {
        let c = &self.config;
        Markup::element("div")
            .class(&c.status_class)
            .child(
                Markup::element("div")
                    .class(&c.info_class)
                    .child(Markup::element("span").class(&c.dot_class))
                    .child(Markup::element("span").class(&c.username_class).text(name)),
            )
            .child(
                Markup::element("a")
                    .id(&c.sign_out_id)
                    .class(&c.sign_out_class)
                    .attr("href", "javascript:void(0)")
                    .text(&c.sign_out_label),
            )
    }

    fn render(&self, container: &H::Node, name: &str) -> RenderChange {
        let sign_in = Selector::attr("a", "href", &self.config.sign_in_href);
        if let Some(link) = self.host.query(Some(container), &sign_in) {
            return match self.host.replace_with(&link, &self.status_markup(name)) {
                Some(_) => RenderChange::ReplacedSignIn,
                None => RenderChange::Unchanged,
            };
        }

        let status = Selector::class(&self.config.status_class);
        if self.host.query(Some(container), &status).is_some() {
            return RenderChange::AlreadyPresent;
        }
        match self.host.append(container, &self.status_markup(name)) {
            Some(_) => RenderChange::Appended,
            None => RenderChange::Unchanged,
        }
    }

    fn bind_sign_out(&self) -> bool {
        let Some(control) = self.host.element_by_id(&self.config.sign_out_id) else {
            return false;
        };
        if self.bound_control.borrow().as_ref() == Some(&control) {
            return true;
        }

        let overlay = Rc::downgrade(&self.overlay);
        let host = Rc::clone(&self.host);
        let record = self.record.clone();
        let title = self.config.confirm_title.clone();
        let message = self.config.confirm_message.clone();

        self.host.listen(
            &control,
            EventKind::Click,
            Box::new(move |event| {
                event.prevent_default();
                let Some(overlay) = overlay.upgrade() else {
                    return;
                };
                let host = Rc::clone(&host);
                let record = record.clone();
                overlay.show(
                    &title,
                    &message,
                    Some(Box::new(move || {
                        crate::debug!("sign-out confirmed");
                        record.clear();
                        host.reload();
                    })),
                );
            }),
        );
        *self.bound_control.borrow_mut() = Some(control);
        true
    }
}
