//! Page boot sequence.
//!
//! [`Page::boot`] is the document-ready handler: install the overlay, sync
//! the session indicator (which may bind sign-out to the overlay), then
//! attach the independent listeners. The returned [`Page`] owns the
//! components for the life of the document.

use std::rc::Rc;

use crate::anchors::AnchorNavigator;
use crate::chrome::ScrollChrome;
use crate::config::{Features, SiteConfig};
use crate::forms::FormInterceptor;
use crate::host::Host;
use crate::navigation::PageLoad;
use crate::overlay::OverlayController;
use crate::reveal::RevealObserver;
use crate::session::{SessionRecord, SessionStateSync, SyncReport};
use crate::store::KeyValueStore;

/// Everything wired on one document.
pub struct Page<H: Host, S: KeyValueStore> {
    overlay: Rc<OverlayController<H>>,
    record: SessionRecord<S>,
    session: Option<SessionStateSync<H, S>>,
    report: Option<SyncReport>,
    reveal: Option<RevealObserver<H>>,
    chrome: Option<ScrollChrome<H>>,
    forms: Vec<FormInterceptor<H>>,
    anchors: Option<AnchorNavigator>,
    load: PageLoad,
}

impl<H: Host, S: KeyValueStore> std::fmt::Debug for Page<H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("load", &self.load)
            .field("overlay", &self.overlay)
            .field("session", &self.report)
            .field("reveal", &self.reveal)
            .field("chrome", &self.chrome.is_some())
            .field("forms", &self.forms)
            .field("anchors", &self.anchors)
            .finish()
    }
}

impl<H: Host, S: KeyValueStore> Page<H, S> {
    /// Wire every enabled component in dependency order.
    pub fn boot(host: Rc<H>, store: Rc<S>, load: PageLoad, config: SiteConfig) -> Self {
        let span = crate::debug_span!("page.boot", path = %load.path, load = load.kind.as_str());
        let _guard = span.enter();

        let overlay = OverlayController::install(Rc::clone(&host), config.overlay.clone());
        let record = SessionRecord::new(Rc::clone(&store), config.session.storage_key.clone());

        let (session, report) = if config.enabled(Features::SESSION) {
            let sync = SessionStateSync::new(
                Rc::clone(&host),
                Rc::clone(&overlay),
                store,
                load.clone(),
                config.session.clone(),
            );
            let report = sync.run();
            (Some(sync), Some(report))
        } else {
            (None, None)
        };

        let reveal = config
            .enabled(Features::REVEAL)
            .then(|| RevealObserver::attach(&host, &config.reveal));

        let chrome = if config.enabled(Features::CHROME) {
            ScrollChrome::attach(&host, &config.chrome)
        } else {
            None
        };

        let forms: Vec<FormInterceptor<H>> = if config.enabled(Features::FORMS) {
            config
                .forms
                .iter()
                .filter_map(|spec| FormInterceptor::attach_spec(&host, &overlay, spec))
                .collect()
        } else {
            Vec::new()
        };

        let anchors = config
            .enabled(Features::ANCHORS)
            .then(|| AnchorNavigator::attach(&host));

        crate::info!(
            forms = forms.len(),
            header = chrome.is_some(),
            "page booted"
        );

        Self {
            overlay,
            record,
            session,
            report,
            reveal,
            chrome,
            forms,
            anchors,
            load,
        }
    }

    #[must_use]
    pub fn overlay(&self) -> &Rc<OverlayController<H>> {
        &self.overlay
    }

    /// Show a notification with no dismiss callback.
    pub fn notify(&self, title: &str, message: &str) {
        self.overlay.notify(title, message);
    }

    /// Record `identifier` as signed in. Nothing is rendered until the next
    /// page load.
    pub fn sign_in(&self, identifier: &str) {
        self.record.store(identifier);
    }

    #[must_use]
    pub fn record(&self) -> &SessionRecord<S> {
        &self.record
    }

    #[must_use]
    pub fn session(&self) -> Option<&SessionStateSync<H, S>> {
        self.session.as_ref()
    }

    /// Result of the boot-time session sync; `None` when disabled.
    #[must_use]
    pub fn session_report(&self) -> Option<&SyncReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn reveal(&self) -> Option<&RevealObserver<H>> {
        self.reveal.as_ref()
    }

    #[must_use]
    pub fn chrome(&self) -> Option<&ScrollChrome<H>> {
        self.chrome.as_ref()
    }

    #[must_use]
    pub fn forms(&self) -> &[FormInterceptor<H>] {
        &self.forms
    }

    #[must_use]
    pub fn anchors(&self) -> Option<&AnchorNavigator> {
        self.anchors.as_ref()
    }

    #[must_use]
    pub fn load(&self) -> &PageLoad {
        &self.load
    }
}
