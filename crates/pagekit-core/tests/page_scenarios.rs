//! End-to-end page scenarios over the in-memory host.
//!
//! Each test builds a small document, boots a [`Page`] against it and drives
//! it with the events a visitor would produce.

use std::rc::Rc;

use pagekit_core::host::memory::{MemoryHost, NodeId};
use pagekit_core::{
    EventKind, Host, KeyValueStore, LoadKind, Markup, MemoryStore, Page, PageLoad, RenderChange,
    SessionPhase, Selector, SiteConfig,
};
use pretty_assertions::assert_eq;

fn site_markup() -> Vec<Markup> {
    vec![
        Markup::element("header").class("header").child(
            Markup::element("nav").class("nav-right").child(
                Markup::element("a")
                    .id("signInLink")
                    .attr("href", "login.html")
                    .text("Sign In"),
            ),
        ),
        Markup::element("a").id("jump").attr("href", "#features"),
        Markup::element("a").id("broken").attr("href", "#nowhere"),
        Markup::element("section")
            .id("features")
            .child(Markup::element("div").id("row1").class("feature-row"))
            .child(Markup::element("div").id("row2").class("feature-row")),
        Markup::element("form")
            .id("contactForm")
            .child(Markup::element("input").id("email").attr("required", ""))
            .child(Markup::element("textarea").id("message")),
    ]
}

fn boot(
    store: &Rc<MemoryStore>,
    kind: LoadKind,
    path: &str,
) -> (Rc<MemoryHost>, Page<MemoryHost, MemoryStore>) {
    let host = Rc::new(MemoryHost::with_body(site_markup()));
    let page = Page::boot(
        Rc::clone(&host),
        Rc::clone(store),
        PageLoad::new(kind, path),
        SiteConfig::default(),
    );
    (host, page)
}

fn by_id(host: &MemoryHost, id: &str) -> NodeId {
    host.element_by_id(id)
        .unwrap_or_else(|| panic!("element #{id} should exist"))
}

#[test]
fn signed_in_visitor_sees_name_and_can_sign_out() {
    let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
    let (host, page) = boot(&store, LoadKind::Navigate, "/index.html");

    let report = page.session_report().expect("session enabled");
    assert_eq!(
        report.phase,
        SessionPhase::Authenticated {
            identifier: "jane@example.com".into(),
            display_name: "jane".into(),
        }
    );
    assert_eq!(report.render, RenderChange::ReplacedSignIn);
    assert!(report.sign_out_bound);

    let nav = host.query(None, &Selector::class("nav-right")).unwrap();
    assert_eq!(
        host.outer_html(&nav),
        "<nav class=\"nav-right\"><div class=\"user-status\"><div class=\"user-info\">\
         <span class=\"dot\"></span><span class=\"username\">jane</span></div>\
         <a id=\"signOut\" class=\"btn-signout\" href=\"javascript:void(0)\">Sign Out</a>\
         </div></nav>"
    );

    let sign_out = by_id(&host, "signOut");
    assert!(host.click(&sign_out));
    let overlay = page.overlay().state();
    assert!(overlay.visible);
    assert_eq!(overlay.title, "Sign Out");
    assert_eq!(overlay.message, "Are you sure you want to end your session?");
    assert!(overlay.pending_callback);
    assert_eq!(host.reload_count(), 0);
    assert_eq!(store.get("user").unwrap().as_deref(), Some("jane@example.com"));

    host.click(&by_id(&host, "globalModalClose"));
    assert_eq!(store.get("user").unwrap(), None);
    assert_eq!(host.reload_count(), 1);
    assert!(!host.is_scroll_locked());
}

#[test]
fn sign_out_then_reload_renders_anonymous() {
    let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
    let (host, _page) = boot(&store, LoadKind::Navigate, "/index.html");
    host.click(&by_id(&host, "signOut"));
    host.click(&by_id(&host, "globalModalClose"));
    assert_eq!(host.reload_count(), 1);

    let (next, page) = boot(&store, LoadKind::Reload, "/index.html");
    assert_eq!(page.session_report().unwrap().phase, SessionPhase::Anonymous);
    assert_eq!(next.count(&Selector::attr("a", "href", "login.html")), 1);
    assert_eq!(next.count(&Selector::class("user-status")), 0);
}

#[test]
fn anonymous_visitor_keeps_sign_in_link() {
    let store = Rc::new(MemoryStore::new());
    let (host, page) = boot(&store, LoadKind::Navigate, "/index.html");

    let report = page.session_report().unwrap();
    assert_eq!(report.phase, SessionPhase::Anonymous);
    assert_eq!(report.render, RenderChange::Unchanged);
    assert!(!report.sign_out_bound);
    assert!(host.is_attached(&by_id(&host, "signInLink")));
    assert!(host.element_by_id("signOut").is_none());
}

#[test]
fn reload_clears_session_before_reading() {
    let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
    let (host, page) = boot(&store, LoadKind::Reload, "/index.html");
    assert_eq!(store.get("user").unwrap(), None);
    assert_eq!(page.session_report().unwrap().phase, SessionPhase::Anonymous);
    assert!(host.is_attached(&by_id(&host, "signInLink")));
}

#[test]
fn back_forward_keeps_session() {
    let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
    let (_host, page) = boot(&store, LoadKind::BackForward, "/index.html");
    assert_eq!(store.get("user").unwrap().as_deref(), Some("jane@example.com"));
    assert!(matches!(
        page.session_report().unwrap().phase,
        SessionPhase::Authenticated { .. }
    ));
}

#[test]
fn auth_pages_are_not_mutated() {
    for path in ["/login.html", "/signup.html"] {
        let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
        let (host, page) = boot(&store, LoadKind::Navigate, path);
        let report = page.session_report().unwrap();
        assert_eq!(report.render, RenderChange::Unchanged, "{path}");
        assert!(!report.sign_out_bound);
        assert!(host.is_attached(&by_id(&host, "signInLink")));
        assert_eq!(host.count(&Selector::class("user-status")), 0);
    }
}

#[test]
fn rerunning_sync_never_duplicates_widget() {
    let store = Rc::new(MemoryStore::with_entry("user", "jane@example.com"));
    let (host, page) = boot(&store, LoadKind::Navigate, "/index.html");
    let sync = page.session().unwrap();
    for _ in 0..3 {
        assert_eq!(sync.run().render, RenderChange::AlreadyPresent);
    }
    assert_eq!(host.count(&Selector::class("user-status")), 1);
    assert_eq!(host.count(&Selector::attr("a", "href", "login.html")), 0);
    assert_eq!(
        host.listener_count(&by_id(&host, "signOut"), EventKind::Click),
        1
    );
}

#[test]
fn contact_form_is_acknowledged_and_reset() {
    let store = Rc::new(MemoryStore::new());
    let (host, page) = boot(&store, LoadKind::Navigate, "/contact.html");
    assert_eq!(page.forms().len(), 1);

    let email = by_id(&host, "email");
    let message = by_id(&host, "message");
    host.set_value(&message, "Hello there");

    assert!(host.submit(&by_id(&host, "contactForm")));
    let state = page.overlay().state();
    assert!(state.visible);
    assert_eq!(state.title, "Message Sent");
    assert_eq!(
        state.message,
        "Thank you! We have received your message and will get back to you shortly."
    );
    assert_eq!(host.value(&email), "");
    assert_eq!(host.value(&message), "");
    assert!(host.is_scroll_locked());

    host.click(&by_id(&host, "globalModalClose"));
    assert!(!host.is_scroll_locked());
    assert_eq!(host.reload_count(), 0);
}

#[test]
fn anchor_to_missing_target_is_silent() {
    let store = Rc::new(MemoryStore::new());
    let (host, _page) = boot(&store, LoadKind::Navigate, "/");
    assert!(host.click(&by_id(&host, "broken")));
    assert!(host.scrolled_into_view().is_empty());

    assert!(host.click(&by_id(&host, "jump")));
    assert_eq!(host.scrolled_into_view(), vec![by_id(&host, "features")]);
}

#[test]
fn reveal_and_chrome_are_wired() {
    let store = Rc::new(MemoryStore::new());
    let (host, page) = boot(&store, LoadKind::Navigate, "/");
    let row1 = by_id(&host, "row1");
    let row2 = by_id(&host, "row2");

    host.intersect(&[(row1, true), (row2, false)]);
    assert!(host.has_class(&row1, "visible"));
    assert!(!host.has_class(&row2, "visible"));
    assert_eq!(page.reveal().unwrap().revealed_count(), 1);

    let header = page.chrome().unwrap().header().clone();
    host.scroll_to(20.0);
    assert!(!host.has_class(&header, "scrolled"));
    host.scroll_to(21.0);
    assert!(host.has_class(&header, "scrolled"));
}

#[test]
fn overlay_is_installed_once_across_boots_on_same_document() {
    let host = Rc::new(MemoryHost::with_body(site_markup()));
    let store = Rc::new(MemoryStore::new());
    for _ in 0..3 {
        let _page = Page::boot(
            Rc::clone(&host),
            Rc::clone(&store),
            PageLoad::new(LoadKind::Navigate, "/"),
            SiteConfig::default(),
        );
    }
    assert_eq!(host.count(&Selector::id("globalModal")), 1);
}

#[test]
fn custom_config_changes_storage_key_and_routes() {
    let config = SiteConfig::from_json(
        r#"{ "session": { "storage_key": "member", "auth_routes": ["account/"] } }"#,
    )
    .unwrap();
    let store = Rc::new(MemoryStore::with_entry("member", "lee@example.com"));
    let host = Rc::new(MemoryHost::with_body(site_markup()));
    let page = Page::boot(
        Rc::clone(&host),
        Rc::clone(&store),
        PageLoad::new(LoadKind::Navigate, "/login.html"),
        config,
    );
    // login.html is no longer an auth route under this config.
    assert_eq!(
        page.session_report().unwrap().render,
        RenderChange::ReplacedSignIn
    );
    let name = host.query(None, &Selector::class("username")).unwrap();
    assert_eq!(host.text(&name), "lee");
}
