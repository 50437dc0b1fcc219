//! The rendering-environment port.
//!
//! [`Host`] is everything the components need from a document and its
//! window: lookups, node insertion and replacement, presentation classes,
//! the background scroll lock, and event registration. `pagekit-web`
//! implements it over `web-sys`; [`memory::MemoryHost`] is a deterministic
//! in-process tree used by tests.
//!
//! Every method is infallible by contract. A host that cannot perform an
//! operation (missing body, detached node) does nothing and returns `None`
//! where a value is expected, so components degrade without error paths.

pub mod memory;

use std::fmt;

use crate::markup::{Markup, Selector};

/// Events a component can listen for on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
        }
    }
}

/// The part of a dispatched DOM event handlers may act on.
pub trait DomEvent {
    /// Suppress the host's default action (navigation, form submission).
    fn prevent_default(&self);
}

/// One intersection observation for an observed target.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry<N> {
    pub target: N,
    pub is_intersecting: bool,
}

/// Handler for click/submit events.
pub type EventHandler = Box<dyn FnMut(&dyn DomEvent)>;

/// Handler for window scroll events; receives the current vertical offset.
pub type ScrollHandler = Box<dyn FnMut(f64)>;

/// Handler for batched intersection observations.
pub type IntersectionHandler<N> = Box<dyn FnMut(&[IntersectionEntry<N>])>;

/// Document and window operations, single-threaded.
pub trait Host: 'static {
    /// Handle to an element. Cheap to clone; equality is node identity.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// The document body, the default insertion parent.
    fn body(&self) -> Option<Self::Node>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// First match in document order, searching under `scope` when given.
    fn query(&self, scope: Option<&Self::Node>, selector: &Selector) -> Option<Self::Node>;

    /// All matches in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Node>;

    /// Materialize `markup` as the last child of `parent`.
    fn append(&self, parent: &Self::Node, markup: &Markup) -> Option<Self::Node>;

    /// Replace `node` in place with `markup` (the `outerHTML` swap).
    fn replace_with(&self, node: &Self::Node, markup: &Markup) -> Option<Self::Node>;

    /// Replace the text content of `node`.
    fn set_text(&self, node: &Self::Node, text: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Lock or unlock scrolling of the document's scroll container.
    fn set_scroll_locked(&self, locked: bool);

    /// Smooth-scroll `node` into view.
    fn scroll_into_view(&self, node: &Self::Node);

    /// Reset a form's fields to their initial values.
    fn reset_form(&self, form: &Self::Node);

    /// Register `handler` for `kind` events targeting `node`.
    fn listen(&self, node: &Self::Node, kind: EventKind, handler: EventHandler);

    /// Register `handler` for window scroll events.
    fn on_scroll(&self, handler: ScrollHandler);

    /// Observe `targets` with the given visibility `threshold` (0.0..=1.0).
    fn observe_intersections(
        &self,
        targets: &[Self::Node],
        threshold: f64,
        handler: IntersectionHandler<Self::Node>,
    );

    /// Force a full reload of the current document.
    fn reload(&self);
}
