//! Deterministic in-process [`Host`] for tests and non-browser embedders.
//!
//! The tree is a flat arena of element records rooted at a `body` node.
//! Replaced nodes are detached (no parent) but keep their id, so stale
//! handles stay valid and simply stop matching queries.
//!
//! Beyond the [`Host`] contract, `MemoryHost` exposes driver methods the
//! browser would normally supply: [`MemoryHost::click`],
//! [`MemoryHost::submit`], [`MemoryHost::scroll_to`] and
//! [`MemoryHost::intersect`]. Dispatch clones the handler list before calling
//! anything, so handlers may freely call back into the host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{
    DomEvent, EventHandler, EventKind, Host, IntersectionEntry, IntersectionHandler, ScrollHandler,
};
use crate::markup::{ElementView, Markup, Selector};

/// Handle to a node in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The body node every host starts with.
    pub const BODY: Self = Self(0);
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: String,
    /// Live value of a form field; `None` means the `value` attribute applies.
    value: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn view(&self) -> ElementView<'_> {
        ElementView {
            tag: &self.tag,
            id: self.id.as_deref(),
            classes: &self.classes,
            attrs: &self.attrs,
        }
    }
}

/// A dispatched event in a [`MemoryHost`].
#[derive(Debug, Default)]
pub struct MemoryEvent {
    default_prevented: Cell<bool>,
}

impl MemoryEvent {
    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

impl DomEvent for MemoryEvent {
    fn prevent_default(&self) {
        self.default_prevented.set(true);
    }
}

type SharedHandler = Rc<RefCell<EventHandler>>;

struct Listener {
    node: NodeId,
    kind: EventKind,
    handler: SharedHandler,
}

struct Observer {
    targets: Vec<NodeId>,
    threshold: f64,
    handler: Rc<RefCell<IntersectionHandler<NodeId>>>,
}

/// In-memory document and window.
pub struct MemoryHost {
    nodes: RefCell<Vec<NodeData>>,
    listeners: RefCell<Vec<Listener>>,
    scroll_handlers: RefCell<Vec<Rc<RefCell<ScrollHandler>>>>,
    observers: RefCell<Vec<Observer>>,
    scroll_locked: Cell<bool>,
    scroll_offset: Cell<f64>,
    reloads: Cell<u32>,
    scrolled_into_view: RefCell<Vec<NodeId>>,
    /// `false` models a document whose body is not reachable yet.
    has_body: bool,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("nodes", &self.nodes.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .field("scroll_locked", &self.scroll_locked.get())
            .field("reloads", &self.reloads.get())
            .finish()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// A document with an empty body.
    #[must_use]
    pub fn new() -> Self {
        let body = NodeData {
            tag: "body".into(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            value: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: RefCell::new(vec![body]),
            listeners: RefCell::new(Vec::new()),
            scroll_handlers: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            scroll_locked: Cell::new(false),
            scroll_offset: Cell::new(0.0),
            reloads: Cell::new(0),
            scrolled_into_view: RefCell::new(Vec::new()),
            has_body: true,
        }
    }

    /// A document whose `body()` lookup fails, as during early parsing.
    #[must_use]
    pub fn without_body() -> Self {
        Self {
            has_body: false,
            ..Self::new()
        }
    }

    /// A document whose body holds `children`, in order.
    #[must_use]
    pub fn with_body(children: impl IntoIterator<Item = Markup>) -> Self {
        let host = Self::new();
        for child in children {
            host.append(&NodeId::BODY, &child);
        }
        host
    }

    fn build(&self, markup: &Markup, parent: Option<NodeId>) -> NodeId {
        let id = {
            let mut nodes = self.nodes.borrow_mut();
            nodes.push(NodeData {
                tag: markup.tag.clone(),
                id: markup.id.clone(),
                classes: markup.classes.clone(),
                attrs: markup.attrs.clone(),
                text: markup.text.clone().unwrap_or_default(),
                value: None,
                parent,
                children: Vec::new(),
            });
            NodeId(nodes.len() - 1)
        };
        for child in &markup.children {
            let child_id = self.build(child, Some(id));
            self.nodes.borrow_mut()[id.0].children.push(child_id);
        }
        id
    }

    fn with_node<R>(&self, node: &NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.nodes.borrow().get(node.0).map(f)
    }

    fn with_node_mut(&self, node: &NodeId, f: impl FnOnce(&mut NodeData)) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(node.0) {
            f(data);
        }
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = nodes
            .get(root.0)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = nodes.get(id.0) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn matching(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let candidates = self.descendants(root);
        let nodes = self.nodes.borrow();
        candidates
            .into_iter()
            .filter(|id| selector.matches(&nodes[id.0].view()))
            .collect()
    }

    fn dispatch(&self, node: &NodeId, kind: EventKind) -> bool {
        let handlers: Vec<SharedHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.node == *node && l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        let event = MemoryEvent::default();
        for handler in handlers {
            (&mut *handler.borrow_mut())(&event);
        }
        event.default_prevented()
    }

    /// Dispatch a click on `node`. Returns whether the default was prevented.
    pub fn click(&self, node: &NodeId) -> bool {
        self.dispatch(node, EventKind::Click)
    }

    /// Dispatch a submit on `node`. Returns whether the default was prevented.
    pub fn submit(&self, node: &NodeId) -> bool {
        self.dispatch(node, EventKind::Submit)
    }

    /// Move the window to `offset` and fire scroll handlers.
    pub fn scroll_to(&self, offset: f64) {
        self.scroll_offset.set(offset);
        let handlers: Vec<_> = self.scroll_handlers.borrow().iter().map(Rc::clone).collect();
        for handler in handlers {
            (&mut *handler.borrow_mut())(offset);
        }
    }

    /// Deliver one intersection batch. Each observer sees only the entries
    /// for targets it observes; observers with none are not called.
    pub fn intersect(&self, entries: &[(NodeId, bool)]) {
        let batches: Vec<_> = self
            .observers
            .borrow()
            .iter()
            .map(|o| {
                let batch: Vec<IntersectionEntry<NodeId>> = entries
                    .iter()
                    .filter(|(id, _)| o.targets.contains(id))
                    .map(|&(target, is_intersecting)| IntersectionEntry {
                        target,
                        is_intersecting,
                    })
                    .collect();
                (Rc::clone(&o.handler), batch)
            })
            .collect();
        for (handler, batch) in batches {
            if !batch.is_empty() {
                (&mut *handler.borrow_mut())(&batch);
            }
        }
    }

    /// Set the live value of a form field.
    pub fn set_value(&self, node: &NodeId, value: &str) {
        self.with_node_mut(node, |n| n.value = Some(value.to_owned()));
    }

    /// Live value of a form field, falling back to its `value` attribute.
    #[must_use]
    pub fn value(&self, node: &NodeId) -> String {
        self.with_node(node, |n| {
            n.value.clone().unwrap_or_else(|| {
                n.attrs
                    .iter()
                    .find(|(name, _)| name == "value")
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
        })
        .unwrap_or_default()
    }

    /// Own text content of `node` (children excluded).
    #[must_use]
    pub fn text(&self, node: &NodeId) -> String {
        self.with_node(node, |n| n.text.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.with_node(node, |n| n.parent).flatten()
    }

    #[must_use]
    pub fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.with_node(node, |n| n.children.clone())
            .unwrap_or_default()
    }

    /// Whether `node` is reachable from the body.
    #[must_use]
    pub fn is_attached(&self, node: &NodeId) -> bool {
        let mut cur = *node;
        loop {
            if cur == NodeId::BODY {
                return true;
            }
            match self.parent(&cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Number of attached elements matching `selector`.
    #[must_use]
    pub fn count(&self, selector: &Selector) -> usize {
        self.matching(NodeId::BODY, selector).len()
    }

    #[must_use]
    pub fn listener_count(&self, node: &NodeId, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.node == *node && l.kind == kind)
            .count()
    }

    #[must_use]
    pub fn scroll_listener_count(&self) -> usize {
        self.scroll_handlers.borrow().len()
    }

    /// Thresholds of registered intersection observers, in order.
    #[must_use]
    pub fn observer_thresholds(&self) -> Vec<f64> {
        self.observers.borrow().iter().map(|o| o.threshold).collect()
    }

    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked.get()
    }

    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    #[must_use]
    pub fn reload_count(&self) -> u32 {
        self.reloads.get()
    }

    /// Nodes passed to `scroll_into_view`, oldest first.
    #[must_use]
    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.scrolled_into_view.borrow().clone()
    }

    /// Escaped HTML of `node` and its subtree.
    #[must_use]
    pub fn outer_html(&self, node: &NodeId) -> String {
        self.to_markup(*node).map(|m| m.to_html()).unwrap_or_default()
    }

    fn to_markup(&self, node: NodeId) -> Option<Markup> {
        let (mut markup, children) = self.with_node(&node, |n| {
            let markup = Markup {
                tag: n.tag.clone(),
                id: n.id.clone(),
                classes: n.classes.clone(),
                attrs: n.attrs.clone(),
                text: (!n.text.is_empty()).then(|| n.text.clone()),
                children: Vec::new(),
            };
            (markup, n.children.clone())
        })?;
        markup.children = children
            .into_iter()
            .filter_map(|c| self.to_markup(c))
            .collect();
        Some(markup)
    }
}

impl Host for MemoryHost {
    type Node = NodeId;

    fn body(&self) -> Option<NodeId> {
        self.has_body.then_some(NodeId::BODY)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.matching(NodeId::BODY, &Selector::id(id))
            .into_iter()
            .next()
    }

    fn query(&self, scope: Option<&NodeId>, selector: &Selector) -> Option<NodeId> {
        let root = scope.copied().unwrap_or(NodeId::BODY);
        self.matching(root, selector).into_iter().next()
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.matching(NodeId::BODY, selector)
    }

    fn append(&self, parent: &NodeId, markup: &Markup) -> Option<NodeId> {
        if self.with_node(parent, |_| ()).is_none() {
            return None;
        }
        let id = self.build(markup, Some(*parent));
        self.with_node_mut(parent, |p| p.children.push(id));
        Some(id)
    }

    fn replace_with(&self, node: &NodeId, markup: &Markup) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let id = self.build(markup, Some(parent));
        self.with_node_mut(&parent, |p| {
            if let Some(slot) = p.children.iter_mut().find(|c| **c == *node) {
                *slot = id;
            }
        });
        self.with_node_mut(node, |n| n.parent = None);
        Some(id)
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.with_node_mut(node, |n| n.text = text.to_owned());
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| {
            if name == "id" {
                return n.id.clone();
            }
            n.attrs
                .iter()
                .find(|(attr, _)| attr == name)
                .map(|(_, v)| v.clone())
        })
        .flatten()
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        self.with_node_mut(node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_owned());
            }
        });
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.with_node_mut(node, |n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locked.set(locked);
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.scrolled_into_view.borrow_mut().push(*node);
    }

    fn reset_form(&self, form: &NodeId) {
        for field in self.descendants(*form) {
            self.with_node_mut(&field, |n| {
                if matches!(n.tag.as_str(), "input" | "textarea" | "select") {
                    n.value = None;
                }
            });
        }
    }

    fn listen(&self, node: &NodeId, kind: EventKind, handler: EventHandler) {
        self.listeners.borrow_mut().push(Listener {
            node: *node,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn on_scroll(&self, handler: ScrollHandler) {
        self.scroll_handlers
            .borrow_mut()
            .push(Rc::new(RefCell::new(handler)));
    }

    fn observe_intersections(
        &self,
        targets: &[NodeId],
        threshold: f64,
        handler: IntersectionHandler<NodeId>,
    ) {
        self.observers.borrow_mut().push(Observer {
            targets: targets.to_vec(),
            threshold,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get().saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> Markup {
        Markup::element("nav").class("nav-right").child(
            Markup::element("a")
                .attr("href", "login.html")
                .text("Sign In"),
        )
    }

    #[test]
    fn queries_follow_document_order() {
        let host = MemoryHost::with_body([
            Markup::element("div").class("row").id("a"),
            Markup::element("div")
                .child(Markup::element("div").class("row").id("b")),
            Markup::element("div").class("row").id("c"),
        ]);
        let ids: Vec<_> = host
            .query_all(&Selector::class("row"))
            .iter()
            .filter_map(|n| host.with_node(n, |d| d.id.clone()).flatten())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn replace_detaches_old_node() {
        let host = MemoryHost::with_body([nav()]);
        let link = host
            .query(None, &Selector::attr("a", "href", "login.html"))
            .unwrap();
        let new = host
            .replace_with(&link, &Markup::element("div").class("user-status"))
            .unwrap();
        assert!(!host.is_attached(&link));
        assert!(host.is_attached(&new));
        assert_eq!(host.count(&Selector::attr("a", "href", "login.html")), 0);
        assert_eq!(host.count(&Selector::class("user-status")), 1);
    }

    #[test]
    fn replacing_body_is_refused() {
        let host = MemoryHost::new();
        assert!(host
            .replace_with(&NodeId::BODY, &Markup::element("div"))
            .is_none());
    }

    #[test]
    fn scoped_query_stays_in_scope() {
        let host = MemoryHost::with_body([
            Markup::element("a").attr("href", "login.html"),
            Markup::element("nav").class("nav-right"),
        ]);
        let nav = host.query(None, &Selector::class("nav-right")).unwrap();
        assert!(host
            .query(Some(&nav), &Selector::attr("a", "href", "login.html"))
            .is_none());
    }

    #[test]
    fn dispatch_reports_prevent_default() {
        let host = MemoryHost::with_body([Markup::element("a").id("x")]);
        let a = host.element_by_id("x").unwrap();
        assert!(!host.click(&a));
        host.listen(&a, EventKind::Click, Box::new(|e| e.prevent_default()));
        assert!(host.click(&a));
        assert!(!host.submit(&a));
    }

    #[test]
    fn handlers_may_reenter_host() {
        let host = Rc::new(MemoryHost::with_body([Markup::element("a").id("x")]));
        let a = host.element_by_id("x").unwrap();
        let inner = Rc::clone(&host);
        host.listen(
            &a,
            EventKind::Click,
            Box::new(move |_| {
                let body = inner.body().unwrap();
                inner.append(&body, &Markup::element("p").class("added"));
            }),
        );
        host.click(&a);
        assert_eq!(host.count(&Selector::class("added")), 1);
    }

    #[test]
    fn reset_restores_default_values() {
        let host = MemoryHost::with_body([Markup::element("form").id("f").child(
            Markup::element("input")
                .id("name")
                .attr("value", "default"),
        )]);
        let form = host.element_by_id("f").unwrap();
        let input = host.element_by_id("name").unwrap();
        host.set_value(&input, "typed");
        assert_eq!(host.value(&input), "typed");
        host.reset_form(&form);
        assert_eq!(host.value(&input), "default");
    }

    #[test]
    fn intersect_filters_per_observer() {
        let host = MemoryHost::with_body([
            Markup::element("div").id("a"),
            Markup::element("div").id("b"),
        ]);
        let a = host.element_by_id("a").unwrap();
        let b = host.element_by_id("b").unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        host.observe_intersections(
            &[a],
            0.5,
            Box::new(move |entries| {
                sink.borrow_mut()
                    .extend(entries.iter().map(|e| (e.target, e.is_intersecting)));
            }),
        );
        host.intersect(&[(b, true)]);
        assert!(seen.borrow().is_empty());
        host.intersect(&[(a, true), (b, false)]);
        assert_eq!(*seen.borrow(), vec![(a, true)]);
        assert_eq!(host.observer_thresholds(), vec![0.5]);
    }

    #[test]
    fn outer_html_dumps_subtree() {
        let host = MemoryHost::with_body([nav()]);
        let nav = host.query(None, &Selector::class("nav-right")).unwrap();
        assert_eq!(
            host.outer_html(&nav),
            "<nav class=\"nav-right\"><a href=\"login.html\">Sign In</a></nav>"
        );
    }
}
